use api_types::{cashier::Cashier, shop::Shop};

use crate::{
    gateway::{Gateway, GatewayError},
    session::Session,
};

/// Shops and cashiers offered as pickers by the query views.
#[derive(Clone, Debug, Default)]
pub struct ShopCatalog {
    shops: Vec<Shop>,
    cashiers: Vec<Cashier>,
}

impl ShopCatalog {
    pub fn new(shops: Vec<Shop>, cashiers: Vec<Cashier>) -> Self {
        Self { shops, cashiers }
    }

    pub async fn load(gateway: &Gateway, session: &Session) -> Result<Self, GatewayError> {
        let (shops, cashiers) =
            tokio::try_join!(gateway.shops(session), gateway.cashiers(session))?;
        Ok(Self { shops, cashiers })
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    /// Cashiers of `shop_id`, or every cashier when no shop is picked.
    pub fn cashiers_of<'a>(&'a self, shop_id: Option<&'a str>) -> impl Iterator<Item = &'a Cashier> {
        self.cashiers
            .iter()
            .filter(move |cashier| shop_id.is_none_or(|id| cashier.shop.id == id))
    }

    pub fn shop_name(&self, id: &str) -> Option<&str> {
        self.shops
            .iter()
            .find(|shop| shop.id == id)
            .map(|shop| shop.shop_name.as_str())
    }
}
