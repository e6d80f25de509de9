use api_types::slip::{SlipDetail, SlipSearch};
use chrono::{NaiveDate, Utc};
use tracing::warn;

use super::catalog::ShopCatalog;
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, empty_fetcher},
    session::Session,
    validation::{digits_only, ticket_number},
};

pub const SHOP_REQUIRED_MESSAGE: &str = "Please select a shop";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlipQuery {
    pub shop_id: Option<String>,
    pub cashier_id: Option<String>,
    pub date: Option<NaiveDate>,
    ticket_number: String,
    game_id: String,
}

impl SlipQuery {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            shop_id: None,
            cashier_id: None,
            date: Some(today),
            ticket_number: String::new(),
            game_id: String::new(),
        }
    }

    pub fn ticket_number(&self) -> &str {
        &self.ticket_number
    }

    pub fn set_ticket_number(&mut self, raw: &str) {
        self.ticket_number = ticket_number(raw);
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn set_game_id(&mut self, raw: &str) {
        self.game_id = digits_only(raw);
    }

    pub fn to_search(&self) -> Option<SlipSearch> {
        let shop_id = self.shop_id.as_deref().filter(|id| !id.is_empty())?;
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Some(SlipSearch {
            shop_id: shop_id.to_string(),
            cashier_id: self.cashier_id.as_deref().and_then(non_empty),
            date: self.date.map(|date| date.format("%Y-%m-%d").to_string()),
            ticket_number: non_empty(&self.ticket_number),
            game_id: non_empty(&self.game_id),
        })
    }
}

/// One cell of a cartela grid and whether its number has been called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartelaCell {
    pub number: u32,
    pub called: bool,
}

/// The slip's cartela with called numbers marked. Zero is the free cell and
/// always counts as called.
pub fn cartela_grid(slip: &SlipDetail) -> Vec<Vec<CartelaCell>> {
    slip.cartela_pattern
        .iter()
        .map(|row| {
            row.iter()
                .map(|&number| CartelaCell {
                    number,
                    called: number == 0 || slip.called_numbers.contains(&number),
                })
                .collect()
        })
        .collect()
}

pub struct SlipsView {
    list: ListState<SlipDetail>,
    catalog: ShopCatalog,
    pub query: SlipQuery,
    selected: Option<String>,
    has_searched: bool,
}

impl Default for SlipsView {
    fn default() -> Self {
        Self::new()
    }
}

impl SlipsView {
    pub fn new() -> Self {
        Self {
            list: ListState::new(empty_fetcher(), &[])
                .with_failure_message("Failed to load slip details"),
            catalog: ShopCatalog::default(),
            query: SlipQuery::new(Utc::now().date_naive()),
            selected: None,
            has_searched: false,
        }
    }

    pub fn list(&self) -> &ListState<SlipDetail> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<SlipDetail> {
        &mut self.list
    }

    pub fn catalog(&self) -> &ShopCatalog {
        &self.catalog
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub async fn load_catalog(&mut self, gateway: &Gateway, session: &Session) {
        match ShopCatalog::load(gateway, session).await {
            Ok(catalog) => self.catalog = catalog,
            Err(err) => {
                warn!(error = %err, "slip pickers failed to load");
                self.list.show_toast("Failed to load data", ToastLevel::Error);
            }
        }
    }

    pub async fn search(&mut self, gateway: &Gateway, session: &Session) -> Option<FetchOutcome> {
        let Some(search) = self.query.to_search() else {
            self.list.show_toast(SHOP_REQUIRED_MESSAGE, ToastLevel::Error);
            return None;
        };

        let (gateway, session) = (gateway.clone(), session.clone());
        let pending = self.list.begin_fetch_with(Box::pin(async move {
            gateway.search_slips(&session, &search).await
        }));
        let outcome = self.list.complete_fetch(pending.resolve().await);
        if matches!(outcome, FetchOutcome::Loaded(_)) {
            self.has_searched = true;
            self.selected = None;
            self.list
                .show_toast("Slip details loaded successfully", ToastLevel::Success);
        }
        Some(outcome)
    }

    /// Opens the cartela view for one slip.
    pub fn select(&mut self, bet_id: &str) -> bool {
        if self.list.find(bet_id).is_none() {
            return false;
        }
        self.selected = Some(bet_id.to_string());
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&SlipDetail> {
        self.selected.as_deref().and_then(|id| self.list.find(id))
    }
}
