use api_types::{
    auth::{AdminUser, LoginRequest, LoginResponse},
    balance::{BalanceQuery, BalanceResponse, CashierDetail},
    cashier::{BatFileResponse, Cashier, CashierPayload, SessionRegenerated},
    game_result::{GameResult, GameResultSearch},
    shop::{Shop, ShopPayload, ShopStatus, ShopStatusUpdate},
    shop_owner::{ShopOwner, ShopOwnerPayload},
    slip::{SlipDetail, SlipSearch},
    user::{PasswordReset, PasswordResetDone, User, UserNew, UserStatusUpdate},
};
use reqwest::Method;
use tracing::info;

use super::{Gateway, GatewayError};
use crate::session::Session;

type Result<T> = std::result::Result<T, GatewayError>;

impl Gateway {
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let payload = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = self
            .request(&Session::default(), Method::POST, &["auth", "login"], &[])?
            .json(&payload);
        let res: LoginResponse = self.data(req).await?;
        info!(username = %res.user.username, "admin logged in");
        Ok(res)
    }

    pub async fn logout(&self, session: &Session) -> Result<()> {
        let req = self.request(session, Method::POST, &["auth", "logout"], &[])?;
        self.unit(req).await
    }

    /// Checks that the stored token is still accepted.
    pub async fn verify(&self, session: &Session) -> Result<Option<AdminUser>> {
        #[derive(serde::Deserialize)]
        struct Verified {
            user: Option<AdminUser>,
        }
        let req = self.request(session, Method::GET, &["auth", "verify"], &[])?;
        let verified: Option<Verified> = self.envelope(req).await.or_else(|err| match err {
            GatewayError::Decode(_) => Ok(None),
            err => Err(err),
        })?;
        Ok(verified.and_then(|verified| verified.user))
    }

    pub async fn shop_owners(&self, session: &Session) -> Result<Vec<ShopOwner>> {
        let req = self.request(session, Method::GET, &["shop-owners"], &[])?;
        self.list(req).await
    }

    pub async fn create_shop_owner(
        &self,
        session: &Session,
        payload: &ShopOwnerPayload,
    ) -> Result<ShopOwner> {
        let req = self
            .request(session, Method::POST, &["shop-owners"], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn update_shop_owner(
        &self,
        session: &Session,
        id: &str,
        payload: &ShopOwnerPayload,
    ) -> Result<ShopOwner> {
        let req = self
            .request(session, Method::PUT, &["shop-owners", id], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn delete_shop_owner(&self, session: &Session, id: &str) -> Result<()> {
        let req = self.request(session, Method::DELETE, &["shop-owners", id], &[])?;
        self.unit(req).await
    }

    pub async fn toggle_shop_owner_status(&self, session: &Session, id: &str) -> Result<ShopOwner> {
        let req = self.request(
            session,
            Method::PATCH,
            &["shop-owners", id, "toggle-status"],
            &[],
        )?;
        self.data(req).await
    }

    pub async fn shops(&self, session: &Session) -> Result<Vec<Shop>> {
        let req = self.request(session, Method::GET, &["shops"], &[])?;
        self.list(req).await
    }

    pub async fn create_shop(&self, session: &Session, payload: &ShopPayload) -> Result<Shop> {
        let req = self
            .request(session, Method::POST, &["shops"], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn update_shop(
        &self,
        session: &Session,
        id: &str,
        payload: &ShopPayload,
    ) -> Result<Shop> {
        let req = self
            .request(session, Method::PUT, &["shops", id], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn delete_shop(&self, session: &Session, id: &str) -> Result<()> {
        let req = self.request(session, Method::DELETE, &["shops", id], &[])?;
        self.unit(req).await
    }

    pub async fn update_shop_status(
        &self,
        session: &Session,
        id: &str,
        status: ShopStatus,
    ) -> Result<Shop> {
        let req = self
            .request(session, Method::PATCH, &["shops", id, "status"], &[])?
            .json(&ShopStatusUpdate { status });
        self.data(req).await
    }

    pub async fn cashiers(&self, session: &Session) -> Result<Vec<Cashier>> {
        let req = self.request(session, Method::GET, &["cashiers"], &[])?;
        self.list(req).await
    }

    pub async fn create_cashier(
        &self,
        session: &Session,
        payload: &CashierPayload,
    ) -> Result<Cashier> {
        let req = self
            .request(session, Method::POST, &["cashiers"], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn update_cashier(
        &self,
        session: &Session,
        id: &str,
        payload: &CashierPayload,
    ) -> Result<Cashier> {
        let req = self
            .request(session, Method::PUT, &["cashiers", id], &[])?
            .json(payload);
        self.data(req).await
    }

    pub async fn delete_cashier(&self, session: &Session, id: &str) -> Result<()> {
        let req = self.request(session, Method::DELETE, &["cashiers", id], &[])?;
        self.unit(req).await
    }

    pub async fn toggle_cashier_status(&self, session: &Session, id: &str) -> Result<Cashier> {
        let req = self.request(session, Method::PATCH, &["cashiers", id, "status"], &[])?;
        self.data(req).await
    }

    /// Launcher script shown to the operator for a cashier display.
    pub async fn cashier_bat_content(&self, session: &Session, id: &str) -> Result<String> {
        let req = self.request(
            session,
            Method::GET,
            &["cashiers", id, "bat-file", "content"],
            &[],
        )?;
        let res: BatFileResponse = self.execute(req).await?;
        Ok(res.into_content())
    }

    pub async fn regenerate_cashier_session(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<SessionRegenerated> {
        let req = self.request(
            session,
            Method::POST,
            &["cashiers", id, "regenerate-session"],
            &[],
        )?;
        self.data(req).await
    }

    pub async fn search_game_results(
        &self,
        session: &Session,
        search: &GameResultSearch,
    ) -> Result<Vec<GameResult>> {
        let req = self
            .request(session, Method::POST, &["game-results", "admin-search"], &[])?
            .json(search);
        self.list(req).await
    }

    pub async fn search_slips(
        &self,
        session: &Session,
        search: &SlipSearch,
    ) -> Result<Vec<SlipDetail>> {
        let req = self
            .request(session, Method::POST, &["slips", "search"], &[])?
            .json(search);
        self.list(req).await
    }

    pub async fn balance_data(
        &self,
        session: &Session,
        query: &BalanceQuery,
    ) -> Result<BalanceResponse> {
        let req = self.request(session, Method::GET, &["balance", "data"], &query.pairs())?;
        Ok(self.envelope(req).await?.unwrap_or_default())
    }

    /// Per-cashier metrics of one shop. `shop_id` in the query is ignored.
    pub async fn cashier_details(
        &self,
        session: &Session,
        shop_id: &str,
        query: &BalanceQuery,
    ) -> Result<Vec<CashierDetail>> {
        let query = BalanceQuery {
            shop_id: None,
            ..query.clone()
        };
        let req = self.request(
            session,
            Method::GET,
            &["balance", "cashier-details", shop_id],
            &query.pairs(),
        )?;
        self.list(req).await
    }

    pub async fn users(&self, session: &Session) -> Result<Vec<User>> {
        let req = self.request(session, Method::GET, &["users"], &[])?;
        self.list(req).await
    }

    /// Some backends answer with an empty envelope, hence the `Option`.
    pub async fn create_user(&self, session: &Session, payload: &UserNew) -> Result<Option<User>> {
        let req = self
            .request(session, Method::POST, &["users"], &[])?
            .json(payload);
        self.envelope(req).await
    }

    pub async fn update_user_status(
        &self,
        session: &Session,
        id: &str,
        is_active: bool,
    ) -> Result<()> {
        let req = self
            .request(session, Method::PATCH, &["users", id, "status"], &[])?
            .json(&UserStatusUpdate { is_active });
        self.unit(req).await
    }

    pub async fn delete_user(&self, session: &Session, id: &str) -> Result<()> {
        let req = self.request(session, Method::DELETE, &["users", id], &[])?;
        self.unit(req).await
    }

    pub async fn reset_user_password(
        &self,
        session: &Session,
        id: &str,
        new_password: &str,
    ) -> Result<Option<PasswordResetDone>> {
        let req = self
            .request(
                session,
                Method::POST,
                &["users", id, "reset-password"],
                &[],
            )?
            .json(&PasswordReset {
                new_password: new_password.to_string(),
            });
        self.envelope(req).await
    }
}
