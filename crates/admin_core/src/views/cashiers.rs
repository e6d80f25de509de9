use api_types::{cashier::Cashier, shop::Shop};
use chrono::Utc;
use tracing::{info, warn};

use super::Outcome;
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, fetcher},
    live::LiveEvent,
    session::Session,
    validation::{CashierForm, FormMode},
};

pub const SEARCH_FIELDS: &[&str] = &["username"];

pub const NO_SESSION_MESSAGE: &str = "Cashier does not have a session ID. Please regenerate session.";

/// Shop filter applied on top of the search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ShopFilter {
    #[default]
    All,
    Shop(String),
}

impl ShopFilter {
    pub fn matches(&self, cashier: &Cashier) -> bool {
        match self {
            Self::All => true,
            Self::Shop(id) => cashier.shop.id == *id,
        }
    }
}

pub struct CashiersView {
    list: ListState<Cashier>,
    shops: Vec<Shop>,
    shop_filter: ShopFilter,
}

impl Default for CashiersView {
    fn default() -> Self {
        Self::new()
    }
}

impl CashiersView {
    pub fn new() -> Self {
        let fetch = fetcher(|gateway: Gateway, session: Session| async move {
            gateway.cashiers(&session).await
        });
        Self {
            list: ListState::new(fetch, SEARCH_FIELDS),
            shops: Vec::new(),
            shop_filter: ShopFilter::All,
        }
    }

    pub fn list(&self) -> &ListState<Cashier> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<Cashier> {
        &mut self.list
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn shop_filter(&self) -> &ShopFilter {
        &self.shop_filter
    }

    pub fn set_shop_filter(&mut self, filter: ShopFilter) {
        self.shop_filter = filter;
    }

    /// Search results narrowed to the selected shop.
    pub fn visible(&self) -> impl Iterator<Item = &Cashier> + '_ {
        self.list
            .filtered()
            .filter(|cashier| self.shop_filter.matches(cashier))
    }

    pub async fn load(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        let outcome = self.list.fetch(gateway, session).await;
        match gateway.shops(session).await {
            Ok(shops) => self.shops = shops,
            Err(err) => {
                warn!(error = %err, "shop picker failed to load");
                self.list
                    .show_toast("Failed to load shops data", ToastLevel::Error);
            }
        }
        outcome
    }

    pub async fn save(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        mode: &FormMode,
        form: &CashierForm,
    ) -> Outcome {
        let payload = match form.validate(mode) {
            Ok(payload) => payload,
            Err(errors) => return Outcome::Rejected(errors),
        };

        let result = match mode {
            FormMode::Create => gateway
                .create_cashier(session, &payload)
                .await
                .map(|cashier| {
                    self.list.add_item(cashier);
                    "Cashier created successfully"
                }),
            FormMode::Edit(id) => gateway
                .update_cashier(session, id, &payload)
                .await
                .map(|cashier| {
                    self.list.update_item(id, cashier);
                    "Cashier updated successfully"
                }),
        };

        match result {
            Ok(message) => {
                self.list.show_toast(message, ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "cashier save failed");
                self.list
                    .show_toast(format!("Failed to save cashier: {err}"), ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    pub async fn delete(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.delete_cashier(session, id).await {
            Ok(()) => {
                self.list.delete_item(id);
                self.list
                    .show_toast("Cashier deleted successfully", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "cashier delete failed");
                self.list
                    .show_toast("Failed to delete cashier", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    pub async fn toggle_status(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.toggle_cashier_status(session, id).await {
            Ok(cashier) => {
                let verb = if cashier.is_active { "activated" } else { "deactivated" };
                self.list.update_item(id, cashier);
                self.list.show_toast(
                    format!("Cashier {verb} successfully"),
                    ToastLevel::Success,
                );
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "cashier status toggle failed");
                self.list
                    .show_toast("Failed to update cashier status", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    /// Launcher script for the cashier's display. `None` when there is
    /// nothing to show; the reason is left in the toast.
    pub async fn bat_content(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        id: &str,
    ) -> Option<String> {
        let has_session = self
            .list
            .find(id)
            .is_some_and(|cashier| cashier.session_id.as_deref().is_some_and(|sid| !sid.is_empty()));
        if !has_session {
            self.list.show_toast(NO_SESSION_MESSAGE, ToastLevel::Error);
            return None;
        }

        match gateway.cashier_bat_content(session, id).await {
            Ok(content) => {
                self.list.show_toast("BAT command loaded", ToastLevel::Success);
                Some(content)
            }
            Err(err) => {
                warn!(error = %err, id, "bat content failed");
                self.list
                    .show_toast("Failed to load BAT file commands", ToastLevel::Error);
                None
            }
        }
    }

    /// Issues a fresh display session; the old display drops off.
    pub async fn regenerate_session(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        id: &str,
    ) -> Outcome {
        match gateway.regenerate_cashier_session(session, id).await {
            Ok(fresh) => {
                info!(id, "cashier session regenerated");
                self.list.patch_item(id, |cashier| {
                    cashier.session_id = Some(fresh.session_id);
                    cashier.display_url = Some(fresh.display_url);
                    cashier.is_connected = Some(false);
                    cashier.last_activity = Some(Utc::now());
                });
                self.list
                    .show_toast("Session ID regenerated successfully!", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "cashier session regeneration failed");
                self.list
                    .show_toast("Failed to regenerate session ID", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    /// Connection flips are patched in place; nothing here needs a refetch.
    pub fn handle_live(&mut self, event: &LiveEvent) -> bool {
        if let LiveEvent::CashierConnection {
            cashier_id,
            is_connected,
        } = event
        {
            let connected = *is_connected;
            self.list
                .patch_item(cashier_id, |cashier| cashier.is_connected = Some(connected));
        }
        false
    }
}
