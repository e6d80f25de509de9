use api_types::{shop::Shop, shop_owner::ShopOwner};
use tracing::warn;

use super::{Outcome, failure_text};
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, fetcher},
    live::LiveEvent,
    session::Session,
    validation::{FormMode, ShopForm},
};

pub const SEARCH_FIELDS: &[&str] = &["shopName"];

/// One entry of the shop-owner picker in the shop form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerOption {
    pub id: String,
    pub label: String,
}

impl From<&ShopOwner> for OwnerOption {
    fn from(owner: &ShopOwner) -> Self {
        Self {
            id: owner.id.clone(),
            label: format!("{} ({})", owner.display_name(), owner.username),
        }
    }
}

pub struct ShopsView {
    list: ListState<Shop>,
    owners: Vec<ShopOwner>,
}

impl Default for ShopsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopsView {
    pub fn new() -> Self {
        let fetch = fetcher(|gateway: Gateway, session: Session| async move {
            gateway.shops(&session).await
        });
        Self {
            list: ListState::new(fetch, SEARCH_FIELDS),
            owners: Vec::new(),
        }
    }

    pub fn list(&self) -> &ListState<Shop> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<Shop> {
        &mut self.list
    }

    pub fn owner_options(&self) -> Vec<OwnerOption> {
        self.owners.iter().map(OwnerOption::from).collect()
    }

    /// Loads the shop list and the owner picker.
    pub async fn load(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        let outcome = self.list.fetch(gateway, session).await;
        self.load_owners(gateway, session).await;
        outcome
    }

    pub async fn load_owners(&mut self, gateway: &Gateway, session: &Session) {
        match gateway.shop_owners(session).await {
            Ok(owners) => self.owners = owners,
            Err(err) => {
                warn!(error = %err, "shop owner picker failed to load");
                self.list
                    .show_toast("Failed to load shop owners data", ToastLevel::Error);
            }
        }
    }

    pub async fn save(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        mode: &FormMode,
        form: &ShopForm,
    ) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(errors) => return Outcome::Rejected(errors),
        };

        let result = match mode {
            FormMode::Create => gateway.create_shop(session, &payload).await.map(|shop| {
                self.list.add_item(shop);
                "Shop created successfully"
            }),
            FormMode::Edit(id) => gateway
                .update_shop(session, id, &payload)
                .await
                .map(|shop| {
                    self.list.update_item(id, shop);
                    "Shop updated successfully"
                }),
        };

        match result {
            Ok(message) => {
                self.list.show_toast(message, ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "shop save failed");
                self.list
                    .show_toast(format!("Failed to save shop: {err}"), ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    pub async fn delete(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.delete_shop(session, id).await {
            Ok(()) => {
                self.list.delete_item(id);
                self.list
                    .show_toast("Shop deleted successfully", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "shop delete failed");
                self.list.show_toast("Failed to delete shop", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    /// Flips a shop between active and inactive.
    pub async fn toggle_status(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        let Some(current) = self.list.find(id).map(|shop| shop.status) else {
            return Outcome::Skipped;
        };
        let next = current.toggled();
        match gateway.update_shop_status(session, id, next).await {
            Ok(shop) => {
                self.list.update_item(id, shop);
                self.list.show_toast(
                    format!("Shop {} successfully", next.as_str()),
                    ToastLevel::Success,
                );
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "shop status update failed");
                self.list.show_toast(
                    failure_text(&err, "Failed to update shop status"),
                    ToastLevel::Error,
                );
                Outcome::from(&err)
            }
        }
    }

    /// Returns whether the view should reload.
    pub fn handle_live(&mut self, event: &LiveEvent) -> bool {
        matches!(
            event,
            LiveEvent::ShopUpdated(_) | LiveEvent::ShopOwnerUpdated(_)
        )
    }
}
