use api_types::shop_owner::ShopOwner;
use tracing::warn;

use super::Outcome;
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, fetcher},
    live::LiveEvent,
    session::Session,
    validation::{FormMode, ShopOwnerForm},
};

pub const SEARCH_FIELDS: &[&str] = &["username"];

pub struct ShopOwnersView {
    list: ListState<ShopOwner>,
}

impl Default for ShopOwnersView {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopOwnersView {
    pub fn new() -> Self {
        let fetch = fetcher(|gateway: Gateway, session: Session| async move {
            gateway.shop_owners(&session).await
        });
        Self {
            list: ListState::new(fetch, SEARCH_FIELDS),
        }
    }

    pub fn list(&self) -> &ListState<ShopOwner> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<ShopOwner> {
        &mut self.list
    }

    pub async fn load(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        self.list.fetch(gateway, session).await
    }

    /// Creates or updates depending on `mode`.
    pub async fn save(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        mode: &FormMode,
        form: &ShopOwnerForm,
    ) -> Outcome {
        let payload = match form.validate(mode) {
            Ok(payload) => payload,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match mode {
            FormMode::Create => match gateway.create_shop_owner(session, &payload).await {
                Ok(owner) => {
                    self.list.add_item(owner);
                    self.list
                        .show_toast("Shop owner created successfully!", ToastLevel::Success);
                    Outcome::Applied
                }
                Err(err) => {
                    warn!(error = %err, "shop owner create failed");
                    self.list
                        .show_toast("Failed to create shop owner", ToastLevel::Error);
                    Outcome::from(&err)
                }
            },
            FormMode::Edit(id) => match gateway.update_shop_owner(session, id, &payload).await {
                Ok(owner) => {
                    self.list.update_item(id, owner);
                    self.list
                        .show_toast("Shop owner updated successfully!", ToastLevel::Success);
                    Outcome::Applied
                }
                Err(err) => {
                    warn!(error = %err, id, "shop owner update failed");
                    self.list
                        .show_toast("Failed to update shop owner", ToastLevel::Error);
                    Outcome::from(&err)
                }
            },
        }
    }

    pub async fn delete(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.delete_shop_owner(session, id).await {
            Ok(()) => {
                self.list.delete_item(id);
                self.list
                    .show_toast("Shop owner deleted successfully!", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "shop owner delete failed");
                self.list
                    .show_toast("Failed to delete shop owner", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    pub async fn toggle_status(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.toggle_shop_owner_status(session, id).await {
            Ok(owner) => {
                let verb = if owner.is_active { "activated" } else { "deactivated" };
                self.list.update_item(id, owner);
                self.list.show_toast(
                    format!("Shop owner {verb} successfully!"),
                    ToastLevel::Success,
                );
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "shop owner status toggle failed");
                self.list
                    .show_toast("Failed to update shop owner status", ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    /// Returns whether the list should be refetched.
    pub fn handle_live(&mut self, event: &LiveEvent) -> bool {
        matches!(event, LiveEvent::ShopOwnerUpdated(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::gateway::GatewayConfig;

    fn offline_gateway() -> Gateway {
        Gateway::new(&GatewayConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_any_request() {
        let mut view = ShopOwnersView::new();
        let form = ShopOwnerForm {
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            username: "abebe".to_string(),
            password: "abc".to_string(),
            re_password: "abc".to_string(),
        };
        let outcome = view
            .save(&offline_gateway(), &Session::default(), &FormMode::Create, &form)
            .await;
        let errors = outcome.field_errors().unwrap();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert!(view.list().toast().is_none());
    }

    #[test]
    fn owner_updates_trigger_refetch() {
        let mut view = ShopOwnersView::new();
        assert!(view.handle_live(&LiveEvent::ShopOwnerUpdated(Value::Null)));
        assert!(!view.handle_live(&LiveEvent::ShopUpdated(Value::Null)));
    }
}
