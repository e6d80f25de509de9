use api_types::user::User;
use tracing::{info, warn};

use super::{Outcome, failure_text};
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, fetcher},
    session::Session,
    validation::{PasswordResetForm, UserForm},
};

pub const SEARCH_FIELDS: &[&str] = &["username", "fullName"];
pub const DEFAULT_ROLE: &str = "admin";

pub struct UsersView {
    list: ListState<User>,
}

impl Default for UsersView {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersView {
    pub fn new() -> Self {
        let fetch = fetcher(|gateway: Gateway, session: Session| async move {
            gateway.users(&session).await
        });
        Self {
            list: ListState::new(fetch, SEARCH_FIELDS).with_failure_message("Failed to fetch users"),
        }
    }

    pub fn list(&self) -> &ListState<User> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<User> {
        &mut self.list
    }

    /// Blank create form with the default role filled in.
    pub fn blank_form() -> UserForm {
        UserForm {
            role: DEFAULT_ROLE.to_string(),
            ..UserForm::default()
        }
    }

    pub async fn load(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        self.list.fetch(gateway, session).await
    }

    /// Creates the user, then reloads the list from the server unless the
    /// new record came back with the response.
    pub async fn create(&mut self, gateway: &Gateway, session: &Session, form: &UserForm) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match gateway.create_user(session, &payload).await {
            Ok(created) => {
                match created {
                    Some(user) => self.list.add_item(user),
                    None => {
                        self.list.fetch(gateway, session).await;
                    }
                }
                self.list
                    .show_toast("User created successfully", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "user create failed");
                self.list.show_toast(
                    failure_text(&err, "Failed to create user"),
                    ToastLevel::Error,
                );
                Outcome::from(&err)
            }
        }
    }

    pub async fn toggle_status(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        let Some(current) = self.list.find(id).map(|user| user.is_active) else {
            return Outcome::Skipped;
        };
        match gateway.update_user_status(session, id, !current).await {
            Ok(()) => {
                self.list.patch_item(id, |user| user.is_active = !current);
                let verb = if current { "deactivated" } else { "activated" };
                self.list
                    .show_toast(format!("User {verb} successfully"), ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "user status update failed");
                self.list.show_toast(
                    failure_text(&err, "Failed to update user status"),
                    ToastLevel::Error,
                );
                Outcome::from(&err)
            }
        }
    }

    pub async fn delete(&mut self, gateway: &Gateway, session: &Session, id: &str) -> Outcome {
        match gateway.delete_user(session, id).await {
            Ok(()) => {
                self.list.delete_item(id);
                self.list
                    .show_toast("User deleted successfully", ToastLevel::Success);
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "user delete failed");
                self.list
                    .show_toast(failure_text(&err, "Failed to delete user"), ToastLevel::Error);
                Outcome::from(&err)
            }
        }
    }

    pub async fn reset_password(
        &mut self,
        gateway: &Gateway,
        session: &Session,
        id: &str,
        form: &PasswordResetForm,
    ) -> Outcome {
        let new_password = match form.validate() {
            Ok(password) => password,
            Err(errors) => return Outcome::Rejected(errors),
        };
        let full_name = self
            .list
            .find(id)
            .map(|user| user.full_name.clone())
            .unwrap_or_default();

        match gateway.reset_user_password(session, id, &new_password).await {
            Ok(_) => {
                info!(id, "user password reset");
                self.list.show_toast(
                    format!(
                        "Password for \"{full_name}\" has been reset successfully. You can now login with the new password."
                    ),
                    ToastLevel::Success,
                );
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, id, "password reset failed");
                self.list.show_toast(
                    failure_text(&err, "Failed to reset password. Please try again."),
                    ToastLevel::Error,
                );
                Outcome::from(&err)
            }
        }
    }
}
