//! Feature views of the console.
//!
//! Each view owns one [`ListState`](crate::ListState) plus whatever
//! reference lists and query state its section needs. Mutations validate
//! locally, call the [`Gateway`](crate::Gateway), then apply the canonical
//! record to the list and leave a toast behind.
use crate::{
    gateway::{ErrorKind, GatewayError},
    validation::FieldErrors,
};

pub mod cashiers;
pub mod catalog;
pub mod dashboard;
pub mod game_results;
pub mod reports;
pub mod shop_owners;
pub mod shops;
pub mod slips;
pub mod users;

/// Result of a user-triggered action on a view.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Applied,
    /// The target row is gone; nothing was sent.
    Skipped,
    /// Local validation failed; nothing was sent.
    Rejected(FieldErrors),
    Failed(ErrorKind),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// The session token was refused and the operator must log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Failed(ErrorKind::Unauthorized))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<&GatewayError> for Outcome {
    fn from(err: &GatewayError) -> Self {
        Self::Failed(err.kind())
    }
}

/// Message the server attached to a refusal, if any.
pub(crate) fn server_message(err: &GatewayError) -> Option<String> {
    match err {
        GatewayError::Rejected(message) | GatewayError::Status { message, .. } => {
            Some(message.clone())
        }
        _ => None,
    }
}

/// Server text when there is one, else `fallback`.
pub(crate) fn failure_text(err: &GatewayError, fallback: &str) -> String {
    server_message(err).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_text_prefers_server_message() {
        let err = GatewayError::Rejected("Username already exists".to_string());
        assert_eq!(failure_text(&err, "Failed to create user"), "Username already exists");
        assert_eq!(
            failure_text(&GatewayError::Timeout, "Failed to create user"),
            "Failed to create user"
        );
    }

    #[test]
    fn unauthorized_needs_login() {
        assert!(Outcome::from(&GatewayError::Unauthorized).needs_login());
        assert!(!Outcome::from(&GatewayError::Forbidden).needs_login());
        assert!(Outcome::Applied.is_applied());
    }
}
