//! Client-side form checks.
//!
//! Every form validates into either a request payload or a set of per-field
//! messages; nothing reaches the gateway while [`FieldErrors`] is non-empty.
//! Rules run in field order: a missing required value reports
//! "{Label} is required" and skips that field's other checks.
use std::collections::BTreeMap;

use api_types::{
    auth::Role, cashier::CashierPayload, shop::ShopPayload, shop_owner::ShopOwnerPayload,
    user::UserNew,
};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const TICKET_NUMBER_MAX_LEN: usize = 13;
pub const MARGIN_OPTIONS: [u32; 8] = [10, 15, 20, 25, 30, 35, 40, 45];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, ok: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(ok()) } else { Err(self) }
    }
}

/// Whether a form creates a record or edits the one with the given id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

impl FormMode {
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, format!("{label} is required"));
        return false;
    }
    true
}

fn optional_password(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShopOwnerForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub re_password: String,
}

impl ShopOwnerForm {
    pub fn validate(&self, mode: &FormMode) -> Result<ShopOwnerPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "firstName", "First Name", &self.first_name);
        required(&mut errors, "lastName", "Last Name", &self.last_name);
        required(&mut errors, "username", "Username", &self.username);

        let creating = mode.is_create();
        if creating && self.password.is_empty() {
            errors.insert("password", "Password is required");
        } else if !self.password.is_empty() && self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.insert("password", "Password must be at least 6 characters");
        }
        if creating && self.re_password.is_empty() {
            errors.insert("rePassword", "Re-Password is required");
        } else if !self.password.is_empty() && self.re_password != self.password {
            errors.insert("rePassword", "Passwords do not match");
        }

        errors.into_result(|| ShopOwnerPayload {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: optional_password(&self.password),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CashierForm {
    pub shop_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub re_password: String,
}

impl CashierForm {
    /// Passwords are only compared when creating; an edit may leave them blank.
    pub fn validate(&self, mode: &FormMode) -> Result<CashierPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "shopId", "Shop", &self.shop_id);
        required(&mut errors, "firstName", "First Name", &self.first_name);
        required(&mut errors, "lastName", "Last Name", &self.last_name);
        required(&mut errors, "username", "Username", &self.username);

        if mode.is_create() {
            required(&mut errors, "password", "Password", &self.password);
            if required(&mut errors, "rePassword", "Re-Password", &self.re_password)
                && self.re_password != self.password
            {
                errors.insert("rePassword", "Passwords do not match");
            }
        }

        errors.into_result(|| CashierPayload {
            shop_id: self.shop_id.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: optional_password(&self.password),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShopForm {
    pub owner_id: String,
    pub shop_name: String,
    pub location: String,
    pub margin: String,
}

impl ShopForm {
    pub fn validate(&self) -> Result<ShopPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "ownerId", "Shop Owner", &self.owner_id);
        required(&mut errors, "shopName", "Shop Name", &self.shop_name);

        let mut margin = 0.0;
        if required(&mut errors, "margin", "Shop Margin (%)", &self.margin) {
            match self.margin.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => margin = value,
                _ => errors.insert("margin", "Shop Margin (%) must be a number"),
            }
        }

        errors.into_result(|| ShopPayload {
            owner_id: self.owner_id.clone(),
            shop_name: self.shop_name.trim().to_string(),
            location: self.location.trim().to_string(),
            margin,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserForm {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl UserForm {
    pub fn validate(&self) -> Result<UserNew, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "fullName", "Full Name", &self.full_name);
        required(&mut errors, "username", "Username", &self.username);
        required(&mut errors, "password", "Password", &self.password);

        let mut role = Role::Systemadmin;
        if required(&mut errors, "role", "Role", &self.role) {
            match Role::parse(self.role.trim()) {
                Some(parsed) => role = parsed,
                None => errors.insert("role", "Role is not valid"),
            }
        }

        errors.into_result(|| UserNew {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            role,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasswordResetForm {
    pub new_password: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.new_password.chars().count() < PASSWORD_MIN_LEN {
            errors.insert("newPassword", "Password must be at least 6 characters long");
        }
        errors.into_result(|| self.new_password.clone())
    }
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Ticket numbers are numeric and at most 13 digits long.
pub fn ticket_number(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(TICKET_NUMBER_MAX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cashier_form() -> CashierForm {
        CashierForm {
            shop_id: "shop-1".to_string(),
            first_name: "Sara".to_string(),
            last_name: "Tesfaye".to_string(),
            username: "sara".to_string(),
            password: "abc123".to_string(),
            re_password: "abc123".to_string(),
        }
    }

    #[test]
    fn cashier_password_mismatch_on_create() {
        let form = CashierForm {
            re_password: "xyz999".to_string(),
            ..cashier_form()
        };
        let errors = form.validate(&FormMode::Create).unwrap_err();
        assert_eq!(errors.get("rePassword"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn cashier_edit_ignores_password_fields() {
        let form = CashierForm {
            password: String::new(),
            re_password: "whatever".to_string(),
            ..cashier_form()
        };
        let payload = form.validate(&FormMode::Edit("c1".to_string())).unwrap();
        assert_eq!(payload.password, None);
    }

    #[test]
    fn missing_fields_report_their_labels() {
        let errors = CashierForm::default().validate(&FormMode::Create).unwrap_err();
        assert_eq!(errors.get("shopId"), Some("Shop is required"));
        assert_eq!(errors.get("firstName"), Some("First Name is required"));
        assert_eq!(errors.get("rePassword"), Some("Re-Password is required"));
    }

    #[test]
    fn shop_owner_password_rules() {
        let form = ShopOwnerForm {
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            username: "abebe".to_string(),
            password: "abc".to_string(),
            re_password: "abd".to_string(),
        };
        let errors = form.validate(&FormMode::Create).unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.get("rePassword"), Some("Passwords do not match"));

        let edit = ShopOwnerForm {
            password: String::new(),
            re_password: String::new(),
            ..form
        };
        assert!(edit.validate(&FormMode::Edit("o1".to_string())).is_ok());
    }

    #[test]
    fn shop_margin_must_parse() {
        let form = ShopForm {
            owner_id: "o1".to_string(),
            shop_name: "Piassa".to_string(),
            location: String::new(),
            margin: "ten".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("margin"), Some("Shop Margin (%) must be a number"));

        let ok = ShopForm {
            margin: "25".to_string(),
            ..form
        };
        assert_eq!(ok.validate().unwrap().margin, 25.0);
    }

    #[test]
    fn user_role_is_checked() {
        let form = UserForm {
            full_name: "Admin".to_string(),
            username: "root".to_string(),
            password: "secret1".to_string(),
            role: "janitor".to_string(),
        };
        assert_eq!(form.validate().unwrap_err().get("role"), Some("Role is not valid"));
    }

    #[test]
    fn password_reset_length() {
        let short = PasswordResetForm {
            new_password: "12345".to_string(),
        };
        assert!(short.validate().is_err());
        let ok = PasswordResetForm {
            new_password: "123456".to_string(),
        };
        assert_eq!(ok.validate().unwrap(), "123456");
    }

    #[test]
    fn ticket_numbers_are_trimmed_to_digits() {
        assert_eq!(ticket_number("12-34ab5678901234567"), "1234567890123");
        assert_eq!(digits_only("ev 42"), "42");
    }
}
