use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every backend response.
///
/// `data` is absent on failures and on endpoints that return nothing
/// (deletes, logout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Server-supplied failure text, preferring `error` over `message`.
    pub fn failure_text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Minimal `{_id, shopName}` reference embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub shop_name: String,
}

pub mod auth {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        Systemadmin,
        Admin,
        Shopadmin,
        Superagent,
    }

    impl Role {
        pub const ALL: [Role; 4] = [Self::Systemadmin, Self::Admin, Self::Shopadmin, Self::Superagent];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Systemadmin => "systemadmin",
                Self::Admin => "admin",
                Self::Shopadmin => "shopadmin",
                Self::Superagent => "superagent",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            Self::ALL.into_iter().find(|role| role.as_str() == raw)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminUser {
        #[serde(alias = "_id")]
        pub id: String,
        pub username: String,
        pub full_name: String,
        pub role: Role,
        #[serde(default)]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub last_login: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: AdminUser,
    }
}

pub mod shop_owner {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShopOwner {
        #[serde(rename = "_id")]
        pub id: String,
        #[serde(default)]
        pub first_name: Option<String>,
        #[serde(default)]
        pub last_name: Option<String>,
        /// Older records only carry `fullName`.
        #[serde(default)]
        pub full_name: Option<String>,
        pub username: String,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub last_login: Option<DateTime<Utc>>,
    }

    impl ShopOwner {
        pub fn display_name(&self) -> String {
            if let Some(full) = self.full_name.as_deref().filter(|name| !name.trim().is_empty()) {
                return full.to_string();
            }
            let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if joined.is_empty() {
                self.username.clone()
            } else {
                joined
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShopOwnerPayload {
        pub first_name: String,
        pub last_name: String,
        pub username: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
    }
}

pub mod shop {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ShopStatus {
        Active,
        Inactive,
    }

    impl ShopStatus {
        pub fn toggled(self) -> Self {
            match self {
                Self::Active => Self::Inactive,
                Self::Inactive => Self::Active,
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Inactive => "inactive",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShopOwnerRef {
        #[serde(rename = "_id")]
        pub id: String,
        #[serde(default)]
        pub full_name: Option<String>,
        pub username: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Shop {
        #[serde(rename = "_id")]
        pub id: String,
        pub shop_name: String,
        pub margin: f64,
        pub location: String,
        #[serde(default)]
        pub owner: Option<ShopOwnerRef>,
        #[serde(default)]
        pub system_revenue_percentage: Option<f64>,
        pub status: ShopStatus,
        #[serde(default)]
        pub max_winning: Option<f64>,
        pub created_at: DateTime<Utc>,
    }

    impl Shop {
        pub fn owner_label(&self) -> &str {
            self.owner
                .as_ref()
                .map(|owner| owner.full_name.as_deref().unwrap_or(owner.username.as_str()))
                .unwrap_or("No Owner")
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShopPayload {
        pub owner_id: String,
        pub shop_name: String,
        pub location: String,
        pub margin: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShopStatusUpdate {
        pub status: ShopStatus,
    }
}

pub mod cashier {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cashier {
        #[serde(rename = "_id")]
        pub id: String,
        pub full_name: String,
        pub username: String,
        pub is_active: bool,
        pub shop: ShopRef,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub session_id: Option<String>,
        #[serde(default)]
        pub display_url: Option<String>,
        #[serde(default)]
        pub is_connected: Option<bool>,
        #[serde(default)]
        pub last_activity: Option<DateTime<Utc>>,
    }

    impl Cashier {
        pub fn session_label(&self) -> &'static str {
            match (&self.session_id, self.is_connected) {
                (None, _) => "No Session",
                (Some(_), Some(true)) => "Connected",
                (Some(_), _) => "Yes Session",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashierPayload {
        pub shop_id: String,
        pub first_name: String,
        pub last_name: String,
        pub username: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BatFileContent {
        #[serde(default)]
        pub display_bat_content: String,
    }

    /// The bat-file endpoint answers either with the envelope or with the
    /// bare content object.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum BatFileResponse {
        Wrapped { data: BatFileContent },
        Bare(BatFileContent),
    }

    impl BatFileResponse {
        pub fn into_content(self) -> String {
            match self {
                Self::Wrapped { data } | Self::Bare(data) => data.display_bat_content,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SessionRegenerated {
        pub session_id: String,
        pub display_url: String,
    }
}

pub mod user {
    use super::*;
    use crate::auth::Role;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        #[serde(rename = "_id")]
        pub id: String,
        pub full_name: String,
        pub username: String,
        pub role: Role,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub last_login: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub full_name: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserStatusUpdate {
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PasswordReset {
        pub new_password: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PasswordResetDone {
        pub message: String,
    }
}

pub mod game_result {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GameResult {
        pub event_id: String,
        pub shop_id: String,
        pub shop_name: String,
        pub called_numbers: Vec<u32>,
        pub draw_time: DateTime<Utc>,
        pub game_type: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GameResultSearch {
        pub shop_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cashier_id: Option<String>,
        pub date: String,
        pub event_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub time: Option<String>,
    }
}

pub mod slip {
    use std::fmt;

    use super::*;

    /// Game ids come back as numbers from newer servers and strings from
    /// older ones.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum GameRef {
        Number(i64),
        Text(String),
    }

    impl fmt::Display for GameRef {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Number(n) => write!(f, "{n}"),
                Self::Text(s) => f.write_str(s),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BetType {
        Single,
        Multiple,
        Combination,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BetStatus {
        Pending,
        Active,
        Won,
        Lost,
        Cancelled,
        WonRedeemed,
        LostRedeemed,
    }

    impl BetStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Active => "active",
                Self::Won => "won",
                Self::Lost => "lost",
                Self::Cancelled => "cancelled",
                Self::WonRedeemed => "won_redeemed",
                Self::LostRedeemed => "lost_redeemed",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SlipDetail {
        pub ticket_number: String,
        pub bet_id: String,
        pub game_id: GameRef,
        pub cashier_id: String,
        pub cashier_name: String,
        pub shop_id: String,
        pub shop_name: String,
        pub cartela_id: i64,
        pub stake: f64,
        pub bet_type: BetType,
        pub bet_status: BetStatus,
        pub game_progress: f64,
        pub selected_numbers: Vec<u32>,
        #[serde(default)]
        pub win_pattern: Option<String>,
        /// Zero until the slip is redeemed.
        pub win: f64,
        #[serde(default)]
        pub notes: Option<String>,
        pub is_verified: bool,
        #[serde(default)]
        pub verified_by: Option<String>,
        #[serde(default)]
        pub verified_at: Option<DateTime<Utc>>,
        pub placed_at: DateTime<Utc>,
        #[serde(default)]
        pub settled_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub cartela_pattern: Vec<Vec<u32>>,
        #[serde(default)]
        pub called_numbers: Vec<u32>,
        pub game_status: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SlipSearch {
        pub shop_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cashier_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub ticket_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub game_id: Option<String>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BalanceData {
        pub shop_id: String,
        pub shop_name: String,
        pub tickets: u64,
        pub bets: f64,
        pub unclaimed: f64,
        #[serde(default)]
        pub unclaimed_count: u64,
        pub redeemed: f64,
        #[serde(default)]
        pub redeem_count: u64,
        pub ggr: f64,
        pub net_balance: f64,
        pub last_updated: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashierDetail {
        pub cashier_id: String,
        pub cashier_name: String,
        #[serde(default)]
        pub tickets: u64,
        #[serde(default)]
        pub bets: f64,
        #[serde(default)]
        pub unclaimed: f64,
        #[serde(default)]
        pub unclaimed_count: u64,
        #[serde(default)]
        pub redeemed: f64,
        #[serde(default)]
        pub redeem_count: u64,
        #[serde(default)]
        pub ggr: f64,
        #[serde(default)]
        pub net_balance: f64,
        #[serde(default)]
        pub status: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashierRef {
        #[serde(rename = "_id")]
        pub id: String,
        #[serde(default)]
        pub full_name: Option<String>,
        pub username: String,
        #[serde(default)]
        pub shop: Option<ShopRef>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BalanceResponse {
        #[serde(default)]
        pub balance_data: Vec<BalanceData>,
        #[serde(default)]
        pub shops: Vec<ShopRef>,
        #[serde(default)]
        pub cashiers: Vec<CashierRef>,
    }

    /// One line of the retail or cashier report, derived on the client.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReportRow {
        pub row_index: usize,
        pub shop_id: String,
        pub shop_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cashier_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cashier_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,
        pub tickets: u64,
        pub bets: f64,
        pub unclaimed: f64,
        pub unclaimed_count: u64,
        pub redeemed: f64,
        pub redeem_count: u64,
        pub ggr: f64,
        pub net_balance: f64,
        pub last_updated: String,
    }

    /// Query parameters shared by the balance endpoints.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BalanceQuery {
        pub shop_id: Option<String>,
        pub cashier_id: Option<String>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    impl BalanceQuery {
        pub fn pairs(&self) -> Vec<(&'static str, &str)> {
            [
                ("shopId", self.shop_id.as_deref()),
                ("cashierId", self.cashier_id.as_deref()),
                ("startDate", self.start_date.as_deref()),
                ("endDate", self.end_date.as_deref()),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect()
        }
    }
}

pub mod dashboard {
    use super::*;
    use crate::{cashier::Cashier, shop::Shop, shop_owner::ShopOwner};

    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct StatValue {
        pub value: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardStats {
        pub total_shop_owners: StatValue,
        pub active_shop_owners: StatValue,
        pub total_shops: StatValue,
        pub active_shops: StatValue,
        pub total_cashiers: StatValue,
        pub active_cashiers: StatValue,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardSnapshot {
        pub stats: DashboardStats,
        #[serde(default)]
        pub recent_shop_owners: Vec<ShopOwner>,
        #[serde(default)]
        pub recent_shops: Vec<Shop>,
        #[serde(default)]
        pub recent_cashiers: Vec<Cashier>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashierConnectionUpdate {
        pub cashier_id: String,
        #[serde(default)]
        pub is_connected: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_deserializes() {
        let raw = r#"{"success":false,"error":"Shop not found"}"#;
        let res: ApiResponse<shop::Shop> = serde_json::from_str(raw).unwrap();
        assert!(!res.success);
        assert!(res.data.is_none());
        assert_eq!(res.failure_text(), Some("Shop not found"));
    }

    #[test]
    fn shop_owner_display_name_falls_back() {
        let raw = r#"{"_id":"1","firstName":"Abebe","lastName":"Kebede","username":"abebe","isActive":true,"createdAt":"2025-01-02T10:00:00Z"}"#;
        let owner: shop_owner::ShopOwner = serde_json::from_str(raw).unwrap();
        assert_eq!(owner.display_name(), "Abebe Kebede");

        let raw = r#"{"_id":"2","username":"solo","isActive":false,"createdAt":"2025-01-02T10:00:00Z"}"#;
        let owner: shop_owner::ShopOwner = serde_json::from_str(raw).unwrap();
        assert_eq!(owner.display_name(), "solo");
    }

    #[test]
    fn game_ref_accepts_numbers_and_strings() {
        let n: slip::GameRef = serde_json::from_str("42").unwrap();
        let s: slip::GameRef = serde_json::from_str("\"G-7\"").unwrap();
        assert_eq!(n.to_string(), "42");
        assert_eq!(s.to_string(), "G-7");
    }

    #[test]
    fn bat_file_response_accepts_both_shapes() {
        let wrapped: cashier::BatFileResponse =
            serde_json::from_str(r#"{"success":true,"data":{"displayBatContent":"start x"}}"#).unwrap();
        let bare: cashier::BatFileResponse =
            serde_json::from_str(r#"{"displayBatContent":"start y"}"#).unwrap();
        assert_eq!(wrapped.into_content(), "start x");
        assert_eq!(bare.into_content(), "start y");
    }

    #[test]
    fn balance_query_skips_missing_params() {
        let query = balance::BalanceQuery {
            shop_id: Some("s1".to_string()),
            end_date: Some("2025-02-01".to_string()),
            ..Default::default()
        };
        assert_eq!(query.pairs(), vec![("shopId", "s1"), ("endDate", "2025-02-01")]);
    }

    #[test]
    fn optional_payload_password_is_omitted() {
        let payload = cashier::CashierPayload {
            shop_id: "s1".to_string(),
            first_name: "Sara".to_string(),
            last_name: "Tesfaye".to_string(),
            username: "sara".to_string(),
            password: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["shopId"], "s1");
    }
}
