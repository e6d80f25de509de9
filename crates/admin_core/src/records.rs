use api_types::{
    balance::ReportRow, cashier::Cashier, game_result::GameResult, shop::Shop,
    shop_owner::ShopOwner, slip::SlipDetail, user::User,
};

use crate::list_state::Record;

impl Record for ShopOwner {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "firstName" => self.first_name.as_deref(),
            "lastName" => self.last_name.as_deref(),
            "fullName" => self.full_name.as_deref(),
            _ => None,
        }
    }
}

impl Record for Shop {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "shopName" => Some(&self.shop_name),
            "location" => Some(&self.location),
            "ownerUsername" => self.owner.as_ref().map(|owner| owner.username.as_str()),
            _ => None,
        }
    }
}

impl Record for Cashier {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "fullName" => Some(&self.full_name),
            "shopName" => Some(&self.shop.shop_name),
            _ => None,
        }
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "fullName" => Some(&self.full_name),
            "role" => Some(self.role.as_str()),
            _ => None,
        }
    }
}

impl Record for GameResult {
    fn id(&self) -> &str {
        &self.event_id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "eventId" => Some(&self.event_id),
            "shopName" => Some(&self.shop_name),
            "gameType" => Some(&self.game_type),
            _ => None,
        }
    }
}

impl Record for SlipDetail {
    fn id(&self) -> &str {
        &self.bet_id
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "ticketNumber" => Some(&self.ticket_number),
            "cashierName" => Some(&self.cashier_name),
            "shopName" => Some(&self.shop_name),
            "betStatus" => Some(self.bet_status.as_str()),
            _ => None,
        }
    }
}

/// Cashier report rows are keyed by cashier, retail rows by shop.
impl Record for ReportRow {
    fn id(&self) -> &str {
        self.cashier_id.as_deref().unwrap_or(&self.shop_id)
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        match field {
            "shopName" => Some(&self.shop_name),
            "cashierName" => self.cashier_name.as_deref(),
            _ => None,
        }
    }
}
