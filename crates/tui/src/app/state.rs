use std::time::{Duration, Instant};

use admin_core::{
    ConnectionState, Session, Toast, ToastSlot,
    views::{
        cashiers::CashiersView, dashboard::DashboardView, game_results::GameResultsView,
        reports::ReportsView, shop_owners::ShopOwnersView, shops::ShopsView, slips::SlipsView,
        users::UsersView,
    },
};
use api_types::auth::AdminUser;

use super::forms::FormState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    ShopOwners,
    Shops,
    Cashiers,
    GameResults,
    Slips,
    Reports,
    Users,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Self::Dashboard,
        Self::ShopOwners,
        Self::Shops,
        Self::Cashiers,
        Self::GameResults,
        Self::Slips,
        Self::Reports,
        Self::Users,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::ShopOwners => "Shop Owners",
            Self::Shops => "Shops",
            Self::Cashiers => "Cashiers",
            Self::GameResults => "Game Results",
            Self::Slips => "Slip Details",
            Self::Reports => "Reports",
            Self::Users => "Users",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|section| *section == self)
            .unwrap_or_default()
    }

    /// `1`..`8` jump straight to a section.
    pub fn from_digit(ch: char) -> Option<Self> {
        let idx = ch.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(idx as usize).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Sections whose table can be narrowed with `/`.
    pub fn searchable(self) -> bool {
        matches!(
            self,
            Self::ShopOwners | Self::Shops | Self::Cashiers | Self::Users
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Form,
    Confirm,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteShopOwner(String),
    DeleteShop(String),
    DeleteCashier(String),
    DeleteUser(String),
    RegenerateSession(String),
    Logout,
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub message: String,
    pub action: ConfirmAction,
}

#[derive(Debug, Clone)]
pub enum Detail {
    Text { title: String, body: String },
    Slip,
}

pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub section: Section,
    pub mode: Mode,
    pub session: Session,
    pub user: Option<AdminUser>,
    pub base_url: String,
    pub live: ConnectionState,

    pub dashboard: DashboardView,
    pub shop_owners: ShopOwnersView,
    pub shops: ShopsView,
    pub cashiers: CashiersView,
    pub game_results: GameResultsView,
    pub slips: SlipsView,
    pub reports: ReportsView,
    pub users: UsersView,

    pub selected: [usize; 8],
    pub loaded: [bool; 8],
    pub report_column: usize,
    pub form: Option<FormState>,
    pub confirm: Option<ConfirmState>,
    pub detail: Option<Detail>,
    pub notice: ToastSlot,
}

impl AppState {
    pub fn new(session: Session, base_url: String, username: String, auto_refresh: Duration) -> Self {
        Self {
            screen: Screen::Login,
            login: LoginState {
                username,
                password: String::new(),
                focus: LoginField::Username,
                message: None,
            },
            section: Section::Dashboard,
            mode: Mode::Normal,
            session,
            user: None,
            base_url,
            live: ConnectionState::Disconnected,
            dashboard: DashboardView::new(),
            shop_owners: ShopOwnersView::new(),
            shops: ShopsView::new(),
            cashiers: CashiersView::new(),
            game_results: GameResultsView::new(auto_refresh),
            slips: SlipsView::new(),
            reports: ReportsView::new(),
            users: UsersView::new(),
            selected: [0; 8],
            loaded: [false; 8],
            report_column: 0,
            form: None,
            confirm: None,
            detail: None,
            notice: ToastSlot::default(),
        }
    }

    /// Drops everything tied to the signed-in admin.
    pub fn reset_views(&mut self, auto_refresh: Duration) {
        self.dashboard = DashboardView::new();
        self.shop_owners = ShopOwnersView::new();
        self.shops = ShopsView::new();
        self.cashiers = CashiersView::new();
        self.game_results = GameResultsView::new(auto_refresh);
        self.slips = SlipsView::new();
        self.reports = ReportsView::new();
        self.users = UsersView::new();
        self.selected = [0; 8];
        self.loaded = [false; 8];
        self.report_column = 0;
        self.form = None;
        self.confirm = None;
        self.detail = None;
        self.mode = Mode::Normal;
        self.user = None;
    }

    /// Rows currently shown in the active section's table.
    pub fn visible_len(&self) -> usize {
        match self.section {
            Section::Dashboard => 0,
            Section::ShopOwners => self.shop_owners.list().filtered_len(),
            Section::Shops => self.shops.list().filtered_len(),
            Section::Cashiers => self.cashiers.visible().count(),
            Section::GameResults => self.game_results.list().items().len(),
            Section::Slips => self.slips.list().items().len(),
            Section::Reports => self.reports.list().items().len(),
            Section::Users => self.users.list().filtered_len(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected[self.section.index()]
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        let slot = &mut self.selected[self.section.index()];
        if len > 0 {
            *slot = (*slot + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        let slot = &mut self.selected[self.section.index()];
        *slot = slot.saturating_sub(1);
    }

    /// Keeps the cursor inside the table after the rows changed.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_len();
        let slot = &mut self.selected[self.section.index()];
        *slot = (*slot).min(len.saturating_sub(1));
    }

    /// Id of the highlighted row.
    pub fn selected_id(&self) -> Option<String> {
        let idx = self.selected_index();
        match self.section {
            Section::Dashboard | Section::GameResults | Section::Reports => None,
            Section::ShopOwners => self
                .shop_owners
                .list()
                .filtered()
                .nth(idx)
                .map(|owner| owner.id.clone()),
            Section::Shops => self
                .shops
                .list()
                .filtered()
                .nth(idx)
                .map(|shop| shop.id.clone()),
            Section::Cashiers => self
                .cashiers
                .visible()
                .nth(idx)
                .map(|cashier| cashier.id.clone()),
            Section::Slips => self
                .slips
                .list()
                .items()
                .get(idx)
                .map(|slip| slip.bet_id.clone()),
            Section::Users => self
                .users
                .list()
                .filtered()
                .nth(idx)
                .map(|user| user.id.clone()),
        }
    }

    pub fn search_term(&self) -> &str {
        match self.section {
            Section::ShopOwners => self.shop_owners.list().search_term(),
            Section::Shops => self.shops.list().search_term(),
            Section::Cashiers => self.cashiers.list().search_term(),
            Section::Users => self.users.list().search_term(),
            _ => "",
        }
    }

    pub fn set_search_term(&mut self, term: String) {
        match self.section {
            Section::ShopOwners => self.shop_owners.list_mut().set_search_term(term),
            Section::Shops => self.shops.list_mut().set_search_term(term),
            Section::Cashiers => self.cashiers.list_mut().set_search_term(term),
            Section::Users => self.users.list_mut().set_search_term(term),
            _ => return,
        }
        self.selected[self.section.index()] = 0;
    }

    /// The section's own toast wins over app notices.
    pub fn active_toast(&self) -> Option<&Toast> {
        let section = match self.section {
            Section::Dashboard => self.dashboard.toast(),
            Section::ShopOwners => self.shop_owners.list().toast(),
            Section::Shops => self.shops.list().toast(),
            Section::Cashiers => self.cashiers.list().toast(),
            Section::GameResults => self.game_results.list().toast(),
            Section::Slips => self.slips.list().toast(),
            Section::Reports => self.reports.list().toast(),
            Section::Users => self.users.list().toast(),
        };
        section.or_else(|| self.notice.current())
    }

    /// Closes the visible toast if the operator dismisses it early.
    pub fn close_toast(&mut self) {
        match self.section {
            Section::Dashboard => self.dashboard.toasts().close(),
            Section::ShopOwners => self.shop_owners.list_mut().close_toast(),
            Section::Shops => self.shops.list_mut().close_toast(),
            Section::Cashiers => self.cashiers.list_mut().close_toast(),
            Section::GameResults => self.game_results.list_mut().close_toast(),
            Section::Slips => self.slips.list_mut().close_toast(),
            Section::Reports => self.reports.list_mut().close_toast(),
            Section::Users => self.users.list_mut().close_toast(),
        }
        self.notice.close();
    }

    pub fn expire_toasts(&mut self, now: Instant, ttl: Duration) {
        self.dashboard.toasts().expire(now, ttl);
        self.shop_owners.list_mut().expire_toast(now, ttl);
        self.shops.list_mut().expire_toast(now, ttl);
        self.cashiers.list_mut().expire_toast(now, ttl);
        self.game_results.list_mut().expire_toast(now, ttl);
        self.slips.list_mut().expire_toast(now, ttl);
        self.reports.list_mut().expire_toast(now, ttl);
        self.users.list_mut().expire_toast(now, ttl);
        self.notice.expire(now, ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_sections() {
        assert_eq!(Section::from_digit('1'), Some(Section::Dashboard));
        assert_eq!(Section::from_digit('8'), Some(Section::Users));
        assert_eq!(Section::from_digit('0'), None);
        assert_eq!(Section::from_digit('9'), None);
    }

    #[test]
    fn sections_wrap_around() {
        assert_eq!(Section::Users.next(), Section::Dashboard);
        assert_eq!(Section::Dashboard.prev(), Section::Users);
    }

    #[test]
    fn selection_stays_in_bounds_on_empty_tables() {
        let mut state = AppState::new(
            Session::default(),
            "http://localhost:5000".to_string(),
            String::new(),
            Duration::from_secs(10),
        );
        state.section = Section::Users;
        state.select_next();
        assert_eq!(state.selected_index(), 0);
        state.select_prev();
        assert_eq!(state.selected_index(), 0);
        assert!(state.selected_id().is_none());
    }
}
