//! Game result lookup by shop, date and event id, with optional polling.
use std::time::{Duration, Instant};

use api_types::game_result::{GameResult, GameResultSearch};
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use super::catalog::ShopCatalog;
use crate::{
    gateway::Gateway,
    list_state::{FetchOutcome, ListState, ToastLevel, empty_fetcher},
    session::Session,
    validation::digits_only,
};

pub const DEFAULT_AUTO_REFRESH: Duration = Duration::from_secs(10);
pub const INCOMPLETE_QUERY_MESSAGE: &str = "Please select shop, date, and enter event ID";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResultQuery {
    pub shop_id: Option<String>,
    pub cashier_id: Option<String>,
    pub date: NaiveDate,
    event_id: String,
}

impl GameResultQuery {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            shop_id: None,
            cashier_id: None,
            date: today,
            event_id: String::new(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Keeps only the digits of `raw`.
    pub fn set_event_id(&mut self, raw: &str) {
        self.event_id = digits_only(raw);
    }

    /// The request body, or `None` while shop or event id is missing.
    pub fn to_search(&self) -> Option<GameResultSearch> {
        let shop_id = self.shop_id.as_deref().filter(|id| !id.is_empty())?;
        if self.event_id.is_empty() {
            return None;
        }
        Some(GameResultSearch {
            shop_id: shop_id.to_string(),
            cashier_id: self.cashier_id.clone().filter(|id| !id.is_empty()),
            date: self.date.format("%Y-%m-%d").to_string(),
            event_id: self.event_id.clone(),
            time: None,
        })
    }
}

pub struct GameResultsView {
    list: ListState<GameResult>,
    catalog: ShopCatalog,
    pub query: GameResultQuery,
    auto_refresh: bool,
    refresh_every: Duration,
    last_search: Option<Instant>,
    has_searched: bool,
}

impl GameResultsView {
    pub fn new(refresh_every: Duration) -> Self {
        Self {
            list: ListState::new(empty_fetcher(), &[])
                .with_failure_message("Failed to load game results"),
            catalog: ShopCatalog::default(),
            query: GameResultQuery::new(Utc::now().date_naive()),
            auto_refresh: false,
            refresh_every,
            last_search: None,
            has_searched: false,
        }
    }

    pub fn list(&self) -> &ListState<GameResult> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<GameResult> {
        &mut self.list
    }

    pub fn catalog(&self) -> &ShopCatalog {
        &self.catalog
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub async fn load_catalog(&mut self, gateway: &Gateway, session: &Session) {
        match ShopCatalog::load(gateway, session).await {
            Ok(catalog) => self.catalog = catalog,
            Err(err) => {
                warn!(error = %err, "game result pickers failed to load");
                self.list.show_toast("Failed to load data", ToastLevel::Error);
            }
        }
    }

    /// Runs the query. While auto-refresh is on nothing is toasted.
    pub async fn search(&mut self, gateway: &Gateway, session: &Session) -> Option<FetchOutcome> {
        let Some(search) = self.query.to_search() else {
            self.list
                .show_toast(INCOMPLETE_QUERY_MESSAGE, ToastLevel::Error);
            return None;
        };

        let quiet = self.auto_refresh;
        let (gateway, session) = (gateway.clone(), session.clone());
        let mut pending = self.list.begin_fetch_with(Box::pin(async move {
            gateway.search_game_results(&session, &search).await
        }));
        if quiet {
            pending = pending.quietly();
        }
        self.last_search = Some(Instant::now());

        let outcome = self.list.complete_fetch(pending.resolve().await);
        if let FetchOutcome::Loaded(count) = outcome {
            self.has_searched = true;
            debug!(count, "game results loaded");
            if !quiet {
                self.list
                    .show_toast("Game results loaded successfully", ToastLevel::Success);
            }
        }
        Some(outcome)
    }

    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.auto_refresh = !self.auto_refresh;
        let message = if self.auto_refresh {
            format!(
                "Auto-refresh enabled (every {} seconds)",
                self.refresh_every.as_secs()
            )
        } else {
            "Auto-refresh disabled".to_string()
        };
        self.list.show_toast(message, ToastLevel::Success);
        self.auto_refresh
    }

    /// Auto-refresh only polls a complete query, once per interval.
    pub fn refresh_due(&self, now: Instant) -> bool {
        self.auto_refresh
            && self.query.to_search().is_some()
            && self
                .last_search
                .is_none_or(|last| now.saturating_duration_since(last) >= self.refresh_every)
    }

    /// Called from the event loop's tick.
    pub async fn tick(&mut self, gateway: &Gateway, session: &Session, now: Instant) -> Option<FetchOutcome> {
        if !self.refresh_due(now) {
            return None;
        }
        self.search(gateway, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_view() -> GameResultsView {
        let mut view = GameResultsView::new(DEFAULT_AUTO_REFRESH);
        view.query.shop_id = Some("s1".to_string());
        view.query.set_event_id("1042");
        view
    }

    #[test]
    fn event_id_keeps_digits_only() {
        let mut query = GameResultQuery::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        query.set_event_id("12a-3 4");
        assert_eq!(query.event_id(), "1234");
    }

    #[test]
    fn search_body_needs_shop_and_event() {
        let mut query = GameResultQuery::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(query.to_search().is_none());
        query.shop_id = Some("s1".to_string());
        assert!(query.to_search().is_none());
        query.set_event_id("77");
        query.cashier_id = Some(String::new());
        let search = query.to_search().unwrap();
        assert_eq!(search.date, "2024-05-01");
        assert_eq!(search.cashier_id, None);
        assert_eq!(search.event_id, "77");
    }

    #[tokio::test]
    async fn incomplete_query_toasts_without_request() {
        let gateway = Gateway::new(&crate::gateway::GatewayConfig::default()).unwrap();
        let mut view = GameResultsView::new(DEFAULT_AUTO_REFRESH);
        assert!(view.search(&gateway, &Session::default()).await.is_none());
        assert_eq!(view.list().toast().unwrap().message, INCOMPLETE_QUERY_MESSAGE);
        assert!(!view.list().is_loading());
    }

    #[test]
    fn auto_refresh_waits_for_interval() {
        let mut view = complete_view();
        let now = Instant::now();
        assert!(!view.refresh_due(now));

        assert!(view.toggle_auto_refresh());
        assert_eq!(
            view.list().toast().unwrap().message,
            "Auto-refresh enabled (every 10 seconds)"
        );
        assert!(view.refresh_due(now));

        view.last_search = Some(now);
        assert!(!view.refresh_due(now + Duration::from_secs(9)));
        assert!(view.refresh_due(now + Duration::from_secs(10)));

        assert!(!view.toggle_auto_refresh());
        assert_eq!(view.list().toast().unwrap().message, "Auto-refresh disabled");
    }

    #[test]
    fn auto_refresh_ignores_incomplete_query() {
        let mut view = GameResultsView::new(DEFAULT_AUTO_REFRESH);
        view.toggle_auto_refresh();
        assert!(!view.refresh_due(Instant::now()));
    }
}
