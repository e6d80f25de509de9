use api_types::dashboard::DashboardSnapshot;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::{
    list_state::ToastSlot,
    live::{LiveEvent, SnapshotRequester},
};

pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to server";

/// Everything the dashboard shows comes from the live channel.
#[derive(Debug, Default)]
pub struct DashboardView {
    snapshot: Option<DashboardSnapshot>,
    connected: bool,
    error: Option<String>,
    active_games: Vec<Value>,
    last_refresh: Option<DateTime<Utc>>,
    toasts: ToastSlot,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first snapshot arrives.
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn active_games(&self) -> &[Value] {
        &self.active_games
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn toasts(&mut self) -> &mut ToastSlot {
        &mut self.toasts
    }

    pub fn toast(&self) -> Option<&crate::Toast> {
        self.toasts.current()
    }

    pub fn handle_live(&mut self, event: &LiveEvent) {
        match event {
            LiveEvent::Connected => {
                self.connected = true;
                self.error = None;
            }
            LiveEvent::Disconnected => self.connected = false,
            LiveEvent::ConnectError(message) => {
                self.connected = false;
                self.error = Some(message.clone());
            }
            LiveEvent::DashboardUpdate(snapshot) => {
                self.snapshot = Some(snapshot.as_ref().clone());
                self.error = None;
            }
            LiveEvent::DashboardError(message) => self.error = Some(message.clone()),
            LiveEvent::ActiveGames(games) => self.active_games = games.clone(),
            other => debug!(event = ?other, "dashboard ignores live event"),
        }
    }

    /// Asks the feed for a fresh snapshot. Returns whether a request went out.
    pub fn refresh(&mut self, requester: &impl SnapshotRequester, now: DateTime<Utc>) -> bool {
        if !requester.is_connected() {
            self.toasts.error(NOT_CONNECTED_MESSAGE);
            return false;
        }
        if !requester.request_snapshot() {
            self.toasts.error("Failed to refresh data");
            return false;
        }
        self.last_refresh = Some(now);
        self.toasts.success("Dashboard data refreshed successfully!");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use api_types::dashboard::StatValue;

    use super::*;
    use crate::ToastLevel;

    struct FakeFeed {
        connected: bool,
        requests: Cell<u32>,
    }

    impl SnapshotRequester for FakeFeed {
        fn request_snapshot(&self) -> bool {
            if !self.connected {
                return false;
            }
            self.requests.set(self.requests.get() + 1);
            true
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[test]
    fn refresh_while_disconnected_sends_nothing() {
        let mut view = DashboardView::new();
        let feed = FakeFeed {
            connected: false,
            requests: Cell::new(0),
        };
        assert!(!view.refresh(&feed, Utc::now()));
        assert_eq!(feed.requests.get(), 0);
        let toast = view.toast().unwrap();
        assert_eq!(toast.message, NOT_CONNECTED_MESSAGE);
        assert_eq!(toast.level, ToastLevel::Error);
    }

    #[test]
    fn refresh_while_connected_requests_once() {
        let mut view = DashboardView::new();
        let feed = FakeFeed {
            connected: true,
            requests: Cell::new(0),
        };
        let now = Utc::now();
        assert!(view.refresh(&feed, now));
        assert_eq!(feed.requests.get(), 1);
        assert_eq!(view.last_refresh(), Some(now));
        assert_eq!(
            view.toast().unwrap().message,
            "Dashboard data refreshed successfully!"
        );
    }

    #[test]
    fn snapshot_replaced_wholesale() {
        let mut view = DashboardView::new();
        view.handle_live(&LiveEvent::Connected);
        assert!(view.is_connected());

        let mut snapshot = DashboardSnapshot::default();
        snapshot.stats.total_shops = StatValue { value: 4 };
        view.handle_live(&LiveEvent::DashboardUpdate(Box::new(snapshot)));
        assert_eq!(view.snapshot().unwrap().stats.total_shops.value, 4);

        view.handle_live(&LiveEvent::DashboardUpdate(Box::default()));
        assert_eq!(view.snapshot().unwrap().stats.total_shops.value, 0);

        view.handle_live(&LiveEvent::DashboardError("Failed to fetch dashboard data".into()));
        assert_eq!(view.error(), Some("Failed to fetch dashboard data"));
        assert!(view.snapshot().is_some());
    }

    #[test]
    fn connect_error_marks_disconnected() {
        let mut view = DashboardView::new();
        view.handle_live(&LiveEvent::Connected);
        view.handle_live(&LiveEvent::ConnectError(
            "Failed to connect to real-time updates".into(),
        ));
        assert!(!view.is_connected());
        assert_eq!(view.error(), Some("Failed to connect to real-time updates"));
    }
}
