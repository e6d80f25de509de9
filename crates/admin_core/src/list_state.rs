//! Generic list container shared by every console section.
//!
//! A [`ListState`] owns the collection as last fetched, the filtered view
//! derived from the search term, the loading flag and at most one toast.
//! Mutators are local and synchronous; callers talk to the gateway first and
//! apply the canonical record afterwards.
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::{
    gateway::{ErrorKind, Gateway, GatewayError},
    session::Session,
};

pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to load data";

/// A row of a managed collection.
pub trait Record: Clone + Send + 'static {
    fn id(&self) -> &str;

    /// String field used by the search filter. `None` for unknown fields.
    fn text_field(&self, field: &str) -> Option<&str>;
}

pub type FetchResult<T> = Result<Vec<T>, GatewayError>;

/// Retrieval function injected into a [`ListState`].
pub type Fetcher<T> = Arc<dyn Fn(Gateway, Session) -> BoxFuture<'static, FetchResult<T>> + Send + Sync>;

pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    T: 'static,
    F: Fn(Gateway, Session) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<T>> + Send + 'static,
{
    Arc::new(
        move |gateway: Gateway, session: Session| -> BoxFuture<'static, FetchResult<T>> {
            Box::pin(f(gateway, session))
        },
    )
}

/// Fetcher for lists that are only filled by an explicit query.
pub fn empty_fetcher<T: Send + 'static>() -> Fetcher<T> {
    fetcher(|_, _| async { Ok::<_, GatewayError>(Vec::new()) })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

/// Holds at most one toast; showing a new one replaces the old.
#[derive(Clone, Debug, Default)]
pub struct ToastSlot(Option<Toast>);

impl ToastSlot {
    pub fn current(&self) -> Option<&Toast> {
        self.0.as_ref()
    }

    pub fn show(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.0 = Some(Toast::new(message, level));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, ToastLevel::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, ToastLevel::Error);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(message, ToastLevel::Warning);
    }

    pub fn close(&mut self) {
        self.0 = None;
    }

    /// Drops the toast once its time is up. Returns whether one was removed.
    pub fn expire(&mut self, now: Instant, ttl: Duration) -> bool {
        if self.0.as_ref().is_some_and(|toast| toast.is_expired(now, ttl)) {
            self.0 = None;
            return true;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(usize),
    Failed(ErrorKind),
    /// A newer fetch was started before this one finished.
    Stale,
}

/// A fetch that has been started but not applied yet.
pub struct PendingFetch<T> {
    seq: u64,
    quiet: bool,
    future: BoxFuture<'static, FetchResult<T>>,
}

impl<T> PendingFetch<T> {
    /// Failures of a quiet fetch are logged but never toasted.
    pub fn quietly(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn resolve(self) -> CompletedFetch<T> {
        CompletedFetch {
            seq: self.seq,
            quiet: self.quiet,
            result: self.future.await,
        }
    }
}

pub struct CompletedFetch<T> {
    seq: u64,
    quiet: bool,
    result: FetchResult<T>,
}

pub struct ListState<T: Record> {
    items: Vec<T>,
    visible: Vec<usize>,
    search_term: String,
    search_fields: &'static [&'static str],
    loading: bool,
    toast: ToastSlot,
    latest_seq: u64,
    failure_message: String,
    fetcher: Fetcher<T>,
}

impl<T: Record> ListState<T> {
    pub fn new(fetcher: Fetcher<T>, search_fields: &'static [&'static str]) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            search_term: String::new(),
            search_fields,
            loading: false,
            toast: ToastSlot::default(),
            latest_seq: 0,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            fetcher,
        }
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn set_fetcher(&mut self, fetcher: Fetcher<T>) {
        self.fetcher = fetcher;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().filter_map(|&idx| self.items.get(idx))
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.current()
    }

    pub fn toasts(&mut self) -> &mut ToastSlot {
        &mut self.toast
    }

    /// Marks the list as loading and hands back the request to drive.
    pub fn begin_fetch(&mut self, gateway: &Gateway, session: &Session) -> PendingFetch<T> {
        let future = (self.fetcher)(gateway.clone(), session.clone());
        self.begin_fetch_with(future)
    }

    pub fn begin_fetch_with(&mut self, future: BoxFuture<'static, FetchResult<T>>) -> PendingFetch<T> {
        self.latest_seq += 1;
        self.loading = true;
        debug!(seq = self.latest_seq, "list fetch started");
        PendingFetch {
            seq: self.latest_seq,
            quiet: false,
            future,
        }
    }

    pub fn complete_fetch(&mut self, done: CompletedFetch<T>) -> FetchOutcome {
        if done.seq != self.latest_seq {
            debug!(seq = done.seq, latest = self.latest_seq, "discarding stale list fetch");
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match done.result {
            Ok(items) => {
                let count = items.len();
                self.replace_all(items);
                FetchOutcome::Loaded(count)
            }
            Err(err) => {
                warn!(error = %err, "list fetch failed");
                if !done.quiet {
                    self.show_toast(self.failure_message.clone(), ToastLevel::Error);
                }
                FetchOutcome::Failed(err.kind())
            }
        }
    }

    pub async fn fetch(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        let pending = self.begin_fetch(gateway, session);
        let done = pending.resolve().await;
        self.complete_fetch(done)
    }

    pub async fn fetch_quietly(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        let pending = self.begin_fetch(gateway, session).quietly();
        let done = pending.resolve().await;
        self.complete_fetch(done)
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    pub fn add_item(&mut self, item: T) {
        self.items.insert(0, item);
        self.refilter();
    }

    /// Replaces the entry with identifier `id`. Returns `false` if absent.
    pub fn update_item(&mut self, id: &str, item: T) -> bool {
        self.patch_item(id, |slot| *slot = item)
    }

    pub fn patch_item(&mut self, id: &str, patch: impl FnOnce(&mut T)) -> bool {
        let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        patch(slot);
        self.refilter();
        true
    }

    pub fn delete_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.refilter();
        }
        removed
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refilter();
    }

    pub fn show_toast(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toast.show(message, level);
    }

    pub fn close_toast(&mut self) {
        self.toast.close();
    }

    pub fn expire_toast(&mut self, now: Instant, ttl: Duration) -> bool {
        self.toast.expire(now, ttl)
    }

    fn refilter(&mut self) {
        let term = self.search_term.to_lowercase();
        self.visible = if term.is_empty() || self.search_fields.is_empty() {
            (0..self.items.len()).collect()
        } else {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| {
                    self.search_fields.iter().any(|field| {
                        item.text_field(field)
                            .is_some_and(|value| value.to_lowercase().contains(&term))
                    })
                })
                .map(|(idx, _)| idx)
                .collect()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayConfig;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: String,
        username: String,
        active: bool,
    }

    impl Record for Row {
        fn id(&self) -> &str {
            &self.id
        }

        fn text_field(&self, field: &str) -> Option<&str> {
            match field {
                "username" => Some(&self.username),
                _ => None,
            }
        }
    }

    fn row(id: &str, username: &str) -> Row {
        Row {
            id: id.to_string(),
            username: username.to_string(),
            active: true,
        }
    }

    fn list_with(rows: Vec<Row>) -> ListState<Row> {
        let mut list = ListState::new(empty_fetcher(), &["username"]);
        list.replace_all(rows);
        list
    }

    fn names(list: &ListState<Row>) -> Vec<&str> {
        list.filtered().map(|row| row.username.as_str()).collect()
    }

    fn gateway() -> Gateway {
        Gateway::new(&GatewayConfig::default()).unwrap()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut list = list_with(vec![row("1", "alice")]);
        list.set_search_term("bob");
        assert!(names(&list).is_empty());
        list.set_search_term("ALI");
        assert_eq!(names(&list), vec!["alice"]);
        list.set_search_term("");
        assert_eq!(list.filtered_len(), 1);
    }

    #[test]
    fn whitespace_is_part_of_the_term() {
        let mut list = list_with(vec![row("1", "alice")]);
        list.set_search_term(" ");
        assert_eq!(list.filtered_len(), 0);
        list.set_search_term("ali ");
        assert_eq!(list.filtered_len(), 0);
        list.set_search_term("ali");
        assert_eq!(names(&list), vec!["alice"]);
    }

    #[test]
    fn no_search_fields_shows_everything() {
        let mut list = ListState::new(empty_fetcher(), &[]);
        list.replace_all(vec![row("1", "alice"), row("2", "bob")]);
        list.set_search_term("zzz");
        assert_eq!(list.filtered_len(), 2);
    }

    #[test]
    fn add_prepends_and_filter_follows() {
        let mut list = list_with(vec![row("1", "alice")]);
        list.set_search_term("b");
        list.add_item(row("2", "bob"));
        assert_eq!(list.items()[0].id, "2");
        assert_eq!(names(&list), vec!["bob"]);
    }

    #[test]
    fn update_with_unknown_id_changes_nothing() {
        let mut list = list_with(vec![row("1", "alice")]);
        assert!(!list.update_item("9", row("9", "mallory")));
        assert_eq!(list.items(), &[row("1", "alice")]);
    }

    #[test]
    fn patch_keeps_position() {
        let mut list = list_with(vec![row("1", "alice"), row("2", "bob"), row("3", "carol")]);
        assert!(list.patch_item("2", |row| row.active = false));
        let ids: Vec<_> = list.items().iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(!list.items()[1].active);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut list = list_with(vec![row("1", "alice"), row("2", "bob")]);
        assert!(list.delete_item("1"));
        assert!(!list.delete_item("1"));
        assert_eq!(names(&list), vec!["bob"]);
    }

    #[test]
    fn toast_expires_after_ttl() {
        let mut list = list_with(vec![]);
        list.show_toast("first", ToastLevel::Success);
        list.show_toast("second", ToastLevel::Warning);
        assert_eq!(list.toast().unwrap().message, "second");

        let shown = list.toast().unwrap().shown_at;
        assert!(!list.expire_toast(shown, Duration::from_secs(3)));
        assert!(list.expire_toast(shown + Duration::from_secs(3), Duration::from_secs(3)));
        assert!(list.toast().is_none());
    }

    #[tokio::test]
    async fn fetch_replaces_collection() {
        let mut list = ListState::new(
            fetcher(|_, _| async { Ok::<_, GatewayError>(vec![row("1", "alice"), row("2", "bob")]) }),
            &["username"],
        );
        list.add_item(row("1", "alice"));
        let outcome = list.fetch(&gateway(), &Session::default()).await;
        assert_eq!(outcome, FetchOutcome::Loaded(2));
        assert_eq!(list.items().iter().filter(|row| row.id == "1").count(), 1);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_items_and_toasts_once() {
        let mut list = ListState::new(
            fetcher(|_, _| async { Err::<Vec<Row>, _>(GatewayError::Unauthorized) }),
            &["username"],
        );
        list.replace_all(vec![row("1", "alice")]);
        let outcome = list.fetch(&gateway(), &Session::default()).await;
        assert_eq!(outcome, FetchOutcome::Failed(ErrorKind::Unauthorized));
        assert_eq!(list.items().len(), 1);
        let toast = list.toast().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, DEFAULT_FAILURE_MESSAGE);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn quiet_fetch_failure_has_no_toast() {
        let mut list = ListState::new(
            fetcher(|_, _| async { Err::<Vec<Row>, _>(GatewayError::Timeout) }),
            &["username"],
        );
        list.fetch_quietly(&gateway(), &Session::default()).await;
        assert!(list.toast().is_none());
    }

    #[tokio::test]
    async fn stale_fetch_is_discarded() {
        let mut list = list_with(vec![]);
        let first = list.begin_fetch_with(Box::pin(async { Ok::<_, GatewayError>(vec![row("1", "old")]) }));
        let second = list.begin_fetch_with(Box::pin(async { Ok::<_, GatewayError>(vec![row("2", "new")]) }));

        let second = second.resolve().await;
        let first = first.resolve().await;

        assert_eq!(list.complete_fetch(second), FetchOutcome::Loaded(1));
        assert_eq!(list.complete_fetch(first), FetchOutcome::Stale);
        assert_eq!(names(&list), vec!["new"]);
    }

    #[tokio::test]
    async fn stale_failure_leaves_loading_and_toast_alone() {
        let mut list = list_with(vec![]);
        let first = list.begin_fetch_with(Box::pin(async { Err::<Vec<Row>, _>(GatewayError::Timeout) }));
        let _second = list.begin_fetch_with(Box::pin(async { Ok::<Vec<Row>, GatewayError>(Vec::new()) }));

        let first = first.resolve().await;
        assert_eq!(list.complete_fetch(first), FetchOutcome::Stale);
        assert!(list.is_loading());
        assert!(list.toast().is_none());
    }
}
