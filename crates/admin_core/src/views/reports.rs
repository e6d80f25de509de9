//! Retail and cashier reports over a date range.
//!
//! The retail tab sums every cashier of a shop into one row; the cashier
//! tab lists the cashiers of one shop. Rows are built on the client from
//! the balance endpoints and can be sorted and exported.
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use api_types::{
    ShopRef,
    balance::{BalanceQuery, CashierDetail, CashierRef, ReportRow},
};
use chrono::{Days, NaiveDate, Utc};
use tracing::{info, warn};

use crate::{
    export::{Column, ExportFormat, export_rows, format_number},
    gateway::{Gateway, GatewayError},
    list_state::{FetchOutcome, ListState, ToastLevel, empty_fetcher},
    session::Session,
    validation::FieldErrors,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportTab {
    #[default]
    Shop,
    Cashier,
}

impl ReportTab {
    pub fn toggled(self) -> Self {
        match self {
            Self::Shop => Self::Cashier,
            Self::Cashier => Self::Shop,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateRange {
    Last7,
    #[default]
    Last30,
    Last90,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub const PRESETS: [DateRange; 3] = [Self::Last7, Self::Last30, Self::Last90];

    /// Both dates are required, as `YYYY-MM-DD`, and may not be reversed.
    pub fn custom(start: &str, end: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let start = parse_date(&mut errors, "startDate", "Start Date", start);
        let end = parse_date(&mut errors, "endDate", "End Date", end);
        match (start, end) {
            (Some(start), Some(end)) if end < start => {
                errors.insert("endDate", "End Date must not be before Start Date");
                Err(errors)
            }
            (Some(start), Some(end)) => Ok(Self::Custom { start, end }),
            _ => Err(errors),
        }
    }

    /// Inclusive `(start, end)` relative to `today`.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days_back = |days: u64| today.checked_sub_days(Days::new(days)).unwrap_or(today);
        match self {
            Self::Last7 => (days_back(7), today),
            Self::Last30 => (days_back(30), today),
            Self::Last90 => (days_back(90), today),
            Self::Custom { start, end } => (start, end),
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Last7 => "Last 7 Days".to_string(),
            Self::Last30 => "Last 30 Days".to_string(),
            Self::Last90 => "Last 90 Days".to_string(),
            Self::Custom { start, end } => format!("{start} to {end}"),
        }
    }

    /// Filename fragment, e.g. `Last_7_Days` or `2024-05-01_to_2024-05-31`.
    pub fn slug(self) -> String {
        match self {
            Self::Custom { start, end } => {
                format!("{}_to_{}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
            }
            preset => preset.label().replace(' ', "_"),
        }
    }
}

fn parse_date(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    raw: &str,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.insert(field, format!("{label} is required"));
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert(field, format!("{label} must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

/// Sums the cashiers of one shop into a retail row. An empty slice gives
/// a row of zeros.
pub fn shop_row(
    row_index: usize,
    shop: &ShopRef,
    details: &[CashierDetail],
    today: NaiveDate,
) -> ReportRow {
    let tickets: u64 = details.iter().map(|d| d.tickets).sum();
    let bets: f64 = details.iter().map(|d| d.bets).sum();
    let unclaimed: f64 = details.iter().map(|d| d.unclaimed).sum();
    let redeemed: f64 = details.iter().map(|d| d.redeemed).sum();
    let net_balance = bets - redeemed;
    ReportRow {
        row_index,
        shop_id: shop.id.clone(),
        shop_name: shop.shop_name.clone(),
        tickets,
        bets,
        unclaimed,
        unclaimed_count: details.iter().map(|d| d.unclaimed_count).sum(),
        redeemed,
        redeem_count: details.iter().map(|d| d.redeem_count).sum(),
        ggr: net_balance - unclaimed,
        net_balance,
        last_updated: today.format(DATE_FORMAT).to_string(),
        ..ReportRow::default()
    }
}

/// One cashier line. Counts only record whether any amount is present.
pub fn cashier_row(
    row_index: usize,
    shop: &ShopRef,
    detail: &CashierDetail,
    today: NaiveDate,
) -> ReportRow {
    ReportRow {
        row_index,
        shop_id: shop.id.clone(),
        shop_name: shop.shop_name.clone(),
        cashier_id: Some(detail.cashier_id.clone()),
        cashier_name: Some(detail.cashier_name.clone()),
        status: detail.status.clone(),
        tickets: detail.tickets,
        bets: detail.bets,
        unclaimed: detail.unclaimed,
        unclaimed_count: u64::from(detail.unclaimed > 0.0),
        redeemed: detail.redeemed,
        redeem_count: u64::from(detail.redeemed > 0.0),
        ggr: detail.bets - detail.redeemed - detail.unclaimed,
        net_balance: detail.net_balance,
        last_updated: today.format(DATE_FORMAT).to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportColumn {
    Index,
    Shop,
    Cashier,
    Tickets,
    Bets,
    Unclaimed,
    UnclaimedCount,
    Redeemed,
    RedeemCount,
    Ggr,
    NetBalance,
}

enum SortValue {
    Number(f64),
    Text(String),
}

impl ReportColumn {
    pub const SHOP_TAB: [ReportColumn; 10] = [
        Self::Index,
        Self::Shop,
        Self::Tickets,
        Self::Bets,
        Self::Unclaimed,
        Self::UnclaimedCount,
        Self::Redeemed,
        Self::RedeemCount,
        Self::Ggr,
        Self::NetBalance,
    ];

    pub const CASHIER_TAB: [ReportColumn; 11] = [
        Self::Index,
        Self::Shop,
        Self::Cashier,
        Self::Tickets,
        Self::Bets,
        Self::Unclaimed,
        Self::UnclaimedCount,
        Self::Redeemed,
        Self::RedeemCount,
        Self::Ggr,
        Self::NetBalance,
    ];

    pub fn for_tab(tab: ReportTab) -> &'static [ReportColumn] {
        match tab {
            ReportTab::Shop => &Self::SHOP_TAB,
            ReportTab::Cashier => &Self::CASHIER_TAB,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Index => "NO.",
            Self::Shop => "SHOP",
            Self::Cashier => "CASHIER NAME",
            Self::Tickets => "TICKETS",
            Self::Bets => "BETS",
            Self::Unclaimed => "UNCLAIMED",
            Self::UnclaimedCount => "UNCLAIMED COUNT",
            Self::Redeemed => "REDEEMED",
            Self::RedeemCount => "REDEEM COUNT",
            Self::Ggr => "GGR",
            Self::NetBalance => "NET BALANCE",
        }
    }

    pub fn render(self, row: &ReportRow) -> String {
        match self.value(row) {
            SortValue::Number(_) if self == Self::Index => row.row_index.to_string(),
            SortValue::Number(value) => format_number(value),
            SortValue::Text(text) => text,
        }
    }

    fn value(self, row: &ReportRow) -> SortValue {
        match self {
            Self::Index => SortValue::Number(row.row_index as f64),
            Self::Shop => SortValue::Text(row.shop_name.clone()),
            Self::Cashier => SortValue::Text(row.cashier_name.clone().unwrap_or_default()),
            Self::Tickets => SortValue::Number(row.tickets as f64),
            Self::Bets => SortValue::Number(row.bets),
            Self::Unclaimed => SortValue::Number(row.unclaimed),
            Self::UnclaimedCount => SortValue::Number(row.unclaimed_count as f64),
            Self::Redeemed => SortValue::Number(row.redeemed),
            Self::RedeemCount => SortValue::Number(row.redeem_count as f64),
            Self::Ggr => SortValue::Number(row.ggr),
            Self::NetBalance => SortValue::Number(row.net_balance),
        }
    }

    fn compare(self, a: &ReportRow, b: &ReportRow) -> Ordering {
        match (self.value(a), self.value(b)) {
            (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Stable sort; numbers compare numerically, text case-insensitively.
pub fn sort_rows(rows: &mut [ReportRow], column: ReportColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = column.compare(a, b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn render_index(row: &ReportRow) -> String {
    ReportColumn::Index.render(row)
}
fn render_shop(row: &ReportRow) -> String {
    ReportColumn::Shop.render(row)
}
fn render_cashier(row: &ReportRow) -> String {
    ReportColumn::Cashier.render(row)
}
fn render_tickets(row: &ReportRow) -> String {
    ReportColumn::Tickets.render(row)
}
fn render_bets(row: &ReportRow) -> String {
    ReportColumn::Bets.render(row)
}
fn render_unclaimed(row: &ReportRow) -> String {
    ReportColumn::Unclaimed.render(row)
}
fn render_unclaimed_count(row: &ReportRow) -> String {
    ReportColumn::UnclaimedCount.render(row)
}
fn render_redeemed(row: &ReportRow) -> String {
    ReportColumn::Redeemed.render(row)
}
fn render_redeem_count(row: &ReportRow) -> String {
    ReportColumn::RedeemCount.render(row)
}
fn render_ggr(row: &ReportRow) -> String {
    ReportColumn::Ggr.render(row)
}
fn render_net_balance(row: &ReportRow) -> String {
    ReportColumn::NetBalance.render(row)
}

pub const SHOP_EXPORT: [Column<ReportRow>; 10] = [
    Column::new("NO.", render_index),
    Column::new("SHOP", render_shop),
    Column::new("TICKETS", render_tickets),
    Column::new("BETS", render_bets),
    Column::new("UNCLAIMED", render_unclaimed),
    Column::new("UNCLAIMED COUNT", render_unclaimed_count),
    Column::new("REDEEMED", render_redeemed),
    Column::new("REDEEM COUNT", render_redeem_count),
    Column::new("GGR", render_ggr),
    Column::new("NET BALANCE", render_net_balance),
];

pub const CASHIER_EXPORT: [Column<ReportRow>; 11] = [
    Column::new("NO.", render_index),
    Column::new("SHOP", render_shop),
    Column::new("CASHIER NAME", render_cashier),
    Column::new("TICKETS", render_tickets),
    Column::new("BETS", render_bets),
    Column::new("UNCLAIMED", render_unclaimed),
    Column::new("UNCLAIMED COUNT", render_unclaimed_count),
    Column::new("REDEEMED", render_redeemed),
    Column::new("REDEEM COUNT", render_redeem_count),
    Column::new("GGR", render_ggr),
    Column::new("NET BALANCE", render_net_balance),
];

pub struct ReportsView {
    list: ListState<ReportRow>,
    tab: ReportTab,
    range: DateRange,
    shop_filter: Option<String>,
    cashier_filter: Option<String>,
    shops: Vec<ShopRef>,
    cashiers: Vec<CashierRef>,
    sort: Option<(ReportColumn, SortDirection)>,
}

impl Default for ReportsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportsView {
    pub fn new() -> Self {
        Self {
            list: ListState::new(empty_fetcher(), &[])
                .with_failure_message("Failed to load report data"),
            tab: ReportTab::Shop,
            range: DateRange::default(),
            shop_filter: None,
            cashier_filter: None,
            shops: Vec::new(),
            cashiers: Vec::new(),
            sort: None,
        }
    }

    pub fn list(&self) -> &ListState<ReportRow> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<ReportRow> {
        &mut self.list
    }

    pub fn tab(&self) -> ReportTab {
        self.tab
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn shop_filter(&self) -> Option<&str> {
        self.shop_filter.as_deref()
    }

    pub fn cashier_filter(&self) -> Option<&str> {
        self.cashier_filter.as_deref()
    }

    pub fn shops(&self) -> &[ShopRef] {
        &self.shops
    }

    /// Cashiers offered by the filter, narrowed to the selected shop.
    pub fn cashiers(&self) -> impl Iterator<Item = &CashierRef> + '_ {
        self.cashiers.iter().filter(|cashier| {
            self.shop_filter.as_deref().is_none_or(|shop_id| {
                cashier
                    .shop
                    .as_ref()
                    .is_none_or(|shop| shop.id == shop_id)
            })
        })
    }

    pub fn sort(&self) -> Option<(ReportColumn, SortDirection)> {
        self.sort
    }

    /// Switching tabs drops the rows and the sort of the other tab.
    pub fn set_tab(&mut self, tab: ReportTab) {
        if self.tab != tab {
            self.tab = tab;
            self.sort = None;
            self.list.clear();
        }
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    pub fn set_shop_filter(&mut self, shop_id: Option<String>) {
        if self.shop_filter != shop_id {
            self.cashier_filter = None;
        }
        self.shop_filter = shop_id;
    }

    pub fn set_cashier_filter(&mut self, cashier_id: Option<String>) {
        self.cashier_filter = cashier_id;
    }

    pub fn query(&self, today: NaiveDate) -> BalanceQuery {
        let (start, end) = self.range.bounds(today);
        BalanceQuery {
            shop_id: self.shop_filter.clone(),
            cashier_id: self.cashier_filter.clone(),
            start_date: Some(start.format(DATE_FORMAT).to_string()),
            end_date: Some(end.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn filename(&self) -> String {
        let prefix = match self.tab {
            ReportTab::Shop => "Retail_Report",
            ReportTab::Cashier => "Cashier_Report",
        };
        format!("{prefix}_{}", self.range.slug())
    }

    /// Loads the filter options and the rows of the active tab.
    pub async fn load(&mut self, gateway: &Gateway, session: &Session) -> FetchOutcome {
        self.load_filters(gateway, session).await;

        let today = Utc::now().date_naive();
        let query = self.query(today);
        let shop_filter = self.shop_filter.clone();
        let shop_name = shop_filter
            .as_deref()
            .and_then(|id| self.shops.iter().find(|shop| shop.id == id))
            .map(|shop| shop.shop_name.clone());
        let (gateway, session) = (gateway.clone(), session.clone());

        let pending = match self.tab {
            ReportTab::Shop => self.list.begin_fetch_with(Box::pin(async move {
                let shops = gateway.shops(&session).await?;
                let mut rows = Vec::new();
                let selected = shops
                    .iter()
                    .filter(|shop| shop_filter.as_deref().is_none_or(|id| shop.id == id));
                for (idx, shop) in selected.enumerate() {
                    let shop_ref = ShopRef {
                        id: shop.id.clone(),
                        shop_name: shop.shop_name.clone(),
                    };
                    let details = match gateway.cashier_details(&session, &shop.id, &query).await {
                        Ok(details) => details,
                        Err(err) => {
                            warn!(error = %err, shop = %shop.shop_name, "cashier details failed");
                            Vec::new()
                        }
                    };
                    rows.push(shop_row(idx + 1, &shop_ref, &details, today));
                }
                Ok::<_, GatewayError>(rows)
            })),
            ReportTab::Cashier => self.list.begin_fetch_with(Box::pin(async move {
                // The cashier report only exists per shop.
                let Some(shop_id) = shop_filter else {
                    return Ok::<_, GatewayError>(Vec::new());
                };
                let shop_ref = ShopRef {
                    shop_name: shop_name.unwrap_or_else(|| shop_id.clone()),
                    id: shop_id,
                };
                let details = gateway.cashier_details(&session, &shop_ref.id, &query).await?;
                Ok(details
                    .iter()
                    .enumerate()
                    .map(|(idx, detail)| cashier_row(idx + 1, &shop_ref, detail, today))
                    .collect())
            })),
        };

        let outcome = self.list.complete_fetch(pending.resolve().await);
        match outcome {
            FetchOutcome::Loaded(count) => {
                info!(tab = ?self.tab, rows = count, "report loaded");
                self.apply_sort();
            }
            FetchOutcome::Failed(_) => self.list.clear(),
            FetchOutcome::Stale => {}
        }
        outcome
    }

    pub async fn load_filters(&mut self, gateway: &Gateway, session: &Session) {
        match gateway.balance_data(session, &BalanceQuery::default()).await {
            Ok(balance) => {
                self.shops = balance.shops;
                self.cashiers = balance.cashiers;
            }
            Err(err) => warn!(error = %err, "report filters failed to load"),
        }
    }

    /// Sorts by `column`; picking the same column again flips the direction.
    pub fn sort_by(&mut self, column: ReportColumn) {
        let direction = match self.sort {
            Some((current, direction)) if current == column => direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort = Some((column, direction));
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let Some((column, direction)) = self.sort else {
            return;
        };
        let mut rows = self.list.items().to_vec();
        sort_rows(&mut rows, column, direction);
        self.list.replace_all(rows);
    }

    /// Writes the visible rows to `dir`. Nothing is written for an empty
    /// report.
    pub fn export(&mut self, dir: &Path, format: ExportFormat) -> Option<PathBuf> {
        if self.list.items().is_empty() {
            self.list
                .show_toast("No report data to export", ToastLevel::Warning);
            return None;
        }
        let columns: &[Column<ReportRow>] = match self.tab {
            ReportTab::Shop => &SHOP_EXPORT,
            ReportTab::Cashier => &CASHIER_EXPORT,
        };
        match export_rows(self.list.items(), columns, dir, &self.filename(), format) {
            Ok(path) => {
                self.list.show_toast(
                    format!("Report exported to {}", path.display()),
                    ToastLevel::Success,
                );
                Some(path)
            }
            Err(err) => {
                warn!(error = %err, "report export failed");
                self.list
                    .show_toast(format!("Failed to export report: {err}"), ToastLevel::Error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn detail(name: &str, bets: f64, unclaimed: f64, redeemed: f64) -> CashierDetail {
        CashierDetail {
            cashier_id: format!("c-{name}"),
            cashier_name: name.to_string(),
            tickets: 10,
            bets,
            unclaimed,
            unclaimed_count: 2,
            redeemed,
            redeem_count: 1,
            ggr: 0.0,
            net_balance: bets - redeemed,
            status: Some("active".to_string()),
        }
    }

    fn shop() -> ShopRef {
        ShopRef {
            id: "s1".to_string(),
            shop_name: "Piassa".to_string(),
        }
    }

    #[test]
    fn presets_count_back_from_today() {
        let today = date(2024, 3, 31);
        assert_eq!(DateRange::Last7.bounds(today), (date(2024, 3, 24), today));
        assert_eq!(DateRange::Last30.bounds(today), (date(2024, 3, 1), today));
        assert_eq!(DateRange::Last90.bounds(today), (date(2024, 1, 1), today));
        assert_eq!(DateRange::default(), DateRange::Last30);
    }

    #[test]
    fn slugs_name_the_range() {
        assert_eq!(DateRange::Last7.slug(), "Last_7_Days");
        assert_eq!(DateRange::Last90.slug(), "Last_90_Days");
        let custom = DateRange::custom("2024-05-01", "2024-05-31").unwrap();
        assert_eq!(custom.slug(), "2024-05-01_to_2024-05-31");
    }

    #[test]
    fn custom_range_requires_both_dates() {
        let errors = DateRange::custom("", "2024-05-31").unwrap_err();
        assert_eq!(errors.get("startDate"), Some("Start Date is required"));

        let errors = DateRange::custom("2024-05-31", "2024-05-01").unwrap_err();
        assert_eq!(
            errors.get("endDate"),
            Some("End Date must not be before Start Date")
        );

        let errors = DateRange::custom("31/05/2024", "2024-05-01").unwrap_err();
        assert_eq!(
            errors.get("startDate"),
            Some("Start Date must be a date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn shop_row_sums_cashiers() {
        let details = [detail("a", 1000.0, 100.0, 300.0), detail("b", 500.0, 0.0, 50.0)];
        let row = shop_row(3, &shop(), &details, date(2024, 5, 1));
        assert_eq!(row.row_index, 3);
        assert_eq!(row.tickets, 20);
        assert_eq!(row.bets, 1500.0);
        assert_eq!(row.redeemed, 350.0);
        assert_eq!(row.net_balance, 1150.0);
        assert_eq!(row.ggr, 1050.0);
        assert_eq!(row.unclaimed_count, 4);
        assert_eq!(row.redeem_count, 2);
        assert_eq!(row.last_updated, "2024-05-01");
    }

    #[test]
    fn shop_without_cashiers_is_all_zero() {
        let row = shop_row(1, &shop(), &[], date(2024, 5, 1));
        assert_eq!(row.tickets, 0);
        assert_eq!(row.bets, 0.0);
        assert_eq!(row.ggr, 0.0);
        assert_eq!(row.shop_name, "Piassa");
    }

    #[test]
    fn cashier_row_flags_counts_by_presence() {
        let row = cashier_row(1, &shop(), &detail("a", 1000.0, 100.0, 0.0), date(2024, 5, 1));
        assert_eq!(row.unclaimed_count, 1);
        assert_eq!(row.redeem_count, 0);
        assert_eq!(row.ggr, 900.0);
        assert_eq!(row.cashier_name.as_deref(), Some("a"));
        assert_eq!(row.net_balance, 1000.0);
    }

    #[test]
    fn sorting_is_numeric_or_case_insensitive() {
        let today = date(2024, 5, 1);
        let mut rows = vec![
            cashier_row(1, &shop(), &detail("bekele", 900.0, 0.0, 0.0), today),
            cashier_row(2, &shop(), &detail("Almaz", 1000.0, 0.0, 0.0), today),
            cashier_row(3, &shop(), &detail("chala", 90.0, 0.0, 0.0), today),
        ];
        sort_rows(&mut rows, ReportColumn::Bets, SortDirection::Asc);
        let bets: Vec<f64> = rows.iter().map(|row| row.bets).collect();
        assert_eq!(bets, vec![90.0, 900.0, 1000.0]);

        sort_rows(&mut rows, ReportColumn::Cashier, SortDirection::Desc);
        let names: Vec<_> = rows.iter().filter_map(|row| row.cashier_name.as_deref()).collect();
        assert_eq!(names, vec!["chala", "bekele", "Almaz"]);
    }

    #[test]
    fn sort_by_same_column_flips_direction() {
        let mut view = ReportsView::new();
        let today = date(2024, 5, 1);
        view.list_mut().replace_all(vec![
            shop_row(1, &shop(), &[detail("a", 10.0, 0.0, 0.0)], today),
            shop_row(2, &ShopRef { id: "s2".into(), shop_name: "Bole".into() }, &[], today),
        ]);
        view.sort_by(ReportColumn::Shop);
        assert_eq!(view.sort(), Some((ReportColumn::Shop, SortDirection::Asc)));
        assert_eq!(view.list().items()[0].shop_name, "Bole");
        view.sort_by(ReportColumn::Shop);
        assert_eq!(view.sort(), Some((ReportColumn::Shop, SortDirection::Desc)));
        assert_eq!(view.list().items()[0].shop_name, "Piassa");
    }

    #[test]
    fn query_carries_filters_and_dates() {
        let mut view = ReportsView::new();
        view.set_shop_filter(Some("s1".to_string()));
        view.set_cashier_filter(Some("c1".to_string()));
        view.set_range(DateRange::Last7);
        let query = view.query(date(2024, 5, 8));
        assert_eq!(
            query.pairs(),
            vec![
                ("shopId", "s1"),
                ("cashierId", "c1"),
                ("startDate", "2024-05-01"),
                ("endDate", "2024-05-08"),
            ]
        );

        view.set_shop_filter(Some("s2".to_string()));
        assert_eq!(view.cashier_filter(), None);
    }

    #[test]
    fn filename_follows_tab_and_range() {
        let mut view = ReportsView::new();
        assert_eq!(view.filename(), "Retail_Report_Last_30_Days");
        view.set_tab(ReportTab::Cashier);
        view.set_range(DateRange::Last7);
        assert_eq!(view.filename(), "Cashier_Report_Last_7_Days");
    }

    #[test]
    fn empty_report_is_not_exported() {
        let mut view = ReportsView::new();
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/report-tests");
        assert!(view.export(&dir, ExportFormat::Csv).is_none());
        assert_eq!(view.list().toast().unwrap().level, ToastLevel::Warning);
    }

    #[test]
    fn export_renders_grouped_numbers() {
        let row = shop_row(1, &shop(), &[detail("a", 12500.5, 0.0, 0.0)], date(2024, 5, 1));
        assert_eq!(ReportColumn::Bets.render(&row), "12,500.5");
        assert_eq!(ReportColumn::Index.render(&row), "1");
        assert_eq!(ReportColumn::Shop.render(&row), "Piassa");
    }
}
