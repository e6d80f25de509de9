mod common;

use std::time::Instant;

use admin_core::{
    ErrorKind, FetchOutcome, FormMode, ToastLevel,
    validation::{CashierForm, UserForm},
    views::{
        Outcome,
        cashiers::{CashiersView, ShopFilter},
        game_results::{DEFAULT_AUTO_REFRESH, GameResultsView},
        reports::{ReportTab, ReportsView},
        users::UsersView,
    },
};
use common::{cashier_json, session, spawn_backend};

#[tokio::test]
async fn cashier_toggle_patches_in_place() {
    let backend = spawn_backend(vec![
        cashier_json("c1", "almaz", "s1", true),
        cashier_json("c2", "bekele", "s1", true),
        cashier_json("c3", "chaltu", "s2", false),
    ])
    .await;
    let gateway = backend.gateway();
    let mut view = CashiersView::new();
    assert_eq!(view.load(&gateway, &session()).await, FetchOutcome::Loaded(3));
    let before = backend.state.calls();

    let outcome = view.toggle_status(&gateway, &session(), "c2").await;
    assert!(outcome.is_applied());
    assert_eq!(backend.state.calls(), before + 1);

    let ids: Vec<&str> = view.list().items().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    assert!(!view.list().find("c2").unwrap().is_active);
    let toast = view.list().toast().unwrap();
    assert_eq!(toast.message, "Cashier deactivated successfully");
    assert_eq!(toast.level, ToastLevel::Success);
}

#[tokio::test]
async fn cashier_toggle_of_unknown_id_keeps_the_list() {
    let backend = spawn_backend(vec![cashier_json("c1", "almaz", "s1", true)]).await;
    let gateway = backend.gateway();
    let mut view = CashiersView::new();
    view.load(&gateway, &session()).await;

    let outcome = view.toggle_status(&gateway, &session(), "missing").await;
    assert!(!outcome.is_applied());
    assert_eq!(view.list().items().len(), 1);
    assert_eq!(
        view.list().toast().unwrap().message,
        "Failed to update cashier status"
    );
}

#[tokio::test]
async fn invalid_cashier_form_never_reaches_the_server() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = CashiersView::new();
    let form = CashierForm {
        shop_id: "s1".to_string(),
        first_name: "Almaz".to_string(),
        last_name: "Kebede".to_string(),
        username: "almaz".to_string(),
        password: "secret1".to_string(),
        re_password: "secret2".to_string(),
    };

    let outcome = view.save(&gateway, &session(), &FormMode::Create, &form).await;
    let errors = outcome.field_errors().unwrap();
    assert_eq!(errors.get("rePassword"), Some("Passwords do not match"));
    assert_eq!(backend.state.calls(), 0);
}

#[tokio::test]
async fn created_cashier_is_prepended_and_filterable() {
    let backend = spawn_backend(vec![cashier_json("c1", "almaz", "s1", true)]).await;
    let gateway = backend.gateway();
    let mut view = CashiersView::new();
    view.load(&gateway, &session()).await;

    let form = CashierForm {
        shop_id: "s2".to_string(),
        first_name: "Dawit".to_string(),
        last_name: "Haile".to_string(),
        username: "dawit".to_string(),
        password: "secret1".to_string(),
        re_password: "secret1".to_string(),
    };
    let outcome = view.save(&gateway, &session(), &FormMode::Create, &form).await;
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(view.list().items()[0].username, "dawit");

    view.set_shop_filter(ShopFilter::Shop("s2".to_string()));
    let visible: Vec<&str> = view.visible().map(|c| c.username.as_str()).collect();
    assert_eq!(visible, ["dawit"]);
}

#[tokio::test]
async fn user_created_without_record_triggers_reload() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = UsersView::new();
    let form = UserForm {
        full_name: "Mekdes Alemu".to_string(),
        username: "mekdes".to_string(),
        password: "secret1".to_string(),
        ..UsersView::blank_form()
    };

    let outcome = view.create(&gateway, &session(), &form).await;
    assert!(outcome.is_applied());
    // create + reload
    assert_eq!(backend.state.calls(), 2);
    assert_eq!(view.list().items().len(), 1);
    assert_eq!(view.list().toast().unwrap().message, "User created successfully");
}

#[tokio::test]
async fn rejected_user_status_leaves_the_row() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = UsersView::new();
    view.load(&gateway, &session()).await;

    let outcome = view.toggle_status(&gateway, &session(), "u1").await;
    assert!(!outcome.is_applied());
    assert!(view.list().find("u1").unwrap().is_active);
}

#[tokio::test]
async fn expired_session_asks_for_login() {
    let backend = spawn_backend(vec![cashier_json("c1", "almaz", "s1", true)]).await;
    let gateway = backend.gateway();
    let mut view = CashiersView::new();
    let outcome = view
        .toggle_status(&gateway, &admin_core::Session::with_token("stale"), "c1")
        .await;
    assert!(outcome.needs_login());
}

#[tokio::test]
async fn retail_report_sums_cashiers_per_shop() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = ReportsView::new();

    assert_eq!(view.load(&gateway, &session()).await, FetchOutcome::Loaded(2));
    let rows = view.list().items();

    let piassa = &rows[0];
    assert_eq!(piassa.shop_name, "Piassa");
    assert_eq!(piassa.tickets, 15);
    assert_eq!(piassa.bets, 1500.0);
    assert_eq!(piassa.unclaimed_count, 2);
    assert_eq!(piassa.redeem_count, 3);
    assert_eq!(piassa.net_balance, 1200.0);
    assert_eq!(piassa.ggr, 1100.0);

    // The second shop's details fail; it still gets a row of zeros.
    let bole = &rows[1];
    assert_eq!(bole.shop_name, "Bole");
    assert_eq!(bole.row_index, 2);
    assert_eq!(bole.tickets, 0);
    assert_eq!(bole.net_balance, 0.0);
}

#[tokio::test]
async fn cashier_report_needs_a_shop() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = ReportsView::new();
    view.set_tab(ReportTab::Cashier);

    assert_eq!(view.load(&gateway, &session()).await, FetchOutcome::Loaded(0));
    assert_eq!(view.shops().len(), 2);

    view.set_shop_filter(Some("s1".to_string()));
    assert_eq!(view.load(&gateway, &session()).await, FetchOutcome::Loaded(2));
    let almaz = &view.list().items()[0];
    assert_eq!(almaz.shop_name, "Piassa");
    assert_eq!(almaz.cashier_name.as_deref(), Some("Almaz"));
    assert_eq!(almaz.ggr, 800.0);
    assert_eq!(almaz.net_balance, 900.0);
    assert_eq!(almaz.redeem_count, 1);
}

#[tokio::test]
async fn failed_cashier_report_clears_rows() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = ReportsView::new();
    view.set_tab(ReportTab::Cashier);
    view.set_shop_filter(Some("s1".to_string()));
    view.load(&gateway, &session()).await;
    assert_eq!(view.list().items().len(), 2);

    view.set_shop_filter(Some("s2".to_string()));
    let outcome = view.load(&gateway, &session()).await;
    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    assert!(view.list().items().is_empty());
    assert_eq!(view.list().toast().unwrap().level, ToastLevel::Error);
}

#[tokio::test]
async fn failing_auto_refresh_stays_silent() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = GameResultsView::new(DEFAULT_AUTO_REFRESH);
    view.query.shop_id = Some("s1".to_string());
    view.query.set_event_id("500");

    assert!(view.toggle_auto_refresh());
    view.list_mut().close_toast();

    let outcome = view.tick(&gateway, &session(), Instant::now()).await;
    assert_eq!(outcome, Some(FetchOutcome::Failed(ErrorKind::Server)));
    assert!(view.list().toast().is_none());
    assert_eq!(backend.state.calls(), 1);
}

#[tokio::test]
async fn failing_manual_search_is_toasted() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = backend.gateway();
    let mut view = GameResultsView::new(DEFAULT_AUTO_REFRESH);
    view.query.shop_id = Some("s1".to_string());
    view.query.set_event_id("500");

    let outcome = view.search(&gateway, &session()).await;
    assert_eq!(outcome, Some(FetchOutcome::Failed(ErrorKind::Server)));
    assert_eq!(view.list().toast().unwrap().level, ToastLevel::Error);
}
