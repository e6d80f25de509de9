mod common;

use std::time::Duration;

use admin_core::{ErrorKind, GatewayError, Session};
use api_types::slip::SlipSearch;
use common::{cashier_json, session, spawn_backend};

#[tokio::test]
async fn login_returns_token_and_user() {
    let backend = spawn_backend(Vec::new()).await;
    let res = backend.gateway().login("root", "secret1").await.unwrap();
    assert_eq!(res.token, common::TOKEN);
    assert_eq!(res.user.username, "root");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let backend = spawn_backend(Vec::new()).await;
    let err = backend.gateway().login("root", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.kind(), ErrorKind::Client);
}

#[tokio::test]
async fn missing_token_maps_to_unauthorized() {
    let backend = spawn_backend(vec![cashier_json("c1", "almaz", "s1", true)]).await;
    let err = backend
        .gateway()
        .cashiers(&Session::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized));
    assert_eq!(err.to_string(), "Invalid or expired token");
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let backend = spawn_backend(vec![cashier_json("c1", "almaz", "s1", true)]).await;
    let cashiers = backend.gateway().cashiers(&session()).await.unwrap();
    assert_eq!(cashiers.len(), 1);
    assert_eq!(cashiers[0].shop.shop_name, "Shop s1");
    assert_eq!(backend.state.calls(), 1);
}

#[tokio::test]
async fn bad_request_body_becomes_the_message() {
    let backend = spawn_backend(Vec::new()).await;
    let search = SlipSearch {
        shop_id: "bad".to_string(),
        cashier_id: None,
        date: None,
        ticket_number: None,
        game_id: None,
    };
    let err = backend
        .gateway()
        .search_slips(&session(), &search)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid shop");
}

#[tokio::test]
async fn success_false_is_rejected() {
    let backend = spawn_backend(Vec::new()).await;
    let err = backend
        .gateway()
        .update_user_status(&session(), "u1", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.to_string(), "Cannot deactivate the last system admin");
}

#[tokio::test]
async fn server_errors_hide_the_body() {
    let backend = spawn_backend(Vec::new()).await;
    let err = backend
        .gateway()
        .cashier_details(&session(), "s2", &Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Server error");
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn slow_responses_time_out() {
    let backend = spawn_backend(Vec::new()).await;
    backend.state.set_slow(true);
    let err = backend
        .gateway_with_timeout(Duration::from_millis(200))
        .users(&session())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    let backend = spawn_backend(Vec::new()).await;
    let gateway = admin_core::Gateway::new(&admin_core::GatewayConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();
    let err = gateway.users(&session()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Server is not available. Please check your connection."
    );
    assert_eq!(backend.state.calls(), 0);
}
