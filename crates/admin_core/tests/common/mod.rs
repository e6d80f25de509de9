//! In-process backend used by the integration tests.
#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use admin_core::{Gateway, GatewayConfig, Session};
use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::{Value, json};

pub const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
pub struct BackendState {
    calls: Arc<AtomicUsize>,
    slow: Arc<AtomicBool>,
    cashiers: Arc<Mutex<Vec<Value>>>,
}

impl BackendState {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_slow(&self, slow: bool) {
        self.slow.store(slow, Ordering::SeqCst);
    }
}

pub struct Backend {
    pub addr: SocketAddr,
    pub state: BackendState,
}

impl Backend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn gateway(&self) -> Gateway {
        self.gateway_with_timeout(Duration::from_secs(5))
    }

    pub fn gateway_with_timeout(&self, timeout: Duration) -> Gateway {
        Gateway::new(&GatewayConfig {
            base_url: self.base_url(),
            timeout,
        })
        .unwrap()
    }
}

pub fn session() -> Session {
    Session::with_token(TOKEN)
}

pub fn cashier_json(id: &str, username: &str, shop_id: &str, active: bool) -> Value {
    json!({
        "_id": id,
        "fullName": format!("{username} full"),
        "username": username,
        "isActive": active,
        "shop": {"_id": shop_id, "shopName": format!("Shop {shop_id}")},
        "createdAt": "2024-05-01T08:00:00Z",
        "sessionId": "sess-1"
    })
}

fn shop_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "shopName": name,
        "margin": 20,
        "location": "Addis Ababa",
        "owner": {"_id": "o1", "fullName": "Sara Tesfaye", "username": "sara"},
        "status": "active",
        "createdAt": "2024-05-01T08:00:00Z"
    })
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

async fn auth(State(state): State<BackendState>, request: Request, next: Next) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "error": "jwt expired"})),
        )
            .into_response();
    }
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret1" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Invalid credentials"})),
        )
            .into_response();
    }
    ok(json!({
        "token": TOKEN,
        "user": {"id": "a1", "username": body["username"], "fullName": "Admin", "role": "systemadmin"}
    }))
    .into_response()
}

async fn list_cashiers(State(state): State<BackendState>) -> Json<Value> {
    let cashiers = state.cashiers.lock().unwrap().clone();
    ok(Value::Array(cashiers))
}

async fn create_cashier(State(state): State<BackendState>, Json(body): Json<Value>) -> Json<Value> {
    let username = body["username"].as_str().unwrap_or_default();
    let shop_id = body["shopId"].as_str().unwrap_or_default();
    let created = cashier_json("c-new", username, shop_id, true);
    state.cashiers.lock().unwrap().insert(0, created.clone());
    ok(created)
}

async fn toggle_cashier(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    let mut cashiers = state.cashiers.lock().unwrap();
    let Some(cashier) = cashiers.iter_mut().find(|cashier| cashier["_id"] == id.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Cashier not found"})),
        )
            .into_response();
    };
    let active = cashier["isActive"].as_bool().unwrap_or(false);
    cashier["isActive"] = Value::Bool(!active);
    ok(cashier.clone()).into_response()
}

async fn list_shops() -> Json<Value> {
    ok(json!([shop_json("s1", "Piassa"), shop_json("s2", "Bole")]))
}

async fn list_users(State(state): State<BackendState>) -> Json<Value> {
    if state.slow.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    ok(json!([{
        "_id": "u1",
        "fullName": "Mekdes Alemu",
        "username": "mekdes",
        "role": "admin",
        "isActive": true,
        "createdAt": "2024-05-01T08:00:00Z"
    }]))
}

/// Answers like backends that create the user but send no record back.
async fn create_user() -> Json<Value> {
    Json(json!({"success": true, "message": "User created"}))
}

async fn user_status() -> Json<Value> {
    Json(json!({"success": false, "error": "Cannot deactivate the last system admin"}))
}

async fn cashier_details(Path(shop_id): Path<String>) -> Response {
    match shop_id.as_str() {
        "s1" => ok(json!([
            {"cashierId": "c1", "cashierName": "Almaz", "tickets": 12, "bets": 1200, "unclaimed": 100,
             "unclaimedCount": 2, "redeemed": 300, "redeemCount": 3, "netBalance": 900, "status": "active"},
            {"cashierId": "c2", "cashierName": "Bekele", "tickets": 3, "bets": 300, "unclaimed": 0,
             "unclaimedCount": 0, "redeemed": 0, "redeemCount": 0, "netBalance": 300, "status": "active"}
        ]))
        .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "aggregation failed"})),
        )
            .into_response(),
    }
}

async fn balance_data() -> Json<Value> {
    ok(json!({
        "balanceData": [],
        "shops": [{"_id": "s1", "shopName": "Piassa"}, {"_id": "s2", "shopName": "Bole"}],
        "cashiers": [{"_id": "c1", "username": "almaz", "shop": {"_id": "s1", "shopName": "Piassa"}}]
    }))
}

async fn search_slips(Json(body): Json<Value>) -> Response {
    if body["shopId"] == "bad" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Invalid shop"})),
        )
            .into_response();
    }
    ok(json!([])).into_response()
}

/// Event `500` stands for a draw the backend fails to look up.
async fn search_game_results(Json(body): Json<Value>) -> Response {
    if body["eventId"] == "500" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "lookup failed"})),
        )
            .into_response();
    }
    ok(json!([])).into_response()
}

fn router(state: BackendState) -> Router {
    let protected = Router::new()
        .route("/api/cashiers", get(list_cashiers).post(create_cashier))
        .route("/api/cashiers/{id}/status", patch(toggle_cashier))
        .route("/api/shops", get(list_shops))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}/status", patch(user_status))
        .route("/api/balance/data", get(balance_data))
        .route("/api/balance/cashier-details/{shop_id}", get(cashier_details))
        .route("/api/slips/search", post(search_slips))
        .route("/api/game-results/admin-search", post(search_game_results))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/api/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

/// Starts the backend on an ephemeral port with the given cashiers.
pub async fn spawn_backend(cashiers: Vec<Value>) -> Backend {
    let state = BackendState::default();
    *state.cashiers.lock().unwrap() = cashiers;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Backend { addr, state }
}
