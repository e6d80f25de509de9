//! Push channel to the admin feed.
//!
//! One background task per channel owns the Socket.IO connection. Consumers
//! get typed [`LiveEvent`]s through a broadcast channel and the connection
//! flag through a watch channel. Reconnects with bounded backoff happen
//! inside the task; callers never retry on their own.
use std::time::Duration;

use api_types::{
    ApiResponse,
    dashboard::{CashierConnectionUpdate, DashboardSnapshot},
};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, warn};

use crate::session::Session;

pub mod packet;
pub mod transport;

use packet::{EnginePacket, PacketError, SocketPacket};
use transport::{Connection, TransportKind};

pub const CONNECT_ERROR_MESSAGE: &str = "Failed to connect to real-time updates";
pub const DASHBOARD_ERROR_MESSAGE: &str = "Failed to fetch dashboard data";
pub const REQUEST_DASHBOARD_UPDATE: &str = "request_dashboard_update";

const EVENT_BUFFER: usize = 128;
const COMMAND_BUFFER: usize = 16;
/// How long to wait for the server's open packet before giving up.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("No authentication token found")]
    MissingToken,
    #[error("invalid live endpoint: {0}")]
    InvalidUrl(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("polling error: {0}")]
    Polling(#[from] reqwest::Error),
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error("unexpected handshake: {0}")]
    Handshake(String),
    #[error("live channel is closed")]
    Closed,
}

#[derive(Clone, Debug)]
pub struct LiveConfig {
    pub base_url: String,
    pub reconnect_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_url: crate::gateway::DEFAULT_BASE_URL.to_string(),
            reconnect_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl LiveConfig {
    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameSessionKind {
    Created,
    Disconnected,
    StatusUpdated,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiveEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    DashboardUpdate(Box<DashboardSnapshot>),
    DashboardError(String),
    CashierConnection { cashier_id: String, is_connected: bool },
    GameSession { kind: GameSessionKind, payload: Value },
    ActiveGames(Vec<Value>),
    ShopUpdated(Value),
    ShopOwnerUpdated(Value),
}

impl LiveEvent {
    /// Shop and shop-owner changes make the dashboard stale.
    fn invalidates_dashboard(&self) -> bool {
        matches!(self, Self::ShopUpdated(_) | Self::ShopOwnerUpdated(_))
    }
}

/// Maps an inbound Socket.IO event onto a [`LiveEvent`].
pub fn decode_event(name: &str, data: Value) -> Option<LiveEvent> {
    let event = match name {
        "dashboard_update" => match serde_json::from_value::<ApiResponse<DashboardSnapshot>>(data) {
            Ok(ApiResponse {
                success: true,
                data: Some(snapshot),
                ..
            }) => LiveEvent::DashboardUpdate(Box::new(snapshot)),
            Ok(envelope) => LiveEvent::DashboardError(
                envelope
                    .error
                    .unwrap_or_else(|| DASHBOARD_ERROR_MESSAGE.to_string()),
            ),
            Err(err) => {
                warn!(error = %err, "malformed dashboard update");
                LiveEvent::DashboardError(DASHBOARD_ERROR_MESSAGE.to_string())
            }
        },
        "cashier_connection_update" => {
            let update = serde_json::from_value::<CashierConnectionUpdate>(data).ok()?;
            if update.cashier_id.is_empty() {
                return None;
            }
            LiveEvent::CashierConnection {
                cashier_id: update.cashier_id,
                is_connected: update.is_connected,
            }
        }
        "game_session_created" => LiveEvent::GameSession {
            kind: GameSessionKind::Created,
            payload: data,
        },
        "game_session_disconnected" => {
            let mut payload = match data {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            payload.insert("isConnected".to_string(), Value::Bool(false));
            LiveEvent::GameSession {
                kind: GameSessionKind::Disconnected,
                payload: Value::Object(payload),
            }
        }
        "game_status_updated" => LiveEvent::GameSession {
            kind: GameSessionKind::StatusUpdated,
            payload: data,
        },
        "active_games_update" => match data {
            Value::Array(games) => LiveEvent::ActiveGames(games),
            _ => LiveEvent::ActiveGames(Vec::new()),
        },
        "shop:updated" => LiveEvent::ShopUpdated(data),
        "shopOwner:updated" => LiveEvent::ShopOwnerUpdated(data),
        other => {
            debug!(event = other, "ignoring live event");
            return None;
        }
    };
    Some(event)
}

/// Anything that can ask the feed for a fresh dashboard snapshot.
pub trait SnapshotRequester {
    /// Returns `false` without sending anything while disconnected.
    fn request_snapshot(&self) -> bool;

    fn is_connected(&self) -> bool;
}

#[derive(Debug)]
enum Command {
    RequestSnapshot,
    Close,
}

/// Owner handle of the live connection. Dropping it stops the task.
pub struct LiveChannel {
    events: broadcast::Sender<LiveEvent>,
    state: watch::Receiver<ConnectionState>,
    commands: mpsc::Sender<Command>,
    task: Option<JoinHandle<()>>,
}

impl LiveChannel {
    /// Starts connecting in the background. The returned receiver is
    /// subscribed before the task starts, so it sees every event.
    pub fn connect(
        config: LiveConfig,
        session: &Session,
    ) -> Result<(Self, broadcast::Receiver<LiveEvent>), LiveError> {
        let token = session.token().ok_or(LiveError::MissingToken)?.to_string();
        let base = Url::parse(&config.base_url)
            .map_err(|err| LiveError::InvalidUrl(format!("{}: {err}", config.base_url)))?;

        let (events, first) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let driver = Driver {
            config,
            base,
            token,
            http: reqwest::Client::new(),
            events: events.clone(),
            state: state_tx,
            commands: command_rx,
        };
        let task = tokio::spawn(driver.run());

        Ok((
            Self {
                events,
                state,
                commands,
                task: Some(task),
            },
            first,
        ))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Disconnects and waits for the background task to finish.
    pub async fn close(mut self) {
        let _ = self.commands.send(Command::Close).await;
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "live task ended abnormally");
        }
    }
}

impl SnapshotRequester for LiveChannel {
    fn request_snapshot(&self) -> bool {
        if !self.is_connected() {
            debug!("dashboard update requested while disconnected");
            return false;
        }
        self.commands.try_send(Command::RequestSnapshot).is_ok()
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Exit {
    /// Transport dropped; worth reconnecting.
    Lost,
    /// The server refused or ended the session.
    Rejected,
    /// The owner closed the channel.
    Closed,
}

struct Driver {
    config: LiveConfig,
    base: Url,
    token: String,
    http: reqwest::Client,
    events: broadcast::Sender<LiveEvent>,
    state: watch::Sender<ConnectionState>,
    commands: mpsc::Receiver<Command>,
}

impl Driver {
    async fn run(mut self) {
        let mut failures = 0u32;
        loop {
            self.state.send_replace(ConnectionState::Connecting);
            let exit = match self.open().await {
                Ok(conn) => {
                    info!(transport = ?conn.kind(), "live transport open");
                    let (exit, connected) = self.drive(conn).await;
                    if connected {
                        failures = 0;
                        self.publish(LiveEvent::Disconnected);
                    }
                    exit
                }
                Err(err) => {
                    warn!(error = %err, "live connection failed");
                    self.publish(LiveEvent::ConnectError(CONNECT_ERROR_MESSAGE.to_string()));
                    Exit::Lost
                }
            };
            self.state.send_replace(ConnectionState::Disconnected);
            if exit != Exit::Lost {
                info!(?exit, "live channel stopped");
                return;
            }

            failures += 1;
            if failures > self.config.reconnect_attempts {
                warn!(attempts = self.config.reconnect_attempts, "giving up on live channel");
                return;
            }
            let delay = self.config.backoff(failures);
            debug!(?delay, attempt = failures, "live reconnect scheduled");
            if !self.wait(delay).await {
                return;
            }
        }
    }

    /// Sleeps through the backoff. Returns `false` if the owner closed us.
    async fn wait(&mut self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(Command::RequestSnapshot) => {
                        debug!("dropping dashboard request while reconnecting");
                    }
                    Some(Command::Close) | None => return false,
                },
            }
        }
    }

    async fn open(&self) -> Result<Connection, LiveError> {
        let ws_url = transport::endpoint(&self.base, TransportKind::WebSocket, &self.token)?;
        match transport::open_websocket(&ws_url).await {
            Ok(conn) => Ok(conn),
            Err(err) => {
                debug!(error = %err, "websocket unavailable, falling back to polling");
                let url = transport::endpoint(&self.base, TransportKind::Polling, &self.token)?;
                transport::open_polling(self.http.clone(), url).await
            }
        }
    }

    fn publish(&self, event: LiveEvent) {
        // No subscribers is fine; the flag still lives in the watch channel.
        let _ = self.events.send(event);
    }

    async fn drive(&mut self, mut conn: Connection) -> (Exit, bool) {
        let mut connected = false;
        let mut heartbeat: Option<Duration> = None;
        let mut deadline = Instant::now() + HANDSHAKE_TIMEOUT;

        let exit = loop {
            tokio::select! {
                raw = conn.recv() => {
                    let Some(raw) = raw else { break Exit::Lost };
                    if let Some(window) = heartbeat {
                        deadline = Instant::now() + window;
                    }
                    let packet = match packet::decode(&raw) {
                        Ok(packet) => packet,
                        Err(err) => {
                            warn!(error = %err, packet = %raw, "undecodable live packet");
                            continue;
                        }
                    };
                    match self.handle(&mut conn, packet, &mut connected, &mut heartbeat).await {
                        Ok(None) => {}
                        Ok(Some(exit)) => break exit,
                        Err(err) => {
                            warn!(error = %err, "live send failed");
                            break Exit::Lost;
                        }
                    }
                    if let Some(window) = heartbeat {
                        deadline = Instant::now() + window;
                    }
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::RequestSnapshot) => {
                        if connected
                            && let Err(err) = conn.send(packet::encode_event(REQUEST_DASHBOARD_UPDATE, None)).await
                        {
                            warn!(error = %err, "dashboard request failed");
                            break Exit::Lost;
                        }
                    }
                    Some(Command::Close) | None => {
                        if connected {
                            let _ = conn.send("41".to_string()).await;
                        }
                        conn.close().await;
                        return (Exit::Closed, connected);
                    }
                },
                _ = sleep_until(deadline) => {
                    warn!("live heartbeat timed out");
                    break Exit::Lost;
                }
            }
        };
        (exit, connected)
    }

    async fn handle(
        &self,
        conn: &mut Connection,
        packet: EnginePacket,
        connected: &mut bool,
        heartbeat: &mut Option<Duration>,
    ) -> Result<Option<Exit>, LiveError> {
        match packet {
            EnginePacket::Open(handshake) => {
                debug!(sid = %handshake.sid, "engine handshake");
                *heartbeat = Some(Duration::from_millis(
                    handshake.ping_interval + handshake.ping_timeout,
                ));
                conn.send(packet::NAMESPACE_CONNECT.to_string()).await?;
            }
            EnginePacket::Ping(data) => {
                conn.send(format!("{}{data}", packet::PONG)).await?;
            }
            EnginePacket::Close => return Ok(Some(Exit::Lost)),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
            EnginePacket::Message(SocketPacket::Connect(_)) => {
                *connected = true;
                self.state.send_replace(ConnectionState::Connected);
                info!("live channel connected");
                self.publish(LiveEvent::Connected);
            }
            EnginePacket::Message(SocketPacket::Disconnect) => {
                info!("live channel disconnected by server");
                return Ok(Some(Exit::Rejected));
            }
            EnginePacket::Message(SocketPacket::ConnectError(reason)) => {
                warn!(%reason, "live channel refused");
                self.publish(LiveEvent::ConnectError(CONNECT_ERROR_MESSAGE.to_string()));
                return Ok(Some(Exit::Rejected));
            }
            EnginePacket::Message(SocketPacket::Event { name, data }) => {
                debug!(event = %name, "live event");
                if let Some(event) = decode_event(&name, data) {
                    if *connected && event.invalidates_dashboard() {
                        conn.send(packet::encode_event(REQUEST_DASHBOARD_UPDATE, None))
                            .await?;
                    }
                    self.publish(event);
                }
            }
            EnginePacket::Message(SocketPacket::Unsupported(kind)) => {
                debug!(%kind, "ignoring socket packet");
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = LiveConfig::default();
        let delays: Vec<_> = (1..=5).map(|n| config.backoff(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);
    }

    #[test]
    fn dashboard_update_success_and_failure() {
        let ok = json!({
            "success": true,
            "data": {
                "stats": {
                    "totalShopOwners": {"value": 3},
                    "activeShopOwners": {"value": 2},
                    "totalShops": {"value": 5},
                    "activeShops": {"value": 4},
                    "totalCashiers": {"value": 9},
                    "activeCashiers": {"value": 7}
                },
                "recentShopOwners": [],
                "recentShops": [],
                "recentCashiers": []
            }
        });
        let Some(LiveEvent::DashboardUpdate(snapshot)) = decode_event("dashboard_update", ok) else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.stats.active_cashiers.value, 7);

        let failed = decode_event("dashboard_update", json!({"success": false}));
        assert_eq!(
            failed,
            Some(LiveEvent::DashboardError(DASHBOARD_ERROR_MESSAGE.to_string()))
        );
    }

    #[test]
    fn session_disconnect_marks_not_connected() {
        let event = decode_event("game_session_disconnected", json!({"sessionId": "s1"}));
        let Some(LiveEvent::GameSession { kind, payload }) = event else {
            panic!("expected game session event");
        };
        assert_eq!(kind, GameSessionKind::Disconnected);
        assert_eq!(payload["isConnected"], json!(false));
        assert_eq!(payload["sessionId"], json!("s1"));
    }

    #[test]
    fn cashier_update_without_id_is_ignored() {
        assert_eq!(decode_event("cashier_connection_update", json!({"isConnected": true})), None);
        assert_eq!(
            decode_event(
                "cashier_connection_update",
                json!({"cashierId": "c1", "isConnected": true})
            ),
            Some(LiveEvent::CashierConnection {
                cashier_id: "c1".to_string(),
                is_connected: true
            })
        );
    }

    #[test]
    fn unknown_events_are_dropped() {
        assert_eq!(decode_event("something_else", Value::Null), None);
    }

    #[test]
    fn missing_token_never_connects() {
        let err = LiveChannel::connect(LiveConfig::default(), &Session::default())
            .err()
            .unwrap();
        assert!(matches!(err, LiveError::MissingToken));
        assert_eq!(err.to_string(), "No authentication token found");
    }
}
