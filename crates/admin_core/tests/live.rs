use std::time::Duration;

use admin_core::{
    ConnectionState, LiveChannel, LiveConfig, LiveEvent, Session, live::SnapshotRequester,
};
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// Socket.IO server double: it completes the handshake, then relays
/// frames between the socket and the test.
struct FakeServer {
    url: String,
    received: mpsc::Receiver<String>,
    outgoing: mpsc::Sender<String>,
}

async fn spawn_server(accept_namespace: bool) -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (received_tx, received) = mpsc::channel(32);
    let (outgoing, mut outgoing_rx) = mpsc::channel::<String>(32);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#
                .to_string(),
        ))
        .await
        .unwrap();

        loop {
            tokio::select! {
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if text == "40" {
                            let reply = if accept_namespace {
                                r#"40{"sid":"ns1"}"#
                            } else {
                                r#"44{"message":"Authentication error"}"#
                            };
                            ws.send(Message::Text(reply.to_string())).await.unwrap();
                        }
                        if received_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                },
                out = outgoing_rx.recv() => match out {
                    Some(text) => ws.send(Message::Text(text)).await.unwrap(),
                    None => break,
                },
            }
        }
    });

    FakeServer {
        url,
        received,
        outgoing,
    }
}

fn config(url: &str) -> LiveConfig {
    LiveConfig {
        base_url: url.to_string(),
        reconnect_attempts: 0,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(10),
    }
}

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<LiveEvent>) -> LiveEvent {
    timeout(WAIT, rx.recv()).await.unwrap().unwrap()
}

async fn next_frame(server: &mut FakeServer) -> String {
    timeout(WAIT, server.received.recv()).await.unwrap().unwrap()
}

#[test]
fn connecting_without_a_token_fails() {
    let err = LiveChannel::connect(LiveConfig::default(), &Session::default())
        .err()
        .unwrap();
    assert!(matches!(err, admin_core::LiveError::MissingToken));
}

#[tokio::test]
async fn handshake_then_snapshot_request() {
    let mut server = spawn_server(true).await;
    let (channel, mut events) =
        LiveChannel::connect(config(&server.url), &Session::with_token("t")).unwrap();

    assert_eq!(next_frame(&mut server).await, "40");
    assert_eq!(next_event(&mut events).await, LiveEvent::Connected);
    assert_eq!(channel.state(), ConnectionState::Connected);

    assert!(channel.request_snapshot());
    assert_eq!(
        next_frame(&mut server).await,
        r#"42["request_dashboard_update"]"#
    );

    channel.close().await;
}

#[tokio::test]
async fn shop_change_requests_a_fresh_snapshot() {
    let mut server = spawn_server(true).await;
    let (channel, mut events) =
        LiveChannel::connect(config(&server.url), &Session::with_token("t")).unwrap();
    next_frame(&mut server).await;
    next_event(&mut events).await;

    server
        .outgoing
        .send(r#"42["shop:updated",{"_id":"s1"}]"#.to_string())
        .await
        .unwrap();
    assert_eq!(
        next_frame(&mut server).await,
        r#"42["request_dashboard_update"]"#
    );
    assert!(matches!(
        next_event(&mut events).await,
        LiveEvent::ShopUpdated(_)
    ));

    server
        .outgoing
        .send(r#"42["cashier_connection_update",{"cashierId":"c1","isConnected":true}]"#.to_string())
        .await
        .unwrap();
    assert_eq!(
        next_event(&mut events).await,
        LiveEvent::CashierConnection {
            cashier_id: "c1".to_string(),
            is_connected: true,
        }
    );

    channel.close().await;
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let mut server = spawn_server(true).await;
    let (channel, mut events) =
        LiveChannel::connect(config(&server.url), &Session::with_token("t")).unwrap();
    next_frame(&mut server).await;
    next_event(&mut events).await;

    server.outgoing.send("2".to_string()).await.unwrap();
    assert_eq!(next_frame(&mut server).await, "3");

    channel.close().await;
}

#[tokio::test]
async fn refused_namespace_reports_connect_error() {
    let mut server = spawn_server(false).await;
    let (channel, mut events) =
        LiveChannel::connect(config(&server.url), &Session::with_token("t")).unwrap();
    next_frame(&mut server).await;

    assert_eq!(
        next_event(&mut events).await,
        LiveEvent::ConnectError(admin_core::live::CONNECT_ERROR_MESSAGE.to_string())
    );
    assert!(!channel.request_snapshot());
}
