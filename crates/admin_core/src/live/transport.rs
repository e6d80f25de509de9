//! Raw Engine.IO transports.
//!
//! Both transports hand inbound packets to the driver through an mpsc
//! receiver fed by a reader task; the receiver closing means the transport
//! is gone.
use std::time::Duration;

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use reqwest::Url;
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, warn};

use super::{
    LiveError,
    packet::{self, EnginePacket},
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

const INBOUND_BUFFER: usize = 64;
/// Long-poll requests are held open by the server for up to a ping interval.
const POLL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    WebSocket,
    Polling,
}

impl TransportKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Polling => "polling",
        }
    }
}

/// `/socket.io/` on the api host with the admin query attached.
pub fn endpoint(base: &Url, kind: TransportKind, token: &str) -> Result<Url, LiveError> {
    let mut url = base
        .join("/socket.io/")
        .map_err(|err| LiveError::InvalidUrl(format!("{base}: {err}")))?;
    url.query_pairs_mut()
        .append_pair("EIO", "4")
        .append_pair("transport", kind.as_str())
        .append_pair("type", "admin")
        .append_pair("token", token);
    if kind == TransportKind::WebSocket {
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| LiveError::InvalidUrl(format!("cannot use {scheme} for {base}")))?;
    }
    Ok(url)
}

enum Writer {
    WebSocket(WsSink),
    Polling { http: reqwest::Client, url: Url },
}

pub struct Connection {
    kind: TransportKind,
    inbound: mpsc::Receiver<String>,
    writer: Writer,
    reader: JoinHandle<()>,
}

impl Connection {
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    pub async fn send(&mut self, raw: String) -> Result<(), LiveError> {
        debug!(transport = self.kind.as_str(), packet = %raw, "live send");
        match &mut self.writer {
            Writer::WebSocket(sink) => sink.send(Message::Text(raw)).await?,
            Writer::Polling { http, url } => {
                http.post(url.clone())
                    .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
                    .body(raw)
                    .send()
                    .await?
                    .error_for_status()?;
            }
        }
        Ok(())
    }

    pub async fn close(mut self) {
        let closed = if let Writer::WebSocket(sink) = &mut self.writer {
            sink.close().await.map_err(LiveError::from)
        } else {
            self.send(packet::CLOSE.to_string()).await
        };
        if let Err(err) = closed {
            debug!(error = %err, "live transport close failed");
        }
        self.reader.abort();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

pub async fn open_websocket(url: &Url) -> Result<Connection, LiveError> {
    let (stream, _) = connect_async(url.as_str()).await?;
    let (sink, mut stream) = stream.split();
    let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);

    let reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if tx.send(text).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "websocket closed by server");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "websocket read failed");
                    break;
                }
            }
        }
    });

    Ok(Connection {
        kind: TransportKind::WebSocket,
        inbound,
        writer: Writer::WebSocket(sink),
        reader,
    })
}

pub async fn open_polling(http: reqwest::Client, url: Url) -> Result<Connection, LiveError> {
    let body = http
        .get(url.clone())
        .timeout(POLL_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let packets: Vec<String> = packet::split_payload(&body).map(str::to_string).collect();
    let sid = match packets.first().map(|raw| packet::decode(raw)) {
        Some(Ok(EnginePacket::Open(handshake))) => handshake.sid,
        Some(Ok(other)) => return Err(LiveError::Handshake(format!("{other:?}"))),
        Some(Err(err)) => return Err(err.into()),
        None => return Err(LiveError::Handshake("empty polling handshake".to_string())),
    };

    let mut session_url = url;
    session_url.query_pairs_mut().append_pair("sid", &sid);

    let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);
    // The handshake is replayed so the driver sees the same stream as on a websocket.
    for raw in packets {
        tx.try_send(raw).map_err(|_| LiveError::Closed)?;
    }

    let reader = tokio::spawn(poll_loop(http.clone(), session_url.clone(), tx));
    Ok(Connection {
        kind: TransportKind::Polling,
        inbound,
        writer: Writer::Polling {
            http,
            url: session_url,
        },
        reader,
    })
}

async fn poll_loop(http: reqwest::Client, url: Url, tx: mpsc::Sender<String>) {
    loop {
        let res = http
            .get(url.clone())
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        let body = match res {
            Ok(res) => match res.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(error = %err, "polling read failed");
                    return;
                }
            },
            Err(err) => {
                warn!(error = %err, "polling request failed");
                return;
            }
        };
        for raw in packet::split_payload(&body) {
            if tx.send(raw.to_string()).await.is_err() || raw == packet::CLOSE {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_endpoint_switches_scheme() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let url = endpoint(&base, TransportKind::WebSocket, "tok en").unwrap();
        assert_eq!(
            url.as_str(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket&type=admin&token=tok+en"
        );
    }

    #[test]
    fn polling_endpoint_keeps_https() {
        let base = Url::parse("https://api.example.com/").unwrap();
        let url = endpoint(&base, TransportKind::Polling, "t").unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.as_str().contains("transport=polling"));
    }
}
