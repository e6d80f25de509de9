//! Engine.IO v4 framing with Socket.IO packets on the default namespace.
//!
//! Only text frames are handled; the admin feed never sends binary
//! attachments.
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Polling payloads join packets with the record separator.
pub const RECORD_SEPARATOR: char = '\u{1e}';

pub const PONG: &str = "3";
pub const CLOSE: &str = "1";
pub const NAMESPACE_CONNECT: &str = "40";

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,
    #[error("unknown engine packet type {0:?}")]
    UnknownEngineType(char),
    #[error("malformed handshake: {0}")]
    Handshake(String),
    #[error("malformed event: {0}")]
    Event(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(Value),
    /// Acks and binary packets, which the admin feed does not use.
    Unsupported(char),
}

pub fn decode(raw: &str) -> Result<EnginePacket, PacketError> {
    let mut chars = raw.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let body = chars.as_str();
    match kind {
        '0' => serde_json::from_str(body)
            .map(EnginePacket::Open)
            .map_err(|err| PacketError::Handshake(err.to_string())),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => decode_socket(body).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(PacketError::UnknownEngineType(other)),
    }
}

fn decode_socket(raw: &str) -> Result<SocketPacket, PacketError> {
    let mut chars = raw.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let body = skip_namespace(chars.as_str());
    match kind {
        '0' => Ok(SocketPacket::Connect(parse_optional(body))),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => decode_event(body.trim_start_matches(|c: char| c.is_ascii_digit())),
        '4' => Ok(SocketPacket::ConnectError(
            parse_optional(body).unwrap_or(Value::Null),
        )),
        other => Ok(SocketPacket::Unsupported(other)),
    }
}

/// Strips a `/nsp,` prefix.
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    }
}

fn parse_optional(body: &str) -> Option<Value> {
    if body.is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    }
}

fn decode_event(body: &str) -> Result<SocketPacket, PacketError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| PacketError::Event(err.to_string()))?;
    let Value::Array(mut parts) = value else {
        return Err(PacketError::Event("payload is not an array".to_string()));
    };
    if parts.is_empty() {
        return Err(PacketError::Event("missing event name".to_string()));
    }
    let Value::String(name) = parts.remove(0) else {
        return Err(PacketError::Event("event name is not a string".to_string()));
    };
    let data = if parts.is_empty() {
        Value::Null
    } else {
        parts.remove(0)
    };
    Ok(SocketPacket::Event { name, data })
}

/// Encodes an outbound event as a full Engine.IO message packet.
pub fn encode_event(name: &str, data: Option<&Value>) -> String {
    let mut parts = vec![Value::String(name.to_string())];
    if let Some(data) = data {
        parts.push(data.clone());
    }
    format!("42{}", Value::Array(parts))
}

pub fn split_payload(body: &str) -> impl Iterator<Item = &str> {
    body.split(RECORD_SEPARATOR).filter(|packet| !packet.is_empty())
}

pub fn join_payload<S: AsRef<str>>(packets: &[S]) -> String {
    packets
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_open_handshake() {
        let raw = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = decode(raw).unwrap() else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.ping_interval, 25_000);
        assert_eq!(handshake.upgrades, vec!["websocket".to_string()]);
    }

    #[test]
    fn decodes_ping_and_close() {
        assert_eq!(decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(decode("1").unwrap(), EnginePacket::Close);
        assert_eq!(decode("6").unwrap(), EnginePacket::Noop);
    }

    #[test]
    fn decodes_namespace_connect() {
        let packet = decode(r#"40{"sid":"abc"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Connect(Some(json!({"sid": "abc"}))))
        );
        assert_eq!(
            decode("40").unwrap(),
            EnginePacket::Message(SocketPacket::Connect(None))
        );
    }

    #[test]
    fn decodes_event_with_and_without_data() {
        let packet = decode(r#"42["cashier_connection_update",{"cashierId":"c1","isConnected":true}]"#)
            .unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                name: "cashier_connection_update".to_string(),
                data: json!({"cashierId": "c1", "isConnected": true}),
            })
        );

        let bare = decode(r#"42["shop:updated"]"#).unwrap();
        assert_eq!(
            bare,
            EnginePacket::Message(SocketPacket::Event {
                name: "shop:updated".to_string(),
                data: Value::Null,
            })
        );
    }

    #[test]
    fn decodes_event_with_namespace_and_ack_id() {
        let packet = decode(r#"42/admin,17["dashboard_update",{"success":false}]"#).unwrap();
        let EnginePacket::Message(SocketPacket::Event { name, .. }) = packet else {
            panic!("expected event");
        };
        assert_eq!(name, "dashboard_update");
    }

    #[test]
    fn decodes_connect_error() {
        let packet = decode(r#"44{"message":"Authentication error"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::ConnectError(
                json!({"message": "Authentication error"})
            ))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(decode(""), Err(PacketError::Empty));
        assert_eq!(decode("9"), Err(PacketError::UnknownEngineType('9')));
        assert!(matches!(decode("42{}"), Err(PacketError::Event(_))));
    }

    #[test]
    fn encodes_outbound_event() {
        assert_eq!(
            encode_event("request_dashboard_update", None),
            r#"42["request_dashboard_update"]"#
        );
    }

    #[test]
    fn polling_payload_splits_on_record_separator() {
        let body = "2\u{1e}42[\"shop:updated\"]\u{1e}";
        let packets: Vec<_> = split_payload(body).collect();
        assert_eq!(packets, vec!["2", "42[\"shop:updated\"]"]);
        assert_eq!(join_payload(&["3", "40"]), "3\u{1e}40");
    }
}
