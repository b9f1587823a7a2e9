use crate::types::{NetError, Result, SocketMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine.IO open handshake (`0{...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// One Engine.IO v4 text frame, with the Socket.IO packet it carries
/// flattened into the same enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenHandshake),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connect; carries the auth payload client side, the session
    /// id server side
    Connect(Option<Value>),
    Disconnect,
    Event(SocketMessage),
    ConnectError(Value),
}

pub fn encode(packet: &Packet) -> Result<String> {
    let frame = match packet {
        Packet::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
        Packet::Close => "1".to_string(),
        Packet::Ping => "2".to_string(),
        Packet::Pong => "3".to_string(),
        Packet::Noop => "6".to_string(),
        Packet::Connect(None) => "40".to_string(),
        Packet::Connect(Some(data)) => format!("40{}", serde_json::to_string(data)?),
        Packet::Disconnect => "41".to_string(),
        Packet::Event(message) => format!(
            "42{}",
            serde_json::to_string(&serde_json::json!([message.event, message.payload]))?
        ),
        Packet::ConnectError(data) => format!("44{}", serde_json::to_string(data)?),
    };
    Ok(frame)
}

pub fn decode(frame: &str) -> Result<Packet> {
    let mut chars = frame.chars();
    let engine_type = chars
        .next()
        .ok_or_else(|| NetError::Protocol("empty frame".to_string()))?;
    let rest = chars.as_str();

    match engine_type {
        '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket_packet(rest),
        '6' => Ok(Packet::Noop),
        other => Err(NetError::Protocol(format!(
            "unknown engine packet type '{}'",
            other
        ))),
    }
}

fn decode_socket_packet(body: &str) -> Result<Packet> {
    let mut chars = body.chars();
    let packet_type = chars
        .next()
        .ok_or_else(|| NetError::Protocol("empty socket packet".to_string()))?;
    let data = strip_ack_id(strip_namespace(chars.as_str()));
    let json = || -> Result<Option<Value>> {
        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_str(data)?))
        }
    };

    match packet_type {
        '0' => Ok(Packet::Connect(json()?)),
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let Some(Value::Array(mut args)) = json()? else {
                return Err(NetError::Protocol(format!("event without arguments: {}", body)));
            };
            if args.is_empty() {
                return Err(NetError::Protocol("event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(NetError::Protocol(format!(
                        "event name is not a string: {}",
                        other
                    )));
                }
            };
            let payload = if args.is_empty() {
                Value::Null
            } else {
                args.remove(0)
            };
            Ok(Packet::Event(SocketMessage::new(name, payload)))
        }
        // Acks are not requested by this client
        '3' => Ok(Packet::Noop),
        '4' => Ok(Packet::ConnectError(json()?.unwrap_or(Value::Null))),
        other => Err(NetError::Protocol(format!(
            "unsupported socket packet type '{}'",
            other
        ))),
    }
}

/// Drops a `/namespace,` prefix
fn strip_namespace(data: &str) -> &str {
    if data.starts_with('/') {
        match data.find(',') {
            Some(idx) => &data[idx + 1..],
            None => "",
        }
    } else {
        data
    }
}

/// Drops a numeric ack id before the JSON body
fn strip_ack_id(data: &str) -> &str {
    data.trim_start_matches(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        let packet =
            decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#)
                .unwrap();
        assert_eq!(
            packet,
            Packet::Open(OpenHandshake {
                sid: "abc".to_string(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn test_decode_event_takes_first_argument() {
        let packet = decode(r#"42["chat_message",{"content":"hi"},"extra"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event(SocketMessage::new("chat_message", json!({"content": "hi"})))
        );
    }

    #[test]
    fn test_decode_event_without_payload() {
        let packet = decode(r#"42["user_offline"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event(SocketMessage::new("user_offline", Value::Null))
        );
    }

    #[test]
    fn test_decode_tolerates_namespace_and_ack_id() {
        let packet = decode(r#"42/chat,17["user_typing",{"user_id":"u1"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event(SocketMessage::new("user_typing", json!({"user_id": "u1"})))
        );
    }

    #[test]
    fn test_decode_connect_and_connect_error() {
        assert_eq!(
            decode(r#"40{"sid":"s1"}"#).unwrap(),
            Packet::Connect(Some(json!({"sid": "s1"})))
        );
        assert_eq!(decode("40").unwrap(), Packet::Connect(None));
        assert_eq!(
            decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError(json!({"message": "Not authorized"}))
        );
    }

    #[test]
    fn test_decode_control_frames() {
        assert_eq!(decode("2").unwrap(), Packet::Ping);
        assert_eq!(decode("3").unwrap(), Packet::Pong);
        assert_eq!(decode("1").unwrap(), Packet::Close);
        assert_eq!(decode("41").unwrap(), Packet::Disconnect);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode(""), Err(NetError::Protocol(_))));
        assert!(matches!(decode("9"), Err(NetError::Protocol(_))));
        assert!(matches!(decode("42{}"), Err(NetError::Protocol(_))));
        assert!(matches!(decode("42[1]"), Err(NetError::Protocol(_))));
        assert!(decode("0not-json").is_err());
    }

    #[test]
    fn test_encode_event_and_connect() {
        let event = Packet::Event(SocketMessage::new("chat_message", json!({"content": "hi"})));
        assert_eq!(
            encode(&event).unwrap(),
            r#"42["chat_message",{"content":"hi"}]"#
        );
        assert_eq!(
            encode(&Packet::Connect(Some(json!({"user_id": "u1"})))).unwrap(),
            r#"40{"user_id":"u1"}"#
        );
        assert_eq!(encode(&Packet::Pong).unwrap(), "3");
    }
}
