use crate::types::constants::event_names;
use crate::types::{Result, SocketMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant of a [`RealtimeEvent`], used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Channel connected (local lifecycle event)
    Connect,
    /// Channel dropped or closed (local lifecycle event)
    Disconnect,
    /// Connection error, including reconnect exhaustion
    Error,
    ChatMessage,
    UserTyping,
    UserStopTyping,
    UserOnline,
    UserOffline,
    /// Any other server event
    Custom(String),
}

impl EventKind {
    /// Parse a wire event name into an EventKind
    pub fn parse(s: &str) -> Self {
        match s {
            event_names::CONNECT => Self::Connect,
            event_names::DISCONNECT => Self::Disconnect,
            event_names::ERROR => Self::Error,
            event_names::CHAT_MESSAGE => Self::ChatMessage,
            event_names::USER_TYPING => Self::UserTyping,
            event_names::USER_STOP_TYPING => Self::UserStopTyping,
            event_names::USER_ONLINE => Self::UserOnline,
            event_names::USER_OFFLINE => Self::UserOffline,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Wire event name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => event_names::CONNECT,
            Self::Disconnect => event_names::DISCONNECT,
            Self::Error => event_names::ERROR,
            Self::ChatMessage => event_names::CHAT_MESSAGE,
            Self::UserTyping => event_names::USER_TYPING,
            Self::UserStopTyping => event_names::USER_STOP_TYPING,
            Self::UserOnline => event_names::USER_ONLINE,
            Self::UserOffline => event_names::USER_OFFLINE,
            Self::Custom(s) => s,
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingNotice {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceNotice {
    pub user_id: String,
}

/// Every event the realtime channel dispatches, with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Connect,
    Disconnect { reason: String },
    Error { message: String },
    ChatMessage(ChatMessage),
    UserTyping(TypingNotice),
    UserStopTyping(TypingNotice),
    UserOnline(PresenceNotice),
    UserOffline(PresenceNotice),
    Custom { name: String, payload: Value },
}

impl RealtimeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connect => EventKind::Connect,
            Self::Disconnect { .. } => EventKind::Disconnect,
            Self::Error { .. } => EventKind::Error,
            Self::ChatMessage(_) => EventKind::ChatMessage,
            Self::UserTyping(_) => EventKind::UserTyping,
            Self::UserStopTyping(_) => EventKind::UserStopTyping,
            Self::UserOnline(_) => EventKind::UserOnline,
            Self::UserOffline(_) => EventKind::UserOffline,
            Self::Custom { name, .. } => EventKind::Custom(name.clone()),
        }
    }

    /// Decodes a named wire event into its typed form.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the payload does not match the
    /// shape of a known event.
    pub fn from_wire(name: &str, payload: Value) -> Result<Self> {
        let event = match EventKind::parse(name) {
            EventKind::Connect => Self::Connect,
            EventKind::Disconnect => Self::Disconnect {
                reason: text_of(&payload, "reason"),
            },
            EventKind::Error => Self::Error {
                message: text_of(&payload, "message"),
            },
            EventKind::ChatMessage => Self::ChatMessage(serde_json::from_value(payload)?),
            EventKind::UserTyping => Self::UserTyping(serde_json::from_value(payload)?),
            EventKind::UserStopTyping => Self::UserStopTyping(serde_json::from_value(payload)?),
            EventKind::UserOnline => Self::UserOnline(serde_json::from_value(payload)?),
            EventKind::UserOffline => Self::UserOffline(serde_json::from_value(payload)?),
            EventKind::Custom(name) => Self::Custom { name, payload },
        };
        Ok(event)
    }

    /// Encodes this event as a wire message.
    pub fn to_wire(&self) -> Result<SocketMessage> {
        let payload = match self {
            Self::Connect => Value::Null,
            Self::Disconnect { reason } => serde_json::json!({ "reason": reason }),
            Self::Error { message } => serde_json::json!({ "message": message }),
            Self::ChatMessage(m) => serde_json::to_value(m)?,
            Self::UserTyping(n) | Self::UserStopTyping(n) => serde_json::to_value(n)?,
            Self::UserOnline(n) | Self::UserOffline(n) => serde_json::to_value(n)?,
            Self::Custom { payload, .. } => payload.clone(),
        };
        Ok(SocketMessage::new(self.kind().as_str(), payload))
    }
}

/// A string payload, or `field` of an object payload.
fn text_of(payload: &Value, field: &str) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_kind_parse() {
        assert_eq!(EventKind::parse("chat_message"), EventKind::ChatMessage);
        assert_eq!(EventKind::parse("user_stop_typing"), EventKind::UserStopTyping);
        assert_eq!(
            EventKind::parse("agent_status"),
            EventKind::Custom("agent_status".to_string())
        );
    }

    #[test]
    fn test_known_kinds_keep_their_wire_names() {
        for name in [
            "connect",
            "disconnect",
            "error",
            "chat_message",
            "user_typing",
            "user_stop_typing",
            "user_online",
            "user_offline",
        ] {
            assert_eq!(EventKind::parse(name).as_str(), name);
        }
    }

    #[test]
    fn test_chat_message_from_wire() {
        let event = RealtimeEvent::from_wire(
            "chat_message",
            json!({"id": "m1", "user_id": "u1", "content": "hello", "extra": 1}),
        )
        .unwrap();
        match event {
            RealtimeEvent::ChatMessage(m) => {
                assert_eq!(m.id.as_deref(), Some("m1"));
                assert_eq!(m.content, "hello");
                assert_eq!(m.agent_id, None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(RealtimeEvent::from_wire("user_typing", json!({"who": 1})).is_err());
    }

    #[test]
    fn test_error_payload_accepts_string_or_object() {
        assert_eq!(
            RealtimeEvent::from_wire("error", json!("boom")).unwrap(),
            RealtimeEvent::Error {
                message: "boom".to_string()
            }
        );
        assert_eq!(
            RealtimeEvent::from_wire("error", json!({"message": "bad token"})).unwrap(),
            RealtimeEvent::Error {
                message: "bad token".to_string()
            }
        );
    }

    #[test]
    fn test_to_wire_uses_event_name() {
        let event = RealtimeEvent::UserOnline(PresenceNotice {
            user_id: "u1".to_string(),
        });
        let message = event.to_wire().unwrap();
        assert_eq!(message.event, "user_online");
        assert_eq!(message.payload, json!({"user_id": "u1"}));
    }

    #[test]
    fn test_custom_event_passes_payload_through() {
        let event = RealtimeEvent::from_wire("agent_status", json!({"busy": true})).unwrap();
        assert_eq!(event.kind(), EventKind::Custom("agent_status".to_string()));
        assert_eq!(event.to_wire().unwrap().payload, json!({"busy": true}));
    }
}
