use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A named event with its JSON payload, as carried on the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocketMessage {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SocketMessage {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// An `emit` recorded while the channel was not connected.
#[derive(Debug, Clone)]
pub struct OutboundQueueEntry {
    pub message: SocketMessage,
    pub enqueued_at: SystemTime,
}

impl OutboundQueueEntry {
    pub fn new(message: SocketMessage) -> Self {
        Self {
            message,
            enqueued_at: SystemTime::now(),
        }
    }
}
