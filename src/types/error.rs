use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the network access layer.
///
/// Per-attempt connectivity failures are not errors: they are
/// [`RequestOutcome`](crate::http::RequestOutcome) variants consumed by the
/// router's fallback loop. Only caller mistakes, exhausted endpoint lists and
/// realtime handshake failures come back as `Err`.
#[derive(Error, Debug)]
pub enum NetError {
    /// Deadline exceeded, attempt aborted
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, DNS or TLS failure
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint reachable but answered with a non-2xx/3xx status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Every candidate endpoint failed with a connectivity-class error
    #[error("All {attempts} endpoints unreachable: {last_error}")]
    Exhausted { attempts: usize, last_error: String },

    /// Every candidate endpoint failed the realtime handshake
    #[error("Realtime connect failed: {}", .0.join("; "))]
    ConnectFailed(Vec<String>),

    /// Auto-reconnect gave up
    #[error("Reconnect gave up after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,

    /// Malformed Socket.IO / Engine.IO frame or handshake
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid static configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed base URL or path)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP client construction or transport error
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Convenience type alias for `Result<T, NetError>`.
pub type Result<T> = std::result::Result<T, NetError>;
