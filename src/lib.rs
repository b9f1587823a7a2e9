//! # chatlink
//!
//! Resilient network access layer for a chat client: request/response calls
//! that fall back across an ordered endpoint table, and a Socket.IO realtime
//! channel with reconnect, an outbound queue and typed event dispatch.
//!
//! ## Example
//!
//! ```no_run
//! use chatlink::{ChatNetwork, EventKind, LoginRequest, NetworkConfig, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let network = ChatNetwork::new(NetworkConfig::for_platform(Platform::Android, true))?;
//!
//!     let login = network
//!         .api()
//!         .login(&LoginRequest {
//!             username: "alice".to_string(),
//!             password: "secret".to_string(),
//!         })
//!         .await?;
//!     println!("logged in (offline: {})", login.offline);
//!
//!     let realtime = network.realtime();
//!     realtime.on(EventKind::ChatMessage, |event| println!("{:?}", event));
//!     realtime.connect("alice", None).await?;
//!     realtime.send_chat_message("hello", None).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod http;
pub mod infrastructure;
pub mod messaging;
pub mod network;
pub mod types;
pub mod websocket;

pub use client::{ConnectionState, RealtimeClient, RealtimeClientBuilder, RealtimeClientOptions};
pub use config::{Endpoint, EndpointTable, NetworkConfig, Platform, PlatformProfile};
pub use diagnostics::{DiagnosticProbe, DiagnosticReport, ProbeResult};
pub use http::{
    ApiResponse, ChatApi, HttpTransport, LoginRequest, RegisterRequest, RequestOptions,
    RequestOutcome, RequestRouter, TimeoutFetch,
};
pub use messaging::{ChatMessage, EventKind, ListenerId, RealtimeEvent};
pub use network::ChatNetwork;
pub use types::{NetError, Result};
pub use websocket::{AuthPayload, SocketConnector, WebSocketFactory};
