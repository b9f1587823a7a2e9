use super::{ClientState, RealtimeClient};
use crate::config::{EndpointTable, PlatformProfile};
use crate::messaging::EventRegistry;
use crate::types::{
    MAX_OUTBOUND_QUEUE, NetError, RECONNECT_BASE_DELAY, RECONNECT_MAX_DELAY, Result,
};
use crate::websocket::{SocketConnector, WebSocketFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Deadline for one handshake attempt against one endpoint
    pub handshake_timeout: Duration,
    /// First reconnect delay; doubles per attempt
    pub reconnect_base_delay: Duration,
    /// Reconnect delay ceiling
    pub reconnect_max_delay: Duration,
    /// Reconnect attempts after a drop before giving up
    pub max_reconnect_attempts: u32,
    /// Bound on the outbound queue while disconnected
    pub queue_capacity: usize,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
            reconnect_base_delay: Duration::from_millis(RECONNECT_BASE_DELAY),
            reconnect_max_delay: Duration::from_millis(RECONNECT_MAX_DELAY),
            max_reconnect_attempts: 5,
            queue_capacity: MAX_OUTBOUND_QUEUE,
        }
    }
}

impl RealtimeClientOptions {
    /// Defaults with the platform's handshake timeout and retry budget.
    pub fn from_profile(profile: &PlatformProfile) -> Self {
        Self {
            handshake_timeout: profile.handshake_timeout,
            max_reconnect_attempts: profile.max_retries,
            ..Default::default()
        }
    }
}

/// Builder for RealtimeClient
pub struct RealtimeClientBuilder {
    endpoints: Arc<EndpointTable>,
    options: RealtimeClientOptions,
    connector: Option<Arc<dyn SocketConnector>>,
}

impl RealtimeClientBuilder {
    pub fn new(endpoints: Arc<EndpointTable>) -> Self {
        Self {
            endpoints,
            options: RealtimeClientOptions::default(),
            connector: None,
        }
    }

    pub fn options(mut self, options: RealtimeClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the websocket transport (tests, custom stacks).
    pub fn connector(mut self, connector: Arc<dyn SocketConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Build the client. Does not connect.
    pub fn build(self) -> Result<RealtimeClient> {
        if self.options.queue_capacity == 0 {
            return Err(NetError::Config(
                "outbound queue capacity must be at least 1".to_string(),
            ));
        }
        if self.options.handshake_timeout.is_zero() {
            return Err(NetError::Config(
                "handshake timeout must be non-zero".to_string(),
            ));
        }

        Ok(RealtimeClient {
            endpoints: self.endpoints,
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(WebSocketFactory)),
            state: Arc::new(RwLock::new(ClientState::new(self.options.queue_capacity))),
            registry: Arc::new(EventRegistry::new()),
            connect_lock: Arc::new(Mutex::new(())),
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;

    fn table() -> Arc<EndpointTable> {
        Arc::new(EndpointTable::new(["http://localhost:8000"]).unwrap())
    }

    #[test]
    fn test_options_follow_platform_profile() {
        let profile = PlatformProfile::new(Platform::Android, true);
        let options = RealtimeClientOptions::from_profile(&profile);
        assert_eq!(options.handshake_timeout, profile.handshake_timeout);
        assert_eq!(options.max_reconnect_attempts, profile.max_retries);
        assert_eq!(options.queue_capacity, MAX_OUTBOUND_QUEUE);
    }

    #[test]
    fn test_zero_queue_capacity_is_rejected() {
        let result = RealtimeClientBuilder::new(table())
            .options(RealtimeClientOptions {
                queue_capacity: 0,
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(NetError::Config(_))));
    }

    #[test]
    fn test_build_does_not_connect() {
        let client = RealtimeClientBuilder::new(table()).build().unwrap();
        assert_eq!(client.endpoints.len(), 1);
    }
}
