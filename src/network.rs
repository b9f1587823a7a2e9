use crate::client::{RealtimeClient, RealtimeClientOptions};
use crate::config::{EndpointTable, NetworkConfig, PlatformProfile};
use crate::diagnostics::DiagnosticProbe;
use crate::http::{ChatApi, HttpTransport, RequestRouter, TimeoutFetch};
use crate::infrastructure::ReqwestTransport;
use crate::types::Result;
use crate::websocket::{SocketConnector, WebSocketFactory};
use std::sync::Arc;

/// Everything the app talks to the backend through, built from one config.
///
/// The HTTP router, the realtime client and the diagnostic probe share one
/// endpoint table and one fetch primitive. Construct one per app (or per
/// test) and hand clones to consumers; clones share state.
#[derive(Clone)]
pub struct ChatNetwork {
    profile: PlatformProfile,
    endpoints: Arc<EndpointTable>,
    api: ChatApi,
    realtime: RealtimeClient,
    probe: DiagnosticProbe,
}

impl ChatNetwork {
    /// Production stack: reqwest for HTTP, tungstenite for the realtime channel.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Config`](crate::NetError::Config) for an empty or
    /// malformed endpoint list.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_transports(
            config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(WebSocketFactory),
        )
    }

    pub fn with_transports(
        config: NetworkConfig,
        http: Arc<dyn HttpTransport>,
        socket: Arc<dyn SocketConnector>,
    ) -> Result<Self> {
        let profile = config.profile();
        let endpoints = Arc::new(config.endpoint_table()?);
        tracing::info!(
            "Network layer for {} ({} endpoints, primary {})",
            profile.platform,
            endpoints.len(),
            endpoints.primary()
        );

        let fetch = TimeoutFetch::new(http, profile.clone());
        let router = RequestRouter::new(fetch, Arc::clone(&endpoints));
        let probe = DiagnosticProbe::from_router(&router);
        let realtime = RealtimeClient::builder(Arc::clone(&endpoints))
            .options(RealtimeClientOptions::from_profile(&profile))
            .connector(socket)
            .build()?;

        Ok(Self {
            profile,
            endpoints,
            api: ChatApi::new(router),
            realtime,
            probe,
        })
    }

    pub fn api(&self) -> &ChatApi {
        &self.api
    }

    pub fn router(&self) -> &RequestRouter {
        self.api.router()
    }

    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }

    pub fn diagnostics(&self) -> &DiagnosticProbe {
        &self.probe
    }

    pub fn endpoints(&self) -> &Arc<EndpointTable> {
        &self.endpoints
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;

    #[test]
    fn test_components_share_one_endpoint_table() {
        let network =
            ChatNetwork::new(NetworkConfig::for_platform(Platform::Android, true)).unwrap();

        assert!(Arc::ptr_eq(network.endpoints(), network.router().endpoints()));
        assert_eq!(
            network.realtime().options().handshake_timeout,
            network.profile().handshake_timeout
        );
        assert_eq!(network.realtime().options().max_reconnect_attempts, 5);
    }

    #[test]
    fn test_empty_endpoint_list_is_rejected() {
        let mut config = NetworkConfig::for_platform(Platform::Web, false);
        config.base_urls.clear();
        assert!(ChatNetwork::new(config).is_err());
    }
}
