use super::{ClientState, ConnectionState, RealtimeClientBuilder, RealtimeClientOptions};
use crate::config::EndpointTable;
use crate::infrastructure::{Timer, http_to_ws_endpoint};
use crate::messaging::{
    ChatMessage, EventKind, EventRegistry, ListenerId, RealtimeEvent, TypingNotice,
};
use crate::types::{LISTEN_CHANNEL_CAPACITY, NetError, Result, SocketMessage, event_names};
use crate::websocket::{AuthPayload, SocketConnector, SocketLink};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use url::Url;

/// Persistent realtime channel to the chat backend.
///
/// `RealtimeClient` walks the endpoint table to open one Socket.IO
/// connection, reconnects with exponential backoff when it drops, queues
/// outbound events while it is down and dispatches inbound events to
/// registered callbacks. Clones share the same connection.
///
/// # Example
///
/// ```no_run
/// use chatlink::{EndpointTable, EventKind, RealtimeClient, RealtimeClientOptions};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let endpoints = Arc::new(EndpointTable::new(["http://10.0.2.2:8000"])?);
/// let client = RealtimeClient::new(endpoints, RealtimeClientOptions::default())?;
///
/// client.on(EventKind::ChatMessage, |event| println!("{:?}", event));
/// client.connect("user-1", Some("token".to_string())).await?;
/// client.send_chat_message("hello", None).await?;
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) endpoints: Arc<EndpointTable>,
    pub(crate) options: RealtimeClientOptions,
    pub(crate) connector: Arc<dyn SocketConnector>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,

    pub(crate) registry: Arc<EventRegistry>,

    // Serializes connection attempts
    pub(crate) connect_lock: Arc<Mutex<()>>,
}

impl RealtimeClient {
    /// Creates a client over the WebSocket transport. Does not connect.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Config`] if the options are invalid.
    pub fn new(endpoints: Arc<EndpointTable>, options: RealtimeClientOptions) -> Result<Self> {
        RealtimeClientBuilder::new(endpoints).options(options).build()
    }

    pub fn builder(endpoints: Arc<EndpointTable>) -> RealtimeClientBuilder {
        RealtimeClientBuilder::new(endpoints)
    }

    /// Opens the realtime connection, trying each endpoint in table order.
    ///
    /// On success the queued outbound events are flushed in order, a
    /// `user_online` presence event is sent and `connect` listeners run.
    /// Returns immediately if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ConnectFailed`] with one entry per endpoint if
    /// every handshake fails or times out. No `error` event is dispatched
    /// for this case.
    pub async fn connect(
        &self,
        identity: impl Into<String>,
        credential: Option<String>,
    ) -> Result<()> {
        let _guard = self.connect_lock.lock().await;

        let auth = AuthPayload {
            user_id: identity.into(),
            token: credential,
        };
        {
            let mut state = self.state.write().await;
            if state.connection.state() == ConnectionState::Connected {
                return Ok(());
            }
            state.was_manual_disconnect = false;
            state.auth = Some(auth.clone());
            state.set_state(ConnectionState::Connecting);
        }

        let result = match self.establish(&auth).await {
            Ok((link, url)) => self.install(link, url).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!("Realtime connect failed: {}", e);
            self.state
                .write()
                .await
                .set_state(ConnectionState::Disconnected);
        }
        result
    }

    /// One handshake per endpoint, in table order, each bounded by the
    /// handshake timeout.
    async fn establish(&self, auth: &AuthPayload) -> Result<(SocketLink, Url)> {
        let mut errors = Vec::new();

        for endpoint in self.endpoints.iter() {
            let url = match http_to_ws_endpoint(&endpoint.url) {
                Ok(url) => url,
                Err(e) => {
                    errors.push(format!("{}: {}", endpoint, e));
                    continue;
                }
            };

            tracing::info!("Connecting realtime channel to {}", url);
            match tokio::time::timeout(
                self.options.handshake_timeout,
                self.connector.connect(&url, auth),
            )
            .await
            {
                Ok(Ok(link)) => return Ok((link, url)),
                Ok(Err(e)) => {
                    tracing::warn!("Handshake with {} failed: {}", endpoint, e);
                    errors.push(format!("{}: {}", endpoint, e));
                }
                Err(_) => {
                    let e = NetError::Timeout(self.options.handshake_timeout);
                    tracing::warn!("Handshake with {} failed: {}", endpoint, e);
                    errors.push(format!("{}: {}", endpoint, e));
                }
            }
        }

        Err(NetError::ConnectFailed(errors))
    }

    /// Makes `link` the live connection.
    ///
    /// The flush, the presence event and the switch to `Connected` happen
    /// under one write lock, so no `emit` can overtake queued events.
    async fn install(&self, link: SocketLink, url: Url) -> Result<()> {
        let SocketLink { outbound, inbound } = link;
        {
            let mut state = self.state.write().await;
            if state.was_manual_disconnect {
                tracing::info!("Disconnected during handshake, dropping new link");
                return Err(NetError::NotConnected);
            }

            let generation = state.connection.attach(outbound, url.clone());
            let flushed = state.flush_queue();
            if flushed > 0 {
                tracing::info!("Flushed {} queued events", flushed);
            }

            if let Some(auth) = &state.auth {
                let online = SocketMessage::new(
                    event_names::USER_ONLINE,
                    serde_json::json!({ "user_id": auth.user_id }),
                );
                if state.connection.send(online).is_err() {
                    tracing::warn!("Link closed before presence could be announced");
                }
            }

            state.reconnect_attempts = 0;
            state.set_state(ConnectionState::Connected);

            let client = self.clone();
            state
                .task_manager
                .spawn(client.run_link(inbound, generation));
        }

        tracing::info!("Realtime channel connected to {}", url);
        self.registry.dispatch(&RealtimeEvent::Connect);
        Ok(())
    }

    /// Reads inbound events until the link closes, then handles the drop.
    fn run_link(
        self,
        mut inbound: mpsc::UnboundedReceiver<SocketMessage>,
        generation: u64,
    ) -> BoxFuture<'static, ()> {
        async move {
            tracing::debug!("Starting read task for link {}", generation);
            while let Some(message) = inbound.recv().await {
                match RealtimeEvent::from_wire(&message.event, message.payload) {
                    Ok(event) => {
                        let panicked = self.registry.dispatch(&event);
                        if panicked > 0 {
                            tracing::warn!(
                                "{} '{}' listeners panicked",
                                panicked,
                                message.event
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Dropping malformed '{}' event: {}", message.event, e);
                    }
                }
            }
            tracing::debug!("Read task for link {} finished", generation);
            self.handle_drop(generation).await;
        }
        .boxed()
    }

    async fn handle_drop(&self, generation: u64) {
        {
            let mut state = self.state.write().await;
            if !state.connection.is_current(generation) {
                return;
            }
            state.connection.detach();
            state.set_state(ConnectionState::Disconnected);
            if state.was_manual_disconnect {
                return;
            }
        }

        tracing::warn!("Realtime connection dropped");
        self.registry.dispatch(&RealtimeEvent::Disconnect {
            reason: "transport closed".to_string(),
        });
        self.reconnect().await;
    }

    /// Retries the endpoint walk with exponential backoff until connected,
    /// disconnected manually, or out of attempts.
    async fn reconnect(&self) {
        let mut timer = Timer::new(
            self.options.reconnect_base_delay,
            self.options.reconnect_max_delay,
            self.options.max_reconnect_attempts,
        );
        {
            let mut state = self.state.write().await;
            if state.connection.state() == ConnectionState::Disconnected {
                state.set_state(ConnectionState::Connecting);
            }
        }

        while timer.schedule_timeout().await {
            let _guard = self.connect_lock.lock().await;
            let auth = {
                let mut state = self.state.write().await;
                if state.was_manual_disconnect {
                    tracing::info!("Manual disconnect detected, will not attempt to reconnect");
                    return;
                }
                if state.connection.state() == ConnectionState::Connected {
                    tracing::info!("Already connected, stopping reconnection attempts");
                    return;
                }
                state.reconnect_attempts = timer.attempts();
                match state.auth.clone() {
                    Some(auth) => auth,
                    None => return,
                }
            };

            tracing::info!(
                "Reconnect attempt {}/{}",
                timer.attempts(),
                self.options.max_reconnect_attempts
            );
            match self.establish(&auth).await {
                Ok((link, url)) => {
                    if let Err(e) = self.install(link, url).await {
                        tracing::info!("Reconnect abandoned: {}", e);
                    }
                    return;
                }
                Err(e) => tracing::error!("Reconnection attempt failed: {}", e),
            }
        }

        let error = {
            let mut state = self.state.write().await;
            if state.was_manual_disconnect || state.connection.state() == ConnectionState::Connected
            {
                return;
            }
            state.set_state(ConnectionState::Disconnected);
            NetError::ReconnectExhausted {
                attempts: timer.attempts(),
            }
        };
        tracing::error!("{}", error);
        self.registry.dispatch(&RealtimeEvent::Error {
            message: error.to_string(),
        });
    }

    /// Sends an event, or queues it until the next successful connect.
    ///
    /// Never fails and never blocks on the network. While not connected the
    /// event goes to the bounded outbound queue; the oldest entry is dropped
    /// when it is full.
    pub async fn emit(&self, event: impl Into<EventKind>, payload: Value) {
        let message = SocketMessage::new(event.into().as_str(), payload);
        let mut state = self.state.write().await;

        if state.connection.state() == ConnectionState::Connected {
            match state.connection.send(message) {
                Ok(()) => return,
                Err(message) => state.enqueue(message),
            }
        } else {
            state.enqueue(message);
        }
    }

    /// Emits a typed event.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload cannot be encoded.
    pub async fn emit_event(&self, event: &RealtimeEvent) -> Result<()> {
        let SocketMessage { event, payload } = event.to_wire()?;
        self.emit(event, payload).await;
        Ok(())
    }

    /// Sends a chat message as the connected identity and returns it with
    /// its client-generated id.
    pub async fn send_chat_message(
        &self,
        content: impl Into<String>,
        agent_id: Option<&str>,
    ) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Some(uuid::Uuid::new_v4().to_string()),
            user_id: self.identity().await.unwrap_or_default(),
            agent_id: agent_id.map(str::to_string),
            content: content.into(),
            timestamp: None,
        };
        self.emit_event(&RealtimeEvent::ChatMessage(message.clone()))
            .await?;
        Ok(message)
    }

    pub async fn start_typing(&self, agent_id: Option<&str>) -> Result<()> {
        let notice = self.typing_notice(agent_id).await;
        self.emit_event(&RealtimeEvent::UserTyping(notice)).await
    }

    pub async fn stop_typing(&self, agent_id: Option<&str>) -> Result<()> {
        let notice = self.typing_notice(agent_id).await;
        self.emit_event(&RealtimeEvent::UserStopTyping(notice)).await
    }

    async fn typing_notice(&self, agent_id: Option<&str>) -> TypingNotice {
        TypingNotice {
            user_id: self.identity().await.unwrap_or_default(),
            agent_id: agent_id.map(str::to_string),
        }
    }

    /// Identity from the last `connect` call
    pub async fn identity(&self) -> Option<String> {
        self.state
            .read()
            .await
            .auth
            .as_ref()
            .map(|auth| auth.user_id.clone())
    }

    /// Registers a callback for one event kind.
    ///
    /// Callbacks for the same kind run in registration order. A panicking
    /// callback is logged and does not stop the others.
    pub fn on<F>(&self, kind: impl Into<EventKind>, callback: F) -> ListenerId
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.registry.on(kind.into(), callback)
    }

    /// Unregisters a callback. Returns `false` if it was not registered.
    pub fn off(&self, kind: impl Into<EventKind>, id: ListenerId) -> bool {
        self.registry.off(&kind.into(), id)
    }

    /// Streams events of one kind through a channel instead of a callback.
    pub fn listen(&self, kind: impl Into<EventKind>) -> mpsc::Receiver<RealtimeEvent> {
        let (tx, rx) = mpsc::channel(LISTEN_CHANNEL_CAPACITY);
        self.registry.subscribe(kind.into(), tx);
        rx
    }

    /// Tears the connection down and suppresses auto-reconnect.
    ///
    /// Announces `user_offline` if connected, clears the outbound queue and
    /// resets reconnect counters. Call [`connect()`](Self::connect) to
    /// start again.
    pub async fn disconnect(&self) -> Result<()> {
        let previous = {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = true;
            state.task_manager.abort_all();

            let previous = state.connection.state();
            if previous == ConnectionState::Connected
                && let Some(auth) = &state.auth
            {
                let offline = SocketMessage::new(
                    event_names::USER_OFFLINE,
                    serde_json::json!({ "user_id": auth.user_id }),
                );
                let _ = state.connection.send(offline);
            }

            state.connection.detach();
            let dropped = state.queue.len();
            state.queue.clear();
            if dropped > 0 {
                tracing::info!("Discarded {} queued events", dropped);
            }
            state.reconnect_attempts = 0;
            state.set_state(ConnectionState::Disconnected);
            previous
        };

        if previous != ConnectionState::Disconnected {
            tracing::info!("Disconnected from realtime server");
            self.registry.dispatch(&RealtimeEvent::Disconnect {
                reason: "client disconnect".to_string(),
            });
        }
        Ok(())
    }

    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.connection.state()
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Watch channel that sees every connection state transition.
    pub async fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.read().await.state_change_tx.subscribe()
    }

    /// Events waiting for the next connect
    pub async fn queued_len(&self) -> usize {
        self.state.read().await.queue.len()
    }

    /// Reconnect attempts made since the last drop
    pub async fn reconnect_attempts(&self) -> u32 {
        self.state.read().await.reconnect_attempts
    }

    /// WebSocket URL of the live connection
    pub async fn current_endpoint(&self) -> Option<Url> {
        self.state.read().await.connection.endpoint().cloned()
    }

    pub fn options(&self) -> &RealtimeClientOptions {
        &self.options
    }
}
