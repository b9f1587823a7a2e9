use crate::types::SocketMessage;
use tokio::sync::mpsc;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// The live link, if any, plus the authoritative connection state.
///
/// Every installed link gets a new generation number, so a reader task
/// that outlived its link can tell it is stale.
pub struct ConnectionManager {
    state: ConnectionState,
    writer: Option<mpsc::UnboundedSender<SocketMessage>>,
    endpoint: Option<Url>,
    generation: u64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            writer: None,
            endpoint: None,
            generation: 0,
        }
    }

    /// Gets the current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Installs a new link writer and returns its generation
    pub fn attach(&mut self, writer: mpsc::UnboundedSender<SocketMessage>, endpoint: Url) -> u64 {
        self.generation += 1;
        self.writer = Some(writer);
        self.endpoint = Some(endpoint);
        self.generation
    }

    /// Drops the writer, which closes the link
    pub fn detach(&mut self) {
        self.writer = None;
        self.endpoint = None;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.writer.is_some() && self.generation == generation
    }

    /// Endpoint of the live link
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Sends through the live link. Hands the message back if there is no
    /// link or it already closed.
    pub fn send(&self, message: SocketMessage) -> std::result::Result<(), SocketMessage> {
        match &self.writer {
            Some(writer) => writer.send(message).map_err(|e| e.0),
            None => Err(message),
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
