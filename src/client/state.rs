use super::connection::{ConnectionManager, ConnectionState};
use crate::infrastructure::TaskManager;
use crate::types::{OutboundQueueEntry, SocketMessage};
use crate::websocket::AuthPayload;
use std::collections::VecDeque;
use tokio::sync::watch;

/// Consolidated mutable state for RealtimeClient.
///
/// Connection state and the outbound queue sit behind one lock, so an `emit`
/// can never slip in between a queue flush and the switch to `Connected`.
pub struct ClientState {
    /// Live link and authoritative connection state
    pub connection: ConnectionManager,

    /// Emits recorded while not connected, oldest first
    pub queue: VecDeque<OutboundQueueEntry>,

    /// Bound on `queue`; the oldest entry is dropped on overflow
    pub queue_capacity: usize,

    /// Credentials from the last `connect` call, reused on reconnect
    pub auth: Option<AuthPayload>,

    /// Whether the disconnect was manual (prevents auto-reconnect)
    pub was_manual_disconnect: bool,

    /// Reconnect attempts made since the last drop
    pub reconnect_attempts: u32,

    /// Background task manager
    pub task_manager: TaskManager,

    /// Sender for state change notifications
    pub state_change_tx: watch::Sender<ConnectionState>,
}

impl ClientState {
    pub fn new(queue_capacity: usize) -> Self {
        let (state_change_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connection: ConnectionManager::new(),
            queue: VecDeque::new(),
            queue_capacity,
            auth: None,
            was_manual_disconnect: false,
            reconnect_attempts: 0,
            task_manager: TaskManager::new(),
            state_change_tx,
        }
    }

    /// Sets the connection state and notifies watchers
    pub fn set_state(&mut self, state: ConnectionState) {
        if self.connection.state() == state {
            return;
        }
        self.connection.set_state(state);
        self.state_change_tx.send_replace(state);
    }

    /// Appends to the outbound queue, dropping the oldest entry when full
    pub fn enqueue(&mut self, message: SocketMessage) {
        if self.queue.len() >= self.queue_capacity
            && let Some(dropped) = self.queue.pop_front()
        {
            tracing::warn!(
                "Outbound queue full ({}), dropping oldest '{}' event",
                self.queue_capacity,
                dropped.message.event
            );
        }
        tracing::debug!("Queued '{}' while disconnected", message.event);
        self.queue.push_back(OutboundQueueEntry::new(message));
    }

    /// Sends every queued message through the live link in FIFO order.
    ///
    /// If the link closes mid-flush the unsent remainder stays queued, still
    /// in order. Returns the number of messages sent.
    pub fn flush_queue(&mut self) -> usize {
        let mut sent = 0;
        while let Some(entry) = self.queue.pop_front() {
            if let Err(message) = self.connection.send(entry.message) {
                self.queue.push_front(OutboundQueueEntry {
                    message,
                    enqueued_at: entry.enqueued_at,
                });
                break;
            }
            sent += 1;
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;
    use url::Url;

    fn message(n: i32) -> SocketMessage {
        SocketMessage::new("chat_message", json!({ "n": n }))
    }

    #[test]
    fn test_enqueue_drops_oldest_when_full() {
        let mut state = ClientState::new(2);
        state.enqueue(message(1));
        state.enqueue(message(2));
        state.enqueue(message(3));

        let kept: Vec<_> = state.queue.iter().map(|e| e.message.payload["n"].clone()).collect();
        assert_eq!(kept, vec![json!(2), json!(3)]);
    }

    #[test]
    fn test_flush_sends_in_order_and_empties_queue() {
        let mut state = ClientState::new(10);
        for n in 1..=3 {
            state.enqueue(message(n));
        }
        let (tx, mut rx) = mpsc::unbounded_channel();
        state
            .connection
            .attach(tx, Url::parse("ws://localhost/socket.io/").unwrap());

        assert_eq!(state.flush_queue(), 3);
        assert!(state.queue.is_empty());
        for n in 1..=3 {
            assert_eq!(rx.try_recv().unwrap().payload["n"], n);
        }
    }

    #[test]
    fn test_flush_without_link_keeps_queue() {
        let mut state = ClientState::new(10);
        state.enqueue(message(1));
        state.enqueue(message(2));

        assert_eq!(state.flush_queue(), 0);
        assert_eq!(state.queue.len(), 2);
        assert_eq!(state.queue[0].message.payload["n"], 1);
    }

    #[test]
    fn test_set_state_notifies_watchers() {
        let mut state = ClientState::new(1);
        let rx = state.state_change_tx.subscribe();
        state.set_state(ConnectionState::Connecting);
        assert_eq!(*rx.borrow(), ConnectionState::Connecting);
    }
}
