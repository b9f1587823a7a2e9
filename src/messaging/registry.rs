use super::{EventKind, RealtimeEvent};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

type Callback = Arc<dyn Fn(&RealtimeEvent) + Send + Sync + 'static>;

/// Handle returned by [`EventRegistry::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
enum Listener {
    Callback(Callback),
    /// Forwards into a channel; removed once the receiver is dropped
    Channel(mpsc::Sender<RealtimeEvent>),
}

impl Listener {
    fn is_closed(&self) -> bool {
        matches!(self, Self::Channel(tx) if tx.is_closed())
    }
}

type ListenerMap = HashMap<EventKind, Vec<(ListenerId, Listener)>>;

/// Maps event kinds to listeners, invoked in registration order.
///
/// A panicking callback is caught and logged; the remaining callbacks for
/// the same event still run. Channel listeners whose receiver was dropped
/// are forgotten the next time the registry is touched.
pub struct EventRegistry {
    next_id: AtomicU64,
    listeners: Mutex<ListenerMap>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    fn listeners(&self) -> MutexGuard<'_, ListenerMap> {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|_, entries| {
            entries.retain(|(_, listener)| !listener.is_closed());
            !entries.is_empty()
        });
        listeners
    }

    fn add(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().entry(kind).or_default().push((id, listener));
        id
    }

    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&RealtimeEvent) + Send + Sync + 'static,
    {
        self.add(kind, Listener::Callback(Arc::new(callback)))
    }

    /// Forwards events of `kind` into `sender`.
    ///
    /// Events are dropped with a warning while the channel is full. The
    /// listener goes away by itself once the receiver is dropped.
    pub fn subscribe(&self, kind: EventKind, sender: mpsc::Sender<RealtimeEvent>) -> ListenerId {
        self.add(kind, Listener::Channel(sender))
    }

    /// Removes one listener. Returns `false` if it was not registered.
    pub fn off(&self, kind: &EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let Some(entries) = listeners.get_mut(kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(kind);
        }
        removed
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.listeners().get(kind).map_or(0, Vec::len)
    }

    /// Invokes every listener registered for the event's kind.
    ///
    /// Callbacks run outside the registry lock, so they may register or
    /// unregister listeners. Returns the number of callbacks that panicked.
    pub fn dispatch(&self, event: &RealtimeEvent) -> usize {
        let kind = event.kind();
        let listeners: Vec<Listener> = match self.listeners().get(&kind) {
            Some(entries) => entries.iter().map(|(_, l)| l.clone()).collect(),
            None => return 0,
        };

        let mut panicked = 0;
        for listener in listeners {
            match listener {
                Listener::Callback(callback) => {
                    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
                        panicked += 1;
                        let reason = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        tracing::error!("Listener for '{}' panicked: {}", kind, reason);
                    }
                }
                Listener::Channel(tx) => match tx.try_send(event.clone()) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Listener channel for '{}' is full, dropping event", kind);
                    }
                },
            }
        }
        panicked
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
