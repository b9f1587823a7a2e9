// Messaging module - typed realtime events and their dispatch registry
pub mod event;
pub mod registry;

pub use event::{ChatMessage, EventKind, PresenceNotice, RealtimeEvent, TypingNotice};
pub use registry::{EventRegistry, ListenerId};
