/// Socket.IO / Engine.IO protocol strings (magic strings layer)
pub mod socketio {
    pub const PATH: &str = "socket.io";
    pub const ENGINE_VERSION: &str = "4";
    pub const TRANSPORT_WEBSOCKET: &str = "websocket";
}

/// Event names exchanged on the realtime channel
pub mod event_names {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const ERROR: &str = "error";
    pub const CHAT_MESSAGE: &str = "chat_message";
    pub const USER_TYPING: &str = "user_typing";
    pub const USER_STOP_TYPING: &str = "user_stop_typing";
    pub const USER_ONLINE: &str = "user_online";
    pub const USER_OFFLINE: &str = "user_offline";
}

/// Backend REST paths
pub mod paths {
    pub const REGISTER: &str = "/api/auth/register";
    pub const LOGIN: &str = "/api/auth/login";
    pub const MESSAGES: &str = "/api/chat/messages";
    pub const AGENTS: &str = "/api/agents";
    pub const PROFILE: &str = "/api/users/me";
    pub const HEALTH: &str = "/health";
}

/// Default backend port used by the built-in endpoint tables
pub const DEFAULT_PORT: u16 = 8000;

/// Default reconnect base delay (milliseconds)
pub const RECONNECT_BASE_DELAY: u64 = 1000;

/// Reconnect delay ceiling (milliseconds)
pub const RECONNECT_MAX_DELAY: u64 = 5000;

/// Max outbound queue size while disconnected
pub const MAX_OUTBOUND_QUEUE: usize = 1000;

/// Fallback ping interval when the server does not advertise one (milliseconds)
pub const DEFAULT_PING_INTERVAL: u64 = 25000;

/// Grace period past the ping interval before a silent link is dropped (milliseconds)
pub const DEFAULT_PING_TIMEOUT: u64 = 20000;

/// Buffer of each `listen` channel; events beyond it are dropped
pub const LISTEN_CHANNEL_CAPACITY: usize = 100;

/// Token handed out by the offline login/registration substitutes
pub const OFFLINE_TOKEN: &str = "offline-demo-token";
