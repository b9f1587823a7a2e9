// Infrastructure module - transports, backoff and background task plumbing
pub mod heartbeat;
pub mod http;
pub mod task_manager;
pub mod timer;

pub use heartbeat::HeartbeatMonitor;
pub use http::{ReqwestTransport, http_to_ws_endpoint};
pub use task_manager::TaskManager;
pub use timer::Timer;
