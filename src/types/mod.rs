pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{NetError, Result};
pub use message::{OutboundQueueEntry, SocketMessage};
