// Realtime transport: Socket.IO framing over a websocket
pub mod codec;
pub mod factory;

pub use codec::{OpenHandshake, Packet};
pub use factory::{AuthPayload, LinkPeer, SocketConnector, SocketLink, WebSocketFactory};
