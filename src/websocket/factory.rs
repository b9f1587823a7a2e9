use super::codec::{self, Packet};
use crate::infrastructure::HeartbeatMonitor;
use crate::types::{NetError, Result, SocketMessage};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Auth payload sent with the namespace connect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthPayload {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Client side of an established realtime connection.
///
/// Messages pushed into `outbound` go to the server in order; `inbound`
/// yields server events and closes when the connection drops. Dropping
/// `outbound` closes the connection.
pub struct SocketLink {
    pub outbound: mpsc::UnboundedSender<SocketMessage>,
    pub inbound: mpsc::UnboundedReceiver<SocketMessage>,
}

/// Transport side of a [`SocketLink`].
pub struct LinkPeer {
    pub outbound: mpsc::UnboundedReceiver<SocketMessage>,
    pub inbound: mpsc::UnboundedSender<SocketMessage>,
}

impl SocketLink {
    /// A connected link/peer pair.
    pub fn channel() -> (SocketLink, LinkPeer) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        (
            SocketLink {
                outbound: out_tx,
                inbound: in_rx,
            },
            LinkPeer {
                outbound: out_rx,
                inbound: in_tx,
            },
        )
    }
}

/// Opens a realtime connection to one endpoint.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self, url: &Url, auth: &AuthPayload) -> Result<SocketLink>;
}

/// Socket.IO v4 over tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WebSocketFactory;

#[async_trait]
impl SocketConnector for WebSocketFactory {
    async fn connect(&self, url: &Url, auth: &AuthPayload) -> Result<SocketLink> {
        tracing::debug!("Creating WebSocket connection to: {}", url);
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let handshake = match next_packet(&mut read).await? {
            Packet::Open(handshake) => handshake,
            other => {
                return Err(NetError::Protocol(format!(
                    "expected open handshake, got {:?}",
                    other
                )));
            }
        };
        tracing::debug!(
            "Engine.IO session {} (ping interval {}ms, timeout {}ms)",
            handshake.sid,
            handshake.ping_interval,
            handshake.ping_timeout
        );

        let connect = codec::encode(&Packet::Connect(Some(serde_json::to_value(auth)?)))?;
        write.send(Message::Text(connect.into())).await?;

        loop {
            match next_packet(&mut read).await? {
                Packet::Connect(_) => break,
                Packet::ConnectError(data) => {
                    let reason = data
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| data.to_string());
                    return Err(NetError::Network(format!(
                        "server rejected connection: {}",
                        reason
                    )));
                }
                Packet::Ping => {
                    let pong = codec::encode(&Packet::Pong)?;
                    write.send(Message::Text(pong.into())).await?;
                }
                other => tracing::debug!("Ignoring {:?} during handshake", other),
            }
        }

        let monitor = if handshake.ping_interval > 0 {
            HeartbeatMonitor::new(
                Duration::from_millis(handshake.ping_interval),
                Duration::from_millis(handshake.ping_timeout),
            )
        } else {
            HeartbeatMonitor::default()
        };

        let (link, peer) = SocketLink::channel();
        tokio::spawn(pump(write, read, peer, monitor));
        Ok(link)
    }
}

/// Reads text frames until one decodes into a packet.
async fn next_packet(read: &mut SplitStream<WsStream>) -> Result<Packet> {
    while let Some(frame) = read.next().await {
        match frame? {
            Message::Text(text) => return codec::decode(text.as_str()),
            Message::Close(_) => break,
            _ => continue,
        }
    }
    Err(NetError::Network(
        "connection closed during handshake".to_string(),
    ))
}

/// Moves frames between the websocket and the link until either side goes away.
async fn pump(
    mut write: SplitSink<WsStream, Message>,
    mut read: SplitStream<WsStream>,
    mut peer: LinkPeer,
    mut monitor: HeartbeatMonitor,
) {
    tracing::info!("Starting read task");
    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    monitor.touch();
                    match codec::decode(text.as_str()) {
                        Ok(Packet::Ping) => {
                            if let Ok(pong) = codec::encode(&Packet::Pong)
                                && write.send(Message::Text(pong.into())).await.is_err()
                            {
                                break;
                            }
                        }
                        Ok(Packet::Event(message)) => {
                            tracing::debug!("Received event: {}", message.event);
                            if peer.inbound.send(message).is_err() {
                                break;
                            }
                        }
                        Ok(Packet::Disconnect) | Ok(Packet::Close) => {
                            tracing::warn!("Server closed the session");
                            break;
                        }
                        Ok(other) => tracing::debug!("Ignoring {:?}", other),
                        Err(e) => {
                            tracing::warn!("Failed to parse frame: {} - Raw: {}", e, text.as_str())
                        }
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(close_frame) = frame {
                        tracing::warn!(
                            "Server closed connection: code={:?}, reason='{}'",
                            close_frame.code,
                            close_frame.reason
                        );
                    } else {
                        tracing::warn!("Server closed connection without close frame");
                    }
                    break;
                }
                Some(Ok(_)) => monitor.touch(),
                Some(Err(e)) => {
                    tracing::error!("WebSocket read error: {}", e);
                    break;
                }
                None => break,
            },
            outbound = peer.outbound.recv() => match outbound {
                Some(message) => {
                    let frame = match codec::encode(&Packet::Event(message)) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::error!("Failed to encode outbound event: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        tracing::error!("WebSocket write error: {}", e);
                        break;
                    }
                }
                None => {
                    if let Ok(frame) = codec::encode(&Packet::Disconnect) {
                        let _ = write.send(Message::Text(frame.into())).await;
                    }
                    break;
                }
            },
            _ = tokio::time::sleep_until(monitor.deadline()) => {
                tracing::warn!(
                    "No traffic from server within the ping window, dropping connection"
                );
                break;
            }
        }
    }

    let _ = write.close().await;
    tracing::info!("Read task finished");
}
