//! The listening socket and per-connection receive/reply loops.

use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{info, warn};

use coil_env::Mailbox;

use crate::config::{ConfigError, ServerConfig};
use crate::protocol::{decode_inbound, encode_reply, Inbound};

// ── ServerError ──────────────────────────────────────────────────

/// Errors surfaced by [`BridgeServer::bind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// The listening socket could not be bound.
    Bind {
        /// The address that failed to bind.
        addr: String,
        /// OS description of the failure.
        reason: String,
    },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid config: {e}"),
            Self::Bind { addr, reason } => write!(f, "failed to bind {addr}: {reason}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Bind { .. } => None,
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── BridgeServer ─────────────────────────────────────────────────

/// Keepalive settings handed to each connection task.
#[derive(Clone, Copy, Debug)]
struct Keepalive {
    interval: Duration,
    timeout: Duration,
}

/// The WebSocket transport server.
///
/// Owns the listening socket and a shared [`Mailbox`] handle. Each
/// accepted connection gets its own tokio task running
/// request/reply until the peer disconnects or the keepalive declares
/// it dead. Multiple simultaneous connections are allowed; their
/// snapshots interleave into the mailbox FIFO and the latest action is
/// last-write-wins.
pub struct BridgeServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    mailbox: Arc<Mailbox>,
    keepalive: Keepalive,
}

impl BridgeServer {
    /// Validate the config and bind the listening socket.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] on invalid configuration,
    /// [`ServerError::Bind`] when the socket cannot be bound.
    pub async fn bind(config: ServerConfig, mailbox: Arc<Mailbox>) -> Result<Self, ServerError> {
        config.validate()?;
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| ServerError::Bind {
            addr,
            reason: e.to_string(),
        })?;
        info!(%local_addr, "bridge server listening");
        Ok(Self {
            listener,
            local_addr,
            mailbox,
            keepalive: Keepalive {
                interval: config.ping_interval,
                timeout: config.ping_timeout,
            },
        })
    }

    /// The actually bound address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections forever, spawning one task per connection.
    ///
    /// Runs until the owning task is dropped or cancelled. Individual
    /// accept or handshake failures are logged and do not stop the
    /// server.
    pub async fn run(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let mailbox = Arc::clone(&self.mailbox);
            let keepalive = self.keepalive;
            tokio::spawn(async move {
                match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => connection_loop(ws, peer, mailbox, keepalive).await,
                    Err(e) => warn!(%peer, error = %e, "websocket handshake failed"),
                }
            });
        }
    }
}

// ── Connection loop ──────────────────────────────────────────────

/// Sleep until the keepalive deadline, or forever if none is pending.
async fn pong_overdue(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn connection_loop(
    mut ws: WebSocketStream<TcpStream>,
    peer: SocketAddr,
    mailbox: Arc<Mailbox>,
    keepalive: Keepalive,
) {
    info!(%peer, "client connected");
    let mut ping_timer = tokio::time::interval_at(
        Instant::now() + keepalive.interval,
        keepalive.interval,
    );
    // Set when a ping is in flight; cleared by the matching pong.
    let mut pong_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            message = ws.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_frame(text.as_bytes(), &mailbox) {
                            if let Err(e) = ws.send(Message::Text(reply)).await {
                                warn!(%peer, error = %e, "reply send failed");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        if let Some(reply) = handle_frame(&data, &mailbox) {
                            if let Err(e) = ws.send(Message::Text(reply)).await {
                                warn!(%peer, error = %e, "reply send failed");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if ws.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        pong_deadline = None;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        // Transport-level failure: the connection itself
                        // is unusable, unlike a malformed frame.
                        warn!(%peer, error = %e, "connection error");
                        break;
                    }
                }
            }
            _ = ping_timer.tick() => {
                if ws.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
                if pong_deadline.is_none() {
                    pong_deadline = Some(Instant::now() + keepalive.timeout);
                }
            }
            _ = pong_overdue(pong_deadline) => {
                info!(%peer, "keepalive timeout");
                let _ = ws.close(None).await;
                break;
            }
        }
    }
    info!(%peer, "client disconnected");
}

/// Decode one frame and produce the reply for it, if any.
///
/// An update is submitted to the mailbox and answered with the latest
/// action; other envelope types and malformed frames produce no reply.
fn handle_frame(raw: &[u8], mailbox: &Mailbox) -> Option<String> {
    match decode_inbound(raw) {
        Ok(Inbound::Update(snapshot)) => {
            mailbox.submit(snapshot);
            Some(encode_reply(&mailbox.latest_action()))
        }
        Ok(Inbound::Ignored) => None,
        Err(e) => {
            warn!(error = %e, "dropped inbound frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coil_core::Action;

    #[test]
    fn handle_frame_update_submits_and_replies() {
        let mailbox = Mailbox::new();
        mailbox.set_action(Action::new(0.25, -1.0, 1.0));

        let reply = handle_frame(
            br#"{"type": "update", "payload": {"slither": {"x": 0.0, "y": 0.0}}}"#,
            &mailbox,
        )
        .expect("update must be answered");

        assert_eq!(mailbox.queued(), 1);
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["payload"]["xt"], 0.25);
        assert_eq!(value["payload"]["acceleration"], 1);
    }

    #[test]
    fn handle_frame_ignored_and_malformed_produce_no_reply() {
        let mailbox = Mailbox::new();
        assert!(handle_frame(br#"{"type": "chat", "payload": {}}"#, &mailbox).is_none());
        assert!(handle_frame(b"garbage", &mailbox).is_none());
        assert_eq!(mailbox.queued(), 0);
    }

    #[test]
    fn handle_frame_neutral_reply_before_any_action() {
        let mailbox = Mailbox::new();
        let reply = handle_frame(br#"{"type": "update", "payload": {}}"#, &mailbox).unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["payload"]["xt"], 0.0);
        assert_eq!(value["payload"]["yt"], 0.0);
        assert_eq!(value["payload"]["acceleration"], 0);
    }
}
