use crate::config::ClientConfig;
use crate::handler::{DisconnectReason, EventHandlers};
use crate::protocol::ClientMessage;
use crate::reconnect::{Backoff, ReconnectState};
use crate::router;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle state of the client's single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Closing = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Commands sent from the public handle to the background connection task
enum Command {
    Connect,
    Disconnect { reason: String },
    Subscribe { activity_id: String },
    Unsubscribe { activity_id: String },
    Send { message: Value },
    /// Fired by a backoff timer; honored only if `epoch` still matches
    Reconnect { epoch: u64 },
}

/// Resilient subscription client for the activity update stream.
///
/// Owns one long-lived WebSocket connection, multiplexes per-activity
/// subscriptions over it, reconnects with capped exponential backoff after
/// abnormal closure, and replays the subscription set on every successful
/// connection. All mutable state lives in a background task; the handle's
/// methods enqueue commands and return immediately. Failures never surface
/// as errors from these methods — they are reported through the
/// [`EventHandlers`] table supplied at construction.
pub struct ActivityStreamClient {
    cmd_tx: mpsc::Sender<Command>,
    state: Arc<AtomicU8>,
    _task: JoinHandle<()>,
}

impl ActivityStreamClient {
    /// Construct the client and spawn its connection task.
    ///
    /// Does not open the transport; call [`connect`](Self::connect) for
    /// that. Must be called within a Tokio runtime.
    pub fn new(config: ClientConfig, handlers: EventHandlers) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected as u8));

        let task = ConnectionTask {
            endpoint: config.endpoint,
            handlers,
            state: state.clone(),
            cmd_rx,
            cmd_tx: cmd_tx.downgrade(),
            subscriptions: BTreeSet::new(),
            reconnect: ReconnectState::new(config.reconnect),
            epoch: 0,
            disconnect_requested: false,
        };
        let handle = tokio::spawn(task.run());

        Self {
            cmd_tx,
            state,
            _task: handle,
        }
    }

    /// Open the connection. No-op while already connecting or connected.
    pub async fn connect(&self) {
        self.send_command(Command::Connect).await;
    }

    /// Close the connection with the normal-closure code and the given
    /// reason, clear all subscriptions, and suppress any pending
    /// reconnection. A later `connect()` starts a fresh cycle.
    pub async fn disconnect(&self, reason: impl Into<String>) {
        self.send_command(Command::Disconnect {
            reason: reason.into(),
        })
        .await;
    }

    /// Request live updates for an activity. Sent immediately when
    /// connected; otherwise remembered and replayed on the next successful
    /// connection. Each call while connected sends a fresh subscribe frame
    /// even if the activity is already subscribed.
    pub async fn subscribe_to_activity(&self, activity_id: impl Into<String>) {
        self.send_command(Command::Subscribe {
            activity_id: activity_id.into(),
        })
        .await;
    }

    /// Stop live updates for an activity. Takes effect locally even while
    /// disconnected, so the activity is not replayed after a reconnect.
    pub async fn unsubscribe_from_activity(&self, activity_id: impl Into<String>) {
        self.send_command(Command::Unsubscribe {
            activity_id: activity_id.into(),
        })
        .await;
    }

    /// Send a custom message. Dropped with a logged warning unless the
    /// client is currently connected; never queued.
    pub async fn send(&self, message: Value) {
        self.send_command(Command::Send { message }).await;
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    async fn send_command(&self, command: Command) {
        if self.cmd_tx.send(command).await.is_err() {
            warn!("Connection task is gone; command dropped");
        }
    }
}

// ── Background connection task ──────────────────────────────────────────────

struct ConnectionTask {
    endpoint: String,
    handlers: EventHandlers,
    state: Arc<AtomicU8>,
    cmd_rx: mpsc::Receiver<Command>,
    /// Handed to backoff timers so they can fire `Command::Reconnect`.
    /// Weak so the task's own channel end never keeps it alive after every
    /// client handle is gone.
    cmd_tx: mpsc::WeakSender<Command>,
    /// Activities the caller currently wants live updates for; replayed in
    /// iteration order after every successful connection
    subscriptions: BTreeSet<String>,
    reconnect: ReconnectState,
    /// Bumped on every explicit connect/disconnect; a backoff timer fired
    /// for an older epoch is ignored
    epoch: u64,
    disconnect_requested: bool,
}

impl ConnectionTask {
    async fn run(mut self) {
        let mut ws: Option<WsStream> = None;

        loop {
            if let Some(ref mut stream) = ws {
                tokio::select! {
                    cmd = self.cmd_rx.recv() => {
                        match cmd {
                            Some(Command::Connect) => {
                                debug!("connect() while already connected; ignoring");
                            }
                            Some(Command::Disconnect { reason }) => {
                                self.disconnect_requested = true;
                                self.epoch += 1;
                                self.set_state(ConnectionState::Closing);
                                info!(reason = %reason, "Disconnecting");
                                let frame = CloseFrame {
                                    code: CloseCode::Normal,
                                    reason: reason.clone().into(),
                                };
                                if let Err(e) = stream.close(Some(frame)).await {
                                    debug!(error = %e, "Close handshake failed");
                                }
                                self.subscriptions.clear();
                                self.set_state(ConnectionState::Disconnected);
                                self.handlers.emit_disconnected(&DisconnectReason::with_code(
                                    reason,
                                    u16::from(CloseCode::Normal),
                                ));
                                ws = None;
                            }
                            Some(Command::Subscribe { activity_id }) => {
                                self.subscriptions.insert(activity_id.clone());
                                // At-least-once per call: duplicate subscribes still
                                // send a fresh frame; the server treats them
                                // idempotently
                                info!(activity_id = %activity_id, "Subscribing to activity");
                                let msg = ClientMessage::subscribe(activity_id.clone());
                                if let Err(e) = send_frame(stream, &msg).await {
                                    warn!(activity_id = %activity_id, error = %e, "Failed to send subscribe frame");
                                }
                            }
                            Some(Command::Unsubscribe { activity_id }) => {
                                self.subscriptions.remove(&activity_id);
                                info!(activity_id = %activity_id, "Unsubscribing from activity");
                                let msg = ClientMessage::unsubscribe(activity_id.clone());
                                if let Err(e) = send_frame(stream, &msg).await {
                                    warn!(activity_id = %activity_id, error = %e, "Failed to send unsubscribe frame");
                                }
                            }
                            Some(Command::Send { message }) => {
                                match serde_json::to_string(&message) {
                                    Ok(json) => {
                                        if let Err(e) = stream.send(Message::Text(json.into())).await {
                                            warn!(error = %e, "Failed to send message");
                                        }
                                    }
                                    Err(e) => warn!(error = %e, "Failed to serialize message"),
                                }
                            }
                            Some(Command::Reconnect { .. }) => {
                                // A stray timer from before a manual reconnect
                                debug!("Stale reconnect timer while connected; ignoring");
                            }
                            None => {
                                // All handles dropped; close and exit
                                let _ = stream.close(None).await;
                                self.set_state(ConnectionState::Disconnected);
                                return;
                            }
                        }
                    }

                    frame = stream.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                router::dispatch(&text, &self.handlers);
                            }
                            Some(Ok(Message::Ping(data))) => {
                                if let Err(e) = stream.send(Message::Pong(data)).await {
                                    warn!(error = %e, "Failed to send pong");
                                }
                            }
                            Some(Ok(Message::Close(close))) => {
                                let reason = match close {
                                    Some(f) => DisconnectReason::with_code(
                                        f.reason.as_str().to_string(),
                                        u16::from(f.code),
                                    ),
                                    None => DisconnectReason::new("connection closed"),
                                };
                                // Only the caller-initiated normal closure
                                // suppresses reconnection
                                let abnormal = reason.code != Some(u16::from(CloseCode::Normal));
                                info!(code = ?reason.code, reason = %reason.reason, "Connection closed by server");
                                self.set_state(ConnectionState::Disconnected);
                                self.handlers.emit_disconnected(&reason);
                                if abnormal {
                                    self.schedule_reconnect();
                                }
                                ws = None;
                            }
                            Some(Ok(_)) => {
                                // Ignore binary and pong frames
                            }
                            Some(Err(e)) => {
                                let msg = format!("transport error: {e}");
                                warn!(error = %e, "WebSocket error");
                                self.handlers.emit_error(&msg);
                                // The stream is unusable after a read error
                                self.set_state(ConnectionState::Disconnected);
                                self.handlers.emit_disconnected(&DisconnectReason::new(msg));
                                self.schedule_reconnect();
                                ws = None;
                            }
                            None => {
                                info!("Connection stream ended");
                                self.set_state(ConnectionState::Disconnected);
                                self.handlers
                                    .emit_disconnected(&DisconnectReason::new("stream ended"));
                                self.schedule_reconnect();
                                ws = None;
                            }
                        }
                    }
                }
            } else {
                match self.cmd_rx.recv().await {
                    Some(Command::Connect) => {
                        self.disconnect_requested = false;
                        self.epoch += 1;
                        ws = self.attempt_connect().await;
                    }
                    Some(Command::Reconnect { epoch }) => {
                        if epoch != self.epoch || self.disconnect_requested {
                            debug!(
                                timer_epoch = epoch,
                                current_epoch = self.epoch,
                                "Ignoring stale reconnect timer"
                            );
                        } else {
                            info!(attempt = self.reconnect.attempts(), "Reconnecting");
                            ws = self.attempt_connect().await;
                        }
                    }
                    Some(Command::Disconnect { .. }) => {
                        // No transport to close; still authoritative for any
                        // pending timer and the subscription set
                        self.disconnect_requested = true;
                        self.epoch += 1;
                        self.subscriptions.clear();
                    }
                    Some(Command::Subscribe { activity_id }) => {
                        info!(activity_id = %activity_id, "Subscription recorded; will replay on connect");
                        self.subscriptions.insert(activity_id);
                    }
                    Some(Command::Unsubscribe { activity_id }) => {
                        self.subscriptions.remove(&activity_id);
                    }
                    Some(Command::Send { .. }) => {
                        warn!("Dropping message; not connected");
                    }
                    None => return,
                }
            }
        }
    }

    /// Open the transport. On success: reset the backoff counter, replay
    /// the subscription set, then notify `on_connected` — in that order.
    /// On failure: notify `on_disconnected` and schedule a reconnection.
    async fn attempt_connect(&mut self) -> Option<WsStream> {
        self.set_state(ConnectionState::Connecting);
        info!(endpoint = %self.endpoint, "Connecting");

        match connect_async(self.endpoint.as_str()).await {
            Ok((mut stream, _response)) => {
                self.set_state(ConnectionState::Connected);
                self.reconnect.reset();
                info!("Connected");
                self.replay_subscriptions(&mut stream).await;
                self.handlers.emit_connected();
                Some(stream)
            }
            Err(e) => {
                warn!(error = %e, "Connection failed");
                self.set_state(ConnectionState::Disconnected);
                self.handlers
                    .emit_disconnected(&DisconnectReason::new(format!("connection failed: {e}")));
                self.schedule_reconnect();
                None
            }
        }
    }

    /// Send one subscribe frame per desired activity, in set order
    async fn replay_subscriptions(&self, stream: &mut WsStream) {
        if self.subscriptions.is_empty() {
            return;
        }
        info!(
            count = self.subscriptions.len(),
            "Replaying active subscriptions"
        );
        for activity_id in &self.subscriptions {
            let msg = ClientMessage::subscribe(activity_id.clone());
            if let Err(e) = send_frame(stream, &msg).await {
                warn!(activity_id = %activity_id, error = %e, "Failed to replay subscription");
            }
        }
    }

    /// Arm a backoff timer for the next reconnection attempt, or report
    /// exhaustion. The timer captures the current epoch; firing after an
    /// explicit connect/disconnect is a no-op.
    fn schedule_reconnect(&mut self) {
        if self.disconnect_requested {
            return;
        }
        match self.reconnect.next_attempt() {
            Backoff::Schedule { attempt, delay } => {
                info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling reconnection"
                );
                let Some(cmd_tx) = self.cmd_tx.upgrade() else {
                    return;
                };
                let epoch = self.epoch;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = cmd_tx.send(Command::Reconnect { epoch }).await;
                });
            }
            Backoff::Exhausted => {
                error!("Reconnect attempts exhausted");
                self.handlers
                    .emit_error("reconnect attempts exhausted; call connect() to retry");
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

async fn send_frame(stream: &mut WsStream, msg: &ClientMessage) -> Result<()> {
    let json = serde_json::to_string(msg).context("Failed to serialize frame")?;
    stream
        .send(Message::Text(json.into()))
        .await
        .context("Failed to send frame")?;
    Ok(())
}
