//! Event loop wiring transports to a single `Router`.
//!
//! Every connection runs in its own task, but all game state lives in the one
//! task that owns the router. Connection tasks forward `Event`s over a channel
//! and the router handles each event to completion before taking the next.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::engine::SessionId;
use crate::protocol::{encode, ServerMessage};
use crate::router::{Connection, Router};
use crate::transport::tcp::{TcpTransport, DEFAULT_MAX_FRAME_LEN};
use crate::transport::Transport;

/// Runtime settings for the network server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub max_frame_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Identifies one attached transport. Two transports claiming the same
/// session id never share a token.
pub type ConnToken = u64;

/// Work item for the router task.
#[derive(Debug)]
pub enum Event {
    Connected {
        id: SessionId,
        token: ConnToken,
        conn: ChannelConnection,
    },
    Frame {
        id: SessionId,
        token: ConnToken,
        frame: String,
    },
    Closed {
        id: SessionId,
        token: ConnToken,
    },
}

/// Instruction for a connection task's writer side.
#[derive(Debug)]
pub enum Outgoing {
    Message(ServerMessage),
    Close,
}

/// Router-side send primitive backed by the connection task's outbox.
#[derive(Debug)]
pub struct ChannelConnection {
    outbox: UnboundedSender<Outgoing>,
}

impl ChannelConnection {
    pub fn new(outbox: UnboundedSender<Outgoing>) -> Self {
        Self { outbox }
    }
}

impl Connection for ChannelConnection {
    fn send(&mut self, msg: ServerMessage) -> anyhow::Result<()> {
        self.outbox
            .send(Outgoing::Message(msg))
            .map_err(|_| anyhow::anyhow!("Connection task has exited"))
    }

    fn close(&mut self) {
        let _ = self.outbox.send(Outgoing::Close);
    }
}

/// Issue a fresh random session id.
pub fn issue_session_id() -> SessionId {
    let raw: u128 = rand::random();
    SessionId::new(format!("{:032x}", raw))
}

/// Cloneable entry point used to hand new transports to the server.
#[derive(Clone)]
pub struct ServerHandle {
    events: UnboundedSender<Event>,
    next_token: Arc<AtomicU64>,
}

impl ServerHandle {
    /// Register `transport` under a freshly issued id and start serving it.
    pub fn attach<T: Transport + 'static>(&self, transport: T) -> anyhow::Result<SessionId> {
        let id = issue_session_id();
        self.attach_as(id.clone(), transport)?;
        Ok(id)
    }

    /// Register `transport` under a caller-issued id.
    pub fn attach_as<T: Transport + 'static>(
        &self,
        id: SessionId,
        transport: T,
    ) -> anyhow::Result<()> {
        let (outbox, rx) = unbounded_channel();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        // Sent before the task exists so `Connected` precedes every `Frame`.
        self.events
            .send(Event::Connected {
                id: id.clone(),
                token,
                conn: ChannelConnection::new(outbox),
            })
            .map_err(|_| anyhow::anyhow!("Server has shut down"))?;
        tokio::spawn(run_connection(id, token, transport, rx, self.events.clone()));
        Ok(())
    }
}

/// Owns the router and the event stream feeding it.
pub struct Server {
    router: Router<ChannelConnection>,
    /// Token of the transport currently registered under each id.
    live: HashMap<SessionId, ConnToken>,
    events: UnboundedReceiver<Event>,
    handle: ServerHandle,
}

impl Server {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            router: Router::new(),
            live: HashMap::new(),
            events: rx,
            handle: ServerHandle {
                events: tx,
                next_token: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    pub fn router(&self) -> &Router<ChannelConnection> {
        &self.router
    }

    fn is_live(&self, id: &SessionId, token: ConnToken) -> bool {
        self.live.get(id) == Some(&token)
    }

    /// Apply one event to the router. Frames and closes from a transport that
    /// was refused at connect time are dropped.
    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Connected { id, token, conn } => {
                if self.router.connect(id.clone(), conn) {
                    self.live.insert(id, token);
                }
            }
            Event::Frame { id, token, frame } => {
                if self.is_live(&id, token) {
                    self.router.handle_frame(&id, &frame);
                } else {
                    debug!("dropping frame from stale transport {} of {}", token, id);
                }
            }
            Event::Closed { id, token } => {
                if self.is_live(&id, token) {
                    self.live.remove(&id);
                    self.router.disconnect(&id);
                } else {
                    debug!("stale transport {} of {} closed", token, id);
                }
            }
        }
    }

    /// Process events until `shutdown` resolves.
    pub async fn run_until<F: Future<Output = ()>>(mut self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    // The server holds a sender itself, so this only happens on teardown.
                    None => break,
                },
            }
        }
    }

    /// Process events forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

enum Step {
    Inbound(anyhow::Result<Option<String>>),
    Outbound(Option<Outgoing>),
}

/// Pump frames between one transport and the router until either side closes.
async fn run_connection<T: Transport>(
    id: SessionId,
    token: ConnToken,
    mut transport: T,
    mut outbox: UnboundedReceiver<Outgoing>,
    events: UnboundedSender<Event>,
) {
    loop {
        let step = tokio::select! {
            biased;
            out = outbox.recv() => Step::Outbound(out),
            frame = transport.recv() => Step::Inbound(frame),
        };
        match step {
            Step::Outbound(Some(Outgoing::Message(msg))) => {
                let sent = match encode(&msg) {
                    Ok(frame) => transport.send(&frame).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = sent {
                    warn!("send to {} failed: {}", id, e);
                    break;
                }
            }
            Step::Outbound(Some(Outgoing::Close)) | Step::Outbound(None) => {
                if let Err(e) = transport.close().await {
                    debug!("close of {} failed: {}", id, e);
                }
                break;
            }
            Step::Inbound(Ok(Some(frame))) => {
                if events
                    .send(Event::Frame {
                        id: id.clone(),
                        token,
                        frame,
                    })
                    .is_err()
                {
                    break;
                }
            }
            Step::Inbound(Ok(None)) => {
                debug!("session {} closed by peer", id);
                break;
            }
            Step::Inbound(Err(e)) => {
                warn!("receive from {} failed: {}", id, e);
                break;
            }
        }
    }
    let _ = events.send(Event::Closed { id, token });
}

/// Accept TCP connections forever, attaching each to the server.
pub async fn serve_tcp(
    listener: TcpListener,
    handle: ServerHandle,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let transport = TcpTransport::with_max_frame_len(stream, config.max_frame_len);
        let id = handle.attach(transport)?;
        info!("connection from {} assigned session {}", addr, id);
    }
}
