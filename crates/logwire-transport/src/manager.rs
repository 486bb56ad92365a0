use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logwire_logs::parse_event;
use logwire_types::{ConnectionEvent, TransportKind};

use crate::config::TransportConfig;
use crate::engineio::{EnginePacket, Handshake};
use crate::error::TransportError;
use crate::socketio::SocketPacket;
use crate::transport::Transport;

/// Owner-facing contract of a log source connection
pub trait Connection {
    /// Start connecting; no-op if already open
    fn open(&mut self);

    /// Stop the session and all further notifications; idempotent
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Next connectivity change or received event, in arrival order.
    /// Pends forever while closed.
    fn next_event(&mut self) -> impl Future<Output = Option<ConnectionEvent>> + Send;
}

/// Live view of the connection for status displays
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStatus {
    /// Transport of the current session, if connected
    pub transport: Option<TransportKind>,

    /// Consecutive failed attempts since the last successful connect
    pub failed_attempts: u32,

    /// Most recent failure, for display
    pub last_error: Option<String>,

    /// The reconnect policy ran out; nothing is retrying any more
    pub gave_up: bool,
}

/// Maintains a Socket.IO session to the log source in a background task
pub struct ConnectionManager {
    config: Arc<TransportConfig>,

    /// HTTP client shared by all polling sessions
    client: Client,

    /// Cancellation token for the running session task
    cancel: CancellationToken,

    task: Option<JoinHandle<()>>,

    /// Present only while open
    events: Option<mpsc::UnboundedReceiver<ConnectionEvent>>,

    status: Arc<RwLock<LinkStatus>>,
}

impl ConnectionManager {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(config.connect_timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            config: Arc::new(config),
            cancel: CancellationToken::new(),
            task: None,
            events: None,
            status: Arc::new(RwLock::new(LinkStatus::default())),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn status(&self) -> LinkStatus {
        self.status.read().clone()
    }
}

impl Connection for ConnectionManager {
    fn open(&mut self) {
        if self.is_open() {
            return;
        }
        if let Some(stale) = self.task.take() {
            stale.abort();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = self.cancel.clone();
        let worker = Worker {
            config: Arc::clone(&self.config),
            client: self.client.clone(),
            status: Arc::clone(&self.status),
            tx,
        };

        info!(endpoint = %self.config.endpoint, "opening connection");
        *self.status.write() = LinkStatus::default();
        self.events = Some(rx);
        self.task = Some(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = worker.run() => {}
            }
        }));
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            info!("closing connection");
            self.cancel.cancel();
            task.abort();
            // Fresh token for a later open()
            self.cancel = CancellationToken::new();
        }
        // Dropping the receiver discards anything still queued
        self.events = None;
        self.status.write().transport = None;
    }

    fn is_open(&self) -> bool {
        self.task.is_some() && !self.status.read().gave_up
    }

    async fn next_event(&mut self) -> Option<ConnectionEvent> {
        match self.events.as_mut() {
            Some(rx) => {
                let event = rx.recv().await;
                if event.is_none() {
                    // Worker gave up; behave like a closed manager from now on
                    self.events = None;
                }
                event
            }
            None => std::future::pending().await,
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

/// State moved into the background session task
struct Worker {
    config: Arc<TransportConfig>,
    client: Client,
    status: Arc<RwLock<LinkStatus>>,
    tx: mpsc::UnboundedSender<ConnectionEvent>,
}

impl Worker {
    /// Connect, pump, and reconnect until the policy gives up or the owner
    /// stops listening
    async fn run(self) {
        let mut failures = 0u32;

        loop {
            match self.connect().await {
                Ok((transport, handshake)) => {
                    failures = 0;
                    {
                        let mut status = self.status.write();
                        status.transport = Some(transport.kind());
                        status.failed_attempts = 0;
                        status.last_error = None;
                    }
                    if self.tx.send(ConnectionEvent::Connected).is_err() {
                        transport.close().await;
                        return;
                    }

                    let reason = self.pump(transport, &handshake).await;
                    warn!(error = %reason, "connection lost");
                    {
                        let mut status = self.status.write();
                        status.transport = None;
                        status.last_error = Some(reason.to_string());
                    }
                    if self.tx.send(ConnectionEvent::Disconnected).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, attempt = failures, "connect attempt failed");
                    let mut status = self.status.write();
                    status.failed_attempts = failures;
                    status.last_error = Some(e.to_string());
                }
            }

            let Some(delay) = self.config.reconnect.delay_for(failures) else {
                info!("giving up on reconnecting");
                let mut status = self.status.write();
                status.transport = None;
                status.gave_up = true;
                return;
            };
            debug!(?delay, "reconnecting after delay");
            tokio::time::sleep(delay).await;
        }
    }

    /// Try each configured transport in order until one completes the
    /// Engine.IO and Socket.IO handshakes
    async fn connect(&self) -> Result<(Transport, Handshake), TransportError> {
        let mut last_error = TransportError::NoTransport;

        for &kind in &self.config.transports {
            let attempt = tokio::time::timeout(self.config.connect_timeout, self.connect_with(kind));
            match attempt.await {
                Ok(Ok(connected)) => return Ok(connected),
                Ok(Err(e)) => {
                    debug!(transport = %kind, error = %e, "transport failed");
                    last_error = e;
                }
                Err(_) => {
                    debug!(transport = %kind, "transport timed out");
                    last_error = TransportError::Handshake(format!(
                        "{} handshake timed out after {:?}",
                        kind, self.config.connect_timeout
                    ));
                }
            }
        }

        Err(last_error)
    }

    async fn connect_with(&self, kind: TransportKind) -> Result<(Transport, Handshake), TransportError> {
        let url = self.config.engine_url(kind)?;
        debug!(%url, "connecting");
        let (mut transport, handshake) = Transport::connect(kind, &url, &self.client).await?;

        let connect = SocketPacket::connect(&self.config.namespace);
        transport
            .send(&EnginePacket::Message(connect.encode()))
            .await?;

        loop {
            let Some(packets) = transport.recv().await? else {
                return Err(TransportError::Closed);
            };

            for packet in packets {
                match packet {
                    EnginePacket::Ping(data) => transport.send(&EnginePacket::Pong(data)).await?,
                    EnginePacket::Close => return Err(TransportError::Closed),
                    EnginePacket::Message(text) => match SocketPacket::decode(&text)? {
                        SocketPacket::Connect { namespace, .. } if namespace == self.config.namespace => {
                            info!(transport = %kind, sid = %handshake.sid, "connected");
                            return Ok((transport, handshake));
                        }
                        SocketPacket::ConnectError { namespace, data } => {
                            return Err(TransportError::ConnectRejected {
                                namespace,
                                reason: data.map(|d| d.to_string()).unwrap_or_default(),
                            });
                        }
                        other => debug!(?other, "ignoring packet before connect"),
                    },
                    _ => {}
                }
            }
        }
    }

    /// Forward events until the session ends, returning why it ended
    async fn pump(&self, mut transport: Transport, handshake: &Handshake) -> TransportError {
        let heartbeat = handshake.heartbeat_timeout();

        loop {
            let packets = match tokio::time::timeout(heartbeat, transport.recv()).await {
                Err(_) => return TransportError::PingTimeout(heartbeat),
                Ok(Err(e)) => return e,
                Ok(Ok(None)) => return TransportError::Closed,
                Ok(Ok(Some(packets))) => packets,
            };

            for packet in packets {
                match packet {
                    EnginePacket::Ping(data) => {
                        if let Err(e) = transport.send(&EnginePacket::Pong(data)).await {
                            return e;
                        }
                    }
                    EnginePacket::Close => return TransportError::Closed,
                    EnginePacket::Message(text) => {
                        if let Some(reason) = self.dispatch(&text) {
                            transport.close().await;
                            return reason;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Handle one Socket.IO packet; returns a reason if the session must end
    fn dispatch(&self, text: &str) -> Option<TransportError> {
        let packet = match SocketPacket::decode(text) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "dropping undecodable packet");
                return None;
            }
        };

        if packet.namespace() != self.config.namespace {
            return None;
        }

        match packet {
            SocketPacket::Event { name, args, .. } if name == self.config.event => {
                let Some(payload) = args.first() else {
                    warn!("dropping {} event without payload", name);
                    return None;
                };
                match parse_event(payload) {
                    Ok(event) => {
                        if self.tx.send(ConnectionEvent::EventReceived(event)).is_err() {
                            return Some(TransportError::Closed);
                        }
                    }
                    Err(e) => warn!(error = %e, %payload, "dropping malformed log event"),
                }
                None
            }
            SocketPacket::Disconnect { .. } => Some(TransportError::ServerDisconnect),
            other => {
                debug!(?other, "ignoring packet");
                None
            }
        }
    }
}
