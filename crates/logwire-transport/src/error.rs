use thiserror::Error;

/// Failure to decode an Engine.IO or Socket.IO packet
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,

    #[error("unknown packet type '{0}'")]
    UnknownType(char),

    #[error("invalid handshake: {0}")]
    Handshake(#[source] serde_json::Error),

    #[error("invalid packet payload: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("event packet without a name")]
    MissingEventName,

    #[error("unsupported packet: {0}")]
    Unsupported(&'static str),
}

/// Failure of a transport session
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("server rejected namespace {namespace}: {reason}")]
    ConnectRejected { namespace: String, reason: String },

    #[error("no packet within {0:?}, assuming the connection is gone")]
    PingTimeout(std::time::Duration),

    #[error("server closed the session")]
    ServerDisconnect,

    #[error("transport closed")]
    Closed,

    #[error("no transport could connect")]
    NoTransport,
}
