//! Engine.IO transports

mod polling;
mod websocket;

use reqwest::{Client, Url};

use logwire_types::TransportKind;

use crate::engineio::{EnginePacket, Handshake};
use crate::error::TransportError;

pub use polling::PollingTransport;
pub use websocket::WebSocketTransport;

/// An open Engine.IO session over one of the supported transports
pub enum Transport {
    WebSocket(WebSocketTransport),
    Polling(PollingTransport),
}

impl Transport {
    /// Open a session of the given kind and return the server handshake
    pub async fn connect(
        kind: TransportKind,
        url: &Url,
        client: &Client,
    ) -> Result<(Self, Handshake), TransportError> {
        match kind {
            TransportKind::WebSocket => {
                let (transport, handshake) = WebSocketTransport::connect(url).await?;
                Ok((Self::WebSocket(transport), handshake))
            }
            TransportKind::Polling => {
                let (transport, handshake) = PollingTransport::connect(client.clone(), url).await?;
                Ok((Self::Polling(transport), handshake))
            }
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Self::WebSocket(_) => TransportKind::WebSocket,
            Self::Polling(_) => TransportKind::Polling,
        }
    }

    pub async fn send(&mut self, packet: &EnginePacket) -> Result<(), TransportError> {
        match self {
            Self::WebSocket(t) => t.send(packet).await,
            Self::Polling(t) => t.send(packet).await,
        }
    }

    pub async fn recv(&mut self) -> Result<Option<Vec<EnginePacket>>, TransportError> {
        match self {
            Self::WebSocket(t) => t.recv().await,
            Self::Polling(t) => t.recv().await,
        }
    }

    pub async fn close(self) {
        match self {
            Self::WebSocket(t) => t.close().await,
            Self::Polling(t) => t.close().await,
        }
    }
}
