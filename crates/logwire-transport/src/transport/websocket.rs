use futures::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::engineio::{EnginePacket, Handshake};
use crate::error::TransportError;

/// Engine.IO over a single WebSocket, one packet per text frame
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Open the socket and wait for the server's open packet
    pub async fn connect(url: &Url) -> Result<(Self, Handshake), TransportError> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        let mut transport = Self { stream };

        match transport.recv().await? {
            Some(packets) => match packets.into_iter().next() {
                Some(EnginePacket::Open(handshake)) => Ok((transport, handshake)),
                other => Err(TransportError::Handshake(format!(
                    "expected open packet, got {:?}",
                    other
                ))),
            },
            None => Err(TransportError::Closed),
        }
    }

    pub async fn send(&mut self, packet: &EnginePacket) -> Result<(), TransportError> {
        self.stream.send(Message::Text(packet.encode().into())).await?;
        Ok(())
    }

    /// Wait for the next packet; `None` once the socket is closed
    pub async fn recv(&mut self) -> Result<Option<Vec<EnginePacket>>, TransportError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };

            match message? {
                Message::Text(text) => return Ok(Some(vec![EnginePacket::decode(&text)?])),
                Message::Close(frame) => {
                    debug!(?frame, "websocket closed by server");
                    return Ok(None);
                }
                // Binary attachments and control frames carry no log events
                _ => continue,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
