use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use crate::engineio::{self, EnginePacket, Handshake};
use crate::error::TransportError;

/// Engine.IO over HTTP long-polling.
///
/// Each GET blocks until the server has packets for us; outgoing packets are
/// POSTed to the same session URL.
pub struct PollingTransport {
    client: Client,
    url: Url,

    /// The server sent a close packet; no further polls are made
    closed: bool,
}

impl PollingTransport {
    /// Perform the handshake GET and bind to the returned session id
    pub async fn connect(client: Client, url: &Url) -> Result<(Self, Handshake), TransportError> {
        let body = client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let handshake = match engineio::decode_payload(&body)?.into_iter().next() {
            Some(EnginePacket::Open(handshake)) => handshake,
            other => {
                return Err(TransportError::Handshake(format!(
                    "expected open packet, got {:?}",
                    other
                )));
            }
        };

        let mut url = url.clone();
        url.query_pairs_mut().append_pair("sid", &handshake.sid);

        Ok((
            Self {
                client,
                url,
                closed: false,
            },
            handshake,
        ))
    }

    pub async fn send(&mut self, packet: &EnginePacket) -> Result<(), TransportError> {
        self.client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(engineio::encode_payload(std::slice::from_ref(packet)))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Long-poll for the next batch of packets; `None` once the server closes.
    /// Packets ahead of a close packet in the same batch are still returned.
    pub async fn recv(&mut self) -> Result<Option<Vec<EnginePacket>>, TransportError> {
        if self.closed {
            return Ok(None);
        }

        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut packets = engineio::decode_payload(&body)?;
        if let Some(at) = packets.iter().position(|p| *p == EnginePacket::Close) {
            packets.truncate(at);
            self.closed = true;
            if packets.is_empty() {
                return Ok(None);
            }
        }
        Ok(Some(packets))
    }

    pub async fn close(mut self) {
        let _ = self.send(&EnginePacket::Close).await;
    }
}
