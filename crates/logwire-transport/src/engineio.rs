//! Engine.IO v4 packet codec
//!
//! Every packet is a one-character type followed by its data. Long-polling
//! bodies carry several packets joined by the ASCII record separator.

use serde::Deserialize;
use std::time::Duration;

use crate::error::PacketError;

/// Protocol revision sent as the `EIO` query parameter
pub const PROTOCOL_VERSION: &str = "4";

/// Separator between packets in a polling payload
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Session parameters sent by the server in the open packet
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest silence tolerated before the session is considered dead
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

/// A single Engine.IO packet
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    /// Decode one text packet
    pub fn decode(raw: &str) -> Result<Self, PacketError> {
        let mut chars = raw.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let data = chars.as_str();

        match kind {
            '0' => serde_json::from_str(data)
                .map(Self::Open)
                .map_err(PacketError::Handshake),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data.to_string())),
            '3' => Ok(Self::Pong(data.to_string())),
            '4' => Ok(Self::Message(data.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    /// Encode a client-originated packet
    pub fn encode(&self) -> String {
        match self {
            // Only servers send open packets; the client never re-encodes one
            Self::Open(_) => "0".to_string(),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{}", data),
            Self::Pong(data) => format!("3{}", data),
            Self::Message(data) => format!("4{}", data),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

/// Decode a long-polling response body.
///
/// Base64 binary packets (`b...`) are skipped; this client only consumes
/// text events.
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>, PacketError> {
    body.split(RECORD_SEPARATOR)
        .filter(|raw| !raw.is_empty() && !raw.starts_with('b'))
        .map(EnginePacket::decode)
        .collect()
}

/// Encode packets into a long-polling request body
pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}
