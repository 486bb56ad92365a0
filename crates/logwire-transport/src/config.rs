use std::time::Duration;

use reqwest::Url;

use logwire_types::TransportKind;

use crate::engineio::PROTOCOL_VERSION;
use crate::error::TransportError;
use crate::socketio::DEFAULT_NAMESPACE;

/// How the manager retries after a failed attempt or a dropped session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,

    /// Delay before the first retry, doubled on every further failure
    pub delay: Duration,

    /// Upper bound for the doubling delay
    pub max_delay: Duration,

    /// Give up after this many consecutive failures (None = never)
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before the next attempt after `failures` consecutive failed
    /// attempts, or None once the policy gives up
    pub fn delay_for(&self, failures: u32) -> Option<Duration> {
        if !self.enabled || self.max_attempts.is_some_and(|max| failures >= max) {
            return None;
        }
        let factor = 2u32.saturating_pow(failures.min(16));
        Some(self.delay.saturating_mul(factor).min(self.max_delay))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            max_attempts: None,
        }
    }
}

/// Where and how to connect to the log source
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Server origin, e.g. `https://logs.example.com/`
    pub endpoint: Url,

    /// Engine.IO request path
    pub path: String,

    /// Socket.IO namespace to join
    pub namespace: String,

    /// Name of the push event carrying log lines
    pub event: String,

    /// Transports to try, most preferred first
    pub transports: Vec<TransportKind>,

    pub reconnect: ReconnectPolicy,

    /// Limit for a single transport to complete the handshake
    pub connect_timeout: Duration,
}

impl TransportConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            path: "/socket.io/".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            event: "log".to_string(),
            transports: vec![TransportKind::WebSocket, TransportKind::Polling],
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Parse an endpoint string into a config with default settings
    pub fn parse(endpoint: &str) -> Result<Self, TransportError> {
        let url = Url::parse(endpoint).map_err(|e| TransportError::Endpoint(e.to_string()))?;
        match url.scheme() {
            "http" | "https" | "ws" | "wss" => Ok(Self::new(url)),
            other => Err(TransportError::Endpoint(format!(
                "unsupported scheme '{}'",
                other
            ))),
        }
    }

    /// Engine.IO URL for the given transport
    pub fn engine_url(&self, kind: TransportKind) -> Result<Url, TransportError> {
        let mut url = self.endpoint.clone();
        url.set_path(&self.path);
        url.query_pairs_mut()
            .clear()
            .append_pair("EIO", PROTOCOL_VERSION)
            .append_pair("transport", kind.as_str());

        let scheme = match (kind, url.scheme()) {
            (TransportKind::WebSocket, "http" | "ws") => "ws",
            (TransportKind::WebSocket, _) => "wss",
            (TransportKind::Polling, "http" | "ws") => "http",
            (TransportKind::Polling, _) => "https",
        };
        url.set_scheme(scheme)
            .map_err(|_| TransportError::Endpoint(format!("cannot use scheme '{}'", scheme)))?;

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_url_per_transport() {
        let config = TransportConfig::parse("https://logs.example.com/").unwrap();

        assert_eq!(
            config.engine_url(TransportKind::WebSocket).unwrap().as_str(),
            "wss://logs.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            config.engine_url(TransportKind::Polling).unwrap().as_str(),
            "https://logs.example.com/socket.io/?EIO=4&transport=polling"
        );
    }

    #[test]
    fn test_engine_url_plain_http() {
        let config = TransportConfig::parse("http://localhost:3000").unwrap();
        assert_eq!(
            config.engine_url(TransportKind::WebSocket).unwrap().as_str(),
            "ws://localhost:3000/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_parse_rejects_bad_endpoints() {
        assert!(TransportConfig::parse("not a url").is_err());
        assert!(TransportConfig::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_reconnect_delays_double_up_to_max() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_millis(4000)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_millis(5000)));
        assert_eq!(policy.delay_for(100), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn test_reconnect_gives_up() {
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        assert!(policy.delay_for(1).is_some());
        assert!(policy.delay_for(2).is_none());
        assert!(ReconnectPolicy::disabled().delay_for(0).is_none());
    }
}
