//! Configuration loading
//!
//! Settings come from a TOML file, then `LOGWIRE_*` environment variables,
//! then command-line flags, later sources winning. The endpoint and the
//! secret are required; everything else has a default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, warn};

use logwire_session::FileStore;
use logwire_transport::{ReconnectPolicy, TransportConfig, TransportKind};
use logwire_types::Capacity;

use crate::Args;

pub const ENV_ENDPOINT: &str = "LOGWIRE_ENDPOINT";
pub const ENV_SECRET: &str = "LOGWIRE_SECRET";
pub const ENV_CAPACITY: &str = "LOGWIRE_CAPACITY";

/// Retained events when nothing else is configured
const DEFAULT_CAPACITY: usize = 30;

/// On-disk representation; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    endpoint: Option<String>,
    secret: Option<String>,
    path: Option<String>,
    event: Option<String>,
    namespace: Option<String>,
    transports: Option<Vec<TransportKind>>,
    capacity: Option<Capacity>,
    remember: Option<bool>,
    reconnect: ReconnectSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReconnectSection {
    enabled: Option<bool>,
    delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    /// 0 means unlimited
    max_attempts: Option<u32>,
}

impl ReconnectSection {
    fn policy(&self) -> ReconnectPolicy {
        let default = ReconnectPolicy::default();
        ReconnectPolicy {
            enabled: self.enabled.unwrap_or(default.enabled),
            delay: self
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.delay),
            max_delay: self
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.max_delay),
            max_attempts: self.max_attempts.filter(|&n| n > 0),
        }
    }
}

/// Fully resolved settings
#[derive(Debug)]
pub struct Config {
    pub transport: TransportConfig,
    pub secret: String,
    pub capacity: Capacity,
    pub remember: bool,

    /// Where the remembered credential is kept (None = not persisted)
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("logwire").join("config.toml"))
    }

    /// Load from the config file, the process environment and `args`
    pub fn load(args: &Args) -> Result<Self> {
        Self::load_with(args, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup
    pub fn load_with(args: &Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match &args.config {
            Some(path) => read_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => read_file(&path)?,
                _ => FileConfig::default(),
            },
        };

        let endpoint = args
            .endpoint
            .clone()
            .or_else(|| env(ENV_ENDPOINT))
            .or(file.endpoint)
            .filter(|s| !s.trim().is_empty());
        let Some(endpoint) = endpoint else {
            bail!(
                "no endpoint configured: set `endpoint` in the config file, {} or --endpoint",
                ENV_ENDPOINT
            );
        };

        let secret = env(ENV_SECRET)
            .or(file.secret)
            .filter(|s| !s.is_empty());
        let Some(secret) = secret else {
            bail!(
                "no secret configured: set `secret` in the config file or {}",
                ENV_SECRET
            );
        };

        let env_capacity = env(ENV_CAPACITY)
            .map(|raw| {
                raw.parse::<Capacity>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("invalid {}", ENV_CAPACITY))
            })
            .transpose()?;
        let capacity = args
            .capacity
            .or(env_capacity)
            .or(file.capacity)
            .or(Capacity::bounded(DEFAULT_CAPACITY))
            .unwrap_or_default();

        let mut transport = TransportConfig::parse(&endpoint)
            .with_context(|| format!("invalid endpoint '{}'", endpoint))?;
        if let Some(path) = file.path {
            transport.path = path;
        }
        if let Some(event) = file.event {
            transport.event = event;
        }
        if let Some(namespace) = file.namespace {
            transport.namespace = namespace;
        }
        if !args.transports.is_empty() {
            transport.transports = args.transports.clone();
        } else if let Some(transports) = file.transports {
            transport.transports = transports;
        }
        if transport.transports.is_empty() {
            bail!("at least one transport must be enabled");
        }
        transport.reconnect = file.reconnect.policy();

        let remember = !args.no_remember && file.remember.unwrap_or(true);
        let state_path = remember.then(FileStore::default_path).flatten();
        if remember && state_path.is_none() {
            warn!("no home directory; the credential cannot be remembered");
        }

        debug!(
            endpoint = %transport.endpoint,
            %capacity,
            remember,
            "configuration loaded"
        );

        Ok(Self {
            transport,
            secret,
            capacity,
            remember,
            state_path,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn args(config: &Path, extra: &[&str]) -> Args {
        let mut argv = vec!["logwire", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_file_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
endpoint = "https://logs.example.com/"
secret = "hunter2"
"#,
        );

        let config = Config::load_with(&args(&path, &[]), env(&[])).unwrap();
        assert_eq!(config.secret, "hunter2");
        assert_eq!(config.capacity, Capacity::bounded(30).unwrap());
        assert_eq!(config.transport.event, "log");
        assert_eq!(
            config.transport.transports,
            vec![TransportKind::WebSocket, TransportKind::Polling]
        );
        assert_eq!(config.transport.reconnect, ReconnectPolicy::default());
        assert!(config.remember);
    }

    #[test]
    fn test_full_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
endpoint = "http://localhost:3000"
secret = "s"
path = "/io/"
event = "logs"
namespace = "/admin"
transports = ["polling"]
capacity = "unbounded"
remember = false

[reconnect]
delay_ms = 250
max_attempts = 3
"#,
        );

        let config = Config::load_with(&args(&path, &[]), env(&[])).unwrap();
        assert_eq!(config.transport.path, "/io/");
        assert_eq!(config.transport.event, "logs");
        assert_eq!(config.transport.namespace, "/admin");
        assert_eq!(config.transport.transports, vec![TransportKind::Polling]);
        assert_eq!(config.capacity, Capacity::Unbounded);
        assert!(!config.remember);
        assert!(config.state_path.is_none());
        assert_eq!(config.transport.reconnect.delay, Duration::from_millis(250));
        assert_eq!(config.transport.reconnect.max_attempts, Some(3));
    }

    #[test]
    fn test_env_and_cli_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
endpoint = "https://file.example.com/"
secret = "from-file"
capacity = 10
"#,
        );

        let vars = env(&[
            (ENV_ENDPOINT, "https://env.example.com/"),
            (ENV_SECRET, "from-env"),
            (ENV_CAPACITY, "20"),
        ]);
        let config = Config::load_with(&args(&path, &[]), &vars).unwrap();
        assert_eq!(config.transport.endpoint.as_str(), "https://env.example.com/");
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.capacity, Capacity::bounded(20).unwrap());

        let cli = args(
            &path,
            &[
                "--endpoint",
                "https://cli.example.com/",
                "--capacity",
                "5",
                "--transport",
                "polling",
                "--no-remember",
            ],
        );
        let config = Config::load_with(&cli, &vars).unwrap();
        assert_eq!(config.transport.endpoint.as_str(), "https://cli.example.com/");
        assert_eq!(config.capacity, Capacity::bounded(5).unwrap());
        assert_eq!(config.transport.transports, vec![TransportKind::Polling]);
        assert!(!config.remember);
    }

    #[test]
    fn test_missing_required_settings_are_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_config(&dir, r#"secret = "s""#);
        let err = Config::load_with(&args(&path, &[]), env(&[])).unwrap_err();
        assert!(err.to_string().contains("no endpoint"));

        let path = write_config(&dir, r#"endpoint = "https://x.example.com/""#);
        let err = Config::load_with(&args(&path, &[]), env(&[])).unwrap_err();
        assert!(err.to_string().contains("no secret"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "endpoint = \"https://x.example.com/\"\nsecret = \"s\"\n");

        let vars = env(&[(ENV_CAPACITY, "lots")]);
        assert!(Config::load_with(&args(&path, &[]), vars).is_err());

        let vars = env(&[(ENV_CAPACITY, "0")]);
        assert!(Config::load_with(&args(&path, &[]), vars).is_err());
        assert!(Args::try_parse_from(["logwire", "--capacity", "0"]).is_err());

        let path = write_config(&dir, "endpoint = \"https://x/\"\nsecret = \"s\"\ncapacity = 0\n");
        assert!(Config::load_with(&args(&path, &[]), env(&[])).is_err());

        let path = write_config(&dir, "endpoint = \"ftp://x.example.com/\"\nsecret = \"s\"\n");
        assert!(Config::load_with(&args(&path, &[]), env(&[])).is_err());

        let path = write_config(&dir, "endpoint = \"https://x/\"\nsecret = \"s\"\ncolour = 1\n");
        assert!(Config::load_with(&args(&path, &[]), env(&[])).is_err());
    }
}
