//! Shared types for logwire
//!
//! This crate contains data structures used across multiple logwire crates.

use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level as sent by the producer.
///
/// The set is open: anything the client does not recognise is kept verbatim
/// in [`Level::Other`] so it can still be displayed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Info,
    Error,
    Query,
    Other(String),
}

impl Level {
    /// Parse a level from its wire name
    pub fn parse(s: &str) -> Self {
        match s {
            "info" => Self::Info,
            "error" => Self::Error,
            "query" => Self::Query,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name of this level
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
            Self::Query => "query",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Whether this is one of the levels the client knows about
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Upper-cased label used in the log list (`[INFO]:`)
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::LightBlue,
            Self::Error => Color::Red,
            Self::Query => Color::Magenta,
            Self::Other(_) => Color::White,
        }
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        match s.as_str() {
            "info" | "error" | "query" => Self::parse(&s),
            _ => Self::Other(s),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        match level {
            Level::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single received log line.
///
/// Events are never mutated once received; the buffer hands them out behind
/// an [`std::sync::Arc`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Severity as sent by the producer
    pub level: Level,

    /// Payload, rendered verbatim (may contain line breaks)
    pub message: String,

    /// Producer-supplied display string, never parsed
    pub timestamp: String,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Category selector for the filter view
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum FilterCategory {
    /// Every retained event
    #[default]
    All,
    /// Events whose level equals the given one
    Only(Level),
}

impl FilterCategory {
    /// Parse a category name; `"all"` selects everything
    pub fn parse(s: &str) -> Self {
        match s {
            "all" => Self::All,
            other => Self::Only(Level::parse(other)),
        }
    }

    /// Check whether an event's level is selected by this category.
    ///
    /// Unknown levels only ever match [`FilterCategory::All`], and a category
    /// naming an unknown level matches nothing.
    pub fn matches(&self, level: &Level) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted.is_known() && wanted == level,
        }
    }

    /// Get display label for this category
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Only(Level::Info) => "Info",
            Self::Only(Level::Error) => "Error",
            Self::Only(Level::Query) => "Query",
            Self::Only(Level::Other(s)) => s.as_str(),
        }
    }

    /// Categories offered as tabs, in display order
    pub fn tabs() -> [FilterCategory; 4] {
        [
            Self::All,
            Self::Only(Level::Info),
            Self::Only(Level::Error),
            Self::Only(Level::Query),
        ]
    }

    /// Cycle to the next category
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Only(Level::Info),
            Self::Only(Level::Info) => Self::Only(Level::Error),
            Self::Only(Level::Error) => Self::Only(Level::Query),
            Self::Only(_) => Self::All,
        }
    }

    /// Cycle to the previous category
    pub fn prev(&self) -> Self {
        match self {
            Self::All => Self::Only(Level::Query),
            Self::Only(Level::Info) => Self::All,
            Self::Only(Level::Error) => Self::Only(Level::Info),
            Self::Only(Level::Query) => Self::Only(Level::Error),
            Self::Only(Level::Other(_)) => Self::All,
        }
    }
}

/// Maximum number of events the buffer retains
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Capacity {
    /// Keep everything for the lifetime of the session
    #[default]
    Unbounded,
    /// Keep at most this many events, evicting the oldest
    Bounded(NonZeroUsize),
}

impl Capacity {
    /// Bounded capacity, or `None` for zero
    pub fn bounded(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self::Bounded)
    }

    /// The bound, if any
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(n) => Some(n.get()),
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Bounded(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Capacity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unbounded" | "none" => Ok(Self::Unbounded),
            n => n
                .parse::<usize>()
                .ok()
                .and_then(Self::bounded)
                .ok_or_else(|| {
                    format!("invalid capacity '{}': expected a positive number or 'unbounded'", s)
                }),
        }
    }
}

impl<'de> Deserialize<'de> for Capacity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Self::bounded(n)
                .ok_or_else(|| serde::de::Error::custom("capacity must be positive or 'unbounded'")),
            Raw::Word(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Session / Connection Types
// ============================================================================

/// Connectivity of an unlocked session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
    Disconnected,
    Connected,
}

/// Access gate and connection state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Locked,
    Unlocking,
    Unlocked(Link),
}

impl SessionState {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked(_))
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Unlocked(Link::Connected))
    }
}

/// Observable output of a connection manager
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
    EventReceived(LogEvent),
}

/// Transports the client can negotiate, in preference order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    WebSocket,
    Polling,
}

impl TransportKind {
    /// Value of the Engine.IO `transport` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Polling => "polling",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "websocket" | "ws" => Ok(Self::WebSocket),
            "polling" | "long-polling" => Ok(Self::Polling),
            _ => Err(format!("unknown transport '{}'", s)),
        }
    }
}
