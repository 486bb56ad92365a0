use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::watch;

use logwire_types::{Capacity, Level, LogEvent};

use crate::ArcLogEvent;

/// Bounded, newest-first store of received log events
pub struct LogBuffer {
    /// Newest entry at the front
    entries: VecDeque<ArcLogEvent>,

    /// Maximum retained entries
    capacity: Capacity,

    /// Revision counter, bumped on every mutation
    changes: watch::Sender<u64>,
}

impl LogBuffer {
    /// Create an empty buffer with the given capacity
    pub fn new(capacity: Capacity) -> Self {
        let entries = match capacity.limit() {
            // The extra slot holds the incoming entry before eviction
            Some(limit) => VecDeque::with_capacity(limit + 1),
            None => VecDeque::new(),
        };
        let (changes, _) = watch::channel(0);

        Self {
            entries,
            capacity,
            changes,
        }
    }

    /// Insert an event at the head, evicting from the tail past capacity
    pub fn append(&mut self, event: LogEvent) {
        self.entries.push_front(Arc::new(event));
        if let Some(limit) = self.capacity.limit() {
            self.entries.truncate(limit);
        }
        self.changes.send_modify(|rev| *rev += 1);
    }

    /// Current contents, newest first (Arc clones are cheap)
    pub fn snapshot(&self) -> Vec<ArcLogEvent> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate the current contents without cloning
    pub fn iter(&self) -> impl Iterator<Item = &ArcLogEvent> {
        self.entries.iter()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.changes.send_modify(|rev| *rev += 1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Monotonic revision; equal revisions imply equal contents
    pub fn revision(&self) -> u64 {
        *self.changes.borrow()
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Get entry count per log level
    pub fn level_counts(&self) -> LevelCounts {
        let mut counts = LevelCounts::default();

        for entry in &self.entries {
            match entry.level {
                Level::Info => counts.info += 1,
                Level::Error => counts.error += 1,
                Level::Query => counts.query += 1,
                Level::Other(_) => counts.other += 1,
            }
        }

        counts
    }
}

/// Counts per log level
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub info: usize,
    pub error: usize,
    pub query: usize,
    pub other: usize,
}

impl LevelCounts {
    pub fn total(&self) -> usize {
        self.info + self.error + self.query + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(level: &str, message: &str) -> LogEvent {
        LogEvent::new(Level::parse(level), message, "2024-01-15 10:30:00")
    }

    fn messages(buffer: &LogBuffer) -> Vec<String> {
        buffer.snapshot().iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        buffer.append(event("info", "e1"));
        buffer.append(event("info", "e2"));
        buffer.append(event("info", "e3"));

        assert_eq!(messages(&buffer), vec!["e3", "e2", "e1"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = LogBuffer::new(Capacity::bounded(2).unwrap());
        buffer.append(event("info", "A"));
        buffer.append(event("error", "B"));
        buffer.append(event("query", "C"));

        assert_eq!(messages(&buffer), vec!["C", "B"]);
    }

    #[test]
    fn test_bound_holds_for_long_sequences() {
        for limit in [1, 10, 30] {
            let mut buffer = LogBuffer::new(Capacity::bounded(limit).unwrap());
            for i in 0..100 {
                buffer.append(event("info", &i.to_string()));
                assert!(buffer.len() <= limit);
            }

            let expected: Vec<String> = (100 - limit..100).rev().map(|i| i.to_string()).collect();
            assert_eq!(messages(&buffer), expected);
        }
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        for i in 0..500 {
            buffer.append(event("info", &i.to_string()));
        }
        assert_eq!(buffer.len(), 500);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut buffer = LogBuffer::new(Capacity::bounded(5).unwrap());
        buffer.append(event("info", "a"));
        buffer.append(event("error", "b"));

        let revision = buffer.revision();
        let first = buffer.snapshot();
        let second = buffer.snapshot();
        assert_eq!(first, second);
        assert_eq!(buffer.revision(), revision);
    }

    #[test]
    fn test_clear_and_notify() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        let mut rx = buffer.subscribe();

        buffer.append(event("info", "a"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[test]
    fn test_level_counts() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        buffer.append(event("info", "a"));
        buffer.append(event("error", "b"));
        buffer.append(event("error", "c"));
        buffer.append(event("debug", "d"));

        let counts = buffer.level_counts();
        assert_eq!(counts.info, 1);
        assert_eq!(counts.error, 2);
        assert_eq!(counts.query, 0);
        assert_eq!(counts.other, 1);
        assert_eq!(counts.total(), 4);
    }
}
