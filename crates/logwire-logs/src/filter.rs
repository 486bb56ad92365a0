use regex::{Regex, RegexBuilder};

use logwire_types::{FilterCategory, LogEvent};

use crate::{ArcLogEvent, LogBuffer};

/// Select the events of a snapshot that belong to `category`.
///
/// Ordering is preserved; [`FilterCategory::All`] returns the input unchanged.
pub fn visible(snapshot: &[ArcLogEvent], category: &FilterCategory) -> Vec<ArcLogEvent> {
    match category {
        FilterCategory::All => snapshot.to_vec(),
        category => snapshot
            .iter()
            .filter(|e| category.matches(&e.level))
            .cloned()
            .collect(),
    }
}

/// Compiled text search over event messages
#[derive(Clone)]
pub struct TextFilter {
    regex: Regex,

    /// Pattern as typed
    pattern: String,

    case_insensitive: bool,
}

impl TextFilter {
    /// Compile a pattern
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;

        Ok(Self {
            regex,
            pattern: pattern.to_string(),
            case_insensitive,
        })
    }

    /// Check if an event's message matches
    pub fn matches(&self, event: &LogEvent) -> bool {
        self.regex.is_match(&event.message)
    }

    /// Find all match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl std::fmt::Debug for TextFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFilter")
            .field("pattern", &self.pattern)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

/// Key the cached result was computed for
#[derive(Clone, Debug, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    category: FilterCategory,
    pattern: Option<(String, bool)>,
}

/// Projection of a [`LogBuffer`] through the active category and search.
///
/// Holds no events of its own beyond a cache of the last result, which is
/// reused while the buffer revision, category, and search are unchanged.
#[derive(Default)]
pub struct FilterView {
    category: FilterCategory,
    search: Option<TextFilter>,
    cache: Option<(CacheKey, Vec<ArcLogEvent>)>,
}

impl FilterView {
    pub fn new(category: FilterCategory) -> Self {
        Self {
            category,
            search: None,
            cache: None,
        }
    }

    pub fn category(&self) -> &FilterCategory {
        &self.category
    }

    pub fn set_category(&mut self, category: FilterCategory) {
        self.category = category;
    }

    pub fn search(&self) -> Option<&TextFilter> {
        self.search.as_ref()
    }

    pub fn set_search(&mut self, search: Option<TextFilter>) {
        self.search = search;
    }

    /// Events currently visible, newest first
    pub fn visible(&mut self, buffer: &LogBuffer) -> &[ArcLogEvent] {
        let key = CacheKey {
            revision: buffer.revision(),
            category: self.category.clone(),
            pattern: self
                .search
                .as_ref()
                .map(|s| (s.pattern().to_string(), s.is_case_insensitive())),
        };

        let stale = !matches!(&self.cache, Some((cached, _)) if *cached == key);
        if stale {
            let mut entries = visible(&buffer.snapshot(), &self.category);
            if let Some(search) = &self.search {
                entries.retain(|e| search.matches(e));
            }
            self.cache = Some((key, entries));
        }

        match &self.cache {
            Some((_, entries)) => entries.as_slice(),
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwire_types::{Capacity, Level};
    use std::sync::Arc;

    fn event(level: &str, message: &str) -> ArcLogEvent {
        Arc::new(LogEvent::new(Level::parse(level), message, "ts"))
    }

    fn sample() -> Vec<ArcLogEvent> {
        vec![event("query", "C"), event("error", "B"), event("info", "A")]
    }

    #[test]
    fn test_visible_by_category() {
        let result = visible(&sample(), &FilterCategory::parse("error"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].message, "B");
    }

    #[test]
    fn test_visible_all_is_identity() {
        let snapshot = sample();
        assert_eq!(visible(&snapshot, &FilterCategory::All), snapshot);
    }

    #[test]
    fn test_visible_is_ordered_subset() {
        let snapshot = vec![
            event("info", "4"),
            event("error", "3"),
            event("info", "2"),
            event("trace", "1"),
        ];

        let result = visible(&snapshot, &FilterCategory::parse("info"));
        let messages: Vec<_> = result.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["4", "2"]);
        assert!(result.iter().all(|e| e.level == Level::Info));
    }

    #[test]
    fn test_unrecognised_category_is_empty() {
        let snapshot = vec![event("trace", "x"), event("info", "y")];
        assert!(visible(&snapshot, &FilterCategory::parse("trace")).is_empty());
    }

    #[test]
    fn test_text_filter() {
        let filter = TextFilter::new("timeout", true).unwrap();
        assert!(filter.matches(&LogEvent::new(Level::Error, "DB TIMEOUT after 5s", "ts")));
        assert!(!filter.matches(&LogEvent::new(Level::Error, "ok", "ts")));

        let strict = TextFilter::new("timeout", false).unwrap();
        assert!(!strict.matches(&LogEvent::new(Level::Error, "DB TIMEOUT", "ts")));
    }

    #[test]
    fn test_find_matches() {
        let filter = TextFilter::new("error", false).unwrap();
        let matches = filter.find_matches("an error occurred, another error here");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_view_tracks_buffer_and_category() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        buffer.append(LogEvent::new(Level::Info, "A", "ts"));
        buffer.append(LogEvent::new(Level::Error, "B", "ts"));

        let mut view = FilterView::new(FilterCategory::parse("error"));
        assert_eq!(view.visible(&buffer).len(), 1);

        buffer.append(LogEvent::new(Level::Error, "C", "ts"));
        let messages: Vec<_> = view.visible(&buffer).iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages, vec!["C", "B"]);

        view.set_category(FilterCategory::All);
        assert_eq!(view.visible(&buffer).len(), 3);

        // Changing the category never touches the buffer
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_view_combines_search() {
        let mut buffer = LogBuffer::new(Capacity::Unbounded);
        buffer.append(LogEvent::new(Level::Info, "user 7 checked in", "ts"));
        buffer.append(LogEvent::new(Level::Info, "user 9 checked out", "ts"));

        let mut view = FilterView::default();
        view.set_search(Some(TextFilter::new("checked in", true).unwrap()));
        assert_eq!(view.visible(&buffer).len(), 1);

        view.set_search(None);
        assert_eq!(view.visible(&buffer).len(), 2);
    }
}
