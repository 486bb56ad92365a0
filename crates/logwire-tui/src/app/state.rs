use logwire_logs::{FilterView, LogBuffer, TextFilter};
use logwire_session::{CredentialInput, Notice};
use logwire_transport::LinkStatus;
use logwire_types::{FilterCategory, SessionState};

/// Screen enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Unlock,
    LogViewer,
}

impl Screen {
    /// The screen shown for a session state
    pub fn for_state(state: SessionState) -> Self {
        if state.is_unlocked() {
            Self::LogViewer
        } else {
            Self::Unlock
        }
    }
}

/// Read-only view of the session handed to the screens on every frame
pub struct SessionView<'a> {
    pub state: SessionState,
    pub input: &'a CredentialInput,
    pub notice: Option<&'a Notice>,
    pub remember_enabled: bool,
    pub buffer: &'a LogBuffer,
    pub link: LinkStatus,
}

/// UI-specific transient state
pub struct UiState {
    /// Is search/filter bar active?
    pub search_active: bool,

    /// Current search input text
    pub search_input: String,

    /// Filter input error message (e.g., invalid regex)
    pub filter_error: Option<String>,

    /// Case insensitive search?
    pub filter_case_insensitive: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show statistics bar?
    pub stats_visible: bool,

    /// Rows scrolled away from the newest event
    pub log_scroll: usize,

    /// Height of the log list at the last render, for paging
    pub page_size: usize,

    /// Transient message (export result and the like)
    pub message: Option<String>,

    /// Active category and search over the buffer
    pub view: FilterView,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search_active: false,
            search_input: String::new(),
            filter_error: None,
            filter_case_insensitive: true,
            help_visible: false,
            stats_visible: false,
            log_scroll: 0,
            page_size: 10,
            message: None,
            view: FilterView::default(),
        }
    }
}

/// Global application state
pub struct AppState {
    /// Endpoint shown in the header
    pub endpoint: String,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    /// Forget everything tied to the previous session
    pub fn reset_viewer(&mut self) {
        let stats_visible = self.ui_state.stats_visible;
        self.ui_state = UiState {
            stats_visible,
            ..UiState::default()
        };
    }

    pub fn category(&self) -> &FilterCategory {
        self.ui_state.view.category()
    }

    /// Switch category and jump back to the newest event
    pub fn select_category(&mut self, category: FilterCategory) {
        self.ui_state.view.set_category(category);
        self.ui_state.log_scroll = 0;
    }

    pub fn next_category(&mut self) {
        let next = self.category().next();
        self.select_category(next);
    }

    pub fn prev_category(&mut self) {
        let prev = self.category().prev();
        self.select_category(prev);
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
    }

    /// Clamped against the visible count at render time
    pub fn scroll_down(&mut self, n: usize) {
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.ui_state.log_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.ui_state.log_scroll = usize::MAX;
    }

    pub fn show_message(&mut self, msg: String) {
        self.ui_state.message = Some(msg);
    }

    pub fn dismiss_message(&mut self) {
        self.ui_state.message = None;
    }

    /// Start search/filter input mode
    pub fn start_search(&mut self) {
        self.ui_state.search_active = true;
        self.ui_state.search_input = self
            .ui_state
            .view
            .search()
            .map(|s| s.pattern().to_string())
            .unwrap_or_default();
        self.ui_state.filter_error = None;
    }

    /// Leave search input without touching the active filter
    pub fn cancel_search(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
    }

    /// Apply the current search input as a filter
    pub fn apply_filter(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.filter_error = None;
        self.ui_state.log_scroll = 0;

        if self.ui_state.search_input.is_empty() {
            self.ui_state.view.set_search(None);
            return;
        }

        match TextFilter::new(
            &self.ui_state.search_input,
            self.ui_state.filter_case_insensitive,
        ) {
            Ok(filter) => self.ui_state.view.set_search(Some(filter)),
            Err(e) => {
                self.ui_state.filter_error = Some(format!("Invalid regex: {}", e));
                // Keep input open to fix
                self.ui_state.search_active = true;
            }
        }
    }

    /// Clear the active filter
    pub fn clear_filter(&mut self) {
        self.ui_state.view.set_search(None);
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
    }

    /// Flip case sensitivity and re-apply the active pattern
    pub fn toggle_case_sensitive(&mut self) {
        self.ui_state.filter_case_insensitive = !self.ui_state.filter_case_insensitive;

        let pattern = self.ui_state.view.search().map(|s| s.pattern().to_string());
        if let Some(pattern) = pattern
            && !self.ui_state.search_active
        {
            self.ui_state.search_input = pattern;
            self.apply_filter();
        }
    }

    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }
}
