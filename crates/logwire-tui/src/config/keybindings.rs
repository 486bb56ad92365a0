use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use logwire_types::{FilterCategory, Level};

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Unlock,
    Notice,
    LogViewer,
    FilterInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Unlock prompt; plain characters go to the credential field
        let mut unlock = HashMap::new();
        unlock.insert(KeyBinding::new(KeyCode::Enter), Action::SubmitCredential);
        unlock.insert(KeyBinding::new(KeyCode::Backspace), Action::CredentialBackspace);
        unlock.insert(KeyBinding::new(KeyCode::Tab), Action::ToggleRemember);
        unlock.insert(KeyBinding::new(KeyCode::Esc), Action::Quit);
        bindings.insert(KeyContext::Unlock, unlock);

        // Notice popup
        let mut notice = HashMap::new();
        notice.insert(KeyBinding::new(KeyCode::Enter), Action::DismissNotice);
        notice.insert(KeyBinding::new(KeyCode::Esc), Action::DismissNotice);
        notice.insert(KeyBinding::new(KeyCode::Char(' ')), Action::DismissNotice);
        bindings.insert(KeyContext::Notice, notice);

        // Log viewer bindings - less-like navigation
        let mut log_viewer = HashMap::new();
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        // Category tabs
        log_viewer.insert(
            KeyBinding::new(KeyCode::Char('a')),
            Action::SelectCategory(FilterCategory::All),
        );
        log_viewer.insert(
            KeyBinding::new(KeyCode::Char('1')),
            Action::SelectCategory(FilterCategory::Only(Level::Info)),
        );
        log_viewer.insert(
            KeyBinding::new(KeyCode::Char('2')),
            Action::SelectCategory(FilterCategory::Only(Level::Error)),
        );
        log_viewer.insert(
            KeyBinding::new(KeyCode::Char('3')),
            Action::SelectCategory(FilterCategory::Only(Level::Query)),
        );
        log_viewer.insert(KeyBinding::new(KeyCode::Tab), Action::NextCategory);
        log_viewer.insert(KeyBinding::new(KeyCode::BackTab), Action::PrevCategory);
        log_viewer.insert(KeyBinding::shift(KeyCode::BackTab), Action::PrevCategory);
        // Search
        log_viewer.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearFilter);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('i')), Action::ToggleCaseSensitive);
        // Toggles and actions
        log_viewer.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleStats);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('e')), Action::ExportLogs);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('L')), Action::Logout);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        log_viewer.insert(KeyBinding::new(KeyCode::Esc), Action::DismissMessage);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Filter input bindings (when search bar is active)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplyFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        bindings.insert(KeyContext::FilterInput, filter_input);

        Self { bindings }
    }

    fn lookup(&self, context: &KeyContext, binding: &KeyBinding) -> Option<Action> {
        self.bindings.get(context)?.get(binding).cloned()
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        self.lookup(&context, &binding)
            .or_else(|| self.lookup(&KeyContext::Global, &binding))
    }

    /// Handle key event on the unlock prompt.
    /// Regular characters become credential input.
    pub fn get_unlock_action(&self, key: &KeyEvent) -> Option<Action> {
        self.get_text_action(KeyContext::Unlock, key, Action::CredentialInput)
    }

    /// Handle key event in filter input mode.
    /// Regular characters become search input.
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        self.get_text_action(KeyContext::FilterInput, key, Action::SearchInput)
    }

    fn get_text_action(
        &self,
        context: KeyContext,
        key: &KeyEvent,
        input: fn(char) -> Action,
    ) -> Option<Action> {
        if let Some(action) = self.get_action(context, key) {
            return Some(action);
        }

        if let KeyCode::Char(c) = key.code
            && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
        {
            return Some(input(c));
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_unlock_treats_letters_as_input() {
        let bindings = KeyBindings::new();

        assert_eq!(
            bindings.get_unlock_action(&key(KeyCode::Char('q'))),
            Some(Action::CredentialInput('q'))
        );
        assert_eq!(
            bindings.get_unlock_action(&KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(Action::CredentialInput('Q'))
        );
        assert_eq!(
            bindings.get_unlock_action(&key(KeyCode::Enter)),
            Some(Action::SubmitCredential)
        );
        assert_eq!(
            bindings.get_unlock_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_log_viewer_bindings() {
        let bindings = KeyBindings::new();

        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('2'))),
            Some(Action::SelectCategory(FilterCategory::Only(Level::Error)))
        );
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            bindings.get_action(
                KeyContext::LogViewer,
                &KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)
            ),
            Some(Action::Logout)
        );
        assert_eq!(bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_filter_input_keeps_ctrl_keys() {
        let bindings = KeyBindings::new();

        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('q'))),
            Some(Action::SearchInput('q'))
        );
        assert_eq!(
            bindings.get_filter_input_action(&KeyEvent::new(
                KeyCode::Char('u'),
                KeyModifiers::CONTROL
            )),
            Some(Action::SearchClear)
        );
        assert_eq!(
            bindings.get_filter_input_action(&KeyEvent::new(
                KeyCode::Char('x'),
                KeyModifiers::ALT
            )),
            None
        );
    }
}
