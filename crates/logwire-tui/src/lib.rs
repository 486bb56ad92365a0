//! TUI components for logwire
//!
//! This crate provides the terminal user interface for logwire: the unlock
//! prompt, the live log viewer, keybindings, and terminal event handling.
//! It only reads session state; every change goes through an [`Action`].

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Screen, SessionView, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, NoticePopup, StatusBar};
pub use ui::screens::{LogViewerScreen, UnlockScreen};
pub use ui::{Layout, Theme};
