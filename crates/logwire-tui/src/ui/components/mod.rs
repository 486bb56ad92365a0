mod help_overlay;
mod notice;
mod status_bar;

pub use help_overlay::HelpOverlay;
pub use notice::NoticePopup;
pub use status_bar::StatusBar;
