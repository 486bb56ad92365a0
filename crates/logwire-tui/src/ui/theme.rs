use ratatui::style::{Color, Modifier, Style};

/// Styles shared by the unlock prompt and the log viewer
pub struct Theme;

impl Theme {
    pub const ACCENT: Color = Color::Cyan;
    pub const MUTED: Color = Color::DarkGray;
    pub const ATTENTION: Color = Color::Yellow;
    pub const HEALTHY: Color = Color::Green;
    pub const FAILURE: Color = Color::Red;

    const BAR: Color = Color::DarkGray;

    fn bold(color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::MUTED)
    }

    /// Frame of the credential prompt
    pub fn prompt_border() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn title() -> Style {
        Self::bold(Self::ACCENT)
    }

    /// Log messages and other body text
    pub fn text() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn text_highlight() -> Style {
        Self::bold(Self::ATTENTION)
    }

    pub fn tab() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn tab_selected() -> Style {
        Style::default()
            .fg(Color::Reset)
            .bg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn connected() -> Style {
        Self::bold(Self::HEALTHY)
    }

    pub fn reconnecting() -> Style {
        Self::bold(Self::ATTENTION)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BAR)
    }

    pub fn status_bar_key() -> Style {
        Self::bold(Self::ATTENTION).bg(Self::BAR)
    }

    /// Text search hits inside a message
    pub fn search_match() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::ATTENTION)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Self::bold(Self::FAILURE)
    }
}
