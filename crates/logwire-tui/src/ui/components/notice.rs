use ratatui::{
    Frame,
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{Layout, Theme};

/// Dismissible popup centered over the current screen
pub struct NoticePopup;

impl NoticePopup {
    pub fn render(frame: &mut Frame, title: &str, message: &str, style: Style) {
        let width = (message.chars().count() as u16 + 6).clamp(30, 70);
        let area = Layout::centered(frame.area(), width, 7);

        frame.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message.to_string(), Theme::text())),
            Line::from(""),
            Line::from(Span::styled("[Enter] Dismiss", Theme::text_dim())),
        ];

        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title(Span::styled(format!(" {} ", title), style)),
            );

        frame.render_widget(popup, area);
    }
}
