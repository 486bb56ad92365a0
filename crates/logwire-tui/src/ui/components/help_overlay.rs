use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing log viewer keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Navigation"),
            Self::key_line("j/↓", "Scroll to older"),
            Self::key_line("k/↑", "Scroll to newer"),
            Self::key_line("Ctrl+d", "Page down"),
            Self::key_line("Ctrl+u", "Page up"),
            Self::key_line("g", "Newest event"),
            Self::key_line("G", "Oldest event"),
            Line::from(""),
            Self::section("Categories"),
            Self::key_line("a", "All"),
            Self::key_line("1/2/3", "Info / Error / Query"),
            Self::key_line("Tab", "Next category"),
            Line::from(""),
            Self::section("Actions"),
            Self::key_line("/", "Search messages"),
            Self::key_line("n", "Clear search"),
            Self::key_line("i", "Toggle case sensitivity"),
            Self::key_line("s", "Toggle stats bar"),
            Self::key_line("e", "Export visible logs"),
            Self::key_line("L", "Log out"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q", "Quit"),
        ];

        let area = Layout::centered(frame.area(), 46, help_text.len() as u16 + 2);
        frame.render_widget(Clear, area);

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, area);
    }

    fn section(name: &str) -> Line<'_> {
        Line::from(Span::styled(name, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
