use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::Theme;

/// One-line bar of key hints with optional right-aligned text
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(desc.to_string(), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text is dropped rather than overlapping the hints
        if let Some(right) = self.right_text {
            let right_width = Line::from(right.as_str()).width() as u16;
            let right_x = area.x + area.width.saturating_sub(right_width + 1);
            if right_x > area.x + line_width + 2 {
                let span = Span::styled(right.as_str(), Theme::status_bar());
                buf.set_span(right_x, area.y, &span, right_width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_hints_and_right_text() {
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints([("q", "Quit")])
            .right("3 logs")
            .render(area, &mut buf);

        let text = row(&buf);
        assert!(text.starts_with(" [q]Quit"));
        assert!(text.trim_end().ends_with("3 logs"));
    }

    #[test]
    fn test_drops_right_text_when_crowded() {
        let area = Rect::new(0, 0, 16, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints([("Enter", "Unlock")])
            .right("remember")
            .render(area, &mut buf);

        assert!(!row(&buf).contains("remember"));
    }
}
