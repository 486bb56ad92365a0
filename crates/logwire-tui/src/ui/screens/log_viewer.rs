use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Tabs},
};

use logwire_logs::{ArcLogEvent, LogBuffer, LogEvent, TextFilter};
use logwire_transport::LinkStatus;
use logwire_types::{FilterCategory, Level};

use crate::app::{AppState, SessionView};
use crate::ui::Theme;
use crate::ui::components::{NoticePopup, StatusBar};

/// Live, newest-first log list with category tabs
pub struct LogViewerScreen;

impl LogViewerScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, session: &SessionView) {
        let area = frame.area();

        let show_filter_bar = state.ui_state.search_active
            || state.ui_state.view.search().is_some()
            || state.ui_state.filter_error.is_some();

        let mut constraints = vec![Constraint::Length(3), Constraint::Length(3)]; // Header, tabs
        if state.ui_state.stats_visible {
            constraints.push(Constraint::Length(3));
        }
        if show_filter_bar {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Min(1)); // Logs
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let mut chunks = chunks.iter().copied();
        let mut next = || chunks.next().unwrap_or_default();

        Self::render_header(frame, next(), state, session);
        Self::render_tabs(frame, next(), state.category());
        if state.ui_state.stats_visible {
            Self::render_stats_bar(frame, next(), session.buffer);
        }
        if show_filter_bar {
            Self::render_filter_bar(frame, next(), state);
        }
        let visible_count = Self::render_logs(frame, next(), state, session.buffer);
        Self::render_status_bar(frame, next(), visible_count, session.buffer);

        if let Some(message) = &state.ui_state.message {
            NoticePopup::render(frame, "logwire", message, Theme::title());
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, session: &SessionView) {
        let link = link_span(session.state.is_connected(), &session.link);

        let mut title = vec![
            Span::styled("logwire", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.endpoint.as_str(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            link,
        ];
        if !session.state.is_connected()
            && let Some(err) = &session.link.last_error
        {
            title.push(Span::styled(" │ ", Theme::text_dim()));
            title.push(Span::styled(err.clone(), Theme::text_dim()));
        }

        let header = Paragraph::new(Line::from(title)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_tabs(frame: &mut Frame, area: Rect, category: &FilterCategory) {
        let tabs = FilterCategory::tabs();
        let selected = tabs.iter().position(|t| t == category);

        let titles: Vec<Line> = tabs
            .iter()
            .map(|t| Line::from(format!(" {} ", t.label())))
            .collect();

        let widget = Tabs::new(titles)
            .select(selected)
            .style(Theme::tab())
            .highlight_style(Theme::tab_selected())
            .divider("│")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Span::styled(" Category ", Theme::title())),
            );

        frame.render_widget(widget, area);
    }

    fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let ui = &state.ui_state;
        let mut spans = vec![];

        if ui.search_active {
            spans.push(Span::styled(
                " /",
                Style::default()
                    .fg(Theme::ATTENTION)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(" Search: ", Theme::text_dim()));
        }

        let pattern = if ui.search_active {
            ui.search_input.as_str()
        } else {
            ui.view.search().map(|s| s.pattern()).unwrap_or("")
        };
        spans.push(Span::styled(pattern.to_string(), Theme::text_highlight()));

        if ui.search_active {
            spans.push(Span::styled(
                "█",
                Style::default()
                    .fg(Theme::ATTENTION)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        if let Some(err) = &ui.filter_error {
            spans.push(Span::styled(format!(" ⚠ {}", err), Theme::error()));
        }

        let case_text = if ui.filter_case_insensitive {
            "  [i] case-insensitive"
        } else {
            "  [I] case-sensitive"
        };
        spans.push(Span::styled(case_text, Theme::text_dim()));

        if ui.search_active {
            spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", Theme::text_dim()));
        } else {
            spans.push(Span::styled("  [n] Clear  [/] Edit", Theme::text_dim()));
        }

        let border = if ui.search_active {
            Style::default().fg(Theme::ATTENTION)
        } else if ui.filter_error.is_some() {
            Style::default().fg(Theme::FAILURE)
        } else {
            Theme::border()
        };

        let filter_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Span::styled(" Search ", Theme::title())),
        );

        frame.render_widget(filter_bar, area);
    }

    /// Renders the visible page and returns the number of visible events
    fn render_logs(frame: &mut Frame, area: Rect, state: &mut AppState, buffer: &LogBuffer) -> usize {
        let inner_height = area.height.saturating_sub(2) as usize;
        let ui = &mut state.ui_state;
        ui.page_size = inner_height.max(1);

        let visible = ui.view.visible(buffer);
        let total = visible.len();

        let max_scroll = max_scroll(visible, inner_height);
        ui.log_scroll = ui.log_scroll.min(max_scroll);

        let mut rows = 0;
        let page: Vec<ArcLogEvent> = visible
            .iter()
            .skip(ui.log_scroll)
            .take_while(|e| {
                let fits = rows < inner_height;
                rows += line_count(e);
                fits
            })
            .cloned()
            .collect();

        let search = ui.view.search();
        let lines: Vec<Line> = page
            .iter()
            .flat_map(|event| format_event_lines(event, search))
            .collect();

        let title = if search.is_some() || *ui.view.category() != FilterCategory::All {
            format!(" Logs ({} of {}) ", total, buffer.len())
        } else {
            format!(" Logs ({}) ", total)
        };

        let body = if total == 0 {
            Paragraph::new(Line::from(Span::styled(
                " Waiting for events…",
                Theme::text_dim(),
            )))
        } else {
            Paragraph::new(lines)
        };

        frame.render_widget(
            body.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Span::styled(title, Theme::title())),
            ),
            area,
        );

        if max_scroll > 0 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(ui.log_scroll);

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        total
    }

    fn render_stats_bar(frame: &mut Frame, area: Rect, buffer: &LogBuffer) {
        let counts = buffer.level_counts();

        let mut spans = vec![Span::styled(" ", Theme::text())];
        for (level, count) in [
            (Level::Info, counts.info),
            (Level::Error, counts.error),
            (Level::Query, counts.query),
        ] {
            spans.push(Span::styled(
                format!("{}:", level.label()),
                Style::default()
                    .fg(level.color())
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(format!("{} ", count), Theme::text()));
        }

        // Unknown levels only if any arrived
        if counts.other > 0 {
            spans.push(Span::styled("OTHER:", Theme::text_highlight()));
            spans.push(Span::styled(format!("{} ", counts.other), Theme::text()));
        }

        spans.push(Span::styled("│ ", Theme::text_dim()));
        spans.push(Span::styled("Total:", Theme::text_dim()));
        spans.push(Span::styled(format!("{} ", counts.total()), Theme::text()));
        spans.push(Span::styled("Capacity:", Theme::text_dim()));
        spans.push(Span::styled(buffer.capacity().to_string(), Theme::text()));

        let stats_widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Stats ", Theme::title())),
        );

        frame.render_widget(stats_widget, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, visible: usize, buffer: &LogBuffer) {
        let hints = [
            ("Tab", "Category"),
            ("/", "Search"),
            ("s", "Stats"),
            ("e", "Export"),
            ("L", "Logout"),
            ("?", "Help"),
            ("q", "Quit"),
        ];

        let status = StatusBar::new()
            .hints(hints)
            .right(format!("{} / {} logs", visible, buffer.len()));

        frame.render_widget(status, area);
    }
}

/// Display rows taken by one event
fn line_count(event: &LogEvent) -> usize {
    event.message.split('\n').count()
}

/// Largest scroll offset that still fills the viewport
/// Connectivity indicator for the header
fn link_span(connected: bool, link: &LinkStatus) -> Span<'static> {
    if connected {
        let transport = link
            .transport
            .map(|t| format!(" ({})", t))
            .unwrap_or_default();
        Span::styled(format!("● connected{}", transport), Theme::connected())
    } else if link.gave_up {
        Span::styled("✕ disconnected, press L to log out", Theme::error())
    } else if link.failed_attempts > 0 {
        Span::styled(
            format!("◌ reconnecting… (attempt {})", link.failed_attempts + 1),
            Theme::reconnecting(),
        )
    } else {
        Span::styled("◌ connecting…", Theme::reconnecting())
    }
}

fn max_scroll(events: &[ArcLogEvent], height: usize) -> usize {
    let mut rows = 0;
    for (i, event) in events.iter().enumerate().rev() {
        rows += line_count(event);
        if rows > height {
            return (i + 1).min(events.len().saturating_sub(1));
        }
    }
    0
}

/// Render one event as `timestamp [LEVEL]: message`.
///
/// The message is kept verbatim; every embedded line break starts a new row
/// indented under the first.
pub(crate) fn format_event_lines(event: &LogEvent, search: Option<&TextFilter>) -> Vec<Line<'static>> {
    let level_style = Style::default()
        .fg(event.level.color())
        .add_modifier(Modifier::BOLD);

    let prefix = vec![
        Span::styled(format!("{} ", event.timestamp), Theme::text_dim()),
        Span::styled(format!("[{}]:", event.level.label()), level_style),
        Span::raw(" "),
    ];
    let indent: usize = prefix.iter().map(|s| s.width()).sum();

    event
        .message
        .split('\n')
        .enumerate()
        .map(|(i, text)| {
            let text = text.strip_suffix('\r').unwrap_or(text);
            let mut spans = if i == 0 {
                prefix.clone()
            } else {
                vec![Span::raw(" ".repeat(indent))]
            };
            spans.extend(highlight(text, search));
            Line::from(spans)
        })
        .collect()
}

/// Split a message line into plain and search-match spans
fn highlight(text: &str, search: Option<&TextFilter>) -> Vec<Span<'static>> {
    let matches = search.map(|s| s.find_matches(text)).unwrap_or_default();
    if matches.is_empty() {
        return vec![Span::styled(text.to_string(), Theme::text())];
    }

    let mut spans = Vec::new();
    let mut last_end = 0;
    for (start, end) in matches {
        if start > last_end {
            spans.push(Span::styled(text[last_end..start].to_string(), Theme::text()));
        }
        spans.push(Span::styled(text[start..end].to_string(), Theme::search_match()));
        last_end = end;
    }
    if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), Theme::text()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn event(message: &str) -> ArcLogEvent {
        Arc::new(LogEvent::new(Level::Info, message, "10:00"))
    }

    #[test]
    fn test_multiline_message_is_verbatim_and_indented() {
        let event = LogEvent::new(Level::Query, "SELECT *\n  FROM users", "10:00:01");
        let lines = format_event_lines(&event, None);

        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "10:00:01 [QUERY]: SELECT *");
        // "10:00:01 [QUERY]: " is 18 columns wide
        assert_eq!(line_text(&lines[1]), format!("{}  FROM users", " ".repeat(18)));
    }

    #[test]
    fn test_unknown_level_label() {
        let event = LogEvent::new(Level::parse("warn"), "disk low", "t");
        let lines = format_event_lines(&event, None);
        assert_eq!(line_text(&lines[0]), "t [WARN]: disk low");
    }

    #[test]
    fn test_search_matches_are_split_out() {
        let filter = TextFilter::new("time", true).unwrap();
        let spans = highlight("DB Timeout after timeout", Some(&filter));

        let texts: Vec<_> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["DB ", "Time", "out after ", "time", "out"]);
        assert_eq!(spans[1].style, Theme::search_match());
    }

    #[test]
    fn test_max_scroll_fills_last_page() {
        let events: Vec<_> = (0..10).map(|i| event(&i.to_string())).collect();
        assert_eq!(max_scroll(&events, 4), 6);
        assert_eq!(max_scroll(&events, 20), 0);

        let tall = vec![event("a"), event("b\nc\nd"), event("e")];
        assert_eq!(max_scroll(&tall, 3), 2);
    }

    #[test]
    fn test_link_indicator_reflects_reconnect_state() {
        let mut link = LinkStatus {
            failed_attempts: 2,
            ..Default::default()
        };
        assert_eq!(link_span(false, &link).content, "◌ reconnecting… (attempt 3)");

        link.gave_up = true;
        let span = link_span(false, &link);
        assert_eq!(span.content, "✕ disconnected, press L to log out");
        assert_eq!(span.style, Theme::error());

        assert_eq!(link_span(false, &LinkStatus::default()).content, "◌ connecting…");
    }
}
