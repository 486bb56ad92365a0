use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use logwire_types::SessionState;

use crate::{
    app::{AppState, SessionView},
    ui::{
        Layout, Theme,
        components::{NoticePopup, StatusBar},
    },
};

/// Credential prompt shown while the session is locked
pub struct UnlockScreen;

impl UnlockScreen {
    pub fn render(frame: &mut Frame, state: &AppState, session: &SessionView) {
        let (header_area, content_area, status_area) = Layout::main(frame.area());

        Self::render_header(frame, header_area, state);
        Self::render_prompt(frame, content_area, session);
        Self::render_status_bar(frame, status_area, session);

        if let Some(notice) = session.notice {
            NoticePopup::render(frame, "Access denied", &notice.to_string(), Theme::error());
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = Line::from(vec![
            Span::styled("logwire", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.endpoint.as_str(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled("locked", Theme::text_highlight()),
        ]);

        let header = Paragraph::new(title).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_prompt(frame: &mut Frame, area: Rect, session: &SessionView) {
        let area = Layout::centered(area, 44, 8);
        let checking = session.state == SessionState::Unlocking;

        let mut input = vec![
            Span::styled(" Password: ", Theme::text_dim()),
            Span::styled(session.input.masked(), Theme::text_highlight()),
        ];
        if !checking {
            input.push(Span::styled(
                "█",
                Style::default()
                    .fg(Theme::ATTENTION)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        let mut lines = vec![Line::from(""), Line::from(input), Line::from("")];

        if session.remember_enabled {
            let mark = if session.input.remember() { "x" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(format!(" [{}] ", mark), Theme::text_highlight()),
                Span::styled("Remember me", Theme::text()),
            ]));
        }

        if checking {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(" Checking…", Theme::text_dim())));
        }

        let prompt = Paragraph::new(lines).alignment(Alignment::Left).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::prompt_border())
                .title(Span::styled(" Unlock ", Theme::title())),
        );

        frame.render_widget(prompt, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, session: &SessionView) {
        let mut hints = vec![("Enter", "Unlock")];
        if session.remember_enabled {
            hints.push(("Tab", "Remember"));
        }
        hints.push(("Esc", "Quit"));

        frame.render_widget(StatusBar::new().hints(hints), area);
    }
}
