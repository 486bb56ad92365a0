mod config;
mod export;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::KeyEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use logwire_session::{AccessGate, FileStore, KeyValueStore, MemoryStore, Session};
use logwire_transport::{Connection, ConnectionManager, TransportKind};
use logwire_tui::{
    Action, AppState, Event, EventHandler, HelpOverlay, KeyBindings, KeyContext, LogViewerScreen,
    Screen, SessionView, Tui, UnlockScreen,
};
use logwire_types::Capacity;

use crate::config::Config;

/// logwire - A terminal client for live application logs over Socket.IO
///
/// The secret is read from the config file or LOGWIRE_SECRET only.
#[derive(Parser, Debug)]
#[command(name = "logwire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: <config dir>/logwire/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log source URL, e.g. https://logs.example.com/
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Events to retain: a positive number or "unbounded"
    #[arg(long, value_name = "N")]
    capacity: Option<Capacity>,

    /// Transport to try, in preference order (repeatable)
    #[arg(long = "transport", value_name = "websocket|polling")]
    transports: Vec<TransportKind>,

    /// Never persist the credential
    #[arg(long)]
    no_remember: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    // Configuration errors surface before the terminal is touched
    let config = Config::load(&args)?;

    run_app(config).await
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

async fn run_app(config: Config) -> Result<()> {
    let endpoint = config.transport.endpoint.to_string();
    let gate = AccessGate::new(config.secret);
    let connection = ConnectionManager::new(config.transport);

    match config.state_path {
        Some(path) => {
            let session = Session::new(gate, FileStore::open(path), connection, config.capacity);
            run_session(session.with_remember(config.remember), endpoint).await
        }
        None => {
            let session = Session::new(gate, MemoryStore::new(), connection, config.capacity);
            run_session(session.with_remember(false), endpoint).await
        }
    }
}

async fn run_session<S: KeyValueStore>(
    mut session: Session<ConnectionManager, S>,
    endpoint: String,
) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut state = AppState::new(endpoint);
    let mut session_rx = session.subscribe();

    session.restore();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    let keybindings = KeyBindings::new();

    render(&mut tui, &mut state, &session)?;

    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        if let Some(action) = key_action(&keybindings, &state, &session, &key) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    // Redraw keeps the connectivity indicator current
                    Event::Tick => {}
                    Event::Error(e) => {
                        warn!(error = %e, "terminal input error");
                    }
                }
            }

            // Connectivity changes and received events, in arrival order
            Some(event) = session.next_event() => {
                session.handle(event);
            }

            // Session state changes
            Ok(()) = session_rx.changed() => {
                let current = *session_rx.borrow_and_update();
                if Screen::for_state(current) == Screen::Unlock {
                    state.reset_viewer();
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &mut session, action);
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state, &session)?;
    }

    info!("shutting down");
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn key_action<C: Connection, S: KeyValueStore>(
    keybindings: &KeyBindings,
    state: &AppState,
    session: &Session<C, S>,
    key: &KeyEvent,
) -> Option<Action> {
    match Screen::for_state(session.state()) {
        Screen::Unlock if session.notice().is_some() => {
            keybindings.get_action(KeyContext::Notice, key)
        }
        Screen::Unlock => keybindings.get_unlock_action(key),
        Screen::LogViewer if state.ui_state.message.is_some() => {
            match keybindings.get_action(KeyContext::Notice, key) {
                Some(Action::DismissNotice) => Some(Action::DismissMessage),
                other => other,
            }
        }
        Screen::LogViewer if state.ui_state.help_visible => {
            match keybindings.get_action(KeyContext::LogViewer, key) {
                Some(Action::ToggleHelp | Action::DismissMessage) => Some(Action::ToggleHelp),
                Some(Action::Quit) => Some(Action::Quit),
                _ => None,
            }
        }
        Screen::LogViewer if state.ui_state.search_active => {
            keybindings.get_filter_input_action(key)
        }
        Screen::LogViewer => keybindings.get_action(KeyContext::LogViewer, key),
    }
}

fn handle_action<C: Connection, S: KeyValueStore>(
    state: &mut AppState,
    session: &mut Session<C, S>,
    action: Action,
) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }

        // Unlock prompt
        Action::CredentialInput(c) => session.input_mut().push(c),
        Action::CredentialBackspace => session.input_mut().pop(),
        Action::SubmitCredential => {
            // The unlock prompt is gone once this succeeds; carry any notice over
            if session.submit().is_unlocked()
                && let Some(notice) = session.notice()
            {
                state.show_message(notice.to_string());
                session.dismiss_notice();
            }
        }
        Action::ToggleRemember => {
            if session.remember_enabled() {
                session.input_mut().toggle_remember();
            }
        }
        Action::DismissNotice => session.dismiss_notice(),

        // Category tabs
        Action::SelectCategory(category) => state.select_category(category),
        Action::NextCategory => state.next_category(),
        Action::PrevCategory => state.prev_category(),

        // Scrolling
        Action::ScrollUp(n) => state.scroll_up(n),
        Action::ScrollDown(n) => state.scroll_down(n),
        Action::ScrollToTop => state.scroll_to_top(),
        Action::ScrollToBottom => state.scroll_to_bottom(),
        Action::PageUp => state.scroll_up(state.ui_state.page_size),
        Action::PageDown => state.scroll_down(state.ui_state.page_size),

        // Search
        Action::OpenSearch => state.start_search(),
        Action::CloseSearch => state.cancel_search(),
        Action::SearchInput(c) => state.search_input_char(c),
        Action::SearchBackspace => state.search_input_backspace(),
        Action::SearchClear => state.ui_state.search_input.clear(),
        Action::ApplyFilter => state.apply_filter(),
        Action::ClearFilter => state.clear_filter(),
        Action::ToggleCaseSensitive => state.toggle_case_sensitive(),

        Action::ToggleStats => {
            state.ui_state.stats_visible = !state.ui_state.stats_visible;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }

        Action::ExportLogs => export_visible(state, session),
        Action::Logout => session.logout(),
        Action::DismissMessage => state.dismiss_message(),

        Action::Render => {}
    }
}

/// Export what the log viewer currently shows
fn export_visible<C: Connection, S: KeyValueStore>(state: &mut AppState, session: &Session<C, S>) {
    let path = export::default_filename();
    let visible = state.ui_state.view.visible(session.buffer());

    let message = match export::export_events(&path, visible) {
        Ok(count) => {
            info!(count, path = %path.display(), "exported logs");
            format!("Exported {} logs to {}", count, path.display())
        }
        Err(e) => {
            warn!(error = %e, "export failed");
            format!("Export failed: {:#}", e)
        }
    };

    state.show_message(message);
}

fn render<S: KeyValueStore>(
    tui: &mut Tui,
    state: &mut AppState,
    session: &Session<ConnectionManager, S>,
) -> Result<()> {
    let view = SessionView {
        state: session.state(),
        input: session.input(),
        notice: session.notice(),
        remember_enabled: session.remember_enabled(),
        buffer: session.buffer(),
        link: session.connection().status(),
    };

    tui.terminal().draw(|frame| match Screen::for_state(view.state) {
        Screen::Unlock => UnlockScreen::render(frame, state, &view),
        Screen::LogViewer => {
            LogViewerScreen::render(frame, state, &view);
            if state.ui_state.help_visible {
                HelpOverlay::render(frame);
            }
        }
    })?;

    Ok(())
}
