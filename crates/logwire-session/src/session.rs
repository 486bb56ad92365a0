use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use logwire_logs::{Capacity, LogBuffer};
use logwire_transport::{Connection, ConnectionEvent};
use logwire_types::{Link, SessionState};

use crate::gate::{AccessGate, CredentialInput, REMEMBER_KEY};
use crate::store::KeyValueStore;

/// Dismissible message for the operator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    WrongCredential,
    StoreFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongCredential => f.write_str("Incorrect password"),
            Self::StoreFailed(e) => write!(f, "Could not update remembered password: {}", e),
        }
    }
}

/// Authenticated log session.
///
/// Owns the connection and the log buffer, and moves between
/// `Locked`, `Unlocking` and `Unlocked(Link)`. The connection is opened
/// only after the gate accepts a credential, and inbound events reach the
/// buffer only while unlocked.
pub struct Session<C, S> {
    gate: AccessGate,
    store: S,
    connection: C,
    state: watch::Sender<SessionState>,
    input: CredentialInput,
    notice: Option<Notice>,
    buffer: LogBuffer,
    remember_enabled: bool,
}

impl<C: Connection, S: KeyValueStore> Session<C, S> {
    pub fn new(gate: AccessGate, store: S, connection: C, capacity: Capacity) -> Self {
        let (state, _) = watch::channel(SessionState::Locked);
        Self {
            gate,
            store,
            connection,
            state,
            input: CredentialInput::default(),
            notice: None,
            buffer: LogBuffer::new(capacity),
            remember_enabled: true,
        }
    }

    /// Allow or forbid persisting the credential
    pub fn with_remember(mut self, enabled: bool) -> Self {
        self.remember_enabled = enabled;
        self
    }

    /// Read the remembered credential once and unlock with it if it still
    /// matches. A stale credential is forgotten.
    pub fn restore(&mut self) {
        if !self.remember_enabled || self.state() != SessionState::Locked {
            return;
        }
        let Some(saved) = self.store.get(REMEMBER_KEY) else {
            return;
        };

        self.set_state(SessionState::Unlocking);
        if self.gate.check(&saved) {
            info!("unlocked with remembered credential");
            self.input.set_remember(true);
            self.unlock();
        } else {
            info!("remembered credential no longer matches; forgetting it");
            if let Err(e) = self.store.delete(REMEMBER_KEY) {
                warn!(error = %e, "failed to delete remembered credential");
            }
            self.set_state(SessionState::Locked);
        }
    }

    /// Check the entered credential. The input field is cleared either way.
    pub fn submit(&mut self) -> SessionState {
        if self.state() != SessionState::Locked {
            return self.state();
        }

        self.set_state(SessionState::Unlocking);
        let credential = self.input.take();

        if self.gate.check(&credential) {
            self.notice = None;
            self.update_remembered(&credential);
            self.unlock();
        } else {
            info!("credential rejected");
            self.notice = Some(Notice::WrongCredential);
            self.set_state(SessionState::Locked);
        }

        self.state()
    }

    fn update_remembered(&mut self, credential: &str) {
        let result = if self.remember_enabled && self.input.remember() {
            self.store.set(REMEMBER_KEY, credential)
        } else {
            self.store.delete(REMEMBER_KEY)
        };

        if let Err(e) = result {
            warn!(error = %e, "failed to update remembered credential");
            self.notice = Some(Notice::StoreFailed(e.to_string()));
        }
    }

    fn unlock(&mut self) {
        self.set_state(SessionState::Unlocked(Link::Disconnected));
        self.connection.open();
    }

    /// Apply one connection event
    pub fn handle(&mut self, event: ConnectionEvent) {
        let state = self.state();
        if !state.is_unlocked() {
            debug!(?state, "ignoring connection event while locked");
            return;
        }

        match event {
            ConnectionEvent::Connected => {
                info!("connected to log source");
                self.set_state(SessionState::Unlocked(Link::Connected));
            }
            ConnectionEvent::Disconnected => {
                info!("disconnected from log source");
                self.set_state(SessionState::Unlocked(Link::Disconnected));
            }
            ConnectionEvent::EventReceived(event) => self.buffer.append(event),
        }
    }

    /// Wait for the next connection event. Pends while no connection is open.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        self.connection.next_event().await
    }

    /// Tear down the connection, drop buffered events and lock again.
    /// The remembered credential is kept.
    pub fn logout(&mut self) {
        self.connection.close();
        self.buffer.clear();
        self.input.clear();
        self.notice = None;
        self.set_state(SessionState::Locked);
        info!("logged out");
    }

    fn set_state(&mut self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = ?*state, to = ?next, "session state");
            *state = next;
            true
        });
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn input(&self) -> &CredentialInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut CredentialInput {
        &mut self.input
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn remember_enabled(&self) -> bool {
        self.remember_enabled
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use logwire_logs::{Level, LogEvent};

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct MockConnection {
        opens: usize,
        closes: usize,
        open: bool,
        script: VecDeque<ConnectionEvent>,
    }

    impl Connection for MockConnection {
        fn open(&mut self) {
            self.opens += 1;
            self.open = true;
        }

        fn close(&mut self) {
            self.closes += 1;
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }

        async fn next_event(&mut self) -> Option<ConnectionEvent> {
            self.script.pop_front()
        }
    }

    fn session() -> Session<MockConnection, MemoryStore> {
        Session::new(
            AccessGate::new("hunter2"),
            MemoryStore::new(),
            MockConnection::default(),
            Capacity::bounded(30).unwrap(),
        )
    }

    fn type_in(session: &mut Session<MockConnection, MemoryStore>, text: &str) {
        for c in text.chars() {
            session.input_mut().push(c);
        }
    }

    fn event(level: Level, message: &str) -> LogEvent {
        LogEvent::new(level, message, "10:00:00")
    }

    #[test]
    fn test_wrong_credential_stays_locked() {
        let mut session = session();
        type_in(&mut session, "guess");

        assert_eq!(session.submit(), SessionState::Locked);
        assert!(session.input().is_empty());
        assert_eq!(session.notice(), Some(&Notice::WrongCredential));
        assert_eq!(session.connection().opens, 0);

        session.dismiss_notice();
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn test_correct_credential_opens_once() {
        let mut session = session();
        type_in(&mut session, "hunter2");

        assert_eq!(
            session.submit(),
            SessionState::Unlocked(Link::Disconnected)
        );
        assert_eq!(session.connection().opens, 1);
        assert!(session.input().is_empty());

        // Further submits do nothing while unlocked
        session.submit();
        assert_eq!(session.connection().opens, 1);
    }

    #[test]
    fn test_remember_persists_and_forget_clears() {
        let mut session = session();
        session.input_mut().toggle_remember();
        type_in(&mut session, "hunter2");
        session.submit();
        assert_eq!(session.store.get(REMEMBER_KEY).as_deref(), Some("hunter2"));

        session.logout();
        assert_eq!(session.store.get(REMEMBER_KEY).as_deref(), Some("hunter2"));

        session.input_mut().toggle_remember();
        type_in(&mut session, "hunter2");
        session.submit();
        assert_eq!(session.store.get(REMEMBER_KEY), None);
    }

    #[test]
    fn test_remember_disabled_never_persists() {
        let mut session = session().with_remember(false);
        session.input_mut().toggle_remember();
        type_in(&mut session, "hunter2");
        session.submit();
        assert_eq!(session.store.get(REMEMBER_KEY), None);
    }

    #[test]
    fn test_restore_unlocks_with_remembered_credential() {
        let mut session = session();
        session.store.set(REMEMBER_KEY, "hunter2").unwrap();

        session.restore();
        assert_eq!(session.state(), SessionState::Unlocked(Link::Disconnected));
        assert_eq!(session.connection().opens, 1);
        assert!(session.input().remember());
    }

    #[test]
    fn test_restore_forgets_stale_credential() {
        let mut session = session();
        session.store.set(REMEMBER_KEY, "old-secret").unwrap();

        session.restore();
        assert_eq!(session.state(), SessionState::Locked);
        assert_eq!(session.store.get(REMEMBER_KEY), None);
        assert_eq!(session.connection().opens, 0);
    }

    #[test]
    fn test_disconnect_keeps_buffer_and_reconnect_does_not_duplicate() {
        let mut session = session();
        type_in(&mut session, "hunter2");
        session.submit();

        session.handle(ConnectionEvent::Connected);
        assert_eq!(session.state(), SessionState::Unlocked(Link::Connected));
        session.handle(ConnectionEvent::EventReceived(event(Level::Info, "a")));
        session.handle(ConnectionEvent::EventReceived(event(Level::Error, "b")));

        session.handle(ConnectionEvent::Disconnected);
        assert_eq!(session.state(), SessionState::Unlocked(Link::Disconnected));
        assert_eq!(session.buffer().len(), 2);

        session.handle(ConnectionEvent::Connected);
        assert_eq!(session.state(), SessionState::Unlocked(Link::Connected));
        let messages: Vec<_> = session
            .buffer()
            .iter()
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(messages, vec!["b", "a"]);
    }

    #[test]
    fn test_events_ignored_while_locked() {
        let mut session = session();
        session.handle(ConnectionEvent::Connected);
        session.handle(ConnectionEvent::EventReceived(event(Level::Info, "a")));

        assert_eq!(session.state(), SessionState::Locked);
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_logout_closes_and_clears() {
        let mut session = session();
        type_in(&mut session, "hunter2");
        session.submit();
        session.handle(ConnectionEvent::Connected);
        session.handle(ConnectionEvent::EventReceived(event(Level::Query, "q")));

        session.logout();
        assert_eq!(session.state(), SessionState::Locked);
        assert_eq!(session.connection().closes, 1);
        assert!(!session.connection().is_open());
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let mut session = session();
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        type_in(&mut session, "hunter2");
        session.submit();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Unlocked(Link::Disconnected));

        // Repeating the current state is not a change
        session.handle(ConnectionEvent::Disconnected);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_next_event_feeds_handle() {
        let mut session = session();
        session.connection.script = VecDeque::from(vec![
            ConnectionEvent::Connected,
            ConnectionEvent::EventReceived(event(Level::Info, "hello")),
        ]);
        type_in(&mut session, "hunter2");
        session.submit();

        while let Some(event) = session.next_event().await {
            session.handle(event);
        }

        assert!(session.state().is_connected());
        assert_eq!(session.buffer().len(), 1);
    }
}
