/// Persisted-state key holding the remembered credential
pub const REMEMBER_KEY: &str = "logwire.credential";

/// Local credential check that precedes any connection
///
/// The configured secret is compared by exact match and never leaves the
/// process.
#[derive(Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn check(&self, credential: &str) -> bool {
        credential == self.secret
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

/// Operator input on the unlock prompt
#[derive(Clone, Debug, Default)]
pub struct CredentialInput {
    text: String,
    remember: bool,
}

impl CredentialInput {
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn toggle_remember(&mut self) {
        self.remember = !self.remember;
    }

    pub fn set_remember(&mut self, remember: bool) {
        self.remember = remember;
    }

    pub fn remember(&self) -> bool {
        self.remember
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// One mask character per typed character
    pub fn masked(&self) -> String {
        "•".repeat(self.len())
    }

    /// Take the entered text, leaving the field empty
    pub(crate) fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}
