use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A pending authorization attempt must present its state parameter within
/// this window.
const STATE_TTL: Duration = Duration::from_secs(600);

/// In-memory store for OAuth CSRF state parameters, keyed by the parameter
/// itself. Entries are single-use.
pub struct OAuthStateStore {
    entries: DashMap<String, Instant>,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Generate, record and return a fresh state parameter.
    pub fn issue(&self) -> String {
        use base64::Engine;
        use rand::RngCore;

        // Opportunistic eviction keeps the map bounded without a background task.
        self.cleanup();

        let mut bytes = [0u8; 24];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let state = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        self.entries.insert(state.clone(), Instant::now());
        state
    }

    /// Consume a state parameter. Returns false when unknown, expired or
    /// already used.
    pub fn take(&self, state: &str) -> bool {
        match self.entries.remove(state) {
            Some((_, issued)) => issued.elapsed() <= STATE_TTL,
            None => false,
        }
    }

    fn cleanup(&self) {
        self.entries
            .retain(|_, issued| issued.elapsed() <= STATE_TTL);
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}
