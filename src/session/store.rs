use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};

use super::credential::{Credential, SessionState};

/// Storage capability for the session credential.
///
/// Both the route gate and the authenticated client read through this trait
/// instead of ambient storage. Writers are the login/registration/callback
/// handlers (`set`), and logout or an unauthorized response (`clear`).
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential, ttl: Duration);
    fn clear(&self);

    fn state(&self) -> SessionState {
        SessionState::from_credential(self.get().as_ref())
    }
}

#[derive(Debug, Clone)]
struct StoredCredential {
    credential: Credential,
    // None when the ttl does not fit in a timestamp
    expires_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Single-slot in-memory store for non-browser contexts and tests.
///
/// An entry past its ttl reads as absent, the way a cookie disappears after
/// its max-age.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<StoredCredential>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `credential` for `ttl`
    pub fn with_credential(credential: Credential, ttl: Duration) -> Self {
        let store = Self::new();
        store.set(credential, ttl);
        store
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|stored| stored.expires_at)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> Option<Credential> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(StoredCredential::is_expired) {
            debug!("Stored credential expired, dropping it");
            *slot = None;
        }
        slot.as_ref().map(|stored| stored.credential.clone())
    }

    #[instrument(skip(self, credential))]
    fn set(&self, credential: Credential, ttl: Duration) {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));

        debug!(
            credential_length = credential.as_str().len(),
            expires_at = ?expires_at,
            "Storing credential in memory"
        );

        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(StoredCredential {
            credential,
            expires_at,
        });
    }

    #[instrument(skip(self))]
    fn clear(&self) {
        debug!("Clearing credential from memory");
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
