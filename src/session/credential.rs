use std::fmt;

/// Opaque bearer token issued by the backend at login, registration or
/// social callback.
///
/// Only values that can travel in an HTTP header are accepted; an empty cookie
/// value counts as no credential at all.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        Some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Never print the token itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

/// Per-context authentication state, derived from whether a credential is
/// stored. There are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    pub fn from_credential(credential: Option<&Credential>) -> Self {
        match credential {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Anonymous,
        }
    }
}
