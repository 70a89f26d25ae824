// Public API - what other modules can use
pub use cookies::{removal_cookie, session_cookie, RequestCookies};
pub use credential::{Credential, SessionState};
pub use expiry::is_locally_expired;
pub use signal::{SessionSignal, SessionWatch};
pub use store::{InMemorySessionStore, SessionStore};

// Internal modules
mod cookies;
mod credential;
mod expiry;
mod signal;
mod store;
