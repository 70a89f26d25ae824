// Library crate for the rental marketplace route gate and API client
// This file exposes the public API for integration tests and the binary

pub mod client;
pub mod config;
pub mod gate;
pub mod routes;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use client::{ApiClient, ApiError, AuthenticatedClient, Location, Navigator, PendingRedirect};
pub use config::{AppConfig, AppProfile, ConfigError};
pub use gate::{GateDecision, PublicPathSet, RouteGate};
pub use routes::app_router;
pub use session::{Credential, InMemorySessionStore, SessionState, SessionStore};
pub use shared::{AppError, AppState};
