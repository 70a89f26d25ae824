//! Authenticated client for the marketplace REST API.
//!
//! Every outbound call goes through one pipeline: the outbound intercept
//! attaches the session credential, and the inbound intercept turns a 401
//! into the end of the session plus a hard navigation to the login page.
//! All other statuses are handed back to the caller untouched.

pub mod api_client;
pub mod auth;
pub mod error;
pub mod navigator;
pub mod types;

pub use api_client::{ApiClient, AuthenticatedClient, REQUESTED_WITH, REQUESTED_WITH_VALUE};
pub use error::ApiError;
pub use navigator::{Location, Navigator, PendingRedirect};
