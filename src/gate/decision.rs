use axum::http::Uri;
use reqwest::Url;
use tracing::{debug, instrument};

use super::paths::PublicPathSet;
use crate::config::{GateConfig, SessionConfig};
use crate::session::{is_locally_expired, Credential, SessionStore};

/// Outcome of evaluating one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectLogin,
    RedirectHome,
}

/// Path-based gate, one instance per app.
///
/// Holds no mutable state, so a single instance is shared by all requests and
/// evaluating the same input twice always gives the same answer.
#[derive(Debug, Clone)]
pub struct RouteGate {
    public_paths: PublicPathSet,
    auth_entry_paths: Vec<String>,
    login_path: String,
    home_path: String,
    check_expiry: bool,
}

impl RouteGate {
    pub fn new(public_paths: PublicPathSet, auth_entry_paths: Vec<String>) -> Self {
        Self {
            public_paths,
            auth_entry_paths,
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
            check_expiry: false,
        }
    }

    pub fn from_config(gate: &GateConfig, session: &SessionConfig) -> Self {
        Self {
            public_paths: PublicPathSet::new(gate.public_paths.clone()),
            auth_entry_paths: gate.auth_entry_paths.clone(),
            login_path: gate.login_path.clone(),
            home_path: gate.home_path.clone(),
            check_expiry: session.check_expiry,
        }
    }

    /// Also treat JWT credentials with a past `exp` as absent
    pub fn with_expiry_check(mut self, enabled: bool) -> Self {
        self.check_expiry = enabled;
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    pub fn is_auth_entry(&self, path: &str) -> bool {
        self.auth_entry_paths.iter().any(|entry| entry == path)
    }

    /// Decides for a request path. Dot segments are resolved first, so the
    /// path matched against the public set is the one the page layer serves.
    pub fn decide(&self, path: &str, store: &dyn SessionStore) -> GateDecision {
        let normalized = normalize_path(path);
        if normalized.is_none() {
            debug!(path, "Request path does not normalize");
        }
        self.evaluate(normalized.as_deref(), store)
    }

    /// Decides for a raw request target. A target that does not parse is
    /// treated as neither public nor an auth entry, so only credential
    /// presence matters.
    pub fn decide_uri(&self, raw: &str, store: &dyn SessionStore) -> GateDecision {
        match raw.parse::<Uri>() {
            Ok(uri) => self.decide(uri.path(), store),
            Err(e) => {
                debug!(error = %e, "Unparseable request target");
                self.evaluate(None, store)
            }
        }
    }

    /// Where the browser is sent for a redirect decision
    pub fn redirect_target(&self, decision: GateDecision) -> Option<&str> {
        match decision {
            GateDecision::Allow => None,
            GateDecision::RedirectLogin => Some(&self.login_path),
            GateDecision::RedirectHome => Some(&self.home_path),
        }
    }

    #[instrument(skip(self, store))]
    fn evaluate(&self, path: Option<&str>, store: &dyn SessionStore) -> GateDecision {
        let credential = self.credential(store);
        let is_public = path.is_some_and(|p| self.is_public(p));
        let is_auth_entry = path.is_some_and(|p| self.is_auth_entry(p));

        let decision = match (credential.is_some(), is_auth_entry, is_public) {
            (true, true, _) => GateDecision::RedirectHome,
            (false, _, false) => GateDecision::RedirectLogin,
            _ => GateDecision::Allow,
        };

        debug!(
            has_credential = credential.is_some(),
            is_public,
            is_auth_entry,
            ?decision,
            "Route gate evaluated"
        );
        decision
    }

    fn credential(&self, store: &dyn SessionStore) -> Option<Credential> {
        let credential = store.get()?;
        if self.check_expiry && is_locally_expired(&credential) {
            debug!("Credential expired locally, treating request as anonymous");
            return None;
        }
        Some(credential)
    }
}

/// Resolves `.` and `..` segments (including their percent-encoded forms)
/// the way a browser does, and collapses empty segments so `//orders` is not
/// read as a sub-path of `/`.
fn normalize_path(path: &str) -> Option<String> {
    let mut url = Url::parse("http://gate.invalid/").ok()?;
    url.set_path(path);

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    let mut normalized = format!("/{}", segments.join("/"));
    if url.path().ends_with('/') && !segments.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}
