use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::client::types::{LoginParams, RegisterParams};
use crate::client::{AuthenticatedClient, PendingRedirect};
use crate::session::{Credential, RequestCookies};
use crate::shared::{AppError, AppState};

/// Session context for one server request: the request's cookies as the
/// store, and a navigator that turns a hard navigation into a redirect.
struct RequestSession {
    cookies: Arc<RequestCookies>,
    navigator: Arc<PendingRedirect>,
    client: AuthenticatedClient,
}

impl RequestSession {
    fn new(state: &AppState, headers: &HeaderMap, path: &str) -> Self {
        let cookies = Arc::new(RequestCookies::from_headers(headers, &state.config.session));
        let navigator = Arc::new(PendingRedirect::new(path));
        let client = state.api.authenticated(cookies.clone(), navigator.clone());

        Self {
            cookies,
            navigator,
            client,
        }
    }

    /// Attaches staged cookie changes. A hard navigation requested during the
    /// request wins over the handler's own response.
    fn respond(self, response: impl IntoResponse) -> Response {
        let jar = self.cookies.jar();
        match self.navigator.target() {
            Some(target) => (jar, Redirect::to(&target)).into_response(),
            None => (jar, response).into_response(),
        }
    }
}

/// POST /login
///
/// Signs in against the backend, writes the session cookie and sends the
/// browser home.
#[instrument(name = "login", skip(state, headers, params))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(params): Json<LoginParams>,
) -> Response {
    let session = RequestSession::new(&state, &headers, uri.path());

    match session.client.login(&params).await {
        Ok(_) => session.respond(Redirect::to(&state.config.gate.home_path)),
        Err(e) => {
            warn!(error = %e, "Login rejected");
            session.respond(AppError::from(e))
        }
    }
}

/// POST /register
#[instrument(name = "register", skip(state, headers, params))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(params): Json<RegisterParams>,
) -> Response {
    let session = RequestSession::new(&state, &headers, uri.path());

    match session.client.register(&params).await {
        Ok(_) => session.respond(Redirect::to(&state.config.gate.home_path)),
        Err(e) => {
            warn!(error = %e, "Registration rejected");
            session.respond(AppError::from(e))
        }
    }
}

/// POST /logout
///
/// The cookie is cleared and the browser sent to the login page whether or
/// not the backend accepted the logout.
#[instrument(name = "logout", skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let session = RequestSession::new(&state, &headers, uri.path());

    if session.client.logout().await.is_ok() {
        info!("Logged out");
    }
    session.respond(Redirect::to(&state.config.gate.login_path))
}

#[derive(Debug, Deserialize)]
pub struct SocialCallbackQuery {
    pub token: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/social-callback (shop: /auth/callback)
///
/// The backend redirects here after a social provider login, with the
/// credential in the query string on success.
#[instrument(name = "social_callback", skip(state, headers, query))]
pub async fn social_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<SocialCallbackQuery>,
) -> Response {
    let session = RequestSession::new(&state, &headers, uri.path());
    let gate = &state.config.gate;

    let succeeded = query.status.as_deref().map_or(true, |status| status == "success");
    let credential = query.token.and_then(Credential::new).filter(|_| succeeded);

    match credential {
        Some(credential) => {
            session.client.begin_session(credential);
            info!("Social login completed");
            session.respond(Redirect::to(&gate.home_path))
        }
        None => {
            let reason = query
                .message
                .or(query.error)
                .or_else(|| query.status.map(|_| "login_failed".to_string()));
            warn!(reason = ?reason, "Social login failed");

            let target = match reason {
                Some(reason) => login_with_error(&gate.login_path, &reason),
                None => gate.login_path.clone(),
            };
            session.respond(Redirect::to(&target))
        }
    }
}

/// `<login>?error=<reason>` with the reason form-encoded
fn login_with_error(login_path: &str, reason: &str) -> String {
    match reqwest::Url::parse_with_params("http://gate.invalid/", &[("error", reason)]) {
        Ok(url) => format!("{}?{}", login_path, url.query().unwrap_or_default()),
        Err(_) => login_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_with_error_encodes_reason() {
        assert_eq!(
            login_with_error("/login", "access_denied"),
            "/login?error=access_denied"
        );
        assert_eq!(
            login_with_error("/login", "bad state & retry"),
            "/login?error=bad+state+%26+retry"
        );
    }
}
