use axum::{extract::State, http::Uri, Extension, Json};
use serde::Serialize;

use crate::session::SessionState;
use crate::shared::AppState;

/// What the page layer would render for an allowed request
#[derive(Debug, Serialize)]
pub struct PageDescriptor {
    pub app: String,
    pub path: String,
    pub authenticated: bool,
}

/// Stand-in for the page layer, reached only when the gate allowed the request
pub async fn page(
    State(state): State<AppState>,
    session: Option<Extension<SessionState>>,
    uri: Uri,
) -> Json<PageDescriptor> {
    let authenticated = matches!(session, Some(Extension(SessionState::Authenticated)));

    Json(PageDescriptor {
        app: state.config.profile.to_string(),
        path: uri.path().to_string(),
        authenticated,
    })
}
