use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};

use super::decision::GateDecision;
use crate::session::{RequestCookies, SessionStore};
use crate::shared::AppState;

/// Route gate middleware - runs before any page handler and redirects
/// requests the gate does not allow. No network calls are made here.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), gate::route_gate))
/// Allowed requests carry the caller's `SessionState` as an extension.
#[instrument(skip(state, req, next), fields(path = %req.uri().path()))]
pub async fn route_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookies = RequestCookies::from_headers(req.headers(), &state.config.session);
    let decision = state.gate.decide_uri(&req.uri().to_string(), &cookies);

    match state.gate.redirect_target(decision) {
        None => {
            req.extensions_mut().insert(cookies.state());
            next.run(req).await
        }
        Some(target) => {
            if decision == GateDecision::RedirectLogin {
                info!(location = target, "No session credential for protected path, redirecting");
            } else {
                info!(location = target, "Already signed in, redirecting away from auth entry");
            }
            Redirect::temporary(target).into_response()
        }
    }
}
