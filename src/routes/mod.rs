use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::REGISTER_PATH;
use crate::gate::route_gate;
use crate::shared::AppState;

pub mod auth;
pub mod pages;

/// Builds the gate server for the configured app. Every route, the fallback
/// page included, sits behind the route gate.
pub fn app_router(state: AppState) -> Router {
    let login_path = state.config.gate.login_path.clone();
    let profile = state.config.profile;

    let mut router = Router::new()
        .route(&login_path, get(pages::page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route(profile.social_callback_path(), get(auth::social_callback));

    if profile.has_registration() {
        router = router.route(REGISTER_PATH, get(pages::page).post(auth::register));
    }

    router
        .fallback(pages::page)
        .layer(middleware::from_fn_with_state(state.clone(), route_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
