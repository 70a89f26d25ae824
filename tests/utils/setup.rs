use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use rentgate::{
    config::ClientConfig, ApiClient, AppConfig, AppProfile, AppState, AuthenticatedClient,
    Credential, InMemorySessionStore, SessionStore,
};

use super::mocks::MockNavigator;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Gate server for a profile, talking to the given backend
pub fn gate_router(profile: AppProfile, api_base_url: &str) -> Router {
    let mut config = AppConfig::for_profile(profile);
    config.client = ClientConfig {
        api_base_url: api_base_url.to_string(),
        timeout: Some(Duration::from_secs(5)),
    };

    let api = ApiClient::from_config(&config).unwrap();
    rentgate::app_router(AppState::new(config, api))
}

/// A browser-like session context: in-memory store, recording navigator
pub struct TestClient {
    pub client: AuthenticatedClient,
    pub store: Arc<InMemorySessionStore>,
    pub navigator: MockNavigator,
}

impl TestClient {
    pub fn credential(&self) -> Option<String> {
        self.store.get().map(|c| c.as_str().to_string())
    }
}

pub fn client_for(api_base_url: &str, current_path: &str, token: Option<&str>) -> TestClient {
    let config = AppConfig {
        client: ClientConfig {
            api_base_url: api_base_url.to_string(),
            timeout: Some(Duration::from_secs(5)),
        },
        ..AppConfig::for_profile(AppProfile::EndUser)
    };

    let store = Arc::new(match token {
        Some(token) => InMemorySessionStore::with_credential(
            Credential::new(token).unwrap(),
            config.session.ttl,
        ),
        None => InMemorySessionStore::new(),
    });
    let navigator = MockNavigator::at(current_path);

    let api = ApiClient::from_config(&config).unwrap();
    let client = api.authenticated(store.clone(), Arc::new(navigator.clone()));

    TestClient {
        client,
        store,
        navigator,
    }
}
