use rentgate::{app_router, ApiClient, AppConfig, AppState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        profile = %config.profile,
        api_base_url = %config.client.api_base_url,
        session_ttl_secs = config.session.ttl.as_secs(),
        "Starting route gate"
    );

    let api = ApiClient::from_config(&config).expect("Failed to build HTTP client");
    let bind_addr = config.bind_addr;
    let app = app_router(AppState::new(config, api));

    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await.unwrap();
}
