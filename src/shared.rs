use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::client::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::gate::RouteGate;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<RouteGate>,
    /// Shared connection pool. Handlers bind it to the request's cookies with
    /// `ApiClient::authenticated`.
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: AppConfig, api: ApiClient) -> Self {
        let gate = RouteGate::from_config(&config.gate, &config.session);

        Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            api,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal,
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => AppError::Unauthorized("Invalid credentials".to_string()),
            ApiError::Validation(msg) => AppError::BadRequest(msg),
            ApiError::SessionEnded => AppError::Unauthorized("Session ended".to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
