use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

// ============================================================================
// Fake Backend API
// ============================================================================

/// Credential the backend accepts without a prior login
pub const VALID_TOKEN: &str = "abc";
/// Credential the backend issues on a successful login
pub const ISSUED_TOKEN: &str = "7|issued-token";
const REGISTERED_TOKEN: &str = "8|registered-token";

/// How long `/api/slow` takes to answer
pub const SLOW_RESPONSE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub requested_with: Option<String>,
    pub accept: Option<String>,
}

#[derive(Clone, Default)]
struct RequestLog {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Backend stand-in on an ephemeral local port. Every request it sees is
/// recorded so tests can assert on the outbound headers.
pub struct FakeBackend {
    pub base_url: String,
    log: RequestLog,
    _server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let log = RequestLog::default();

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/register", post(register))
            .route("/api/logout", post(guarded_message))
            .route("/api/user", get(current_user))
            .route("/api/orders", get(orders))
            .route("/api/forbidden", get(forbidden))
            .route("/api/broken", get(broken))
            .route("/api/slow", get(slow))
            .layer(middleware::from_fn_with_state(log.clone(), record))
            .with_state(log.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            log,
            _server: server,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn record(State(log): State<RequestLog>, req: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        RecordedRequest {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            authorization: header_value(header::AUTHORIZATION),
            requested_with: header_value(header::HeaderName::from_static("x-requested-with")),
            accept: header_value(header::ACCEPT),
        }
    };
    log.requests.lock().unwrap().push(recorded);

    next.run(req).await
}

fn is_authorized(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    [VALID_TOKEN, ISSUED_TOKEN, REGISTERED_TOKEN]
        .iter()
        .any(|token| value == format!("Bearer {}", token))
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthenticated." })),
    )
        .into_response()
}

fn user_json(id: i64, email: &str) -> Value {
    json!({
        "id": id,
        "name": "An",
        "email": email,
        "role": "customer",
        "created_at": "2025-10-01T00:00:00Z"
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "an@example.com" && body["password"] == "secret123" {
        Json(json!({
            "message": "Login successful",
            "access_token": ISSUED_TOKEN,
            "token_type": "Bearer",
            "user": user_json(7, "an@example.com")
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "The email has already been taken.",
                "errors": { "email": ["The email has already been taken."] }
            })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "access_token": REGISTERED_TOKEN,
            "token_type": "Bearer",
            "user": user_json(8, body["email"].as_str().unwrap_or_default())
        })),
    )
        .into_response()
}

async fn guarded_message(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthenticated();
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthenticated();
    }
    Json(user_json(7, "an@example.com")).into_response()
}

async fn orders(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthenticated();
    }
    Json(json!([{ "id": 1, "status": "pending" }])).into_response()
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "message": "This action is unauthorized." })),
    )
        .into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(SLOW_RESPONSE).await;
    Json(json!({ "ok": true })).into_response()
}
