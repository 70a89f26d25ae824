use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Request, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use super::error::ApiError;
use super::navigator::Navigator;
use crate::config::{AppConfig, ClientConfig, SessionConfig};
use crate::session::{Credential, SessionSignal, SessionState, SessionStore};

/// Marker header telling the backend this is a programmatic call, not a
/// page load
pub const REQUESTED_WITH: &str = "x-requested-with";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Connection pool plus the settings every authenticated client shares.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    cookie_name: String,
    session_ttl: Duration,
    login_path: String,
}

impl ApiClient {
    pub fn new(
        client: &ClientConfig,
        session: &SessionConfig,
        login_path: &str,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = client.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: client.api_base_url.trim_end_matches('/').to_string(),
            cookie_name: session.cookie_name.clone(),
            session_ttl: session.ttl,
            login_path: login_path.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.client, &config.session, &config.gate.login_path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Binds the pool to one session context (a browser tab, a CLI run, or a
    /// single server request)
    pub fn authenticated(
        &self,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AuthenticatedClient {
        AuthenticatedClient {
            api: self.clone(),
            store,
            navigator,
            signal: SessionSignal::new(),
        }
    }
}

/// The single pipeline all API calls go through for one session context
#[derive(Clone)]
pub struct AuthenticatedClient {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    signal: SessionSignal,
}

impl AuthenticatedClient {
    /// Resolves an API path against the base URL. Absolute URLs are used as is.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api.base_url, path.trim_start_matches('/'))
        }
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.api.http.request(method, self.url(path))
    }

    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn signal(&self) -> &SessionSignal {
        &self.signal
    }

    /// Anonymous -> Authenticated: stores the credential for the configured ttl
    #[instrument(skip(self, credential))]
    pub fn begin_session(&self, credential: Credential) {
        debug!(credential_length = credential.as_str().len(), "Session started");
        self.store.set(credential, self.api.session_ttl);
    }

    /// Authenticated -> Anonymous: deletes the credential and invalidates
    /// every call still in flight
    #[instrument(skip(self))]
    pub fn end_session(&self) {
        self.store.clear();
        self.signal.end();
    }

    /// Outbound intercept. Reads the credential at call time and attaches it;
    /// without one the request headers are left alone apart from the marker.
    pub fn attach_credentials(&self, request: &mut Request) {
        let headers = request.headers_mut();
        headers.insert(
            REQUESTED_WITH,
            header::HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );
        headers
            .entry(header::ACCEPT)
            .or_insert(header::HeaderValue::from_static("application/json"));

        let Some(credential) = self.store.get() else {
            return;
        };

        if let Ok(value) = header::HeaderValue::from_str(&credential.bearer()) {
            headers.insert(header::AUTHORIZATION, value);
        }
        // Cross-origin calls carry the session cookie as well; some backend
        // session stores key off it.
        if !headers.contains_key(header::COOKIE) {
            let cookie = format!("{}={}", self.api.cookie_name, credential.as_str());
            if let Ok(value) = header::HeaderValue::from_str(&cookie) {
                headers.insert(header::COOKIE, value);
            }
        }
    }

    /// Inbound intercept. A 401 ends the session and sends the context to the
    /// login page unless it is already there. The response itself is always
    /// returned unchanged.
    pub fn inspect_response(&self, response: Response) -> Response {
        if response.status() != StatusCode::UNAUTHORIZED {
            return response;
        }

        warn!(url = %response.url(), "API rejected the session credential");
        self.end_session();

        if self.navigator.current_path() == self.api.login_path {
            debug!("Already on the login page, no navigation");
        } else {
            self.navigator.navigate_hard(&self.api.login_path);
        }
        response
    }

    /// Runs one request through both intercepts. Exactly one attempt, no
    /// retries. Every HTTP status comes back as `Ok`; only transport failures
    /// and calls outlived by their session are errors.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn send(&self, mut request: Request) -> Result<Response, ApiError> {
        let mut session = self.signal.watch();
        self.attach_credentials(&mut request);

        let response = tokio::select! {
            result = self.api.http.execute(request) => result?,
            _ = session.ended() => {
                debug!("Session ended while the call was in flight, discarding it");
                return Err(ApiError::SessionEnded);
            }
        };

        if session.is_ended() {
            debug!("Session ended before the response was handled, discarding it");
            return Err(ApiError::SessionEnded);
        }

        debug!(status = %response.status(), "API call completed");
        Ok(self.inspect_response(response))
    }

    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        self.send(builder.build()?).await
    }

    /// Check if response is successful, returning an error with body if not.
    pub async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().clone();
        Self::check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(self.request(Method::GET, path)).await?;
        Self::parse(response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.request(Method::POST, path).json(body))
            .await?;
        Self::parse(response).await
    }

    /// POST without a body, ignoring whatever the backend answers on success
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.execute(self.request(Method::POST, path)).await?;
        Self::check_response(response).await.map(|_| ())
    }
}
