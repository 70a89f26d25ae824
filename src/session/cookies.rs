use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};

use super::credential::Credential;
use super::store::SessionStore;
use crate::config::SessionConfig;

/// Builds the `Set-Cookie` value that carries a credential
pub fn session_cookie(config: &SessionConfig, credential: &Credential, ttl: Duration) -> Cookie<'static> {
    let max_age = time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX);

    Cookie::build((config.cookie_name.clone(), credential.as_str().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .http_only(config.http_only)
        .max_age(max_age)
        .build()
}

/// Cookie used to delete the credential cookie. Path must match the one it
/// was written with.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Request-scoped session store backed by the request's `Cookie` header.
///
/// Reads see the cookies the browser sent; `set` and `clear` stage
/// `Set-Cookie` changes that the handler returns with its response via
/// [`RequestCookies::jar`].
pub struct RequestCookies {
    jar: Mutex<CookieJar>,
    config: SessionConfig,
}

impl RequestCookies {
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Self {
        Self::from_jar(CookieJar::from_headers(headers), config)
    }

    pub fn from_jar(jar: CookieJar, config: &SessionConfig) -> Self {
        Self {
            jar: Mutex::new(jar),
            config: config.clone(),
        }
    }

    /// Current jar including staged changes, ready to be returned as
    /// response parts
    pub fn jar(&self) -> CookieJar {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = f(jar.clone());
    }
}

impl SessionStore for RequestCookies {
    fn get(&self) -> Option<Credential> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.config.cookie_name)
            .and_then(|cookie| Credential::new(cookie.value()))
    }

    #[instrument(skip(self, credential))]
    fn set(&self, credential: Credential, ttl: Duration) {
        debug!(
            cookie = %self.config.cookie_name,
            ttl_secs = ttl.as_secs(),
            "Staging session cookie"
        );
        let cookie = session_cookie(&self.config, &credential, ttl);
        self.update(|jar| jar.add(cookie));
    }

    #[instrument(skip(self))]
    fn clear(&self) {
        debug!(cookie = %self.config.cookie_name, "Staging session cookie removal");
        let cookie = removal_cookie(&self.config);
        self.update(|jar| jar.remove(cookie));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use axum::http::header;
    use axum::response::IntoResponse;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, value.parse().unwrap());
        headers
    }

    fn set_cookie_headers(cookies: &RequestCookies) -> Vec<String> {
        let response = (cookies.jar(), "ok").into_response();
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_reads_credential_from_cookie_header() {
        let config = SessionConfig::default();
        let cookies = RequestCookies::from_headers(
            &headers_with_cookie("theme=dark; auth_token=abc"),
            &config,
        );

        assert_eq!(cookies.get(), Credential::new("abc"));
        assert_eq!(cookies.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_missing_or_empty_cookie_is_anonymous() {
        let config = SessionConfig::default();

        let missing = RequestCookies::from_headers(&HeaderMap::new(), &config);
        assert_eq!(missing.get(), None);

        let empty = RequestCookies::from_headers(&headers_with_cookie("auth_token="), &config);
        assert_eq!(empty.get(), None);
    }

    #[test]
    fn test_respects_configured_cookie_name() {
        let config = SessionConfig {
            cookie_name: "shop_token".to_string(),
            ..SessionConfig::default()
        };
        let cookies = RequestCookies::from_headers(&headers_with_cookie("auth_token=abc"), &config);
        assert_eq!(cookies.get(), None);
    }

    #[test]
    fn test_set_stages_cookie_with_attributes() {
        let config = SessionConfig::default();
        let cookies = RequestCookies::from_headers(&HeaderMap::new(), &config);

        cookies.set(Credential::new("abc").unwrap(), config.ttl);
        assert_eq!(cookies.get(), Credential::new("abc"));

        let headers = set_cookie_headers(&cookies);
        assert_eq!(headers.len(), 1);
        let cookie = &headers[0];
        assert!(cookie.starts_with("auth_token=abc"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_clear_stages_removal_of_sent_cookie() {
        let config = SessionConfig::default();
        let cookies = RequestCookies::from_headers(&headers_with_cookie("auth_token=abc"), &config);

        cookies.clear();
        assert_eq!(cookies.get(), None);

        let headers = set_cookie_headers(&cookies);
        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("auth_token="));
        assert!(headers[0].contains("Max-Age=0"));
    }

    #[test]
    fn test_untouched_jar_sets_nothing() {
        let config = SessionConfig::default();
        let cookies = RequestCookies::from_headers(&headers_with_cookie("auth_token=abc"), &config);
        assert!(set_cookie_headers(&cookies).is_empty());
    }
}
