//! Deployment configuration.
//!
//! Every value comes from an environment variable with a default, so a bare
//! `cargo run` serves the end-user storefront gate against a local backend.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::debug;

use crate::gate::PublicPathSet;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_COOKIE_NAME: &str = "auth_token";
const DEFAULT_SESSION_TTL_DAYS: u64 = 7;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid path entry {0:?}: paths must start with '/'")]
    InvalidPath(String),

    #[error("Login path {0:?} is not public; anonymous requests would redirect forever")]
    LoginNotPublic(String),

    #[error("Unknown app profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which of the three front-ends this gate protects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum AppProfile {
    EndUser,
    Shop,
    Admin,
}

impl AppProfile {
    /// Paths reachable without a session credential
    pub fn public_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self {
            AppProfile::EndUser => &[
                "/",
                "/login",
                "/register",
                "/categories",
                "/products",
                "/about",
                "/contact",
                "/faq",
                "/terms",
                "/privacy",
                "/help",
                "/auth/social-callback",
                "/forgot-password",
                "/reset-password",
            ],
            AppProfile::Shop => &[
                "/",
                "/login",
                "/register",
                "/forgot-password",
                "/categories",
                "/products",
                "/about",
                "/auth/callback",
            ],
            // Closed by default, the login page is the only way in.
            AppProfile::Admin => &["/login"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    /// Paths that make no sense to visit while already holding a credential
    pub fn auth_entry_paths(&self) -> Vec<String> {
        match self {
            AppProfile::EndUser | AppProfile::Shop => {
                vec![LOGIN_PATH.to_string(), REGISTER_PATH.to_string()]
            }
            AppProfile::Admin => vec![LOGIN_PATH.to_string()],
        }
    }

    pub fn has_registration(&self) -> bool {
        !matches!(self, AppProfile::Admin)
    }

    /// Path the social login provider sends the browser back to
    pub fn social_callback_path(&self) -> &'static str {
        match self {
            AppProfile::Shop => "/auth/callback",
            _ => "/auth/social-callback",
        }
    }
}

/// Path lists and redirect targets for the route gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    pub public_paths: Vec<String>,
    pub auth_entry_paths: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl GateConfig {
    pub fn for_profile(profile: AppProfile) -> Self {
        Self {
            public_paths: profile.public_paths(),
            auth_entry_paths: profile.auth_entry_paths(),
            login_path: LOGIN_PATH.to_string(),
            home_path: HOME_PATH.to_string(),
        }
    }

    /// Moves the login page, carrying its public and auth-entry status along
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        let login_path = login_path.into();
        for entry in self
            .public_paths
            .iter_mut()
            .chain(self.auth_entry_paths.iter_mut())
        {
            if *entry == self.login_path {
                *entry = login_path.clone();
            }
        }
        self.login_path = login_path;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = self
            .public_paths
            .iter()
            .chain(self.auth_entry_paths.iter())
            .chain([&self.login_path, &self.home_path]);
        for path in all {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }

        if !PublicPathSet::new(self.public_paths.clone()).contains(&self.login_path) {
            return Err(ConfigError::LoginNotPublic(self.login_path.clone()));
        }

        Ok(())
    }
}

/// Session cookie attributes and lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// One lifetime per deployment, applied to every credential write
    pub ttl: Duration,
    pub secure: bool,
    pub http_only: bool,
    /// Treat JWT credentials whose `exp` has passed as absent at the gate
    pub check_expiry: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_DAYS * SECONDS_PER_DAY),
            secure: false,
            http_only: false,
            check_expiry: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// `None` leaves the network layer's default in place
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile: AppProfile,
    pub bind_addr: SocketAddr,
    pub gate: GateConfig,
    pub session: SessionConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    /// Defaults for a profile, ignoring the environment
    pub fn for_profile(profile: AppProfile) -> Self {
        Self {
            profile,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            gate: GateConfig::for_profile(profile),
            session: SessionConfig::default(),
            client: ClientConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Unset keys take
    /// their default; set but malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile = match lookup("APP_PROFILE") {
            Some(raw) => raw
                .trim()
                .parse::<AppProfile>()
                .map_err(|_| ConfigError::UnknownProfile(raw.clone()))?,
            None => AppProfile::EndUser,
        };

        let bind_addr = parse_value::<SocketAddr>(&lookup, "BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        let mut gate = GateConfig::for_profile(profile);
        if let Some(login_path) = lookup("LOGIN_PATH") {
            gate = gate.with_login_path(login_path);
        }
        if let Some(home_path) = lookup("HOME_PATH") {
            gate.home_path = home_path;
        }
        gate.validate()?;

        let ttl_days = parse_value::<u64>(&lookup, "SESSION_TTL_DAYS")?
            .unwrap_or(DEFAULT_SESSION_TTL_DAYS);
        let ttl = ttl_days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "SESSION_TTL_DAYS",
                value: ttl_days.to_string(),
            })?;

        let session = SessionConfig {
            cookie_name: lookup("AUTH_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            ttl,
            secure: parse_bool(&lookup, "COOKIE_SECURE")?.unwrap_or(false),
            http_only: parse_bool(&lookup, "COOKIE_HTTP_ONLY")?.unwrap_or(false),
            check_expiry: parse_bool(&lookup, "GATE_CHECK_EXPIRY")?.unwrap_or(false),
        };

        let client = ClientConfig {
            api_base_url: lookup("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            timeout: parse_value::<u64>(&lookup, "API_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        debug!(
            profile = %profile,
            bind_addr = %bind_addr,
            ttl_days,
            public_paths = gate.public_paths.len(),
            "Loaded configuration"
        );

        Ok(Self {
            profile,
            bind_addr,
            gate,
            session,
            client,
        })
    }
}

fn parse_value<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
