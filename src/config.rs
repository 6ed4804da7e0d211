//! Client configuration
//!
//! Settings for the HTTP executor: which Canvas instance to talk to, how to
//! authenticate, and how to retry. Loadable from YAML or JSON.
//!
//! ```yaml
//! base_url: https://canvas.example.edu
//! access_token: "7~abc..."
//! http:
//!   timeout_seconds: 30
//!   max_retries: 3
//!   retry_backoff:
//!     type: exponential
//!     initial_ms: 100
//!     max_ms: 60000
//!   rate_limit:
//!     requests_per_second: 10
//!     burst_size: 10
//! ```

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use url::Url;

const API_PATH: &str = "/api/v1";
const NEW_QUIZZES_PATH: &str = "/api/quiz/v1";
const GRAPHQL_PATH: &str = "/api/graphql";

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for a Canvas [`Requester`](crate::http::Requester)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Institution root URL, e.g. `https://canvas.example.edu`
    pub base_url: String,

    /// API access token sent as a bearer token
    #[serde(default)]
    pub access_token: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Create a config for the given institution URL with default HTTP settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            http: HttpConfig::default(),
        }
    }

    /// Parse a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Set the access token
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout_seconds = timeout.as_secs();
        self
    }

    /// Set max retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.http.max_retries = retries;
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.http.retry_backoff = BackoffConfig {
            backoff_type,
            initial_ms: initial.as_millis() as u64,
            max_ms: max.as_millis() as u64,
        };
        self
    }

    /// Set rate limiter
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.http.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.http.rate_limit = None;
        self
    }

    /// Add a default header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.headers.insert(key.into(), value.into());
        self
    }

    /// The institution URL with whitespace, trailing slashes and any
    /// `/api/v1` suffix removed.
    pub fn institution_url(&self) -> String {
        let url = self.base_url.trim().trim_end_matches('/');
        url.strip_suffix(API_PATH)
            .unwrap_or(url)
            .trim_end_matches('/')
            .to_string()
    }

    /// Base URL of the primary REST API, always ending in `/`
    pub fn api_url(&self) -> String {
        format!("{}{API_PATH}/", self.institution_url())
    }

    /// Base URL of the New Quizzes API, always ending in `/`
    pub fn new_quizzes_url(&self) -> String {
        format!("{}{NEW_QUIZZES_PATH}/", self.institution_url())
    }

    /// GraphQL endpoint
    pub fn graphql_url(&self) -> String {
        format!("{}{GRAPHQL_PATH}", self.institution_url())
    }

    /// Check the config for values the requester cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }

        let parsed = Url::parse(&self.institution_url())?;
        match parsed.scheme() {
            "https" => {}
            "http" => warn!(
                "Canvas base URL {} uses plain http; requests may be rejected or redirected",
                self.base_url
            ),
            other => {
                return Err(Error::config(format!(
                    "unsupported URL scheme '{other}' in base_url"
                )))
            }
        }

        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.ends_with(API_PATH) {
            warn!(
                "base_url {} should not include {API_PATH}; it has been removed",
                self.base_url
            );
        }

        if let Some(limit) = &self.http.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::config("rate_limit.requests_per_second must be > 0"));
            }
        }

        if self
            .access_token
            .as_deref()
            .is_some_and(|t| t.trim() != t || t.is_empty())
        {
            return Err(Error::config(
                "access_token must be non-empty with no surrounding whitespace",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration, `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers sent on every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
            headers: HashMap::new(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// User agent, defaulting to the crate name and version
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("{}/{}", crate::NAME, crate::VERSION))
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (zero-based), capped at `max_ms`
    pub fn delay(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.initial_ms);
        let delay = match self.backoff_type {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(Duration::from_millis(self.max_ms))
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}
