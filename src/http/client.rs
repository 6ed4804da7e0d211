//! Canvas requester
//!
//! The HTTP side of pagination. Handles:
//! - Base URL selection and locator joining
//! - Bearer authentication
//! - Automatic retries with configurable backoff
//! - Rate limiting to stay under the Canvas request quota
//! - `Link` header and JSON body decoding into a [`PageResponse`]

use super::links::links_from_headers;
use super::rate_limit::RateLimiter;
use crate::config::ClientConfig;
use crate::error::{is_retryable_status, Error, Result};
use crate::pagination::{PageRequest, PageResponse, RequestExecutor};
use crate::types::{JsonValue, Method, QueryParams};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// `url_override` value that routes to the New Quizzes API
pub const NEW_QUIZZES: &str = "new_quizzes";

/// `url_override` value that routes to the GraphQL endpoint
pub const GRAPHQL: &str = "graphql";

/// Executes Canvas API requests
pub struct Requester {
    client: Client,
    config: ClientConfig,
    api_url: String,
    new_quizzes_url: String,
    graphql_url: String,
    rate_limiter: Option<RateLimiter>,
}

impl Requester {
    /// Create a requester from a validated config
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent())
            .build()?;
        let rate_limiter = config.http.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            api_url: config.api_url(),
            new_quizzes_url: config.new_quizzes_url(),
            graphql_url: config.graphql_url(),
            config,
            rate_limiter,
        })
    }

    /// The config this requester was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Full URL for `locator` under the base selected by `url_override`.
    /// Absolute locators are used as they are.
    pub fn build_url(&self, locator: &str, url_override: Option<&str>) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return locator.to_string();
        }

        let base = match url_override {
            None => self.api_url.as_str(),
            Some(NEW_QUIZZES) => self.new_quizzes_url.as_str(),
            Some(GRAPHQL) => self.graphql_url.as_str(),
            Some(other) => other,
        };

        if locator.is_empty() {
            return base.to_string();
        }
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            locator.trim_start_matches('/')
        )
    }

    /// Send a request, retrying rate limits, server errors and timeouts
    pub async fn request(
        &self,
        method: Method,
        locator: &str,
        url_override: Option<&str>,
        params: &QueryParams,
    ) -> Result<Response> {
        let url = self.build_url(locator, url_override);
        let max_retries = self.config.http.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let retries_left = attempt < max_retries;
            let delay = match self.prepare(method, &url, params).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Request succeeded: {} {}", method, url);
                    return Ok(response);
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after_seconds(&response);
                    if !retries_left {
                        return Err(Error::RateLimited {
                            retry_after_seconds: retry_after,
                        });
                    }
                    warn!(
                        "Rate limited (429) on {}, attempt {}/{}, waiting {}s",
                        url,
                        attempt + 1,
                        max_retries + 1,
                        retry_after
                    );
                    Duration::from_secs(retry_after)
                }
                Ok(response) if retries_left && is_retryable_response(&response) => {
                    let delay = self.config.http.retry_backoff.delay(attempt);
                    warn!(
                        "Request to {} failed with {}, attempt {}/{}, retrying in {:?}",
                        url,
                        response.status().as_u16(),
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    delay
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::http_status(status, body));
                }
                Err(e) if retries_left && (e.is_timeout() || e.is_connect()) => {
                    let delay = self.config.http.retry_backoff.delay(attempt);
                    warn!(
                        "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                        url,
                        e,
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    delay
                }
                Err(e) if e.is_timeout() => {
                    return Err(Error::Timeout {
                        timeout_ms: self.config.http.timeout().as_millis() as u64,
                    });
                }
                Err(e) => return Err(Error::Http(e)),
            };

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn prepare(&self, method: Method, url: &str, params: &QueryParams) -> RequestBuilder {
        let mut req = self.client.request(method.into(), url);

        for (key, value) in &self.config.http.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(ref token) = self.config.access_token {
            req = req.bearer_auth(token);
        }

        if params.is_empty() {
            req
        } else if method.sends_query() {
            req.query(params)
        } else {
            req.form(params)
        }
    }
}

#[async_trait]
impl RequestExecutor for Requester {
    async fn execute(&self, request: PageRequest) -> Result<PageResponse> {
        let response = self
            .request(
                request.method,
                &request.locator,
                request.url_override.as_deref(),
                &request.params,
            )
            .await?;

        let links = links_from_headers(response.headers());
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(PageResponse { body, links })
    }

    fn base_url(&self) -> &str {
        &self.api_url
    }

    fn new_quizzes_url(&self) -> &str {
        &self.new_quizzes_url
    }
}

impl std::fmt::Debug for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requester")
            .field("api_url", &self.api_url)
            .field("new_quizzes_url", &self.new_quizzes_url)
            .field("has_access_token", &self.config.access_token.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn is_retryable_response(response: &Response) -> bool {
    is_retryable_status(response.status().as_u16())
}

/// Seconds to wait from a `Retry-After` header, 60 when absent
fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(60)
}
