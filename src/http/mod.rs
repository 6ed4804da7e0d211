//! HTTP module
//!
//! The Canvas [`Requester`], the concrete [`RequestExecutor`] behind a
//! paginated list when talking to a real Canvas instance.
//!
//! # Features
//!
//! - **Routing**: primary API, New Quizzes API, GraphQL or an arbitrary base URL
//! - **Automatic Retries**: 429 with `Retry-After`, retryable 5xx, timeouts
//! - **Rate Limiting**: token bucket rate limiter using governor
//! - **Link Headers**: RFC 5988 relations handed to the cursor extractor
//!
//! [`RequestExecutor`]: crate::pagination::RequestExecutor

mod client;
mod links;
mod rate_limit;

pub use client::{Requester, GRAPHQL, NEW_QUIZZES};
pub use links::{links_from_headers, parse_link_header};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
