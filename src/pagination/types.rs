//! Pagination types and traits
//!
//! The seams between the pagination core and its collaborators: the request
//! executor that performs page requests, and the constructor that turns one
//! raw item into a typed element.

use crate::error::Result;
use crate::types::{JsonValue, Method, QueryParams, RawItem};
use async_trait::async_trait;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

/// Page size sent with the first request unless the caller picks one
pub const DEFAULT_PER_PAGE: u32 = 100;

/// One page request handed to a [`RequestExecutor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// HTTP method
    pub method: Method,
    /// Endpoint relative to the selected base URL, may carry a query string
    pub locator: String,
    /// Alternate base URL selector (`"new_quizzes"`, `"graphql"`, or a URL)
    pub url_override: Option<String>,
    /// Request parameters; empty for every page after the first
    pub params: QueryParams,
}

/// A decoded page response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    /// Decoded JSON body
    pub body: JsonValue,
    /// `Link` header relations, rel name to URL
    pub links: HashMap<String, String>,
}

impl PageResponse {
    /// Create a response with the given body and no link relations
    pub fn new(body: JsonValue) -> Self {
        Self {
            body,
            links: HashMap::new(),
        }
    }

    /// Add a link relation
    #[must_use]
    pub fn with_link(mut self, rel: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(rel.into(), url.into());
        self
    }
}

/// Performs page requests for a [`PaginatedList`](super::PaginatedList).
///
/// Retries, authentication and URL construction are the executor's business;
/// the list only passes locators through and reads the response back.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute one request and decode its body
    async fn execute(&self, request: PageRequest) -> Result<PageResponse>;

    /// Base URL of the primary API. Next-page URLs under it become locators.
    fn base_url(&self) -> &str;

    /// Base URL of the New Quizzes API, the second accepted next-page prefix
    fn new_quizzes_url(&self) -> &str;
}

/// Builds one typed element from a merged raw item
pub type Constructor<T> =
    Box<dyn Fn(&Arc<dyn RequestExecutor>, RawItem) -> Result<T> + Send + Sync>;

/// Lazy sequence of elements produced by a list or a slice of it
pub type ItemStream<'a, T> = Pin<Box<dyn Stream<Item = Result<Arc<T>>> + Send + 'a>>;

/// Constructor for any type that deserializes straight from the raw item
pub fn deserialize_item<T: DeserializeOwned>(
    _executor: &Arc<dyn RequestExecutor>,
    raw: RawItem,
) -> Result<T> {
    Ok(serde_json::from_value(JsonValue::Object(raw))?)
}
