//! Lazily grown list over a paginated endpoint
//!
//! A [`PaginatedList`] starts empty and fetches pages only when an index,
//! slice or stream needs elements it has not seen yet. Fetched elements are
//! kept for the lifetime of the list and shared by every access pattern.

use super::cursor;
use super::slice::Slice;
use super::types::{Constructor, ItemStream, PageRequest, RequestExecutor, DEFAULT_PER_PAGE};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, QueryParams, RawItem};
use futures::{stream, TryStreamExt};
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;
use tracing::debug;

/// A list of `T` backed by a paginated API endpoint.
///
/// All growth goes through `&mut self`. A list is meant to be driven by one
/// task at a time; share it across tasks only behind your own lock.
pub struct PaginatedList<T> {
    elements: Vec<Arc<T>>,
    executor: Arc<dyn RequestExecutor>,
    constructor: Constructor<T>,
    method: Method,
    first_url: String,
    next_url: Option<String>,
    next_params: QueryParams,
    extra_attribs: RawItem,
    root: Option<String>,
    url_override: Option<String>,
}

impl<T> PaginatedList<T> {
    /// Start building a list whose first page is at `first_url`
    pub fn builder<F>(
        executor: Arc<dyn RequestExecutor>,
        method: Method,
        first_url: impl Into<String>,
        constructor: F,
    ) -> PaginatedListBuilder<T>
    where
        F: Fn(&Arc<dyn RequestExecutor>, RawItem) -> Result<T> + Send + Sync + 'static,
    {
        PaginatedListBuilder {
            executor,
            constructor: Box::new(constructor),
            method,
            first_url: first_url.into(),
            params: QueryParams::new(),
            per_page: None,
            extra_attribs: RawItem::new(),
            root: None,
            url_override: None,
        }
    }

    /// A list with no extra attributes, no root and the default page size
    pub fn new<F>(
        executor: Arc<dyn RequestExecutor>,
        method: Method,
        first_url: impl Into<String>,
        constructor: F,
    ) -> Self
    where
        F: Fn(&Arc<dyn RequestExecutor>, RawItem) -> Result<T> + Send + Sync + 'static,
    {
        Self::builder(executor, method, first_url, constructor).build()
    }

    /// Elements fetched so far, in server order
    pub fn fetched(&self) -> &[Arc<T>] {
        &self.elements
    }

    /// Number of elements fetched so far
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if nothing has been fetched yet
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Endpoint of the first page
    pub fn first_url(&self) -> &str {
        &self.first_url
    }

    /// Locator of the next page to fetch, if any
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    /// Whether another page may exist
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }

    /// True if `index` is already fetched or more pages may still hold it
    pub fn is_larger_than(&self, index: usize) -> bool {
        self.elements.len() > index || self.has_next()
    }

    /// Element at `index`, fetching pages until it exists.
    ///
    /// Negative indices are rejected without any request.
    pub async fn get(&mut self, index: isize) -> Result<Arc<T>> {
        let index = usize::try_from(index).map_err(|_| Error::InvalidIndex { index })?;
        self.get_at(index).await
    }

    pub(crate) async fn get_at(&mut self, index: usize) -> Result<Arc<T>> {
        self.get_up_to_index(index).await?;
        self.elements
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.elements.len(),
            })
    }

    /// Lazy view over `start..stop` taking every `step`th element.
    ///
    /// `stop: None` runs to the end of the list. A step of zero is treated as one.
    pub fn slice(
        &mut self,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<usize>,
    ) -> Result<Slice<'_, T>> {
        let start = start.unwrap_or(0);
        let start = usize::try_from(start).map_err(|_| Error::InvalidIndex { index: start })?;
        let stop = stop
            .map(|stop| usize::try_from(stop).map_err(|_| Error::InvalidIndex { index: stop }))
            .transpose()?;
        let step = step.filter(|&step| step > 0).unwrap_or(1);

        Ok(Slice::new(self, start, stop, step))
    }

    /// Lazy view over a range of indices, one element at a time
    pub fn range(&mut self, range: impl RangeBounds<usize>) -> Slice<'_, T> {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let stop = match range.end_bound() {
            Bound::Included(&end) => Some(end.saturating_add(1)),
            Bound::Excluded(&end) => Some(end),
            Bound::Unbounded => None,
        };

        Slice::new(self, start, stop, 1)
    }

    /// Fetch pages until `index` exists or the endpoint runs out
    async fn get_up_to_index(&mut self, index: usize) -> Result<()> {
        while self.elements.len() <= index && self.has_next() {
            self.grow().await?;
        }
        Ok(())
    }

    /// Fetch one page and append it, returning the new elements
    async fn grow(&mut self) -> Result<&[Arc<T>]> {
        let new_elements = self.fetch_next_page().await?;
        let start = self.elements.len();
        self.elements.extend(new_elements.into_iter().map(Arc::new));
        Ok(&self.elements[start..])
    }

    async fn fetch_next_page(&mut self) -> Result<Vec<T>> {
        let Some(locator) = self.next_url.clone() else {
            return Ok(Vec::new());
        };

        let request = PageRequest {
            method: self.method,
            locator: locator.clone(),
            url_override: self.url_override.clone(),
            params: self.next_params.clone(),
        };
        let response = self.executor.execute(request).await?;

        // Cleared before parsing so a bad next link leaves the list exhausted.
        self.next_url = None;
        self.next_url = cursor::next_locator(
            &response,
            self.executor.base_url(),
            self.executor.new_quizzes_url(),
        )?;
        self.next_params.clear();

        let items = self.page_items(response.body)?;
        let mut content = Vec::with_capacity(items.len());
        for item in items {
            let mut raw = match item {
                JsonValue::Null => continue,
                JsonValue::Object(raw) => raw,
                other => {
                    return Err(Error::decode(format!(
                        "expected an object for each item, got {other}"
                    )))
                }
            };
            raw.extend(self.extra_attribs.clone());
            content.push((self.constructor)(&self.executor, raw)?);
        }

        debug!(
            "Fetched {} {} items from {}, next page: {:?}",
            content.len(),
            short_type_name::<T>(),
            locator,
            self.next_url
        );
        Ok(content)
    }

    /// The item array of a page body, unwrapped from `root` when configured
    fn page_items(&self, body: JsonValue) -> Result<Vec<JsonValue>> {
        let body = match &self.root {
            Some(root) => match body {
                JsonValue::Object(mut map) => {
                    map.remove(root).ok_or_else(|| Error::missing_root(root))?
                }
                _ => return Err(Error::missing_root(root)),
            },
            None => body,
        };

        match body {
            JsonValue::Array(items) => Ok(items),
            other => Err(Error::decode(format!(
                "expected a list of items, got {other}"
            ))),
        }
    }
}

impl<T: Send + Sync> PaginatedList<T> {
    /// Stream every element: the fetched ones first, then new pages as they
    /// arrive. Each call starts again from index zero without refetching.
    pub fn stream(&mut self) -> ItemStream<'_, T> {
        Box::pin(stream::try_unfold(
            (self, 0usize),
            |(list, position)| async move {
                let next = list.next_from(position).await?;
                Ok::<_, Error>(next.map(|element| (element, (list, position + 1))))
            },
        ))
    }

    /// Fetch the whole endpoint and return every element
    pub async fn collect(&mut self) -> Result<Vec<Arc<T>>> {
        self.stream().try_collect().await
    }

    async fn next_from(&mut self, position: usize) -> Result<Option<Arc<T>>> {
        loop {
            if let Some(element) = self.elements.get(position) {
                return Ok(Some(Arc::clone(element)));
            }
            if !self.has_next() {
                return Ok(None);
            }
            self.grow().await?;
        }
    }
}

impl<T> std::fmt::Display for PaginatedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<PaginatedList of type {}>", short_type_name::<T>())
    }
}

impl<T> std::fmt::Debug for PaginatedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedList")
            .field("type", &short_type_name::<T>())
            .field("fetched", &self.elements.len())
            .field("method", &self.method)
            .field("first_url", &self.first_url)
            .field("next_url", &self.next_url)
            .field("root", &self.root)
            .field("url_override", &self.url_override)
            .finish_non_exhaustive()
    }
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Builder for [`PaginatedList`]
pub struct PaginatedListBuilder<T> {
    executor: Arc<dyn RequestExecutor>,
    constructor: Constructor<T>,
    method: Method,
    first_url: String,
    params: QueryParams,
    per_page: Option<u32>,
    extra_attribs: RawItem,
    root: Option<String>,
    url_override: Option<String>,
}

impl<T> PaginatedListBuilder<T> {
    /// Add a first-request parameter. Keys may repeat.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add several first-request parameters
    #[must_use]
    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Page size for the first request, replacing any `per_page` parameter
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Fields merged into every raw item, overriding fields of the same name
    #[must_use]
    pub fn extra_attribs(mut self, attribs: RawItem) -> Self {
        self.extra_attribs.extend(attribs);
        self
    }

    /// Add a single extra attribute
    #[must_use]
    pub fn extra_attrib(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra_attribs.insert(key.into(), value.into());
        self
    }

    /// Read items from this field of each page body instead of the body itself
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Route requests through an alternate base URL
    #[must_use]
    pub fn url_override(mut self, url_override: impl Into<String>) -> Self {
        self.url_override = Some(url_override.into());
        self
    }

    /// Build the list. Nothing is fetched until it is read.
    pub fn build(self) -> PaginatedList<T> {
        let mut params = self.params;
        match self.per_page {
            Some(per_page) => {
                params.retain(|(key, _)| key != "per_page");
                params.push(("per_page".to_string(), per_page.to_string()));
            }
            None if !params.iter().any(|(key, _)| key == "per_page") => {
                params.push(("per_page".to_string(), DEFAULT_PER_PAGE.to_string()));
            }
            None => {}
        }

        PaginatedList {
            elements: Vec::new(),
            executor: self.executor,
            constructor: self.constructor,
            method: self.method,
            next_url: Some(self.first_url.clone()),
            first_url: self.first_url,
            next_params: params,
            extra_attribs: self.extra_attribs,
            root: self.root,
            url_override: self.url_override,
        }
    }
}
