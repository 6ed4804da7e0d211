//! Next-page cursor extraction
//!
//! Canvas advertises the next page in the `Link` header. A few endpoints use
//! a `meta.pagination.next` body field instead. Either way the absolute URL is
//! reduced to a locator relative to one of the executor's base URLs.

use super::types::PageResponse;
use crate::error::{Error, Result};
use crate::types::JsonValue;

/// Work out the locator of the page after `response`, or `None` when it was
/// the last one.
///
/// A link map that is present but has no `next` relation ends pagination even
/// if the body also carries `meta`. Missing or `null` fields along
/// `meta.pagination.next` also end it; a `next` that is present but unusable
/// is an error.
pub fn next_locator(
    response: &PageResponse,
    base_url: &str,
    new_quizzes_url: &str,
) -> Result<Option<String>> {
    let next_url = if response.links.is_empty() {
        meta_next_url(&response.body)?
    } else {
        response.links.get("next").map(String::as_str)
    };

    next_url
        .map(|url| strip_base_url(url, base_url, new_quizzes_url))
        .transpose()
}

fn meta_next_url(body: &JsonValue) -> Result<Option<&str>> {
    let next = body
        .get("meta")
        .and_then(|meta| meta.get("pagination"))
        .and_then(|pagination| pagination.get("next"));

    match next {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(url)) => Ok(Some(url.as_str())),
        Some(other) => Err(Error::decode(format!(
            "meta.pagination.next must be a URL string, got {other}"
        ))),
    }
}

/// Remove the primary or New Quizzes base URL from the front of `url`.
/// The primary base is tried first.
pub fn strip_base_url(url: &str, base_url: &str, new_quizzes_url: &str) -> Result<String> {
    [base_url, new_quizzes_url]
        .into_iter()
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| url.strip_prefix(prefix))
        .map(str::to_string)
        .ok_or_else(|| Error::unrecognized_host(url))
}
