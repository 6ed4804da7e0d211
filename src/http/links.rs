//! `Link` header parsing (RFC 5988)
//!
//! Format: `<https://host/api/v1/courses?page=2>; rel="next", <...>; rel="last"`

use reqwest::header::{HeaderMap, LINK};
use std::collections::HashMap;

/// Relation name to URL for every `Link` header on a response.
/// A later relation of the same name replaces an earlier one.
pub fn links_from_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut links = HashMap::new();
    for value in headers.get_all(LINK) {
        if let Ok(header) = value.to_str() {
            links.extend(parse_link_header(header));
        }
    }
    links
}

/// Parse one `Link` header value into relation name to URL
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();
    let mut rest = header;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            break;
        };
        let url = after[..close].trim();
        let tail = &after[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        for param in tail[..params_end].split(';') {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let value = value
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches(|c| c == '"' || c == '\'');
            // rel may list several space-separated relation types
            for rel in value.split_whitespace() {
                links.insert(rel.to_string(), url.to_string());
            }
        }

        rest = &tail[params_end..];
    }

    links
}
