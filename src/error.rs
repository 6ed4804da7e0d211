//! Error types for canvas-pager
//!
//! Every public API returns `Result<T, Error>` with the error defined here.
//! Index and slice errors come from the view layer, the data-contract errors
//! from page decoding, and the rest from the HTTP executor.

use thiserror::Error;

/// The main error type for canvas-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Access Errors
    // ============================================================================
    #[error("Cannot negative index a PaginatedList: {index}")]
    InvalidIndex { index: isize },

    #[error("Index {index} out of range for PaginatedList of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ============================================================================
    // Data Contract Errors
    // ============================================================================
    #[error("The key <{field}> does not exist in the response")]
    MissingRootField { field: String },

    #[error("Next page URL '{url}' does not start with a known API base URL")]
    UnrecognizedHostPrefix { url: String },

    #[error("Failed to decode page: {message}")]
    Decode { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O and Generic Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a missing root field error
    pub fn missing_root(field: impl Into<String>) -> Self {
        Self::MissingRootField {
            field: field.into(),
        }
    }

    /// Create an unrecognized host prefix error
    pub fn unrecognized_host(url: impl Into<String>) -> Self {
        Self::UnrecognizedHostPrefix { url: url.into() }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing config field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error is an out-of-range index
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for canvas-pager
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidIndex { index: -1 };
        assert_eq!(err.to_string(), "Cannot negative index a PaginatedList: -1");

        let err = Error::missing_root("items");
        assert_eq!(
            err.to_string(),
            "The key <items> does not exist in the response"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_is_out_of_range() {
        assert!(Error::IndexOutOfRange { index: 3, len: 2 }.is_out_of_range());
        assert!(!Error::InvalidIndex { index: -3 }.is_out_of_range());
        assert!(!Error::missing_root("items").is_out_of_range());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::unrecognized_host("https://elsewhere").is_retryable());
        assert!(!Error::decode("bad").is_retryable());
    }
}
