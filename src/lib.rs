// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # canvas-pager
//!
//! Lazy, cursor-based pagination over the Canvas LMS REST API.
//!
//! ## Features
//!
//! - **Fetch on demand**: pages are requested only when an index, slice or
//!   stream reaches past what has been fetched
//! - **Shared cache**: every access pattern on one list reuses the same pages
//! - **Cursor extraction**: `Link` headers, with `meta.pagination.next` as fallback
//! - **Pluggable transport**: any [`RequestExecutor`](pagination::RequestExecutor);
//!   [`Requester`](http::Requester) is the reqwest-based one
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canvas_pager::http::Requester;
//! use canvas_pager::pagination::{deserialize_item, PaginatedList};
//! use canvas_pager::{ClientConfig, Method, Result};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::from_file("canvas.yaml")?;
//!     let requester = Arc::new(Requester::new(config)?);
//!
//!     let mut courses =
//!         PaginatedList::<Course>::new(requester, Method::GET, "courses", deserialize_item);
//!
//!     let first = courses.get(0).await?;
//!     let mut stream = courses.stream();
//!     while let Some(course) = stream.next().await {
//!         println!("{}", course?.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  get(i)        slice(start, stop, step)     stream()  │
//! └───────────────────────────┬──────────────────────────┘
//!                             │
//! ┌───────────────────────────┴──────────────────────────┐
//! │        PaginatedList: fetched elements + cursor       │
//! └───────────────────────────┬──────────────────────────┘
//!                             │ one page at a time
//! ┌──────────────┬────────────┴───────────┬──────────────┐
//! │  Requester   │   Cursor extraction    │ Constructor  │
//! │ retry, rate  │  Link / meta, prefix   │ raw item → T │
//! │ limit, auth  │  stripping             │              │
//! └──────────────┴────────────────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Canvas HTTP requester
pub mod http;

/// Lazy paginated lists
pub mod pagination;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use pagination::{PaginatedList, RequestExecutor};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
