//! Pagination module
//!
//! Lazy, cursor-based access to Canvas list endpoints.
//!
//! # Overview
//!
//! A [`PaginatedList`] fetches pages through a [`RequestExecutor`] only when
//! an index, slice or stream reaches past what it already holds. Each page
//! response yields the locator of the next page (see [`next_locator`]); the
//! list is exhausted once no locator comes back.
//!
//! ```rust,ignore
//! use canvas_pager::pagination::{deserialize_item, PaginatedList};
//! use canvas_pager::Method;
//!
//! let mut courses =
//!     PaginatedList::<Course>::builder(executor, Method::GET, "courses", deserialize_item)
//!         .param("enrollment_type", "teacher")
//!         .build();
//!
//! let third = courses.get(2).await?;
//! let first_five = courses.slice(None, Some(5), None)?.collect().await?;
//! ```

mod cursor;
mod list;
mod slice;
mod types;

pub use cursor::{next_locator, strip_base_url};
pub use list::{PaginatedList, PaginatedListBuilder};
pub use slice::Slice;
pub use types::{
    deserialize_item, Constructor, ItemStream, PageRequest, PageResponse, RequestExecutor,
    DEFAULT_PER_PAGE,
};
