//! Pagination primitives shared across list endpoints: query parameter
//! parsing and the page engine that counts, fetches and builds links.

pub mod paginator;
pub mod query;

pub use paginator::{Page, PageLinks, PageSource, PaginationInfo, Paginator};
pub use query::{ListParams, RawListParams, DEFAULT_PAGE_SIZE};
