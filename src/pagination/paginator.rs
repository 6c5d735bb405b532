//! Page engine: count the filtered source, derive the page window, fetch it
//! and build navigation links from the original request URI.
//!
//! ```ignore
//! let page = Paginator::new(params.page, params.size)
//!     .find(&source, &request_uri)
//!     .await?;
//! ```

use async_trait::async_trait;
use axum::http::Uri;
use serde::Serialize;
use url::form_urlencoded;

use crate::errors::AppError;
use crate::pagination::query::DEFAULT_PAGE_SIZE;

/// A filtered record set that can be counted and windowed.
///
/// Implementations must apply the same filter to both calls so that `count`
/// describes exactly the rows `fetch` pages over.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn count(&self) -> Result<i64, AppError>;

    async fn fetch(&self, offset: i64, limit: i64) -> Result<Vec<Self::Item>, AppError>;
}

/// Navigation links; an empty string means "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub prev: String,
    pub next: String,
    pub last: String,
}

/// Pagination metadata placed next to `data` in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub max_page: i64,
    pub total: i64,
    pub page_size: i64,
    pub current_page: i64,
    pub links: PageLinks,
}

/// One window of records plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub pagination: PaginationInfo,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            pagination: self.pagination,
            records: self.records.into_iter().map(f).collect(),
        }
    }
}

/// `ceil(total / page_size)`, never below 1.
pub fn max_page(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 1;
    }
    let pages = total / page_size + i64::from(total % page_size != 0);
    pages.max(1)
}

#[derive(Debug, Clone)]
pub struct Paginator {
    current_page: i64,
    page_size: i64,
    total: i64,
    max_page: i64,
    links: PageLinks,
}

impl Paginator {
    /// Pages below 1 become 1; non-positive sizes become the default size.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            current_page: page.max(1),
            page_size: if page_size > 0 {
                page_size
            } else {
                DEFAULT_PAGE_SIZE
            },
            total: 0,
            max_page: 1,
            links: PageLinks::default(),
        }
    }

    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.current_page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Count, fetch the window and build links.
    ///
    /// A page past the last one yields no records; its links are still
    /// derived from the requested page number, not clamped.
    pub async fn find<S>(mut self, source: &S, request_uri: &Uri) -> Result<Page<S::Item>, AppError>
    where
        S: PageSource + ?Sized,
    {
        let total = source.count().await?;
        self.update_page_info(total, request_uri);
        let records = source.fetch(self.offset(), self.limit()).await?;

        Ok(Page {
            pagination: self.info(),
            records,
        })
    }

    /// Record `total`, recompute `max_page` and rebuild every link.
    pub fn update_page_info(&mut self, total: i64, request_uri: &Uri) {
        self.total = total.max(0);
        self.max_page = max_page(self.total, self.page_size);
        self.links = PageLinks {
            first: self.page_link(request_uri, 1),
            prev: if self.has_prev() {
                self.page_link(request_uri, self.current_page - 1)
            } else {
                String::new()
            },
            next: if self.has_next() {
                self.page_link(request_uri, self.current_page + 1)
            } else {
                String::new()
            },
            last: self.page_link(request_uri, self.max_page),
        };
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.max_page
    }

    /// The request URI with its `page` parameter replaced; keys are sorted.
    pub fn page_link(&self, request_uri: &Uri, page: i64) -> String {
        let mut pairs: Vec<(String, String)> = request_uri
            .query()
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .filter(|(key, _)| key != "page")
                    .collect()
            })
            .unwrap_or_default();
        pairs.push(("page".to_string(), page.to_string()));
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}?{}", request_uri.path(), query)
    }

    pub fn info(&self) -> PaginationInfo {
        PaginationInfo {
            max_page: self.max_page,
            total: self.total,
            page_size: self.page_size,
            current_page: self.current_page,
            links: self.links.clone(),
        }
    }
}
