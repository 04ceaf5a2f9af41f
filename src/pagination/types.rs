//! Pagination types and traits
//!
//! Defines the page/cursor abstractions shared by every listing call.

use crate::error::Result;
use crate::http::RequestConfig;
use async_trait::async_trait;

/// Page size used when the caller gives no hint
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Page cursor and size hint for one listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to request; `None` means the first page
    pub page: Option<u32>,
    /// Items per page
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListOptions {
    /// Options for the first page with the given page size
    pub fn new(per_page: u32) -> Self {
        Self {
            page: None,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Shrink the page size to a caller's row limit when that is smaller
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        if let Some(limit) = limit {
            if limit > 0 && limit < u64::from(self.per_page) {
                self.per_page = limit as u32;
            }
        }
        self
    }

    /// Move the cursor to `page`
    #[must_use]
    pub fn at_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Query parameters for the request
    pub fn to_request(&self) -> RequestConfig {
        let config = RequestConfig::new().query("per_page", self.per_page.to_string());
        match self.page {
            Some(page) => config.query("page", page.to_string()),
            None => config,
        }
    }
}

/// One page of results plus the cursor to the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in service order
    pub items: Vec<T>,
    /// Next page number; `None` when results are exhausted
    pub next_page: Option<u32>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}

impl<T> Page<T> {
    /// Create a page; a zero cursor is treated as "no more pages"
    pub fn new(items: Vec<T>, next_page: Option<u32>) -> Self {
        Self {
            items,
            next_page: next_page.filter(|page| *page != 0),
        }
    }

    /// Create the final page
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }

    /// Check if no further pages exist
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }

    /// Convert every item, keeping the cursor
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page: self.next_page,
        }
    }
}

/// Capability to fetch one page of a listing
#[async_trait]
pub trait Lister: Send + Sync {
    /// Listed item type
    type Item: Send;

    /// Fetch the page selected by `opts`
    async fn fetch_page(&self, opts: &ListOptions) -> Result<Page<Self::Item>>;
}

/// Why a pagination sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The service reported no further pages
    Exhausted,
    /// The sink's row limit was reached
    LimitReached,
    /// The sink was cancelled
    Cancelled,
    /// A fetch failed with an error the caller declared ignorable
    Ignored,
}

/// Summary of a completed pagination sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOutcome {
    /// Pages fetched
    pub pages: u32,
    /// Items forwarded to the sink
    pub items: u64,
    /// Terminal state
    pub stop: StopReason,
}
