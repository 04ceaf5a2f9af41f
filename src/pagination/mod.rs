//! Pagination module
//!
//! # Overview
//!
//! Listing calls return a [`Page`]: the items plus an opaque next-page cursor
//! taken from the `Link` response header. The [`Paginator`] asks a [`Lister`]
//! for one page at a time (each request under the [`crate::fetch::Fetcher`]
//! retry policy), forwards every item to a [`crate::sink::RowSink`], and stops
//! when the cursor runs out, the sink's limit is reached, or it is cancelled.

mod link;
mod paginator;
mod types;

pub use link::{next_page, parse_link_header};
pub use paginator::Paginator;
pub use types::{
    ListOptions, Lister, Page, PaginationOutcome, StopReason, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};

#[cfg(test)]
mod tests;
