//! Page-cursor iteration
//!
//! State machine: `Fetching -> Emitting -> {Fetching | Stop(reason)}`.
//! Pages are fetched strictly one after another because each request needs
//! the cursor returned by the previous one.

use super::types::{ListOptions, Lister, PaginationOutcome, StopReason, DEFAULT_PER_PAGE};
use crate::error::Result;
use crate::fetch::{Fetcher, IgnorePredicate};
use crate::sink::RowSink;
use tracing::debug;

/// Drives a [`Lister`] through every page, forwarding items to a sink
#[derive(Debug, Clone)]
pub struct Paginator {
    fetcher: Fetcher,
    per_page: u32,
    ignore: Option<IgnorePredicate>,
}

impl Paginator {
    /// Create a paginator with the default page size
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            per_page: DEFAULT_PER_PAGE,
            ignore: None,
        }
    }

    /// Set the page size hint
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// End the sequence quietly on errors matching `ignore`
    #[must_use]
    pub fn ignore_errors(mut self, ignore: Option<IgnorePredicate>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Options for the first request, shrunk to the sink's remaining capacity
    pub fn initial_options<T>(&self, sink: &dyn RowSink<T>) -> ListOptions {
        ListOptions::new(self.per_page).with_limit(sink.remaining_capacity())
    }

    /// Fetch pages until the service runs out of results or the sink is
    /// satisfied.
    ///
    /// Errors abort the sequence; items already emitted stay emitted. An
    /// error matching the ignore predicate stops it with
    /// [`StopReason::Ignored`] and the progress made so far.
    pub async fn run<L: Lister + ?Sized>(
        &self,
        lister: &L,
        sink: &mut dyn RowSink<L::Item>,
    ) -> Result<PaginationOutcome> {
        let mut opts = self.initial_options(sink);
        let mut pages = 0u32;
        let mut items = 0u64;

        loop {
            if let Some(stop) = stop_reason(sink) {
                return Ok(PaginationOutcome { pages, items, stop });
            }

            let page = match self.fetcher.execute(|| lister.fetch_page(&opts)).await {
                Ok(page) => page,
                Err(err) if err.is_cancelled() => {
                    return Ok(PaginationOutcome {
                        pages,
                        items,
                        stop: StopReason::Cancelled,
                    });
                }
                Err(err) if self.ignore.as_ref().is_some_and(|p| p.matches(&err)) => {
                    debug!("Ignoring error after {} pages: {}", pages, err);
                    return Ok(PaginationOutcome {
                        pages,
                        items,
                        stop: StopReason::Ignored,
                    });
                }
                Err(err) => return Err(err),
            };
            pages += 1;
            debug!(
                "Fetched page {} ({} items, next: {:?})",
                opts.page.unwrap_or(1),
                page.items.len(),
                page.next_page
            );

            // Cancelled while the request was in flight
            if let Some(stop) = stop_reason(sink) {
                return Ok(PaginationOutcome { pages, items, stop });
            }

            let next_page = page.next_page;
            for item in page.items {
                sink.emit(item);
                items += 1;

                if let Some(stop) = stop_reason(sink) {
                    return Ok(PaginationOutcome { pages, items, stop });
                }
            }

            match next_page {
                Some(next) if next != 0 => opts = opts.at_page(next),
                _ => {
                    return Ok(PaginationOutcome {
                        pages,
                        items,
                        stop: StopReason::Exhausted,
                    });
                }
            }
        }
    }
}

fn stop_reason<T>(sink: &dyn RowSink<T>) -> Option<StopReason> {
    if sink.is_cancelled() {
        Some(StopReason::Cancelled)
    } else if sink.remaining_capacity() == Some(0) {
        Some(StopReason::LimitReached)
    } else {
        None
    }
}
