//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, IgnorePredicate, RetryPolicy};
use crate::sink::{CollectingSink, RowSink};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::Mutex;
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Fake lister
// ============================================================================

/// Serves `total` numbered items in pages of the requested size, cursor
/// style (page numbers start at 1)
struct NumberLister {
    total: u32,
    requests: Mutex<Vec<ListOptions>>,
    failures: Mutex<Vec<(u32, Error)>>,
}

impl NumberLister {
    fn new(total: u32) -> Self {
        Self {
            total,
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next request for `page` with `err`
    fn fail_on(self, page: u32, err: Error) -> Self {
        self.failures.lock().unwrap().push((page, err));
        self
    }

    fn requests(&self) -> Vec<ListOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Lister for NumberLister {
    type Item = u32;

    async fn fetch_page(&self, opts: &ListOptions) -> Result<Page<u32>> {
        self.requests.lock().unwrap().push(*opts);
        let page = opts.page.unwrap_or(1);

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(pos) = failures.iter().position(|(p, _)| *p == page) {
                return Err(failures.remove(pos).1);
            }
        }

        let start = (page - 1) * opts.per_page;
        let end = (start + opts.per_page).min(self.total);
        let items: Vec<u32> = (start..end).collect();
        let next = (end < self.total).then_some(page + 1);
        Ok(Page::new(items, next))
    }
}

/// Serves a fixed script of pages regardless of the cursor
struct ScriptedLister {
    pages: Mutex<Vec<Page<&'static str>>>,
    calls: Mutex<u32>,
}

impl ScriptedLister {
    fn new(pages: Vec<Page<&'static str>>) -> Self {
        Self {
            pages: Mutex::new(pages),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Lister for ScriptedLister {
    type Item = &'static str;

    async fn fetch_page(&self, _opts: &ListOptions) -> Result<Page<&'static str>> {
        *self.calls.lock().unwrap() += 1;
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            return Err(Error::Other("no more scripted pages".into()));
        }
        Ok(pages.remove(0))
    }
}

fn paginator() -> Paginator {
    Paginator::new(Fetcher::new(RetryPolicy::fibonacci(
        Duration::from_millis(1),
        10,
    )))
}

// ============================================================================
// ListOptions / Page Tests
// ============================================================================

#[test]
fn test_list_options_default() {
    let opts = ListOptions::default();
    assert_eq!(opts.page, None);
    assert_eq!(opts.per_page, DEFAULT_PER_PAGE);
}

#[test_case(100, None, 100 ; "no limit")]
#[test_case(100, Some(50), 50 ; "limit below page size")]
#[test_case(100, Some(500), 100 ; "limit above page size")]
#[test_case(100, Some(0), 100 ; "zero limit ignored")]
#[test_case(30, Some(100), 30 ; "small page size kept")]
#[test_case(250, None, 100 ; "page size clamped to max")]
fn test_list_options_with_limit(per_page: u32, limit: Option<u64>, expected: u32) {
    assert_eq!(ListOptions::new(per_page).with_limit(limit).per_page, expected);
}

#[test]
fn test_list_options_to_request() {
    let first = ListOptions::new(50).to_request();
    assert_eq!(first.query.get("per_page"), Some(&"50".to_string()));
    assert!(first.query.get("page").is_none());

    let third = ListOptions::new(50).at_page(3).to_request();
    assert_eq!(third.query.get("page"), Some(&"3".to_string()));
}

#[test]
fn test_page_zero_cursor_is_last() {
    assert!(Page::new(vec![1], Some(0)).is_last());
    assert!(Page::<u8>::default().is_last());
    assert!(!Page::new(vec![1], Some(2)).is_last());
}

#[test]
fn test_page_map_keeps_cursor() {
    let page = Page::new(vec![1, 2], Some(4)).map(|n| n * 10);
    assert_eq!(page.items, vec![10, 20]);
    assert_eq!(page.next_page, Some(4));
}

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_parse_link_header() {
    let header = r#"<https://api.github.com/repositories/1/releases?page=2>; rel="next", <https://api.github.com/repositories/1/releases?page=5>; rel="last""#;

    assert_eq!(
        parse_link_header(header, "next"),
        Some("https://api.github.com/repositories/1/releases?page=2".to_string())
    );
    assert_eq!(
        parse_link_header(header, "last"),
        Some("https://api.github.com/repositories/1/releases?page=5".to_string())
    );
    assert_eq!(parse_link_header(header, "prev"), None);
}

#[test]
fn test_next_page_from_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static(
            r#"<https://api.github.com/x?per_page=100&page=3>; rel="next", <https://api.github.com/x?page=1>; rel="first""#,
        ),
    );
    assert_eq!(next_page(&headers), Some(3));
}

#[test]
fn test_next_page_absent() {
    assert_eq!(next_page(&HeaderMap::new()), None);

    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static(r#"<https://api.github.com/x?page=1>; rel="prev""#),
    );
    assert_eq!(next_page(&headers), None);

    headers.insert(
        "link",
        HeaderValue::from_static(r#"<https://api.github.com/x?page=0>; rel="next""#),
    );
    assert_eq!(next_page(&headers), None);
}

// ============================================================================
// Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_emits_all_items_in_order() {
    let lister = NumberLister::new(250);
    let mut sink = CollectingSink::<u32>::new();

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert_eq!(sink.items(), (0..250u32).collect::<Vec<_>>().as_slice());
    assert_eq!(outcome.pages, 3);
    assert_eq!(outcome.items, 250);
    assert_eq!(outcome.stop, StopReason::Exhausted);
}

#[test_case(0, 10, 1 ; "empty listing still fetches once")]
#[test_case(10, 10, 1 ; "exact single page")]
#[test_case(11, 10, 2 ; "one extra item")]
#[test_case(95, 7, 14 ; "uneven pages")]
#[tokio::test]
async fn test_fetch_count_is_ceil(total: u32, per_page: u32, expected_pages: u32) {
    let lister = NumberLister::new(total);
    let mut sink = CollectingSink::<u32>::new();

    let outcome = paginator()
        .per_page(per_page)
        .run(&lister, &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome.pages, expected_pages);
    assert_eq!(sink.into_items(), (0..total).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_limit_shrinks_first_page_size() {
    let lister = NumberLister::new(500);
    let mut sink = CollectingSink::<u32>::with_limit(Some(50));

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    let requests = lister.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].per_page, 50);
    assert_eq!(sink.items().len(), 50);
    assert_eq!(outcome.stop, StopReason::LimitReached);
}

#[tokio::test]
async fn test_limit_stops_mid_page_without_further_calls() {
    let lister = ScriptedLister::new(vec![
        Page::new(vec!["a", "b", "c"], Some(2)),
        Page::new(vec!["d"], None),
    ]);
    let mut sink = CollectingSink::<&str>::with_limit(Some(2));

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert_eq!(sink.items(), &["a", "b"]);
    assert_eq!(lister.calls(), 1);
    assert_eq!(outcome.items, 2);
    assert_eq!(outcome.stop, StopReason::LimitReached);
}

#[tokio::test]
async fn test_two_pages_then_stop() {
    let first: Vec<&'static str> = vec!["x"; 100];
    let second: Vec<&'static str> = vec!["y"; 30];
    let lister = ScriptedLister::new(vec![Page::new(first, Some(2)), Page::new(second, None)]);
    let mut sink = CollectingSink::<&str>::new();

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert_eq!(sink.items().len(), 130);
    assert_eq!(lister.calls(), 2);
    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.stop, StopReason::Exhausted);
}

#[tokio::test]
async fn test_empty_page_with_cursor_continues() {
    let lister = ScriptedLister::new(vec![
        Page::new(vec![], Some(2)),
        Page::new(vec!["late"], None),
    ]);
    let mut sink = CollectingSink::<&str>::new();

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert_eq!(sink.items(), &["late"]);
    assert_eq!(outcome.pages, 2);
}

#[tokio::test]
async fn test_cursor_follows_service() {
    let lister = NumberLister::new(25);
    let mut sink = CollectingSink::<u32>::new();

    paginator()
        .per_page(10)
        .run(&lister, &mut sink)
        .await
        .unwrap();

    let pages: Vec<Option<u32>> = lister.requests().iter().map(|o| o.page).collect();
    assert_eq!(pages, vec![None, Some(2), Some(3)]);
}

#[tokio::test]
async fn test_rate_limited_page_is_retried_transparently() {
    let lister = NumberLister::new(30).fail_on(
        2,
        Error::RateLimited {
            retry_after_seconds: 1,
        },
    );
    let mut sink = CollectingSink::<u32>::new();

    let outcome = paginator()
        .per_page(10)
        .run(&lister, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.into_items(), (0..30u32).collect::<Vec<_>>());
    assert_eq!(outcome.pages, 3);
    assert_eq!(lister.requests().len(), 4);
}

#[tokio::test]
async fn test_error_aborts_and_keeps_partial_results() {
    let lister = NumberLister::new(30).fail_on(2, Error::http_status(500, "boom"));
    let mut sink = CollectingSink::<u32>::new();

    let err = paginator()
        .per_page(10)
        .run(&lister, &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(sink.into_items(), (0..10u32).collect::<Vec<_>>());
    assert_eq!(lister.requests().len(), 2);
}

#[tokio::test]
async fn test_cancelled_sink_issues_no_calls() {
    let token = CancellationToken::new();
    token.cancel();
    let lister = NumberLister::new(30);
    let mut sink = CollectingSink::<u32>::new().with_cancellation(token);

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert_eq!(outcome.pages, 0);
    assert_eq!(outcome.stop, StopReason::Cancelled);
    assert!(lister.requests().is_empty());
}

/// Sink that cancels itself after a fixed number of items
struct CancelAfter {
    seen: Vec<u32>,
    after: usize,
    token: CancellationToken,
}

impl RowSink<u32> for CancelAfter {
    fn emit(&mut self, item: u32) {
        self.seen.push(item);
        if self.seen.len() == self.after {
            self.token.cancel();
        }
    }

    fn remaining_capacity(&self) -> Option<u64> {
        None
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[tokio::test]
async fn test_cancellation_mid_page_stops_immediately() {
    let lister = NumberLister::new(100);
    let mut sink = CancelAfter {
        seen: Vec::new(),
        after: 15,
        token: CancellationToken::new(),
    };

    let outcome = paginator()
        .per_page(10)
        .run(&lister, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.seen, (0..15u32).collect::<Vec<_>>());
    assert_eq!(lister.requests().len(), 2);
    assert_eq!(outcome.stop, StopReason::Cancelled);
}

#[tokio::test]
async fn test_cancel_during_backoff_is_clean_stop() {
    let token = CancellationToken::new();
    let lister = NumberLister::new(10).fail_on(
        1,
        Error::RateLimited {
            retry_after_seconds: 1,
        },
    );
    let paginator = Paginator::new(
        Fetcher::new(RetryPolicy::fibonacci(Duration::from_secs(30), 10))
            .cancel_on(token.clone()),
    );
    let mut sink = CollectingSink::<u32>::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let outcome = paginator.run(&lister, &mut sink).await.unwrap();
    canceller.await.unwrap();

    assert_eq!(outcome.stop, StopReason::Cancelled);
    assert_eq!(outcome.pages, 0);
    assert!(sink.items().is_empty());
}

/// Fires the token while its only request is in flight
struct CancelInFlight {
    token: CancellationToken,
}

#[async_trait]
impl Lister for CancelInFlight {
    type Item = u32;

    async fn fetch_page(&self, _opts: &ListOptions) -> Result<Page<u32>> {
        self.token.cancel();
        Ok(Page::new(vec![1, 2, 3], Some(2)))
    }
}

#[tokio::test]
async fn test_cancel_during_fetch_emits_nothing_from_page() {
    let token = CancellationToken::new();
    let lister = CancelInFlight {
        token: token.clone(),
    };
    let mut sink = CollectingSink::<u32>::new().with_cancellation(token);

    let outcome = paginator().run(&lister, &mut sink).await.unwrap();

    assert!(sink.items().is_empty());
    assert_eq!(outcome.pages, 1);
    assert_eq!(outcome.items, 0);
    assert_eq!(outcome.stop, StopReason::Cancelled);
}

// ============================================================================
// Ignored Error Tests
// ============================================================================

#[tokio::test]
async fn test_ignored_error_keeps_progress() {
    let lister = NumberLister::new(30).fail_on(2, Error::not_found("repos/a/b/releases"));
    let mut sink = CollectingSink::<u32>::new();

    let outcome = paginator()
        .per_page(10)
        .ignore_errors(Some(IgnorePredicate::codes(&["404"])))
        .run(&lister, &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome.stop, StopReason::Ignored);
    assert_eq!(outcome.pages, 1);
    assert_eq!(outcome.items, 10);
    assert_eq!(sink.into_items(), (0..10u32).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_unmatched_error_still_propagates() {
    let lister = NumberLister::new(30).fail_on(1, Error::http_status(500, "boom"));
    let mut sink = CollectingSink::<u32>::new();

    let err = paginator()
        .ignore_errors(Some(IgnorePredicate::codes(&["404"])))
        .run(&lister, &mut sink)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "500");
    assert!(sink.items().is_empty());
}
