//! Tests for the fetch module

use super::*;
use crate::error::{Error, Result};
use crate::types::BackoffType;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

fn rate_limited() -> Error {
    Error::RateLimited {
        retry_after_seconds: 1,
    }
}

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::fibonacci(Duration::from_millis(1), max_attempts)
}

// ============================================================================
// RetryPolicy Tests
// ============================================================================

#[test]
fn test_retry_policy_default() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.base_delay, Duration::from_millis(100));
    assert_eq!(policy.max_attempts, 10);
    assert_eq!(policy.backoff, BackoffType::Fibonacci);
}

#[test]
fn test_fibonacci_schedule() {
    let policy = RetryPolicy::default();
    let delays: Vec<u64> = policy.schedule().map(|d| d.as_millis() as u64).collect();
    assert_eq!(
        delays,
        vec![100, 200, 300, 500, 800, 1300, 2100, 3400, 5500]
    );
}

#[test_case(BackoffType::Constant, &[100, 100, 100, 100] ; "constant")]
#[test_case(BackoffType::Linear, &[100, 200, 300, 400] ; "linear")]
#[test_case(BackoffType::Exponential, &[100, 200, 400, 800] ; "exponential")]
#[test_case(BackoffType::Fibonacci, &[100, 200, 300, 500] ; "fibonacci")]
fn test_backoff_shapes(backoff: BackoffType, expected: &[u64]) {
    let policy = RetryPolicy::fibonacci(Duration::from_millis(100), 5).with_backoff(backoff);
    let delays: Vec<u64> = policy.schedule().map(|d| d.as_millis() as u64).collect();
    assert_eq!(delays, expected);
}

#[test]
fn test_delay_respects_max() {
    let policy = RetryPolicy::default().with_max_delay(Duration::from_millis(250));
    assert_eq!(policy.delay_for(3), Duration::from_millis(250));
    assert_eq!(policy.delay_for(60), Duration::from_millis(250));
}

#[test]
fn test_zero_attempts_still_tries_once() {
    let policy = RetryPolicy::fibonacci(Duration::from_millis(1), 0);
    assert_eq!(policy.attempts(), 1);
    assert_eq!(policy.schedule().count(), 0);
    assert_eq!(RetryPolicy::no_retry().attempts(), 1);
}

// ============================================================================
// Fetcher Tests
// ============================================================================

#[tokio::test]
async fn test_execute_success_first_try() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(10));

    let value = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(7)
        })
        .await
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_retries_rate_limit_then_succeeds() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(10));

    let value = fetcher
        .execute(|| async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 4 {
                Err(rate_limited())
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_execute_succeeds_on_last_allowed_attempt() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(3));

    let result = fetcher
        .execute(|| async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(rate_limited())
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_execute_always_rate_limited_exhausts_attempts() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(5));

    let err = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(rate_limited())
        })
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[test_case(Error::not_found("repos/a/b") ; "not found")]
#[test_case(Error::http_status(500, "boom") ; "server error")]
#[test_case(Error::Timeout { timeout_ms: 10 } ; "timeout")]
#[test_case(Error::missing_field("token") ; "misconfiguration")]
#[tokio::test]
async fn test_execute_does_not_retry_other_errors(err: Error) {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(10));
    let expected_code = err.code();
    let mut err = Some(err);

    let result = fetcher
        .execute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            let e = err.take().unwrap_or_else(|| Error::Other("second call".into()));
            async move { Err::<(), _>(e) }
        })
        .await;

    assert_eq!(result.unwrap_err().code(), expected_code);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_empty_success_is_not_retried() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(10));

    let items: Vec<u32> = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        })
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_custom_classifier() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(3)).retry_when(|e| e.code() == "502");

    let result = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::http_status(502, ""))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_execute_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(10)).cancel_on(token);

    let err = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(())
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_execute_cancel_interrupts_backoff() {
    let token = CancellationToken::new();
    let calls = &AtomicU32::new(0);
    let policy = RetryPolicy::fibonacci(Duration::from_secs(30), 10);
    let fetcher = Fetcher::new(policy).cancel_on(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = fetcher
        .execute(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(rate_limited())
        })
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

// ============================================================================
// Get Path Tests
// ============================================================================

#[test]
fn test_ignore_predicate_matches_code() {
    let predicate = IgnorePredicate::codes(&["404"]);
    assert!(predicate.matches(&Error::not_found("x")));
    assert!(predicate.matches(&Error::http_status(404, "")));
    assert!(!predicate.matches(&Error::http_status(500, "")));
    assert!(!IgnorePredicate::default().matches(&Error::not_found("x")));
}

#[tokio::test]
async fn test_get_item_found() {
    let fetcher = Fetcher::new(quick_policy(3));
    let item = fetcher
        .get_item(None, || async move { Ok(Some("release")) })
        .await
        .unwrap();
    assert_eq!(item, Some("release"));
}

#[tokio::test]
async fn test_get_item_ignored_not_found_is_none() {
    let fetcher = Fetcher::new(quick_policy(3));
    let ignore = IgnorePredicate::codes(&["404"]);

    let item: Option<u32> = fetcher
        .get_item(Some(&ignore), || async move { Err(Error::not_found("x")) })
        .await
        .unwrap();

    assert!(item.is_none());
}

#[tokio::test]
async fn test_get_item_unmatched_not_found_propagates() {
    let fetcher = Fetcher::new(quick_policy(3));
    let ignore = IgnorePredicate::codes(&["410"]);

    let err = fetcher
        .get_item::<u32, _, _>(Some(&ignore), || async move { Err(Error::not_found("x")) })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = fetcher
        .get_item::<u32, _, _>(None, || async move { Err(Error::not_found("x")) })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_item_retries_rate_limit() {
    let calls = &AtomicU32::new(0);
    let fetcher = Fetcher::new(quick_policy(5));

    let item = fetcher
        .get_item(None, || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(rate_limited())
            } else {
                Ok(Some(1u32))
            }
        })
        .await
        .unwrap();

    assert_eq!(item, Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

struct MapGetter;

#[async_trait]
impl Getter for MapGetter {
    type Key = u64;
    type Item = String;

    async fn fetch_one(&self, key: &u64) -> Result<Option<String>> {
        match key {
            1 => Ok(Some("one".to_string())),
            2 => Ok(None),
            _ => Err(Error::not_found(format!("items/{key}"))),
        }
    }
}

#[tokio::test]
async fn test_get_with_getter() {
    let fetcher = Fetcher::new(quick_policy(3));
    let ignore = IgnorePredicate::codes(&["404"]);

    assert_eq!(
        fetcher.get(&MapGetter, &1, None).await.unwrap(),
        Some("one".to_string())
    );
    assert_eq!(fetcher.get(&MapGetter, &2, None).await.unwrap(), None);
    assert_eq!(fetcher.get(&MapGetter, &3, Some(&ignore)).await.unwrap(), None);
    assert!(fetcher.get(&MapGetter, &3, None).await.is_err());
}
