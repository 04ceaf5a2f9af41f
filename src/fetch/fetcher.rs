//! Retrying executor for single remote calls

use super::policy::RetryPolicy;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Capability to fetch one item by key
#[async_trait]
pub trait Getter: Send + Sync {
    /// Key identifying the item
    type Key: Send + Sync;
    /// Fetched item type
    type Item: Send;

    /// Fetch the item; `Ok(None)` means the service returned nothing
    async fn fetch_one(&self, key: &Self::Key) -> Result<Option<Self::Item>>;
}

/// Errors a caller has declared to mean "no row" rather than failure.
///
/// Matched against [`Error::code`], e.g. `IgnorePredicate::codes(&["404"])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePredicate {
    codes: Vec<String>,
}

impl IgnorePredicate {
    /// Ignore errors whose normalized code is one of `codes`
    pub fn codes(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Check whether the error should be swallowed
    pub fn matches(&self, err: &Error) -> bool {
        let code = err.code();
        self.codes.iter().any(|c| *c == code)
    }
}

/// Runs remote calls under a [`RetryPolicy`].
///
/// Only errors accepted by the retry classifier (by default
/// [`Error::is_rate_limited`]) are retried; everything else is returned at
/// once. Each call to [`Fetcher::execute`] owns its retry state, so a single
/// fetcher can serve any number of concurrent fetch sequences.
#[derive(Debug, Clone)]
pub struct Fetcher {
    policy: RetryPolicy,
    retryable: fn(&Error) -> bool,
    cancel: Option<CancellationToken>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl Fetcher {
    /// Create a fetcher that retries rate-limit errors
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            retryable: Error::is_rate_limited,
            cancel: None,
        }
    }

    /// Replace the retry classifier
    #[must_use]
    pub fn retry_when(mut self, retryable: fn(&Error) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Abort backoff waits (with [`Error::Cancelled`]) once `token` fires
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Execute `call`, retrying classified failures.
    ///
    /// On attempt exhaustion the last error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            if self.is_cancelled() {
                return Err(Error::Cancelled);
            }

            attempt += 1;
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !(self.retryable)(&err) {
                return Err(err);
            }

            if attempt >= max_attempts {
                warn!("Giving up after {} attempts: {}", attempt, err);
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt - 1);
            warn!(
                "{}, attempt {}/{}, retrying in {:?}",
                err, attempt, max_attempts, delay
            );
            self.sleep(delay).await?;
        }
    }

    /// Fetch a single item, mapping ignorable errors to `None`
    pub async fn get_item<T, F, Fut>(
        &self,
        ignore: Option<&IgnorePredicate>,
        call: F,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        match self.execute(call).await {
            Ok(item) => Ok(item),
            Err(err) if ignore.is_some_and(|p| p.matches(&err)) => {
                debug!("Ignoring error for get: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Run a [`Getter`] through [`Fetcher::get_item`]
    pub async fn get<G: Getter>(
        &self,
        getter: &G,
        key: &G::Key,
        ignore: Option<&IgnorePredicate>,
    ) -> Result<Option<G::Item>> {
        self.get_item(ignore, || getter.fetch_one(key)).await
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn sleep(&self, delay: std::time::Duration) -> Result<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
