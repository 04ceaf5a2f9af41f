//! Row sinks
//!
//! A sink receives fetched items one at a time and tells the producer when to
//! stop: either the caller's row limit is satisfied or the query was
//! cancelled. Producers poll both after every emitted item.

use tokio_util::sync::CancellationToken;

/// Destination for emitted items
pub trait RowSink<T>: Send {
    /// Accept one item
    fn emit(&mut self, item: T);

    /// Items still wanted, `None` when unbounded
    fn remaining_capacity(&self) -> Option<u64>;

    /// Whether the consumer has gone away
    fn is_cancelled(&self) -> bool;

    /// True when producing more items is pointless
    fn is_satisfied(&self) -> bool {
        self.is_cancelled() || self.remaining_capacity() == Some(0)
    }
}

/// Sink that keeps every emitted item in memory
#[derive(Debug, Default)]
pub struct CollectingSink<T> {
    items: Vec<T>,
    limit: Option<u64>,
    cancel: CancellationToken,
}

impl<T> CollectingSink<T> {
    /// Create an unbounded sink
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a sink that is satisfied after `limit` items
    pub fn with_limit(limit: Option<u64>) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    /// Tie the sink to an external cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this sink
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Items collected so far
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the sink
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Send> RowSink<T> for CollectingSink<T> {
    fn emit(&mut self, item: T) {
        self.items.push(item);
    }

    fn remaining_capacity(&self) -> Option<u64> {
        self.limit
            .map(|limit| limit.saturating_sub(self.items.len() as u64))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Sink that hands each item to a callback as soon as it arrives
pub struct StreamingSink<F> {
    callback: F,
    emitted: u64,
    limit: Option<u64>,
    cancel: CancellationToken,
}

impl<F> StreamingSink<F> {
    /// Create a streaming sink
    pub fn new(callback: F, limit: Option<u64>) -> Self {
        Self {
            callback,
            emitted: 0,
            limit,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the sink to an external cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Number of items handed to the callback
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl<T, F> RowSink<T> for StreamingSink<F>
where
    F: FnMut(T) + Send,
{
    fn emit(&mut self, item: T) {
        self.emitted += 1;
        (self.callback)(item);
    }

    fn remaining_capacity(&self) -> Option<u64> {
        self.limit
            .map(|limit| limit.saturating_sub(self.emitted))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Adapter applying a query's row limit and cancellation on top of another sink
pub struct BoundedSink<'a, T> {
    inner: &'a mut dyn RowSink<T>,
    limit: Option<u64>,
    emitted: u64,
    cancel: CancellationToken,
}

impl<'a, T> BoundedSink<'a, T> {
    /// Wrap `inner`, stopping after `limit` items or once `cancel` fires
    pub fn new(inner: &'a mut dyn RowSink<T>, limit: Option<u64>, cancel: CancellationToken) -> Self {
        Self {
            inner,
            limit,
            emitted: 0,
            cancel,
        }
    }
}

impl<T> RowSink<T> for BoundedSink<'_, T> {
    fn emit(&mut self, item: T) {
        self.emitted += 1;
        self.inner.emit(item);
    }

    fn remaining_capacity(&self) -> Option<u64> {
        let own = self.limit.map(|limit| limit.saturating_sub(self.emitted));
        match (own, self.inner.remaining_capacity()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.inner.is_cancelled()
    }
}
