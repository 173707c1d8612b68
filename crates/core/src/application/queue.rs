// Bounded Queue - shared buffer between producers and consumers
//
// One lock domain guards the items. Two wake sets:
// - not_empty: consumers, signalled after every put
// - below_low_watermark: producers, signalled after a take leaves len < low watermark
// Every signal wakes all waiters; each waiter re-checks its predicate under the lock.

use crate::domain::QueueLimits;
use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, trace};

/// Queue errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue closed")]
    Closed,

    #[error("Queue empty")]
    Empty,
}

/// Failed non-blocking put; hands the item back
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TryPutError<T> {
    #[error("Queue full")]
    Full(T),

    #[error("Queue closed")]
    Closed(T),
}

impl<T> TryPutError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TryPutError::Full(item) | TryPutError::Closed(item) => item,
        }
    }
}

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO queue with a hard capacity and a low watermark for producer wakeups
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    limits: QueueLimits,
    not_empty: Notify,
    below_low_watermark: Notify,
}

/// The queue shared by payload producers and consumers
pub type BoundedStringQueue = BoundedQueue<String>;

impl<T> BoundedQueue<T> {
    pub fn new(limits: QueueLimits) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(limits.capacity()),
                closed: false,
            }),
            limits,
            not_empty: Notify::new(),
            below_low_watermark: Notify::new(),
        }
    }

    /// Append `item` at the tail, waiting while the queue is at capacity.
    ///
    /// A put parked at capacity resumes only after a take leaves fewer than
    /// `low_watermark` items. Dropping the future while parked leaves the
    /// queue untouched.
    ///
    /// # Errors
    /// - QueueError::Closed if the queue is closed before the item is stored
    pub async fn put(&self, mut item: T) -> Result<(), QueueError> {
        loop {
            let notified = self.below_low_watermark.notified();
            tokio::pin!(notified);
            // Register before checking so a take between check and park is not missed
            notified.as_mut().enable();

            match self.try_put(item) {
                Ok(()) => return Ok(()),
                Err(TryPutError::Closed(_)) => return Err(QueueError::Closed),
                Err(TryPutError::Full(returned)) => item = returned,
            }

            debug!(capacity = self.limits.capacity(), "Queue full, producer parked");
            notified.await;
            trace!("Producer woken");
        }
    }

    /// Remove and return the head, waiting while the queue is empty.
    ///
    /// # Errors
    /// - QueueError::Closed if the queue is closed
    pub async fn take(&self) -> Result<T, QueueError> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_take() {
                Ok(item) => return Ok(item),
                Err(QueueError::Closed) => return Err(QueueError::Closed),
                Err(QueueError::Empty) => {}
            }

            debug!("Queue empty, consumer parked");
            notified.await;
            trace!("Consumer woken");
        }
    }

    /// Append without waiting
    pub fn try_put(&self, item: T) -> Result<(), TryPutError<T>> {
        let len = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(TryPutError::Closed(item));
            }
            if self.limits.is_full(state.items.len()) {
                return Err(TryPutError::Full(item));
            }
            state.items.push_back(item);
            state.items.len()
        };

        trace!(len, "Item queued");
        self.not_empty.notify_waiters();
        Ok(())
    }

    /// Remove the head without waiting
    pub fn try_take(&self) -> Result<T, QueueError> {
        let (item, len) = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(QueueError::Closed);
            }
            let item = state.items.pop_front().ok_or(QueueError::Empty)?;
            (item, state.items.len())
        };

        trace!(len, "Item dequeued");
        if self.limits.is_below_low_watermark(len) {
            self.below_low_watermark.notify_waiters();
        }
        Ok(item)
    }

    /// Close the queue and release every parked producer and consumer.
    ///
    /// Items still queued are dropped with the queue. Idempotent.
    pub fn close(&self) {
        let discarded = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.items.len()
        };

        debug!(discarded, "Queue closed");
        self.not_empty.notify_waiters();
        self.below_low_watermark.notify_waiters();
    }

    /// Snapshot of the number of queued items
    pub fn size(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn capacity(&self) -> usize {
        self.limits.capacity()
    }

    pub fn low_watermark(&self) -> usize {
        self.limits.low_watermark()
    }
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::new(QueueLimits::default())
    }
}
