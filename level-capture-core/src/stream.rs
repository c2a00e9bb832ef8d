//! Live level broadcast.
//!
//! A hot, bounded, drop-oldest broadcast of [`LevelSample`] values: one
//! producer (the capture pipeline), zero or more subscribers. A subscription
//! only observes samples published after it was created; there is no backlog
//! replay.

use tokio::sync::broadcast;

use crate::models::config::DEFAULT_STREAM_CAPACITY;
use crate::models::sample::LevelSample;

/// Broadcast channel of level samples.
///
/// Backpressure policy: the channel retains at most `capacity` samples. A
/// subscriber that falls further behind loses the oldest samples and keeps
/// going; the producer never blocks and never fails, so a slow subscriber
/// cannot stall audio capture.
#[derive(Debug, Clone)]
pub struct LevelStream {
    tx: broadcast::Sender<LevelSample>,
}

impl LevelStream {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Producer handle. One producer publishes for the lifetime of a
    /// session; the handle is cheap to clone for the hand-off into the
    /// capture context.
    pub fn publisher(&self) -> LevelPublisher {
        LevelPublisher {
            tx: self.tx.clone(),
        }
    }

    /// Attach a subscriber. It receives samples published from this moment
    /// on. Dropping the subscription unsubscribes.
    pub fn subscribe(&self) -> LevelSubscription {
        LevelSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LevelStream {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_CAPACITY)
    }
}

/// Publishing side of a [`LevelStream`].
#[derive(Debug, Clone)]
pub struct LevelPublisher {
    tx: broadcast::Sender<LevelSample>,
}

impl LevelPublisher {
    /// Hand a sample to all current subscribers. Non-blocking; returns the
    /// number of subscribers reached (zero when nobody listens).
    pub fn publish(&self, sample: LevelSample) -> usize {
        self.tx.send(sample).unwrap_or(0)
    }
}

/// Receiving side of a [`LevelStream`].
pub struct LevelSubscription {
    rx: broadcast::Receiver<LevelSample>,
}

impl LevelSubscription {
    /// Block until the next sample arrives. Returns `None` once every
    /// publisher is gone and the backlog is drained. A subscriber that
    /// lagged past the ring capacity skips the lost samples and continues.
    pub fn recv(&mut self) -> Option<LevelSample> {
        loop {
            match self.rx.blocking_recv() {
                Ok(sample) => return Some(sample),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("level subscriber lagged, dropped {missed} oldest samples");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv). `None` when no sample
    /// is ready or the stream has closed.
    pub fn try_recv(&mut self) -> Option<LevelSample> {
        use broadcast::error::TryRecvError;
        loop {
            match self.rx.try_recv() {
                Ok(sample) => return Some(sample),
                Err(TryRecvError::Lagged(missed)) => {
                    log::warn!("level subscriber lagged, dropped {missed} oldest samples");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
