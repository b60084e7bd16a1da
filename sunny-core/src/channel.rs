//! Single-shot, replaying result streams.
//!
//! Every repository call gets its own [`channel`]: the spawned operation owns
//! the [`Publisher`] and settles it exactly once, the caller holds the
//! [`Subscription`]. A [`LatestSlot`] follows a sequence of such
//! subscriptions and only lets the most recently followed one through.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

/// Creates a connected publisher/subscription pair.
pub fn channel<T>() -> (Publisher<T>, Subscription<T>) {
    let (tx, rx) = watch::channel(None);
    (Publisher { tx }, Subscription { rx, delivered: false })
}

#[derive(Debug)]
pub struct Publisher<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Publisher<T> {
    /// Settles the stream. Consumes the publisher so a stream emits at most once.
    pub fn publish(self, value: T) {
        // Stored even when nobody is subscribed yet; late subscribers replay it.
        self.tx.send_replace(Some(value));
    }
}

/// Receiving end of one operation's result.
///
/// Yields the settled value once and is terminal afterwards. Clones start
/// fresh and replay the settled value.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<Option<T>>,
    delivered: bool,
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone(), delivered: false }
    }
}

impl<T: Clone> Subscription<T> {
    /// Waits for the settled value.
    ///
    /// Returns `None` once the value has been taken, or if the publisher was
    /// dropped without settling.
    pub async fn recv(&mut self) -> Option<T> {
        if self.delivered {
            return None;
        }

        let value = match self.rx.wait_for(Option::is_some).await {
            Ok(settled) => settled.clone(),
            Err(_) => None,
        };

        self.delivered = true;
        value
    }

    pub fn is_settled(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

/// Last-query-wins holder for a single logical subscription slot.
///
/// Results of superseded subscriptions are discarded when they settle.
#[derive(Debug)]
pub struct LatestSlot<T> {
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<T>>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { generation: Arc::new(AtomicU64::new(0)), tx: Arc::new(tx) }
    }
}

impl<T> LatestSlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `subscription` the current source of the slot.
    ///
    /// The returned handle finishes once the subscription settled and its
    /// value was either accepted or discarded.
    pub fn follow(&self, mut subscription: Subscription<T>) -> JoinHandle<()> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.tx);

        tokio::spawn(async move {
            let Some(value) = subscription.recv().await else {
                return;
            };

            tx.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != ticket {
                    debug!(ticket, "discarding result of superseded query");
                    return false;
                }
                *slot = Some(value);
                true
            });
        })
    }

    pub fn subscribe(&self) -> LatestReceiver<T> {
        LatestReceiver { rx: self.tx.subscribe() }
    }
}

#[derive(Debug, Clone)]
pub struct LatestReceiver<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> LatestReceiver<T> {
    /// Waits for the next accepted value. `None` if the slot was dropped.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(value) = self.rx.borrow_and_update().clone() {
                return Some(value);
            }
        }
    }

    /// Most recently accepted value, without waiting.
    pub fn current(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    pub fn has_update(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
