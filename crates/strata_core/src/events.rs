//! # Storage Events
//!
//! Channel-based notifications for region and registry changes.
//!
//! Subscribers hold a [`Subscription`] handle. Dropping the handle (or calling
//! [`Subscription::unsubscribe`]) removes it from the bus, so there are no
//! dangling listener references to clean up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use strata_shared::{Coordinate, WorldId};

use crate::tile::{TileEntry, TileId};

/// How a region entered the loaded set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadSource {
    /// Produced by the world's map generator.
    Generated,
    /// Decoded from the world's region store.
    Restored,
    /// Decoded from a push sent by the authoritative peer.
    Received,
}

/// Region lifecycle notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionEvent {
    /// A region was inserted into the world.
    Loaded {
        /// Owning world.
        world: WorldId,
        /// Region origin.
        origin: Coordinate,
        /// Where the content came from.
        source: LoadSource,
    },
    /// A region's tiles changed (fired once per flush, not per tile).
    Updated {
        /// Owning world.
        world: WorldId,
        /// Region origin.
        origin: Coordinate,
    },
    /// A region is about to be removed. Fired while it is still readable.
    Unloaded {
        /// Owning world.
        world: WorldId,
        /// Region origin.
        origin: Coordinate,
    },
}

impl RegionEvent {
    /// Origin of the region the event is about.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        match self {
            Self::Loaded { origin, .. } | Self::Updated { origin, .. } | Self::Unloaded { origin, .. } => {
                *origin
            }
        }
    }
}

/// Registry notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Every entry was dropped ahead of a resynchronization.
    Cleared,
    /// An entry was registered.
    EntryAdded {
        /// The new entry.
        entry: Arc<TileEntry>,
        /// Its base id.
        id: TileId,
    },
}

type Filter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

struct Subscriber<E> {
    id: u64,
    sender: Sender<E>,
    filter: Option<Filter<E>>,
}

struct BusInner<E> {
    subscribers: Mutex<Vec<Subscriber<E>>>,
    next_id: AtomicU64,
}

impl<E> BusInner<E> {
    fn remove(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }
}

/// Fan-out event bus. Every subscriber gets its own unbounded channel.
pub struct EventBus<E> {
    inner: Arc<BusInner<E>>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribes to every event.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<E> {
        self.attach(None)
    }

    /// Subscribes to events accepted by `filter`.
    #[must_use]
    pub fn subscribe_filtered<F>(&self, filter: F) -> Subscription<E>
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.attach(Some(Box::new(filter)))
    }

    fn attach(&self, filter: Option<Filter<E>>) -> Subscription<E> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(Subscriber { id, sender, filter });
        Subscription {
            id,
            receiver,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every matching subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: &E) -> usize {
        let mut delivered = 0;
        self.inner.subscribers.lock().retain(|sub| {
            if sub.filter.as_ref().is_some_and(|f| !f(event)) {
                return true;
            }
            match sub.sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                // Receiver gone without unsubscribing (handle leaked across a panic).
                Err(_) => false,
            }
        });
        delivered
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one subscription. Unsubscribes on drop.
pub struct Subscription<E> {
    id: u64,
    receiver: Receiver<E>,
    bus: Weak<BusInner<E>>,
}

impl<E> Subscription<E> {
    /// Receives the next event without blocking.
    ///
    /// # Errors
    ///
    /// `Empty` if nothing is queued, `Disconnected` if the bus is gone.
    pub fn try_recv(&self) -> Result<E, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// `Timeout` if nothing arrived, `Disconnected` if the bus is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<E, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Takes every queued event.
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }

    /// Removes this subscription from its bus.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}
