//! Live subscription bookkeeping shared by store implementations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use safety_map_report_models::Report;

/// Callback invoked with each new snapshot.
pub type UpdateCallback = Arc<dyn Fn(Vec<Report>) + Send + Sync>;

struct Subscriber {
    limit: u32,
    gate: Arc<Gate>,
    callback: UpdateCallback,
}

/// Registered live subscriptions for one store.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: Mutex<BTreeMap<u64, Subscriber>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a subscriber and returns its handle.
    pub fn register(self: &Arc<Self>, limit: u32, callback: UpdateCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let gate = Arc::new(Gate::new(true));

        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Subscriber {
                    limit,
                    gate: Arc::clone(&gate),
                    callback,
                },
            );

        log::debug!("Registered subscription {id} (limit {limit})");

        Subscription {
            id,
            limit,
            gate,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        let removed = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        if removed.is_some() {
            log::debug!("Removed subscription {id}");
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The largest limit any subscriber asked for, so a single query can
    /// serve them all.
    #[must_use]
    pub fn max_limit(&self) -> Option<u32> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|s| s.limit)
            .max()
    }

    /// Delivers a newest-first snapshot to every subscriber, each capped at
    /// its own limit.
    pub fn notify(&self, latest: &[Report]) {
        let targets: Vec<(u32, Arc<Gate>, UpdateCallback)> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|s| (s.limit, Arc::clone(&s.gate), Arc::clone(&s.callback)))
            .collect();

        for (limit, gate, callback) in targets {
            deliver(&gate, &callback, capped(latest, limit));
        }
    }

    /// Delivers a snapshot to a single subscription.
    pub fn notify_one(&self, subscription: &Subscription, latest: &[Report]) {
        let callback = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&subscription.id)
            .map(|s| Arc::clone(&s.callback));

        if let Some(callback) = callback {
            deliver(
                &subscription.gate,
                &callback,
                capped(latest, subscription.limit),
            );
        }
    }
}

fn capped(latest: &[Report], limit: u32) -> Vec<Report> {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    latest.iter().take(limit).cloned().collect()
}

/// Whether a subscription still wants updates. Held for the whole
/// callback, so unsubscribing waits out a delivery already in progress.
type Gate = Mutex<bool>;

fn deliver(gate: &Gate, callback: &UpdateCallback, reports: Vec<Report>) {
    let active = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if *active {
        callback(reports);
    }
}

/// Handle for a live subscription.
///
/// Unsubscribing consumes the handle, so it can only happen once. Dropping
/// the handle unsubscribes as well. Once either returns, the callback is
/// not running and will not be called again, which also means a callback
/// must not drop its own handle.
pub struct Subscription {
    id: u64,
    limit: u32,
    gate: Arc<Gate>,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    /// Stops further updates.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Returns the cap this subscription was registered with.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
