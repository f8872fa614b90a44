//! Time-bounded duplicate-rejection tracker.
//!
//! Absorbs CoAP retransmissions within the EXCHANGE_LIFETIME window so the
//! pipeline never pushes the same datagram to the broker twice.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;

/// The CoAP EXCHANGE_LIFETIME: the window within which a retransmission
/// of the same `(peer, message id)` pair may arrive (RFC 7252 §4.8.2).
pub const EXCHANGE_LIFETIME: Duration = Duration::from_secs(145);

/// A generic, thread-safe set of keys with scheduled, self-removing
/// membership.
///
/// `K` is typically `(SocketAddr, CoapId)`, but the tracker is generic so
/// it can be unit-tested without pulling in networking types.
#[derive(Debug)]
pub struct DuplicateTracker<K>
where
    K: Eq + Hash + Send + Sync + 'static,
{
    keys: Arc<DashSet<K>>,
}

impl<K> Default for DuplicateTracker<K>
where
    K: Eq + Hash + Send + Sync + 'static,
{
    fn default() -> Self {
        DuplicateTracker {
            keys: Arc::new(DashSet::new()),
        }
    }
}

impl<K> DuplicateTracker<K>
where
    K: Eq + Hash + Send + Sync + Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key` if absent. Returns `true` iff the key was newly
    /// added.
    pub fn add(&self, key: K) -> bool {
        self.keys.insert(key)
    }

    /// Removes `key` if present. Returns `true` iff it was present.
    pub fn remove(&self, key: K) -> bool {
        self.keys.remove(&key).is_some()
    }

    /// Atomically adds `key`; if it was newly added, schedules its
    /// removal after `delay`. Returns the `add` outcome.
    ///
    /// The scheduled removal runs as an independent task and tolerates
    /// the key having already been removed by the time it fires.
    pub fn add_and_delete_after(&self, key: K, delay: Duration) -> bool {
        let newly_added = self.add(key.clone());
        if newly_added {
            let keys = Arc::clone(&self.keys);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if keys.remove(&key).is_none() {
                    tracing::trace!("scheduled duplicate-tracker eviction found key already removed");
                }
            });
        }
        newly_added
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }
}
