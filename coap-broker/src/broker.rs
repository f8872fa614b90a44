//! The transactional topic/subscription/mailbox broker.
//!
//! All four correlated maps (mailboxes, subscriptions, subscribers, and
//! the id counter) live behind a single [`parking_lot::RwLock`]: one
//! reader-writer lock guarding a struct of the four maps, with every
//! operation taking the write lock for its duration. Sub-path
//! enumeration is computed before the lock is taken to keep the critical
//! section small.

use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::topic::Topic;

/// A 64-bit subscriber identifier, minted by [`Broker::next_id`].
pub type SubscriberId = u64;

/// A payload delivered to a subscriber's mailbox: the topic path it was
/// published on plus the content bytes. This is the type streamed back
/// to remote subscribers by the gRPC façade.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PublisherResponse {
    pub path: String,
    pub content: Bytes,
}

/// Errors raised by broker operations.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum BrokerError {
    /// `remove_subscriber` (or any operation requiring an existing
    /// subscriber) was called with an id that has no entry in
    /// `subscribers`.
    #[error("subscriber {0} is not known to the broker")]
    MissingSubscriber(SubscriberId),

    /// A broker invariant expected a bucket (mailbox or subscription
    /// set) to exist and it did not.
    #[error("expected broker bucket for {0} was missing")]
    MissingBrokerBucket(String),
}

#[derive(Default)]
struct BrokerState {
    mailboxes: HashMap<SubscriberId, UnboundedSender<PublisherResponse>>,
    subscriptions: HashMap<String, HashSet<SubscriberId>>,
    subscribers: HashMap<SubscriberId, HashSet<String>>,
    counter: u64,
}

/// The in-process pub/sub broker: a tree of topic paths mapping to
/// subscriber sets, subscriber mailboxes, and an inverse index for O(1)
/// teardown.
#[derive(Default)]
pub struct Broker {
    state: RwLock<BrokerState>,
}

impl Broker {
    pub fn new() -> Self {
        Broker::default()
    }

    /// Post-increments the subscriber-id counter. Never reuses ids.
    pub fn next_id(&self) -> SubscriberId {
        let mut state = self.state.write();
        let id = state.counter;
        state.counter += 1;
        id
    }

    /// Subscribes `id` to every canonical path in `paths`.
    ///
    /// Creates `subscriptions[path]` if it does not already exist, and
    /// records the inverse mapping in `subscribers[id]`. If this is the
    /// first time `id` has been subscribed to anything, a fresh
    /// unbounded mailbox is created and its receiving half is returned;
    /// on subsequent calls for an already-active subscriber, `None` is
    /// returned since the caller already holds that receiver.
    ///
    /// All updates happen under one write-lock acquisition.
    pub fn add_subscriber_to<I, S>(
        &self,
        paths: I,
        id: SubscriberId,
    ) -> Option<UnboundedReceiver<PublisherResponse>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical_paths: Vec<String> = paths
            .into_iter()
            .map(|p| Topic::parse(p.as_ref()).canonical())
            .filter(|p| !p.is_empty())
            .collect();

        let mut state = self.state.write();

        let receiver = if state.mailboxes.contains_key(&id) {
            None
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            state.mailboxes.insert(id, tx);
            Some(rx)
        };

        let subscriber_paths = state.subscribers.entry(id).or_default();
        for path in canonical_paths {
            state.subscriptions.entry(path.clone()).or_default().insert(id);
            subscriber_paths.insert(path);
        }

        receiver
    }

    /// Tears down `id` entirely: removes it from every subscription set
    /// it belongs to (the topic keys themselves are left behind, with an
    /// empty set), then deletes its mailbox and inverse-index entry.
    ///
    /// Fails with [`BrokerError::MissingSubscriber`] if `id` has no
    /// `subscribers` entry (never subscribed, or already removed).
    pub fn remove_subscriber(&self, id: SubscriberId) -> Result<(), BrokerError> {
        let mut state = self.state.write();

        let paths = state.subscribers.remove(&id).ok_or_else(|| {
            tracing::debug!(subscriber = id, "remove_subscriber called on an unknown id");
            BrokerError::MissingSubscriber(id)
        })?;

        for path in paths {
            if let Some(set) = state.subscriptions.get_mut(&path) {
                set.remove(&id);
            }
        }

        state.mailboxes.remove(&id);
        tracing::debug!(subscriber = id, "removed subscriber");
        Ok(())
    }

    /// Removes `id` from the subscription sets of `paths` only. Does not
    /// touch its mailbox or its subscriptions to any other path.
    pub fn remove_subscriptions<I, S>(&self, paths: I, id: SubscriberId)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.write();
        for raw in paths {
            let path = Topic::parse(raw.as_ref()).canonical();
            if let Some(set) = state.subscriptions.get_mut(&path) {
                set.remove(&id);
            }
            if let Some(owned) = state.subscribers.get_mut(&id) {
                owned.remove(&path);
            }
        }
    }

    /// Ensures every sub-path prefix of `path` exists as a key in
    /// `subscriptions`, creating empty entries where needed. Never
    /// overwrites an existing entry.
    pub fn add_topic(&self, path: &str) {
        let topic = Topic::parse(path);
        let mut state = self.state.write();
        for sub_path in topic.sub_paths() {
            state.subscriptions.entry(sub_path).or_default();
        }
    }

    /// Publishes `msg` to every subscriber of `path` or any of its
    /// ancestor sub-paths ("sub-path expansion"), deduplicated at the
    /// subscriber-id level so a subscriber of more than one matching
    /// sub-path is notified exactly once.
    pub fn push(&self, path: &str, content: Bytes) {
        let topic = Topic::parse(path);
        let canonical = topic.canonical();
        let sub_paths = topic.sub_paths();

        let mut state = self.state.write();

        let mut recipients: HashSet<SubscriberId> = HashSet::new();
        for sub_path in &sub_paths {
            if let Some(ids) = state.subscriptions.get(sub_path) {
                recipients.extend(ids.iter().copied());
            }
        }

        for id in recipients {
            let message = PublisherResponse {
                path: canonical.clone(),
                content: content.clone(),
            };
            // Defensive: a subscriber can appear in a subscription set
            // while concurrent teardown is still removing its mailbox.
            // Rather than drop the message, hand it to a fresh mailbox
            // that nothing will ever drain, keeping `push` total without
            // re-taking the lock.
            let sender = state.mailboxes.entry(id).or_insert_with(|| {
                tracing::warn!(subscriber = id, "publishing to a subscriber with no mailbox");
                mpsc::unbounded_channel().0
            });
            let _ = sender.send(message);
        }
    }

    pub fn get_subscribers(&self, path: &str) -> Option<HashSet<SubscriberId>> {
        let canonical = Topic::parse(path).canonical();
        self.state.read().subscriptions.get(&canonical).cloned()
    }

    pub fn get_topics(&self) -> Vec<String> {
        self.state.read().subscriptions.keys().cloned().collect()
    }

    pub fn mailbox_count(&self) -> usize {
        self.state.read().mailboxes.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.read().subscribers.len()
    }

    pub fn topic_count(&self) -> usize {
        self.state.read().subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_is_strictly_increasing() {
        let broker = Broker::new();
        let a = broker.next_id();
        let b = broker.next_id();
        assert!(b > a);
    }

    #[test]
    fn inverse_index_stays_consistent_across_subscribe_and_unsubscribe() {
        let broker = Broker::new();
        let id = broker.next_id();
        broker.add_subscriber_to(["a", "a/b"], id);

        for path in broker.get_topics() {
            let has_forward = broker.get_subscribers(&path).unwrap_or_default().contains(&id);
            let has_inverse = broker
                .state
                .read()
                .subscribers
                .get(&id)
                .map(|s| s.contains(&path))
                .unwrap_or(false);
            assert_eq!(has_forward, has_inverse, "path={path}");
        }

        broker.remove_subscriptions(["a"], id);
        assert!(!broker.get_subscribers("a").unwrap().contains(&id));
        assert!(broker.get_subscribers("a/b").unwrap().contains(&id));
    }

    #[tokio::test]
    async fn fan_out_deduplicates_overlapping_subscriptions() {
        let broker = Broker::new();
        let id1 = broker.next_id();
        let id2 = broker.next_id();

        let mut rx1 = broker.add_subscriber_to(["root/node/leaf"], id1).unwrap();
        let mut rx2 = broker.add_subscriber_to(["root/node"], id2).unwrap();

        broker.push("root/node/leaf/extra", Bytes::from_static(b"hi"));

        assert_eq!(rx1.recv().await.unwrap().content, Bytes::from_static(b"hi"));
        assert_eq!(rx2.recv().await.unwrap().content, Bytes::from_static(b"hi"));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());

        // Now also subscribe id1 to `root`; republishing should still fan out once each.
        broker.add_subscriber_to(["root"], id1);
        broker.push("root/node/leaf/extra", Bytes::from_static(b"again"));

        assert_eq!(rx1.recv().await.unwrap().content, Bytes::from_static(b"again"));
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.recv().await.unwrap().content, Bytes::from_static(b"again"));
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn remove_subscriber_on_unknown_id_fails() {
        let broker = Broker::new();
        assert_eq!(
            broker.remove_subscriber(42).unwrap_err(),
            BrokerError::MissingSubscriber(42)
        );
    }

    #[test]
    fn remove_subscriber_leaves_empty_topic_keys_behind() {
        let broker = Broker::new();
        let id = broker.next_id();
        broker.add_subscriber_to(["topics/one", "topics/two"], id);

        broker.remove_subscriber(id).unwrap();

        assert_eq!(broker.get_subscribers("topics/one"), Some(HashSet::new()));
        assert_eq!(broker.get_subscribers("topics/two"), Some(HashSet::new()));
        assert_eq!(broker.mailbox_count(), 0);
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[test]
    fn add_topic_creates_all_prefixes_without_overwriting() {
        let broker = Broker::new();
        let id = broker.next_id();
        broker.add_subscriber_to(["a/b"], id);

        broker.add_topic("a/b/c");

        assert!(broker.get_subscribers("a").unwrap().contains(&id));
        assert!(broker.get_subscribers("a/b").unwrap().contains(&id));
        assert_eq!(broker.get_subscribers("a/b/c"), Some(HashSet::new()));
    }
}
