//! Ingress orchestration: decode, respond, and (for new exchanges only)
//! forward the payload to the broker.
//!
//! Collaborators (duplicate tracker, broker, egress sender) are passed
//! in explicitly rather than reached for globally, matching the
//! convention of threading an `AsyncSocket` and `LocalEndpoint` through
//! transaction machinery instead of reaching for ambient state.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;

use coap_broker::{Broker, DuplicateTracker};
use coap_core::{decode, CoapId};

use crate::responder::respond;

/// Processes one inbound `(peer, bytes)` datagram.
///
/// Step 2 (reply enqueue) and step 3 (broker push) are independent;
/// enqueueing the reply never waits on the broker push, since `egress`
/// is an unbounded channel and `push` does not suspend.
pub async fn handle_datagram(
    peer: SocketAddr,
    bytes: Bytes,
    tracker: &DuplicateTracker<(SocketAddr, CoapId)>,
    broker: &Broker,
    egress: &UnboundedSender<(SocketAddr, Bytes)>,
    duplicate_window: std::time::Duration,
) {
    let decoded = decode(&bytes);
    match &decoded {
        Ok(message) => tracing::debug!(?peer, id = message.header().message_id(), "decoded datagram"),
        Err(err) => tracing::debug!(?peer, kind = ?err.kind, id = ?err.id, "failed to decode datagram"),
    }

    if let Some(reply) = respond(peer, &decoded) {
        // An unbounded sender only fails if the receiver was dropped,
        // which means the egress task is shutting down; nothing to do.
        let _ = egress.send(reply);
    }

    let Ok(message) = decoded else {
        return;
    };

    let key = (peer, message.header().message_id());
    if !tracker.add_and_delete_after(key, duplicate_window) {
        tracing::trace!(?peer, id = message.header().message_id(), "dropping retransmission");
        return;
    }

    let Some(path) = message.body().uri_path() else {
        tracing::trace!(?peer, "message carried no Uri-Path option, nothing to publish");
        return;
    };

    let payload = message.body().payload().map(Bytes::copy_from_slice).unwrap_or_default();
    broker.push(&path, payload);
}
