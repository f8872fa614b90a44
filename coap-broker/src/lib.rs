//! The transactional topic broker and duplicate-rejection tracker.
//!
//! These two pieces are independent of each other and of the wire codec
//! in `coap-core`; the `coap-gateway` crate wires them together into the
//! ingress/egress pipeline.

pub mod broker;
pub mod topic;
pub mod tracker;

pub use broker::{Broker, BrokerError, PublisherResponse, SubscriberId};
pub use topic::Topic;
pub use tracker::{DuplicateTracker, EXCHANGE_LIFETIME};
