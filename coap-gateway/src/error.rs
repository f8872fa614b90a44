//! Gateway-level errors: wraps the codec and broker error types plus the
//! boundary failures that only exist once there is a real socket and a
//! real config file.

use std::net::SocketAddr;

use thiserror::Error;

use coap_broker::BrokerError;
use coap_core::ParseError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Codec(#[from] ParseError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// A datagram with no source address reached a stage that requires
    /// one. Unreachable from a real `tokio::net::UdpSocket`, kept so the
    /// pipeline's signature does not need an `Option<SocketAddr>`.
    #[error("no peer address associated with this datagram")]
    MissingAddress,

    #[error("udp socket error")]
    Io(#[from] std::io::Error),

    #[error("gRPC transport error")]
    Transport(#[from] tonic::transport::Error),
}

/// A datagram that could not be routed anywhere useful still needs a
/// peer to blame in logs.
#[derive(Debug)]
pub struct PeerError {
    pub peer: SocketAddr,
    pub source: GatewayError,
}

/// Marks a code path the type system cannot rule out but which the
/// protocol's own invariants should make unreachable. In debug builds
/// this panics via `unreachable!`; in release builds it logs and falls
/// back to `default`, rather than taking the process down over a
/// defensive branch that never fired in testing.
#[track_caller]
pub fn unreachable_or_default<T>(context: &str, default: T) -> T {
    if cfg!(debug_assertions) {
        unreachable!("{context}");
    } else {
        tracing::error!(context, "hit a code path believed unreachable");
        default
    }
}
