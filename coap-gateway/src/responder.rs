//! The response state machine: a pure function from a decode outcome to
//! an optional outbound datagram. No retries, no state; retransmission
//! absorption is the duplicate tracker's job.

use std::net::SocketAddr;

use bytes::Bytes;

use coap_core::{ack, encode, reset, CoapMessage, ParseError};

/// Decides the reply owed (if any) to a decoded datagram from `peer`.
///
/// - A parse error that recovered a message id gets a Reset.
/// - A confirmable message gets an Acknowledgement.
/// - Everything else (a non-confirmable message, or a parse error with
///   no recoverable id) gets no reply.
pub fn respond(
    peer: SocketAddr,
    decoded: &Result<CoapMessage, ParseError>,
) -> Option<(SocketAddr, Bytes)> {
    match decoded {
        Err(err) => err.id.map(|id| (peer, encode(&reset(id)))),
        Ok(message) if message.header().msg_type().is_confirmable() => {
            Some((peer, encode(&ack(message.header().message_id()))))
        }
        Ok(_) => None,
    }
}
