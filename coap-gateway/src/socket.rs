//! A thin async UDP boundary. Modeled on the `AllowStdUdpSocket` /
//! `AsyncSocket` split (a `bind`-style constructor plus `send`/`recv`
//! that hand back or take owned buffers), but built directly on
//! `tokio::net::UdpSocket`'s native async methods instead of the
//! `mio`/`PollEvented` bridge needed before Tokio grew first-class UDP
//! support.

use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tokio::net::UdpSocket;

use crate::error::GatewayError;

/// Largest datagram this gateway will read in one `recv`. CoAP over UDP
/// is expected to fit comfortably under the typical path MTU; a larger
/// inbound datagram is simply truncated by `recv_from`, which is no
/// worse than a link that would have fragmented it.
const MAX_DATAGRAM_SIZE: usize = 2048;

/// Owned wrapper over a bound UDP socket, exposing exactly the two
/// operations the pipeline needs.
#[derive(Debug)]
pub struct GatewaySocket {
    inner: UdpSocket,
}

impl GatewaySocket {
    pub async fn bind(addr: SocketAddr) -> Result<Self, GatewayError> {
        let inner = UdpSocket::bind(addr).await?;
        Ok(GatewaySocket { inner })
    }

    pub async fn recv(&self) -> Result<(SocketAddr, Bytes), GatewayError> {
        let mut buf = BytesMut::zeroed(MAX_DATAGRAM_SIZE);
        let (len, peer) = self.inner.recv_from(&mut buf).await?;
        buf.truncate(len);
        Ok((peer, buf.freeze()))
    }

    pub async fn send(&self, peer: SocketAddr, bytes: Bytes) -> Result<(), GatewayError> {
        self.inner.send_to(&bytes, peer).await?;
        Ok(())
    }

    pub fn local_addr(&self) -> Result<SocketAddr, GatewayError> {
        Ok(self.inner.local_addr()?)
    }
}
