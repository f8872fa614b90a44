//! The CoAP token: 0 to 8 opaque bytes correlating a request with its
//! response.

use crate::error::ParseErrorKind;
use smallvec::SmallVec;

/// An opaque token of 1..=8 bytes.
///
/// A zero-length token is represented as `None` at the [`crate::body::CoapBody`]
/// level rather than as an empty `CoapToken`: it is present only when the
/// header's token-length field is greater than zero (RFC 7252 §3).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CoapToken(SmallVec<[u8; 8]>);

impl CoapToken {
    /// Builds a token from `bytes`, rejecting empty or over-long inputs.
    pub fn new(bytes: &[u8]) -> Result<Self, ParseErrorKind> {
        if bytes.is_empty() || bytes.len() > 8 {
            return Err(ParseErrorKind::InvalidChunkSize {
                want: 1,
                have: bytes.len(),
            });
        }
        Ok(CoapToken(SmallVec::from_slice(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
