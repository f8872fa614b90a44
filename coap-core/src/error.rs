//! Error types produced by the codec.
//!
//! Every parse failure is a [`ParseErrorKind`] paired with an optional
//! recovered message id ([`ParseError`]). The id is present whenever the
//! decoder had already read bytes 2..4 of the header at the point of
//! failure, which lets the responder emit a CoAP reset instead of
//! silently dropping the datagram.

use thiserror::Error;

/// The message id recovered from a CoAP header, when available.
pub type CoapId = u16;

/// The specific way a decode (or a refinement constructor) failed.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// Fewer bytes were available than a fixed-size read required.
    #[error("expected {want} bytes, only {have} available")]
    InvalidChunkSize { want: usize, have: usize },

    /// The header's version field was not `1`.
    #[error("invalid CoAP version")]
    InvalidVersion,

    /// The header's type field did not decode to a known [`crate::header::CoapType`].
    #[error("invalid CoAP message type")]
    InvalidType,

    /// The header's token-length nibble exceeded `8`.
    #[error("invalid token length")]
    InvalidTokenLength,

    /// The header's code-prefix (class) was out of the 0..=7 range.
    ///
    /// Unreachable for a 3-bit field decoded from a byte, kept for parity
    /// with the rest of the header's refinement-constructor fields.
    #[error("invalid code prefix")]
    InvalidCodePrefix,

    /// The header's code-suffix (detail) was out of the 0..=31 range.
    ///
    /// Unreachable for a 5-bit field, kept for parity, see above.
    #[error("invalid code suffix")]
    InvalidCodeSuffix,

    /// The message id refinement constructor rejected its input.
    ///
    /// Unreachable for a `u16`; present because every header field gets
    /// a refinement constructor, this one included.
    #[error("invalid message id")]
    InvalidMessageId,

    /// An option's delta nibble (or extended delta) was the reserved
    /// value `15`, or produced an option number that overflowed `u16`.
    #[error("invalid option delta")]
    InvalidOptionDelta,

    /// An option's length nibble (or extended length) was the reserved
    /// value `15`.
    #[error("invalid option length")]
    InvalidOptionLength,

    /// A computed absolute option number was out of range.
    #[error("invalid option number")]
    InvalidOptionNumber,

    /// The payload marker `0xFF` was the final byte of the datagram, with
    /// no payload bytes following it.
    #[error("payload marker present with no payload")]
    InvalidPayloadMarker,
}

/// A parse failure, tagged with the message id recovered before the
/// failure occurred (if any).
///
/// Intentionally one type with an `Option<CoapId>` field rather than two
/// unrelated error types, so callers cannot forget to handle the
/// id-bearing case.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("{kind} (id={id:?})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub id: Option<CoapId>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, id: Option<CoapId>) -> Self {
        ParseError { kind, id }
    }

    pub fn without_id(kind: ParseErrorKind) -> Self {
        ParseError { kind, id: None }
    }

    pub fn with_id(kind: ParseErrorKind, id: CoapId) -> Self {
        ParseError {
            kind,
            id: Some(id),
        }
    }
}
