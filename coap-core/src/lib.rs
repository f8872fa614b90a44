//! Bit-exact wire codec for CoAP (RFC 7252) messages over UDP.
//!
//! This crate owns the four pieces of the protocol layer that must be
//! exactly right: the [`header`], [`option`], and [`body`]/[`message`]
//! decode/encode pair, and the small [`bytes`] helpers they're built on.
//! It has no knowledge of sockets, subscribers, or topics; see the
//! `coap-broker` and `coap-gateway` crates for those.

pub mod body;
pub mod bytes;
pub mod error;
pub mod header;
pub mod media_type;
pub mod message;
pub mod option;
pub mod token;

pub use body::CoapBody;
pub use error::{CoapId, ParseError, ParseErrorKind};
pub use header::{CoapCode, CoapHeader, CoapType};
pub use media_type::CoapPayloadMediaType;
pub use message::{ack, decode, encode, reset, CoapMessage};
pub use option::{CoapOption, CoapOptionNumber};
pub use token::CoapToken;
