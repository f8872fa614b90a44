//! Whole-message decode/encode: wires the header, token, option, and
//! payload pieces together (RFC 7252 §3).

use ::bytes::Bytes;

use crate::body::CoapBody;
use crate::bytes::take_exact;
use crate::error::{CoapId, ParseError, ParseErrorKind};
use crate::header::{CoapCode, CoapHeader, CoapType};
use crate::option::{decode_option, encode_option, CoapOptionNumber};
use crate::token::CoapToken;

/// A decoded CoAP message: a validated header plus its body.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CoapMessage {
    header: CoapHeader,
    body: CoapBody,
}

impl CoapMessage {
    pub fn new(header: CoapHeader, body: CoapBody) -> Self {
        CoapMessage { header, body }
    }

    pub fn header(&self) -> &CoapHeader {
        &self.header
    }

    pub fn body(&self) -> &CoapBody {
        &self.body
    }

    /// Decodes a complete UDP datagram into a message.
    ///
    /// See [`decode`] for the free-function form and the full algorithm
    /// description.
    pub fn decode(buf: &[u8]) -> Result<Self, ParseError> {
        decode(buf)
    }

    /// Encodes this message back into wire bytes. See [`encode`].
    pub fn encode(&self) -> Bytes {
        encode(self)
    }
}

/// Decodes a UDP datagram into a [`CoapMessage`], short-circuiting on the
/// first failure.
///
/// Bytes 2 and 3 (0-indexed; the big-endian message id) are read before
/// any header field is validated, so that every error arising after they
/// were read carries the recovered message id. Only a datagram shorter
/// than 4 bytes produces an id-less error.
pub fn decode(buf: &[u8]) -> Result<CoapMessage, ParseError> {
    if buf.len() < 4 {
        return Err(ParseError::without_id(ParseErrorKind::InvalidChunkSize {
            want: 4,
            have: buf.len(),
        }));
    }

    let id: CoapId = u16::from_be_bytes([buf[2], buf[3]]);

    let b1 = buf[0];
    let b2 = buf[1];
    let version = b1 >> 6;
    let type_bits = (b1 >> 4) & 0x3;
    let token_length = b1 & 0x0F;

    let msg_type = CoapType::try_from_bits(type_bits).map_err(|kind| {
        log::warn!("id={id:#06x}: invalid message type bits {type_bits:#04b}");
        ParseError::with_id(kind, id)
    })?;
    let code = CoapCode::from_byte(b2).map_err(|kind| {
        log::warn!("id={id:#06x}: invalid code byte {b2:#04x}");
        ParseError::with_id(kind, id)
    })?;
    let header = CoapHeader::new(version, msg_type, token_length, code, id)
        .map_err(|kind| ParseError::with_id(kind, id))?;

    let rest = &buf[4..];
    let (token, rest) = if token_length == 0 {
        (None, rest)
    } else {
        let (token_bytes, rest) = take_exact(rest, token_length as usize).map_err(|kind| {
            log::warn!("id={id:#06x}: token_length={token_length}, only {} bytes left", rest.len());
            ParseError::with_id(kind, id)
        })?;
        let token = CoapToken::new(token_bytes).map_err(|kind| ParseError::with_id(kind, id))?;
        (Some(token), rest)
    };

    let (options, payload) = decode_options_and_payload(rest, id)?;

    log::trace!("id={id:#06x}: decoded {} option(s), payload_len={:?}", options.len(), payload.as_ref().map(Vec::len));

    Ok(CoapMessage {
        header,
        body: CoapBody::new(token, options, payload),
    })
}

/// Parses the option sequence and trailing payload: iterates options
/// (tracking the running absolute option number) until the buffer is
/// exhausted or the `0xFF` payload marker is found.
fn decode_options_and_payload(
    mut cursor: &[u8],
    id: CoapId,
) -> Result<(Vec<crate::option::CoapOption>, Option<Vec<u8>>), ParseError> {
    let mut options = Vec::new();
    let mut running = CoapOptionNumber(0);

    loop {
        match cursor.first() {
            None => return Ok((options, None)),
            Some(&0xFF) => {
                let payload = &cursor[1..];
                if payload.is_empty() {
                    log::warn!("id={id:#06x}: payload marker present with no payload bytes following");
                    return Err(ParseError::with_id(ParseErrorKind::InvalidPayloadMarker, id));
                }
                return Ok((options, Some(payload.to_vec())));
            }
            Some(_) => {
                let (option, consumed) = decode_option(cursor, running).map_err(|kind| {
                    log::warn!("id={id:#06x}: option decode failed after option number {running}");
                    ParseError::with_id(kind, id)
                })?;
                running = option.number();
                cursor = &cursor[consumed..];
                options.push(option);
            }
        }
    }
}

/// Encodes a message back into wire bytes: the reciprocal of [`decode`].
///
/// For any message `m` produced by [`decode`], `decode(&encode(&m))` is
/// `Ok(m)`, modulo the absent-vs-empty collection canonicalization that
/// [`CoapBody::new`] already performs.
pub fn encode(msg: &CoapMessage) -> Bytes {
    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&msg.header.to_bytes());

    if let Some(token) = msg.body.token() {
        out.extend_from_slice(token.as_bytes());
    }

    let mut prev = CoapOptionNumber(0);
    for option in msg.body.options() {
        encode_option(&mut out, prev, option);
        prev = option.number();
    }

    if let Some(payload) = msg.body.payload() {
        out.push(0xFF);
        out.extend_from_slice(payload);
    }

    Bytes::from(out)
}

/// Builds a CON-less acknowledgement for `id`: type `ACK`, code `0.00`,
/// no token, no body.
pub fn ack(id: CoapId) -> CoapMessage {
    let header = CoapHeader::new(1, CoapType::Acknowledgement, 0, CoapCode::EMPTY, id)
        .expect("ack() builds a statically valid header");
    CoapMessage {
        header,
        body: CoapBody::default(),
    }
}

/// Builds a reset for `id`: type `RST`, code `0.00`, no token, no body.
pub fn reset(id: CoapId) -> CoapMessage {
    let header = CoapHeader::new(1, CoapType::Reset, 0, CoapCode::EMPTY, id)
        .expect("reset() builds a statically valid header");
    CoapMessage {
        header,
        body: CoapBody::default(),
    }
}
