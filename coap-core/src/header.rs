//! The fixed 4-byte CoAP header (RFC 7252 §3).

use crate::error::{CoapId, ParseErrorKind};

/// The CoAP message type: `CON`, `NON`, `ACK`, or `RST`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CoapType {
    /// Confirmable: the sender requires an acknowledgement.
    Confirmable = 0,
    /// Non-confirmable: no acknowledgement is expected.
    NonConfirmable = 1,
    /// Acknowledgement of a confirmable message.
    Acknowledgement = 2,
    /// Reset: the message could not be processed.
    Reset = 3,
}

impl CoapType {
    /// Recovers a `CoapType` from its 2-bit wire value.
    pub fn try_from_bits(bits: u8) -> Result<Self, ParseErrorKind> {
        match bits {
            0 => Ok(CoapType::Confirmable),
            1 => Ok(CoapType::NonConfirmable),
            2 => Ok(CoapType::Acknowledgement),
            3 => Ok(CoapType::Reset),
            _ => Err(ParseErrorKind::InvalidType),
        }
    }

    pub fn as_bits(self) -> u8 {
        self as u8
    }

    pub fn is_confirmable(self) -> bool {
        matches!(self, CoapType::Confirmable)
    }
}

/// A CoAP message code, split into its 3-bit class ("prefix") and 5-bit
/// detail ("suffix"), e.g. `0.01` (GET) or `2.05` (Content).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CoapCode {
    prefix: u8,
    suffix: u8,
}

impl CoapCode {
    /// The empty code `0.00`, used by pings, resets, and empty ACKs.
    pub const EMPTY: CoapCode = CoapCode {
        prefix: 0,
        suffix: 0,
    };

    /// Builds a code from its prefix (0..=7) and suffix (0..=31),
    /// rejecting out-of-range inputs.
    pub fn new(prefix: u8, suffix: u8) -> Result<Self, ParseErrorKind> {
        if prefix > 7 {
            return Err(ParseErrorKind::InvalidCodePrefix);
        }
        if suffix > 31 {
            return Err(ParseErrorKind::InvalidCodeSuffix);
        }
        Ok(CoapCode { prefix, suffix })
    }

    pub fn prefix(self) -> u8 {
        self.prefix
    }

    pub fn suffix(self) -> u8 {
        self.suffix
    }

    /// Packs this code into its single wire byte: `prefix << 5 | suffix`.
    pub fn to_byte(self) -> u8 {
        (self.prefix << 5) | self.suffix
    }

    /// Unpacks a wire byte into a code.
    pub fn from_byte(byte: u8) -> Result<Self, ParseErrorKind> {
        CoapCode::new(byte >> 5, byte & 0x1F)
    }
}

impl std::fmt::Display for CoapCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.prefix, self.suffix)
    }
}

/// The fixed 4-byte CoAP header: version, type, token length, code, and
/// message id.
///
/// Every field is validated by a refinement constructor; there is no way
/// to construct a `CoapHeader` with an out-of-range field.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CoapHeader {
    version: u8,
    msg_type: CoapType,
    token_length: u8,
    code: CoapCode,
    message_id: CoapId,
}

impl CoapHeader {
    /// The only version this codec understands.
    pub const SUPPORTED_VERSION: u8 = 1;

    /// Builds a header, validating every field.
    pub fn new(
        version: u8,
        msg_type: CoapType,
        token_length: u8,
        code: CoapCode,
        message_id: CoapId,
    ) -> Result<Self, ParseErrorKind> {
        if version != Self::SUPPORTED_VERSION {
            return Err(ParseErrorKind::InvalidVersion);
        }
        if token_length > 8 {
            return Err(ParseErrorKind::InvalidTokenLength);
        }
        Ok(CoapHeader {
            version,
            msg_type,
            token_length,
            code,
            message_id,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn msg_type(&self) -> CoapType {
        self.msg_type
    }

    pub fn token_length(&self) -> u8 {
        self.token_length
    }

    pub fn code(&self) -> CoapCode {
        self.code
    }

    pub fn message_id(&self) -> CoapId {
        self.message_id
    }

    /// Packs the header into its 4 wire bytes.
    pub fn to_bytes(&self) -> [u8; 4] {
        let b1 = (self.version << 6) | (self.msg_type.as_bits() << 4) | self.token_length;
        let b2 = self.code.to_byte();
        let [id_hi, id_lo] = self.message_id.to_be_bytes();
        [b1, b2, id_hi, id_lo]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let header =
            CoapHeader::new(1, CoapType::Confirmable, 4, CoapCode::new(0, 1).unwrap(), 0x1234)
                .unwrap();
        let bytes = header.to_bytes();
        assert_eq!(bytes, [0x44, 0x01, 0x12, 0x34]);
    }

    #[test]
    fn rejects_bad_version() {
        assert_eq!(
            CoapHeader::new(2, CoapType::Confirmable, 0, CoapCode::EMPTY, 0).unwrap_err(),
            ParseErrorKind::InvalidVersion
        );
    }

    #[test]
    fn rejects_token_length_over_eight() {
        assert_eq!(
            CoapHeader::new(1, CoapType::Confirmable, 9, CoapCode::EMPTY, 0).unwrap_err(),
            ParseErrorKind::InvalidTokenLength
        );
    }

    #[test]
    fn code_round_trips_byte() {
        let code = CoapCode::new(2, 5).unwrap();
        assert_eq!(code.to_byte(), 0x45);
        assert_eq!(CoapCode::from_byte(0x45).unwrap(), code);
        assert_eq!(code.to_string(), "2.05");
    }
}
