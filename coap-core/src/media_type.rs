//! The payload media type, derived from the Content-Format option.

use crate::bytes::first_two_bytes_as_int;
use crate::option::{CoapOption, CoapOptionNumber};

/// The CoAP Content-Format registry value for `text/plain;
/// charset=utf-8`.
pub const CONTENT_FORMAT_TEXT_PLAIN: u32 = 0;

/// The interpretation to give a message's payload.
///
/// "Sniffing" is a placeholder for a real content sniffer; this codec
/// treats sniffed payloads as opaque text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CoapPayloadMediaType {
    /// Content-Format explicitly identified the payload as text.
    Text,
    /// No (or no integer-valued) Content-Format option was present;
    /// treated as opaque text in this scope.
    Sniffing,
    /// There is no payload to classify.
    Absent,
}

/// Scans `options` for the Content-Format option (number 12) and derives
/// the payload's media type.
pub fn media_type_for(options: &[CoapOption], has_payload: bool) -> CoapPayloadMediaType {
    if !has_payload {
        return CoapPayloadMediaType::Absent;
    }

    let content_format = options
        .iter()
        .find(|o| o.number() == CoapOptionNumber::CONTENT_FORMAT);

    match content_format {
        Some(opt) => {
            let value = first_two_bytes_as_int(opt.value());
            if value == CONTENT_FORMAT_TEXT_PLAIN {
                CoapPayloadMediaType::Text
            } else {
                CoapPayloadMediaType::Sniffing
            }
        }
        None => CoapPayloadMediaType::Sniffing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_without_payload() {
        assert_eq!(media_type_for(&[], false), CoapPayloadMediaType::Absent);
    }

    #[test]
    fn sniffing_without_content_format() {
        assert_eq!(media_type_for(&[], true), CoapPayloadMediaType::Sniffing);
    }

    #[test]
    fn text_when_content_format_is_zero() {
        let opt = CoapOption::new(CoapOptionNumber::CONTENT_FORMAT, vec![0u8], CoapOptionNumber(0));
        assert_eq!(media_type_for(&[opt], true), CoapPayloadMediaType::Text);
    }

    #[test]
    fn sniffing_for_other_content_formats() {
        let opt = CoapOption::new(CoapOptionNumber::CONTENT_FORMAT, vec![0x00, 0x32], CoapOptionNumber(0));
        assert_eq!(media_type_for(&[opt], true), CoapPayloadMediaType::Sniffing);
    }
}
