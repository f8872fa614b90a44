//! The CoAP body: token, options, and payload beyond the fixed header.

use std::collections::BTreeMap;

use crate::media_type::{media_type_for, CoapPayloadMediaType};
use crate::option::{CoapOption, CoapOptionNumber};
use crate::token::CoapToken;

/// Everything in a CoAP message after the 4-byte header: an optional
/// token, an optional (non-empty) option list, and an optional
/// (non-empty) payload.
///
/// Empty collections are never stored; [`CoapBody::new`] normalizes a
/// zero-length token, an empty option list, or an empty payload to
/// `None`.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct CoapBody {
    token: Option<CoapToken>,
    options: Option<Vec<CoapOption>>,
    payload: Option<Vec<u8>>,
}

impl CoapBody {
    pub fn new(
        token: Option<CoapToken>,
        options: Vec<CoapOption>,
        payload: Option<Vec<u8>>,
    ) -> Self {
        CoapBody {
            token,
            options: if options.is_empty() { None } else { Some(options) },
            payload: payload.filter(|p| !p.is_empty()),
        }
    }

    pub fn token(&self) -> Option<&CoapToken> {
        self.token.as_ref()
    }

    pub fn options(&self) -> &[CoapOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// The media type implied by the Content-Format option, or the
    /// payload-absent/sniffing fallbacks when it is missing or ambiguous.
    pub fn media_type(&self) -> CoapPayloadMediaType {
        media_type_for(self.options(), self.payload.is_some())
    }

    /// Collapses the (possibly duplicate-containing) option list into a
    /// map keyed by absolute option number.
    ///
    /// Duplicates of a repeatable option number (e.g. Uri-Path) are all
    /// preserved in encounter order; duplicates of a non-repeatable
    /// option number are collapsed to just the first occurrence.
    pub fn options_map(&self) -> BTreeMap<CoapOptionNumber, Vec<&[u8]>> {
        let mut map: BTreeMap<CoapOptionNumber, Vec<&[u8]>> = BTreeMap::new();
        for opt in self.options() {
            let entry = map.entry(opt.number()).or_default();
            if entry.is_empty() || opt.number().is_repeatable() {
                entry.push(opt.value());
            }
        }
        map
    }

    /// Concatenates every Uri-Path option's value, in option order,
    /// joined by `/`, forming the topic path the ingress pipeline
    /// publishes to.
    pub fn uri_path(&self) -> Option<String> {
        let segments: Vec<&str> = self
            .options()
            .iter()
            .filter(|o| o.number() == CoapOptionNumber::URI_PATH)
            .filter_map(|o| std::str::from_utf8(o.value()).ok())
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }
}
