//! Integration-level codec properties: header/option round-trips and
//! end-to-end decode-then-respond behavior.

use coap_core::{ack, decode, encode, reset, CoapBody, CoapCode, CoapHeader, CoapMessage, CoapOption, CoapOptionNumber, CoapToken, CoapType, ParseErrorKind};

#[test]
fn header_round_trip_across_the_full_field_space() {
    for version in [1u8] {
        for type_bits in 0u8..4 {
            for tkl in 0u8..=8 {
                for prefix in 0u8..8 {
                    for suffix in [0u8, 1, 16, 31] {
                        for id in [0u16, 1, 0x1234, 0xFFFF] {
                            let b1 = (version << 6) | (type_bits << 4) | tkl;
                            let code = CoapCode::new(prefix, suffix).unwrap();
                            let b2 = code.to_byte();
                            let [id_hi, id_lo] = id.to_be_bytes();

                            let header = CoapHeader::new(
                                version,
                                CoapType::try_from_bits(type_bits).unwrap(),
                                tkl,
                                code,
                                id,
                            )
                            .unwrap();
                            let bytes = header.to_bytes();
                            assert_eq!(bytes, [b1, b2, id_hi, id_lo]);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn option_extended_encoding_reconstructs_absolute_number_and_value() {
    let deltas = [0u16, 5, 12, 13, 100, 268, 269, 1000, 65804u32 as u16];
    let lengths: [usize; 6] = [0, 5, 12, 13, 268, 269];

    for &delta in &deltas {
        for &length in &lengths {
            let prev = CoapOptionNumber(0);
            // Keep the resulting absolute number inside u16 range.
            let number = CoapOptionNumber(delta.min(60000));
            let value = vec![0x42u8; length];
            let opt = CoapOption::new(number, value.clone(), prev);

            let mut buf = Vec::new();
            coap_core::option::encode_option(&mut buf, prev, &opt);
            let (decoded, consumed) = coap_core::option::decode_option(&buf, prev).unwrap();

            assert_eq!(consumed, buf.len());
            assert_eq!(decoded.number(), number);
            assert_eq!(decoded.value(), value.as_slice());
        }
    }
}

#[test]
fn every_error_on_four_or_more_bytes_carries_the_id() {
    let cases: &[&[u8]] = &[
        &[0x80, 0x01, 0x00, 0x05], // bad version
        &[0x49, 0x01, 0x00, 0x05], // tkl=9, caught by header refinement
        &[0x40, 0x01, 0xAB, 0xCD, 0xFF], // payload marker, no payload
    ];
    for bytes in cases {
        let err = decode(bytes).unwrap_err();
        assert_eq!(err.id, Some(u16::from_be_bytes([bytes[2], bytes[3]])));
    }
}

#[test]
fn every_error_under_four_bytes_carries_no_id() {
    for len in 0..4 {
        let bytes = vec![0u8; len];
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.id, None);
        assert!(matches!(err.kind, ParseErrorKind::InvalidChunkSize { .. }));
    }
}

#[test]
fn confirmable_get_request_is_acked() {
    let msg = decode(&[0x40, 0x01, 0x12, 0x34]).unwrap();
    assert_eq!(msg.header().msg_type(), CoapType::Confirmable);
    let reply = encode(&ack(msg.header().message_id()));
    assert_eq!(&reply[..], &[0x60, 0x00, 0x12, 0x34]);
}

#[test]
fn payload_marker_with_no_payload_resets() {
    let err = decode(&[0x40, 0x01, 0xAB, 0xCD, 0xFF]).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidPayloadMarker);
    let reply = encode(&reset(err.id.unwrap()));
    assert_eq!(&reply[..], &[0x70, 0x00, 0xAB, 0xCD]);
}

#[test]
fn uri_path_option_decodes_and_request_is_acked() {
    let bytes = [0x40, 0x01, 0x00, 0x05, 0xB4, b't', b'e', b's', b't'];
    let msg = decode(&bytes).unwrap();
    assert_eq!(msg.body().uri_path().as_deref(), Some("test"));
    let reply = encode(&ack(msg.header().message_id()));
    assert_eq!(&reply[..], &[0x60, 0x00, 0x00, 0x05]);
}

#[test]
fn decode_of_encode_round_trips_modulo_canonicalization() {
    let header = CoapHeader::new(1, CoapType::NonConfirmable, 2, CoapCode::new(0, 5).unwrap(), 777).unwrap();
    let token = CoapToken::new(&[9, 9]).unwrap();
    let options = vec![
        CoapOption::new(CoapOptionNumber::URI_PATH, b"root".to_vec(), CoapOptionNumber(0)),
        CoapOption::new(CoapOptionNumber::URI_PATH, b"leaf".to_vec(), CoapOptionNumber::URI_PATH),
    ];
    let body = CoapBody::new(Some(token), options, Some(b"hello".to_vec()));
    let msg = CoapMessage::new(header, body);

    let encoded = encode(&msg);
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded, msg);
}
