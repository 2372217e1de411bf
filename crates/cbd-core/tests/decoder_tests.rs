/// Decoder contract tests: header validation, value records and every
/// malformed-input path.
use cbd_core::{
    deserialize, deserialize_with, inspect, read_header, serialize, CbdError, DecodeOptions,
    Header, Value,
};

fn doc(dict: &[&str], body: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xCB, 0xD1, 0x01, dict.len() as u8];
    for key in dict {
        bytes.push(key.len() as u8);
        bytes.extend_from_slice(key.as_bytes());
    }
    bytes.extend_from_slice(body);
    bytes
}

fn assert_malformed(bytes: &[u8]) {
    match deserialize(bytes) {
        Err(CbdError::MalformedBuffer { .. }) => {}
        other => panic!("expected MalformedBuffer for {bytes:02X?}, got {other:?}"),
    }
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn decode_null() {
    assert_eq!(deserialize(&doc(&[], &[0x00])).unwrap(), Value::Null);
}

#[test]
fn decode_bools() {
    assert_eq!(deserialize(&doc(&[], &[0x21])).unwrap(), Value::Bool(true));
    assert_eq!(deserialize(&doc(&[], &[0x20])).unwrap(), Value::Bool(false));
}

#[test]
fn decode_multi_byte_number() {
    assert_eq!(
        deserialize(&doc(&[], &[0x40, 0xAC, 0x02])).unwrap(),
        Value::from(300)
    );
}

#[test]
fn decode_unicode_string() {
    let value = deserialize(&doc(&[], &[0x60, 0x06, 0xE4, 0xBD, 0xA0, 0xE5, 0xA5, 0xBD])).unwrap();
    assert_eq!(value, Value::from("\u{4f60}\u{597d}"));
}

#[test]
fn decode_object_with_dictionary() {
    let bytes = doc(
        &["name", "tags"],
        &[
            0xA1, 0x02, 0x01, 0x60, 0x03, b'B', b'o', b'b', 0x02, 0x81, 0x01, 0x60, 0x01, b'x',
        ],
    );
    assert_eq!(
        deserialize(&bytes).unwrap(),
        Value::object([("name", Value::from("Bob")), ("tags", Value::array(["x"]))])
    );
}

#[test]
fn decode_object_keeps_read_order() {
    let bytes = doc(&["a", "b"], &[0xA1, 0x02, 0x02, 0x00, 0x01, 0x00]);
    let value = deserialize(&bytes).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn decode_unused_dictionary_entries_are_allowed() {
    let bytes = doc(&["unused"], &[0x40, 0x01]);
    assert_eq!(deserialize(&bytes).unwrap(), Value::from(1));
}

#[test]
fn decode_numbers_are_unsigned_integers() {
    let value = deserialize(&serialize(&Value::from(7.9)).unwrap()).unwrap();
    assert_eq!(value, Value::from(7u64));
    assert_eq!(value.as_u64(), Some(7));
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn decode_zero_magic_fails() {
    let err = deserialize(&[0x00, 0x00, 0x01, 0x00, 0x00]).unwrap_err();
    assert!(matches!(err, CbdError::InvalidFormat(_)));
}

#[test]
fn decode_wrong_version_fails() {
    let err = deserialize(&[0xCB, 0xD1, 0x02, 0x00, 0x00]).unwrap_err();
    assert!(matches!(err, CbdError::InvalidFormat(ref m) if m.contains("version")));
}

#[test]
fn decode_short_header_fails() {
    for len in 0..4 {
        assert_malformed(&[0xCB, 0xD1, 0x01, 0x00][..len]);
    }
}

#[test]
fn read_header_fields() {
    let bytes = serialize(&Value::object([("a", 1), ("b", 2)])).unwrap();
    assert_eq!(
        read_header(&bytes).unwrap(),
        Header {
            magic: 0xCBD1,
            version: 1,
            dict_size: 2
        }
    );
}

#[test]
fn inspect_reports_dictionary_and_body() {
    let bytes = serialize(&Value::object([("id", Value::from(1))])).unwrap();
    let info = inspect(&bytes).unwrap();
    assert_eq!(info.keys, ["id"]);
    assert_eq!(info.body_offset, 7);
    assert_eq!(info.body_len(), 5);
    assert_eq!(info.total_len, bytes.len());
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn decode_header_only_fails() {
    assert_malformed(&doc(&[], &[]));
}

#[test]
fn decode_truncated_dictionary_fails() {
    assert_malformed(&[0xCB, 0xD1, 0x01, 0x01, 0x05, b'a', b'b']);
}

#[test]
fn decode_dictionary_size_larger_than_entries_fails() {
    assert_malformed(&[0xCB, 0xD1, 0x01, 0x03, 0x01, b'a', 0x00]);
}

#[test]
fn decode_truncated_varint_fails() {
    assert_malformed(&doc(&[], &[0x40, 0x80]));
}

#[test]
fn decode_truncated_string_fails() {
    assert_malformed(&doc(&[], &[0x60, 0x05, b'a', b'b']));
}

#[test]
fn decode_invalid_utf8_fails() {
    assert_malformed(&doc(&[], &[0x60, 0x01, 0xFF]));
}

#[test]
fn decode_array_count_exceeding_buffer_fails() {
    assert_malformed(&doc(&[], &[0x81, 0x03, 0x00, 0x00]));
}

#[test]
fn decode_huge_declared_count_fails_without_allocating() {
    let mut body = vec![0x81];
    body.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
    assert_malformed(&doc(&[], &body));
}

#[test]
fn decode_object_count_exceeding_buffer_fails() {
    assert_malformed(&doc(&["a"], &[0xA1, 0x02, 0x01, 0x00]));
}

#[test]
fn decode_key_index_zero_fails() {
    assert_malformed(&doc(&["a"], &[0xA1, 0x01, 0x00, 0x00]));
}

#[test]
fn decode_key_index_past_dictionary_fails() {
    assert_malformed(&doc(&["a"], &[0xA1, 0x01, 0x02, 0x00]));
}

#[test]
fn decode_varint_overflow_fails() {
    let mut body = vec![0x40];
    body.extend_from_slice(&[0xFF; 10]);
    body.push(0x01);
    assert_malformed(&doc(&[], &body));
}

#[test]
fn decode_unknown_type_codes_fail() {
    for tag in [0xC0u8, 0xDF, 0xE0, 0xFF] {
        match deserialize(&doc(&[], &[tag])) {
            Err(CbdError::UnknownTypeCode { tag: t, offset: 4, .. }) => assert_eq!(t, tag),
            other => panic!("tag {tag:02X}: unexpected {other:?}"),
        }
    }
}

#[test]
fn decode_every_truncation_of_a_valid_document_fails() {
    let value = Value::object([
        ("name", Value::from("John")),
        ("age", Value::from(300)),
        ("scores", Value::array([95, 87, 92])),
        ("meta", Value::object([("active", Value::from(true)), ("note", Value::Null)])),
    ]);
    let bytes = serialize(&value).unwrap();
    assert_eq!(deserialize(&bytes).unwrap(), value);
    for len in 0..bytes.len() {
        assert_malformed(&bytes[..len]);
    }
}

// ============================================================================
// Trailing data and depth
// ============================================================================

#[test]
fn decode_trailing_bytes_strict_fails() {
    let mut bytes = serialize(&Value::from(1)).unwrap();
    bytes.extend_from_slice(&[0x00, 0x00]);
    let err = deserialize(&bytes).unwrap_err();
    assert!(matches!(
        err,
        CbdError::TrailingData { offset: 6, remaining: 2 }
    ));
}

#[test]
fn decode_trailing_bytes_lenient_ignored() {
    let mut bytes = serialize(&Value::from(1)).unwrap();
    bytes.push(0xFF);
    assert_eq!(
        deserialize_with(&bytes, &DecodeOptions::lenient()).unwrap(),
        Value::from(1)
    );
}

#[test]
fn decode_depth_limit() {
    // 300 nested single-element arrays around a null
    let mut body = Vec::new();
    for _ in 0..300 {
        body.extend_from_slice(&[0x81, 0x01]);
    }
    body.push(0x00);
    let bytes = doc(&[], &body);

    assert!(matches!(
        deserialize(&bytes),
        Err(CbdError::DepthLimitExceeded { limit: 256 })
    ));
    let value = deserialize_with(&bytes, &DecodeOptions::default().max_depth(300)).unwrap();
    let mut depth = 0;
    let mut current = &value;
    while let Value::Array(items) = current {
        depth += 1;
        current = &items[0];
    }
    assert_eq!(depth, 300);
}
