//! Object Codec Tests
//!
//! Tests for serializing application values into frame payloads.

use std::collections::HashMap;

use cachewire::protocol::{from_payload, to_payload, ObjectCodec};
use cachewire::CacheError;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
struct Session {
    user_id: u64,
    name: String,
    roles: Vec<String>,
    expires: Option<i64>,
}

/// Sequence whose length is not known up front
struct Unsized;

impl Serialize for Unsized {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        seq.serialize_element(&1u8)?;
        seq.end()
    }
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip_string() {
    let codec = ObjectCodec::new();
    let bytes = codec.serialize("hello").unwrap();
    let value: Option<String> = codec.deserialize(&bytes).unwrap();
    assert_eq!(value.as_deref(), Some("hello"));
}

#[test]
fn test_round_trip_struct() {
    let session = Session {
        user_id: 42,
        name: "alice".to_string(),
        roles: vec!["admin".to_string(), "ops".to_string()],
        expires: None,
    };

    let bytes = to_payload(&session).unwrap();
    let decoded: Session = from_payload(&bytes).unwrap().unwrap();
    assert_eq!(decoded, session);
}

#[test]
fn test_round_trip_collections() {
    let mut map = HashMap::new();
    map.insert("a".to_string(), vec![1i32, 2, 3]);
    map.insert("b".to_string(), Vec::new());

    let bytes = to_payload(&map).unwrap();
    let decoded: HashMap<String, Vec<i32>> = from_payload(&bytes).unwrap().unwrap();
    assert_eq!(decoded, map);
}

#[test]
fn test_round_trip_primitives() {
    assert_eq!(from_payload::<i64>(to_payload(&-7i64).unwrap()).unwrap(), Some(-7));
    assert_eq!(from_payload::<bool>(to_payload(&true).unwrap()).unwrap(), Some(true));
    assert_eq!(
        from_payload::<Option<u8>>(to_payload(&None::<u8>).unwrap()).unwrap(),
        Some(None)
    );
}

// =============================================================================
// Absent / Empty Tests
// =============================================================================

#[test]
fn test_deserialize_empty_is_absent() {
    let value: Option<String> = from_payload(Vec::<u8>::new()).unwrap();
    assert!(value.is_none());
}

#[test]
fn test_serialize_zero_sized_value_rejected() {
    let err = to_payload(&()).unwrap_err();
    assert!(matches!(err, CacheError::NotSerializable(_)));
}

#[test]
fn test_serialize_empty_string_is_not_empty_payload() {
    // Length prefix keeps the payload non-empty
    let bytes = to_payload("").unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(from_payload::<String>(&bytes).unwrap().as_deref(), Some(""));
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_serialize_unsized_sequence_not_serializable() {
    let err = to_payload(&Unsized).unwrap_err();
    assert!(matches!(err, CacheError::NotSerializable(_)));
}

#[test]
fn test_deserialize_garbage_fails() {
    let err = from_payload::<String>([0xFFu8, 0xFF, 0xFF]).unwrap_err();
    assert!(matches!(err, CacheError::DeserializationFailed(_)));
}

#[test]
fn test_deserialize_trailing_bytes_fails() {
    let mut bytes = to_payload(&7u32).unwrap().to_vec();
    bytes.push(0);

    let err = from_payload::<u32>(&bytes).unwrap_err();
    assert!(matches!(err, CacheError::DeserializationFailed(_)));
}

#[test]
fn test_deserialize_wrong_type_fails() {
    let bytes = to_payload(&1u8).unwrap();
    let err = from_payload::<u64>(&bytes).unwrap_err();
    assert!(matches!(err, CacheError::DeserializationFailed(_)));
}
