//! Object codec
//!
//! Turns application values into frame payloads and back. Independent of
//! request/response framing: the codec only sees opaque bytes.

use bincode::Options;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Serializes any `serde` value into a payload using bincode
///
/// An empty payload means "nothing stored", so values that would encode to
/// zero bytes (unit, empty tuples) are refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectCodec;

impl ObjectCodec {
    pub const fn new() -> Self {
        Self
    }

    /// Serialize `value` into a non-empty payload
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        let bytes = Self::options()
            .serialize(value)
            .map_err(Self::classify_serialize_error::<T>)?;

        if bytes.is_empty() {
            return Err(CacheError::NotSerializable(format!(
                "{} encodes to an empty payload",
                std::any::type_name::<T>()
            )));
        }

        Ok(Bytes::from(bytes))
    }

    /// Deserialize a payload, returning `None` for an empty one
    pub fn deserialize<T: DeserializeOwned>(&self, data: impl AsRef<[u8]>) -> Result<Option<T>> {
        let data = data.as_ref();
        if data.is_empty() {
            return Ok(None);
        }

        Self::options()
            .deserialize(data)
            .map(Some)
            .map_err(CacheError::DeserializationFailed)
    }

    fn options() -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
    }

    fn classify_serialize_error<T: ?Sized>(err: bincode::Error) -> CacheError {
        match *err {
            // The value's shape has no bincode representation
            bincode::ErrorKind::SequenceMustHaveLength | bincode::ErrorKind::Custom(_) => {
                CacheError::NotSerializable(format!("{}: {}", std::any::type_name::<T>(), err))
            }
            _ => CacheError::SerializationFailed(err),
        }
    }
}

/// Serialize a value with the default object codec
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    ObjectCodec::new().serialize(value)
}

/// Deserialize a payload with the default object codec
pub fn from_payload<T: DeserializeOwned>(data: impl AsRef<[u8]>) -> Result<Option<T>> {
    ObjectCodec::new().deserialize(data)
}
