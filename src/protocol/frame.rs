//! Frame payload
//!
//! The opaque byte payload carried by both requests and responses.

use bytes::Bytes;

/// Immutable payload shared by [`Request`](super::Request) and
/// [`Response`](super::Response)
///
/// Backed by [`Bytes`]: clones share one read-only buffer, so nothing handed
/// out by a frame can be used to change it. An absent payload is the empty
/// frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    data: Bytes,
}

impl Frame {
    /// Create a frame that takes ownership of `data`
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Create a frame from a copy of `data`
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }

    /// Create a frame, treating `None` as the empty payload
    pub fn from_optional(data: Option<impl Into<Bytes>>) -> Self {
        data.map(Self::new).unwrap_or_default()
    }

    /// Immutable snapshot of the payload
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Bytes> for Frame {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Frame {
    fn from(data: &[u8]) -> Self {
        Self::copy_from_slice(data)
    }
}
