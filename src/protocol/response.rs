//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

use bytes::Bytes;

use super::Frame;
use crate::error::{CacheError, CodeKind, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Added = 0x00,
    Replaced = 0x01,
    Gotten = 0x02,
    NotFound = 0x03,
    Removed = 0x04,
    Cleared = 0x05,
}

impl Status {
    /// All statuses, in lookup order
    pub const ALL: [Status; 6] = [
        Status::Added,
        Status::Replaced,
        Status::Gotten,
        Status::NotFound,
        Status::Removed,
        Status::Cleared,
    ];

    /// Wire byte for this status
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Look up the status with the given wire byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.to_byte() == byte)
            .ok_or(CacheError::UnsupportedCode {
                kind: CodeKind::Status,
                byte,
            })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Status::Added => "ADDED",
            Status::Replaced => "REPLACED",
            Status::Gotten => "GOTTEN",
            Status::NotFound => "NOT_FOUND",
            Status::Removed => "REMOVED",
            Status::Cleared => "CLEARED",
        }
    }
}

impl TryFrom<u8> for Status {
    type Error = CacheError;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_byte(byte)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Response {
    /// Status code
    status: Status,

    /// Payload (value for GET)
    frame: Frame,
}

impl Response {
    /// Create a response without payload
    pub fn empty(status: Status) -> Self {
        Self {
            status,
            frame: Frame::default(),
        }
    }

    /// Create a response carrying a payload
    pub fn with_data(status: Status, data: impl Into<Bytes>) -> Self {
        Self {
            status,
            frame: Frame::new(data),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Immutable snapshot of the payload
    pub fn data(&self) -> Bytes {
        self.frame.data()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn has_data(&self) -> bool {
        self.frame.has_data()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if self.has_data() {
            write!(f, " [{} bytes]", self.frame.len())?;
        }
        Ok(())
    }
}
