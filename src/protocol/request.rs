//! Request definitions
//!
//! Represents a command sent by a client.

use std::fmt;

use bytes::Bytes;

use super::{Command, Frame};

/// An immutable protocol request
///
/// `key` is expected for GET/PUT/REMOVE and `ttl` only makes sense together
/// with a key and payload, but neither is enforced here: the engine decides
/// what a request shape means.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    /// The operation to perform
    command: Command,

    /// Cache key (ASCII, at most 127 bytes on the wire)
    key: Option<String>,

    /// Time-to-live in milliseconds
    ttl: Option<i64>,

    /// Value payload (PUT)
    frame: Frame,
}

impl Request {
    /// Create a request that carries only a command (e.g. CLEAR)
    pub fn empty(command: Command) -> Self {
        Self::from_parts(command, None, None, Frame::default())
    }

    /// Create a request with a command and a key (e.g. GET, REMOVE)
    pub fn with_key(command: Command, key: impl Into<String>) -> Self {
        Self::from_parts(command, Some(key.into()), None, Frame::default())
    }

    /// Create a request with a command, key, payload and optional ttl (PUT)
    pub fn with_key_and_data(
        command: Command,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        ttl: Option<i64>,
    ) -> Self {
        Self::from_parts(command, Some(key.into()), ttl, Frame::new(data))
    }

    pub(crate) fn from_parts(
        command: Command,
        key: Option<String>,
        ttl: Option<i64>,
        frame: Frame,
    ) -> Self {
        Self {
            command,
            key,
            ttl,
            frame,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn ttl(&self) -> Option<i64> {
        self.ttl
    }

    /// Immutable snapshot of the payload
    pub fn data(&self) -> Bytes {
        self.frame.data()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn has_ttl(&self) -> bool {
        self.ttl.is_some()
    }

    pub fn has_data(&self) -> bool {
        self.frame.has_data()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        if let Some(key) = &self.key {
            write!(f, "[{}]", key)?;
        }
        if self.has_data() {
            write!(f, "={} bytes", self.frame.len())?;
        }
        if let Some(ttl) = self.ttl {
            write!(f, " (time-to-live={} milliseconds)", ttl)?;
        }
        Ok(())
    }
}
