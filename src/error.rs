//! Error types for cachewire
//!
//! Provides a unified error type for codec, cache and network operations.

use std::fmt;

use thiserror::Error;

use crate::protocol::{Command, Status};

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Which closed code table a byte was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Version,
    Command,
    Status,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeKind::Version => "Version",
            CodeKind::Command => "Command",
            CodeKind::Status => "Status",
        };
        f.write_str(name)
    }
}

/// Unified error type for cachewire operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Transport failure on the underlying channel, including premature EOF
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported protocol version byte: 0x{0:02x}")]
    UnsupportedVersion(u8),

    #[error("Unsupported byte code for {kind}: {byte}")]
    UnsupportedCode { kind: CodeKind, byte: u8 },

    #[error("Key length should be <= {max} bytes, got {len}")]
    KeyTooLong { len: usize, max: usize },

    #[error("Key must be 7-bit ASCII: {0:?}")]
    InvalidKey(String),

    #[error("Malformed request flags: 0b{0:08b}")]
    MalformedFlags(u8),

    #[error("Negative payload length: {0}")]
    InvalidLength(i32),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: u32 },

    #[error("Unexpected trailing bytes after frame: {0}")]
    TrailingBytes(usize),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Value is not serializable: {0}")]
    NotSerializable(String),

    #[error("Can not serialize object into byte array: {0}")]
    SerializationFailed(#[source] bincode::Error),

    #[error("Can not deserialize object from byte array: {0}")]
    DeserializationFailed(#[source] bincode::Error),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected status {status} for {command} request")]
    UnexpectedStatus { command: Command, status: Status },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// True when the peer went away (EOF, reset, abort, broken pipe)
    pub fn is_disconnect(&self) -> bool {
        match self {
            CacheError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True when a socket read or write timed out
    pub fn is_timeout(&self) -> bool {
        match self {
            // Windows reports TimedOut where Unix reports WouldBlock
            CacheError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
