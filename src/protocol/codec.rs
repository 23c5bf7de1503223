//! Protocol codec
//!
//! Encoding and decoding of requests and responses.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌─────────┬─────────┬─────────┬─────────────────┬─────────┬──────────────────┐
//! │ Ver (1) │ Cmd (1) │Flags (1)│ KeyLen (1) + Key│ TTL (8) │ Len (4) + Payload│
//! └─────────┴─────────┴─────────┴─────────────────┴─────────┴──────────────────┘
//!                                   bit0 set        bit1 set    bit2 set
//! ```
//!
//! ### Response Format
//! ```text
//! ┌─────────┬──────────┬─────────────┬──────────────────┐
//! │ Ver (1) │Status (1)│ HasData (1) │ Len (4) + Payload│
//! └─────────┴──────────┴─────────────┴──────────────────┘
//!                                      HasData != 0
//! ```
//!
//! All integers are big-endian and signed. Fields whose flag is unset are not
//! written at all, so an empty CLEAR request is exactly 3 bytes.

use std::io::{self, Read, Write};

use bytes::{BufMut, Bytes};

use crate::error::{CacheError, Result};
use super::{Command, Frame, Request, Response, Status, Version};

/// Fixed header size of both message kinds: version + code + flags
pub const HEADER_SIZE: usize = 3;

/// Maximum key length in bytes
pub const MAX_KEY_LENGTH: usize = 127;

/// Largest payload a 4-byte signed length can describe
pub const MAX_PAYLOAD_SIZE: u32 = i32::MAX as u32;

/// Request carries key length (1) + key bytes
pub const KEY_FLAG: u8 = 0b0000_0001;

/// Request carries ttl (8)
pub const TTL_FLAG: u8 = 0b0000_0010;

/// Request carries payload length (4) + payload bytes
pub const DATA_FLAG: u8 = 0b0000_0100;

const KNOWN_FLAGS: u8 = KEY_FLAG | TTL_FLAG | DATA_FLAG;

/// Upper bound on memory reserved before a declared payload actually arrives
const READ_CHUNK_SIZE: usize = 64 * 1024;

// =============================================================================
// Request Codec
// =============================================================================

/// Reads and writes [`Request`] frames
///
/// Holds configuration only; a single instance can be shared between threads
/// as long as each call gets its own channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCodec {
    max_payload_size: u32,
}

impl RequestCodec {
    pub const fn new() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }

    /// Create a codec that rejects payloads above `max` bytes
    pub fn with_max_payload_size(max: u32) -> Self {
        Self {
            max_payload_size: max.min(MAX_PAYLOAD_SIZE),
        }
    }

    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    /// Flag byte describing which optional fields follow the header
    pub fn flags_for(request: &Request) -> u8 {
        let mut flags = 0;
        if request.has_key() {
            flags |= KEY_FLAG;
        }
        if request.has_ttl() {
            flags |= TTL_FLAG;
        }
        if request.has_data() {
            flags |= DATA_FLAG;
        }
        flags
    }

    /// Encode a request to bytes
    ///
    /// Validation happens before anything is produced, so a failed encode
    /// never leaves a partial frame behind.
    pub fn encode(&self, request: &Request) -> Result<Vec<u8>> {
        let key = request.key().map(encode_key).transpose()?;
        let payload = request.frame().as_bytes();
        if request.has_data() {
            check_payload_size(payload.len(), self.max_payload_size)?;
        }

        let capacity = HEADER_SIZE
            + key.map_or(0, |k| 1 + k.len())
            + if request.has_ttl() { 8 } else { 0 }
            + if request.has_data() { 4 + payload.len() } else { 0 };

        let mut message = Vec::with_capacity(capacity);
        message.put_u8(Version::CURRENT.to_byte());
        message.put_u8(request.command().to_byte());
        message.put_u8(Self::flags_for(request));

        if let Some(key) = key {
            message.put_u8(key.len() as u8);
            message.put_slice(key);
        }
        if let Some(ttl) = request.ttl() {
            message.put_i64(ttl);
        }
        if request.has_data() {
            message.put_i32(payload.len() as i32);
            message.put_slice(payload);
        }

        Ok(message)
    }

    /// Decode a request from a complete frame
    ///
    /// Fails with [`CacheError::TrailingBytes`] if `bytes` holds more than
    /// one frame.
    pub fn decode(&self, bytes: &[u8]) -> Result<Request> {
        let mut remaining = bytes;
        let request = self.read_from(&mut remaining)?;
        ensure_consumed(remaining)?;
        Ok(request)
    }

    /// Write a request to a stream and flush it
    pub fn write_to<W: Write>(&self, writer: &mut W, request: &Request) -> Result<()> {
        let bytes = self.encode(request)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        tracing::trace!(%request, len = bytes.len(), "request written");
        Ok(())
    }

    /// Read one request from a stream
    ///
    /// Blocks until the whole frame is received or an error occurs.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<Request> {
        check_version(read_u8(reader)?)?;
        let command = Command::from_byte(read_u8(reader)?)?;
        let flags = read_u8(reader)?;

        if flags & !KNOWN_FLAGS != 0 {
            return Err(CacheError::MalformedFlags(flags));
        }
        let has_key = flags & KEY_FLAG != 0;
        let has_ttl = flags & TTL_FLAG != 0;
        let has_data = flags & DATA_FLAG != 0;

        if !has_key {
            // ttl and payload are only ever sent alongside a key
            if has_ttl || has_data {
                return Err(CacheError::MalformedFlags(flags));
            }
            let request = Request::empty(command);
            tracing::trace!(%request, "request read");
            return Ok(request);
        }

        let key = read_key(reader)?;
        let ttl = if has_ttl { Some(read_i64(reader)?) } else { None };
        let frame = if has_data {
            Frame::new(read_payload(reader, self.max_payload_size)?)
        } else {
            Frame::default()
        };

        let request = Request::from_parts(command, Some(key), ttl, frame);
        tracing::trace!(%request, "request read");
        Ok(request)
    }
}

impl Default for RequestCodec {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Response Codec
// =============================================================================

/// Reads and writes [`Response`] frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCodec {
    max_payload_size: u32,
}

impl ResponseCodec {
    pub const fn new() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }

    /// Create a codec that rejects payloads above `max` bytes
    pub fn with_max_payload_size(max: u32) -> Self {
        Self {
            max_payload_size: max.min(MAX_PAYLOAD_SIZE),
        }
    }

    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    /// Encode a response to bytes
    pub fn encode(&self, response: &Response) -> Result<Vec<u8>> {
        let payload = response.frame().as_bytes();
        if response.has_data() {
            check_payload_size(payload.len(), self.max_payload_size)?;
        }

        let capacity = HEADER_SIZE + if response.has_data() { 4 + payload.len() } else { 0 };

        let mut message = Vec::with_capacity(capacity);
        message.put_u8(Version::CURRENT.to_byte());
        message.put_u8(response.status().to_byte());
        message.put_u8(u8::from(response.has_data()));

        if response.has_data() {
            message.put_i32(payload.len() as i32);
            message.put_slice(payload);
        }

        Ok(message)
    }

    /// Decode a response from a complete frame
    pub fn decode(&self, bytes: &[u8]) -> Result<Response> {
        let mut remaining = bytes;
        let response = self.read_from(&mut remaining)?;
        ensure_consumed(remaining)?;
        Ok(response)
    }

    /// Write a response to a stream and flush it
    pub fn write_to<W: Write>(&self, writer: &mut W, response: &Response) -> Result<()> {
        let bytes = self.encode(response)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        tracing::trace!(%response, len = bytes.len(), "response written");
        Ok(())
    }

    /// Read one response from a stream
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<Response> {
        check_version(read_u8(reader)?)?;
        let status = Status::from_byte(read_u8(reader)?)?;
        let has_data = read_u8(reader)? != 0;

        let response = if has_data {
            Response::with_data(status, read_payload(reader, self.max_payload_size)?)
        } else {
            Response::empty(status)
        };

        tracing::trace!(%response, "response read");
        Ok(response)
    }
}

impl Default for ResponseCodec {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Convenience functions (default codecs)
// =============================================================================

/// Encode a request with the default codec
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    RequestCodec::new().encode(request)
}

/// Decode a request with the default codec
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    RequestCodec::new().decode(bytes)
}

/// Write a request to a stream with the default codec
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    RequestCodec::new().write_to(writer, request)
}

/// Read a request from a stream with the default codec
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    RequestCodec::new().read_from(reader)
}

/// Encode a response with the default codec
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    ResponseCodec::new().encode(response)
}

/// Decode a response with the default codec
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    ResponseCodec::new().decode(bytes)
}

/// Write a response to a stream with the default codec
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    ResponseCodec::new().write_to(writer, response)
}

/// Read a response from a stream with the default codec
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    ResponseCodec::new().read_from(reader)
}

// =============================================================================
// Field helpers
// =============================================================================

fn check_version(byte: u8) -> Result<Version> {
    // No compatibility across versions: known but older ones are rejected too
    match Version::from_byte(byte) {
        Ok(version) if version == Version::CURRENT => Ok(version),
        _ => Err(CacheError::UnsupportedVersion(byte)),
    }
}

fn encode_key(key: &str) -> Result<&[u8]> {
    if !key.is_ascii() {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::KeyTooLong {
            len: key.len(),
            max: MAX_KEY_LENGTH,
        });
    }
    Ok(key.as_bytes())
}

fn check_payload_size(size: usize, max: u32) -> Result<()> {
    if size > max as usize {
        return Err(CacheError::PayloadTooLarge { size, max });
    }
    Ok(())
}

fn ensure_consumed(remaining: &[u8]) -> Result<()> {
    if !remaining.is_empty() {
        return Err(CacheError::TrailingBytes(remaining.len()));
    }
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

/// Read exactly `len` bytes, growing the buffer only as data arrives
fn read_exact_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut buf = Vec::with_capacity(len.min(READ_CHUNK_SIZE));
    let read = reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if read < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", len, read),
        )
        .into());
    }
    Ok(Bytes::from(buf))
}

fn read_key<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_u8(reader)? as usize;
    if len > MAX_KEY_LENGTH {
        return Err(CacheError::KeyTooLong {
            len,
            max: MAX_KEY_LENGTH,
        });
    }

    let bytes = read_exact_bytes(reader, len)?;
    if !bytes.is_ascii() {
        return Err(CacheError::InvalidKey(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
    }
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

fn read_payload<R: Read>(reader: &mut R, max: u32) -> Result<Bytes> {
    let len = read_i32(reader)?;
    if len < 0 {
        return Err(CacheError::InvalidLength(len));
    }
    check_payload_size(len as usize, max)?;
    read_exact_bytes(reader, len as usize)
}
