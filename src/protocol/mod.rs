//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1.0 - Flagged Binary)
//!
//! Every message starts with the protocol version byte (`0x10` for 1.0).
//!
//! ### Request Format
//! ```text
//! ┌─────────┬─────────┬─────────┬────────────────────────────────────┐
//! │ Ver (1) │ Cmd (1) │Flags (1)│ [key] [ttl] [payload] per flag bit │
//! └─────────┴─────────┴─────────┴────────────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x00: CLEAR  - no fields
//! - 0x01: PUT    - key, payload, optional ttl
//! - 0x02: GET    - key
//! - 0x03: REMOVE - key
//!
//! ### Response Format
//! ```text
//! ┌─────────┬──────────┬─────────────┬─────────────────────────┐
//! │ Ver (1) │Status (1)│ HasData (1) │ [len (4) + payload]     │
//! └─────────┴──────────┴─────────────┴─────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: ADDED
//! - 0x01: REPLACED
//! - 0x02: GOTTEN
//! - 0x03: NOT_FOUND
//! - 0x04: REMOVED
//! - 0x05: CLEARED

mod version;
mod command;
mod frame;
mod request;
mod response;
mod codec;
mod object;

pub use version::Version;
pub use command::Command;
pub use frame::Frame;
pub use request::Request;
pub use response::{Response, Status};
pub use codec::{
    RequestCodec, ResponseCodec,
    encode_request, decode_request, read_request, write_request,
    encode_response, decode_response, read_response, write_response,
    HEADER_SIZE, MAX_KEY_LENGTH, MAX_PAYLOAD_SIZE, KEY_FLAG, TTL_FLAG, DATA_FLAG,
};
pub use object::{ObjectCodec, to_payload, from_payload};
