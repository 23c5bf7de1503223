//! # cachewire
//!
//! A compact binary wire protocol for cache commands with:
//! - Versioned request/response framing with flag-driven optional fields
//! - Generic `serde` payload serialization for application values
//! - In-memory cache engine with per-entry time-to-live
//! - Blocking TCP server (thread per connection) and client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────┐                  ┌─────────────────────────────┐
//! │       Client        │                  │         TCP Server          │
//! │  ObjectCodec (T ↔   │   Request frame  │  acceptor → handler thread  │
//! │  payload bytes)     │ ───────────────► │  per connection             │
//! │  RequestCodec       │                  │  RequestCodec/ResponseCodec │
//! │  ResponseCodec      │ ◄─────────────── │                             │
//! └─────────────────────┘  Response frame  └──────────────┬──────────────┘
//!                                                         │
//!                                                         ▼
//!                                                  ┌─────────────┐
//!                                                  │   Engine    │
//!                                                  │  (RwLock +  │
//!                                                  │   TTL)      │
//!                                                  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, CodeKind, Result};
pub use config::Config;
pub use engine::Engine;
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cachewire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
