//! Configuration for cachewire
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CacheError, Result};
use crate::protocol::MAX_PAYLOAD_SIZE;

/// Main configuration for a cachewire server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections (one thread each)
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest payload accepted in a single frame (bytes)
    pub max_payload_size: u32,

    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// How often expired entries are swept (milliseconds)
    pub eviction_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9010".to_string(),
            max_connections: 1024,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            max_payload_size: 16 * 1024 * 1024, // 16 MB
            eviction_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(CacheError::Config("listen address can not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(CacheError::Config("max_connections should be > 0".to_string()));
        }
        if self.max_payload_size == 0 || self.max_payload_size > MAX_PAYLOAD_SIZE {
            return Err(CacheError::Config(format!(
                "max_payload_size should be in 1..={}, got {}",
                MAX_PAYLOAD_SIZE, self.max_payload_size
            )));
        }
        if self.eviction_interval_ms == 0 {
            return Err(CacheError::Config("eviction_interval_ms should be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum payload size (in bytes)
    pub fn max_payload_size(mut self, size: u32) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the expiry sweep interval (in milliseconds)
    pub fn eviction_interval_ms(mut self, ms: u64) -> Self {
        self.config.eviction_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
