//! Engine Module
//!
//! The in-memory cache that executes protocol requests.
//!
//! ## Responsibilities
//! - Map each [`Command`] onto a cache operation and a [`Status`]
//! - Track per-entry time-to-live and hide expired entries from readers
//! - Sweep expired entries on demand (driven by the server's eviction ticker)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{CacheError, Result};
use crate::protocol::{Command, Request, Response, Status};

/// A cached value with its optional deadline
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// The cache engine
///
/// ## Concurrency
/// All entries live behind one `RwLock`: GETs share the read lock, every
/// mutation takes the write lock. Expired entries found by a GET are left
/// in place and reclaimed by the next mutation of that key or by
/// [`Engine::evict_expired`].
pub struct Engine {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Execute a request and build the response for it
    pub fn execute(&self, request: &Request) -> Result<Response> {
        let response = match request.command() {
            Command::Clear => {
                self.clear();
                Response::empty(Status::Cleared)
            }
            Command::Put => {
                let key = required_key(request)?;
                if !request.has_data() {
                    return Err(CacheError::InvalidRequest(format!(
                        "PUT [{}] without payload",
                        key
                    )));
                }
                let ttl = request.ttl().map(ttl_duration).transpose()?;
                Response::empty(self.put(key, request.data(), ttl))
            }
            Command::Get => match self.get(required_key(request)?) {
                Some(data) => Response::with_data(Status::Gotten, data),
                None => Response::empty(Status::NotFound),
            },
            Command::Remove => {
                if self.remove(required_key(request)?) {
                    Response::empty(Status::Removed)
                } else {
                    Response::empty(Status::NotFound)
                }
            }
        };

        tracing::trace!(%request, %response, "request executed");
        Ok(response)
    }

    /// Store a value, returning ADDED for a new (or expired) key and REPLACED otherwise
    pub fn put(&self, key: &str, data: Bytes, ttl: Option<Duration>) -> Status {
        let now = Instant::now();
        // A deadline too far in the future to represent never expires
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        let entry = CacheEntry { data, expires_at };

        let previous = self.entries.write().insert(key.to_string(), entry);
        match previous {
            Some(previous) if !previous.is_expired(now) => Status::Replaced,
            _ => Status::Added,
        }
    }

    /// Get a live value
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.data.clone())
    }

    /// Remove a key, returning whether a live value was removed
    pub fn remove(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .write()
            .remove(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remove all expired entries, returning how many were dropped
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn required_key(request: &Request) -> Result<&str> {
    request.key().ok_or_else(|| {
        CacheError::InvalidRequest(format!("{} requires a key", request.command()))
    })
}

fn ttl_duration(ttl_ms: i64) -> Result<Duration> {
    if ttl_ms <= 0 {
        return Err(CacheError::InvalidRequest(format!(
            "time-to-live should be > 0 milliseconds, got {}",
            ttl_ms
        )));
    }
    Ok(Duration::from_millis(ttl_ms as u64))
}
