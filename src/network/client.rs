//! TCP Client
//!
//! Blocking client speaking the cache protocol over one connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};
use crate::protocol::{Command, ObjectCodec, Request, RequestCodec, Response, ResponseCodec, Status};

/// A connected cache client
///
/// Requests are sent one at a time; each call waits for its response.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    requests: RequestCodec,
    responses: ResponseCodec,
    objects: ObjectCodec,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        tracing::debug!("Connected to {}", stream.peer_addr()?);

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            requests: RequestCodec::new(),
            responses: ResponseCodec::new(),
            objects: ObjectCodec::new(),
        })
    }

    /// Configure socket timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Send a raw request and wait for its response
    pub fn send(&mut self, request: &Request) -> Result<Response> {
        self.requests.write_to(&mut self.writer, request)?;
        let response = self.responses.read_from(&mut self.reader)?;
        tracing::trace!(%request, %response, "round trip");
        Ok(response)
    }

    /// Store `value` under `key`, optionally expiring after `ttl`
    ///
    /// A zero `ttl` is rejected before anything is sent; a sub-millisecond
    /// one is rounded up to 1 ms.
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<Status> {
        let data = self.objects.serialize(value)?;
        let ttl = ttl.map(ttl_millis).transpose()?;

        let response = self.send(&Request::with_key_and_data(Command::Put, key, data, ttl))?;
        match response.status() {
            status @ (Status::Added | Status::Replaced) => Ok(status),
            status => Err(unexpected(Command::Put, status)),
        }
    }

    /// Fetch and deserialize the value stored under `key`
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        let response = self.send(&Request::with_key(Command::Get, key))?;
        match response.status() {
            Status::Gotten => self.objects.deserialize(response.data()),
            Status::NotFound => Ok(None),
            status => Err(unexpected(Command::Get, status)),
        }
    }

    /// Remove `key`, returning whether it was present
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let response = self.send(&Request::with_key(Command::Remove, key))?;
        match response.status() {
            Status::Removed => Ok(true),
            Status::NotFound => Ok(false),
            status => Err(unexpected(Command::Remove, status)),
        }
    }

    /// Remove every key
    pub fn clear(&mut self) -> Result<()> {
        let response = self.send(&Request::empty(Command::Clear))?;
        match response.status() {
            Status::Cleared => Ok(()),
            status => Err(unexpected(Command::Clear, status)),
        }
    }
}

fn ttl_millis(ttl: Duration) -> Result<i64> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidRequest(
            "time-to-live should be > 0".to_string(),
        ));
    }
    Ok(i64::try_from(ttl.as_millis().max(1)).unwrap_or(i64::MAX))
}

fn unexpected(command: Command, status: Status) -> CacheError {
    CacheError::UnexpectedStatus { command, status }
}
