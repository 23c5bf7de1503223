//! TCP Server
//!
//! Accepts connections and serves each one on its own thread.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel;
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

use super::Connection;

/// How often the accept loop and the eviction ticker check for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cloneable handle that stops a running [`Server`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sockets of live connections, kept so shutdown can unblock their readers
#[derive(Default)]
struct ConnectionRegistry {
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl ConnectionRegistry {
    fn register(&self, stream: &TcpStream) -> Result<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.streams.lock().insert(id, stream.try_clone()?);
        Ok(id)
    }

    fn unregister(&self, id: u64) {
        self.streams.lock().remove(&id);
    }

    fn len(&self) -> usize {
        self.streams.lock().len()
    }

    /// Shut down every registered socket; blocked reads return EOF
    fn close_all(&self) {
        for (_, stream) in self.streams.lock().drain() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// TCP server for cachewire
///
/// The thread calling [`Server::run`] accepts sockets and spawns one handler
/// thread per connection, up to `max_connections` at a time. Connections
/// beyond the cap are closed right after accept. A ticker thread evicts
/// expired entries.
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
    connections: Arc<ConnectionRegistry>,
}

impl Server {
    /// Validate `config` and bind the listen address
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: ShutdownHandle(Arc::new(AtomicBool::new(false))),
            connections: Arc::new(ConnectionRegistry::default()),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Consumes the server: once stopped, the listener is closed with it.
    /// Open connections are shut down and their threads joined before this
    /// returns.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            "Listening on {} (max {} connections)",
            self.local_addr()?,
            self.config.max_connections
        );

        let evictor = {
            let engine = Arc::clone(&self.engine);
            let interval = Duration::from_millis(self.config.eviction_interval_ms);
            let shutdown = self.shutdown.clone();
            thread::Builder::new()
                .name("cachewire-evictor".to_string())
                .spawn(move || eviction_loop(engine, interval, shutdown))?
        };

        let mut handlers = Vec::new();
        let result = self.accept_loop(&mut handlers);

        // Stop the evictor even when the accept loop failed
        self.shutdown();
        self.connections.close_all();
        join_all(handlers);
        join_all(vec![evictor]);

        tracing::info!("Server stopped");
        result
    }

    fn accept_loop(&self, handlers: &mut Vec<JoinHandle<()>>) -> Result<()> {
        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    handlers.retain(|handler| !handler.is_finished());

                    if self.connections.len() >= self.config.max_connections {
                        tracing::warn!("Connection limit reached, dropping {}", addr);
                        continue;
                    }
                    // Accepted sockets may inherit the listener's non-blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Can not configure connection from {}: {}", addr, e);
                        continue;
                    }
                    match self.spawn_handler(stream, addr) {
                        Ok(handler) => {
                            tracing::debug!("Accepted connection from {}", addr);
                            handlers.push(handler);
                        }
                        Err(e) => tracing::warn!("Can not serve {}: {}", addr, e),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }
        Ok(())
    }

    fn spawn_handler(&self, stream: TcpStream, addr: SocketAddr) -> Result<JoinHandle<()>> {
        let id = self.connections.register(&stream)?;
        let connections = Arc::clone(&self.connections);
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("cachewire-conn-{}", id))
            .spawn(move || {
                if let Err(e) = serve(stream, engine, &config) {
                    tracing::debug!("Connection {} closed with error: {}", addr, e);
                }
                connections.unregister(id);
            });

        spawned.map_err(|e| {
            self.connections.unregister(id);
            e.into()
        })
    }
}

fn serve(stream: TcpStream, engine: Arc<Engine>, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, engine, config.max_payload_size)?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.handle()
}

fn eviction_loop(engine: Arc<Engine>, interval: Duration, shutdown: ShutdownHandle) {
    let ticker = channel::tick(interval);
    while !shutdown.is_shutdown() {
        if ticker.recv_timeout(POLL_INTERVAL).is_ok() {
            let evicted = engine.evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, "Evicted expired entries");
            }
        }
    }
}

fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!("Server thread panicked");
        }
    }
}
