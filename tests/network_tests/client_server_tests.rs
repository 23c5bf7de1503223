//! Client/Server Tests
//!
//! End-to-end tests over loopback TCP.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cachewire::network::ShutdownHandle;
use cachewire::protocol::{encode_request, Command, Request, Status};
use cachewire::{CacheError, Client, Config, Engine, Result, Server};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u32,
    email: String,
}

/// A server running on an ephemeral port
struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(Config::builder())
    }

    fn start_with(builder: cachewire::config::ConfigBuilder) -> Self {
        let config = builder
            .listen_addr("127.0.0.1:0")
            .read_timeout_ms(2000)
            .eviction_interval_ms(20)
            .build();
        let server = Server::bind(config, Arc::new(Engine::new())).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self {
            addr,
            shutdown,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Client {
        let mut client = Client::connect(self.addr).unwrap();
        client.set_timeouts(2000, 2000).unwrap();
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// =============================================================================
// Typed Client Tests
// =============================================================================

#[test]
fn test_put_get_remove() {
    let server = TestServer::start();
    let mut client = server.client();

    assert_eq!(client.put("greeting", "hello", None).unwrap(), Status::Added);
    assert_eq!(client.get::<String>("greeting").unwrap().as_deref(), Some("hello"));

    assert!(client.remove("greeting").unwrap());
    assert!(!client.remove("greeting").unwrap());
    assert_eq!(client.get::<String>("greeting").unwrap(), None);
}

#[test]
fn test_put_replaces_struct_value() {
    let server = TestServer::start();
    let mut client = server.client();

    let first = Profile { id: 1, email: "a@example.com".to_string() };
    let second = Profile { id: 1, email: "b@example.com".to_string() };

    assert_eq!(client.put("profile:1", &first, None).unwrap(), Status::Added);
    assert_eq!(client.put("profile:1", &second, None).unwrap(), Status::Replaced);
    assert_eq!(client.get::<Profile>("profile:1").unwrap(), Some(second));
}

#[test]
fn test_clear() {
    let server = TestServer::start();
    let mut client = server.client();

    client.put("a", &1u32, None).unwrap();
    client.put("b", &2u32, None).unwrap();
    client.clear().unwrap();

    assert_eq!(client.get::<u32>("a").unwrap(), None);
    assert_eq!(client.get::<u32>("b").unwrap(), None);
}

#[test]
fn test_ttl_expiry_over_the_wire() {
    let server = TestServer::start();
    let mut client = server.client();

    client
        .put("session", "token", Some(Duration::from_millis(50)))
        .unwrap();
    assert!(client.get::<String>("session").unwrap().is_some());

    thread::sleep(Duration::from_millis(150));
    assert_eq!(client.get::<String>("session").unwrap(), None);
}

#[test]
fn test_clients_share_one_cache() {
    let server = TestServer::start();
    let mut writer = server.client();
    let mut reader = server.client();

    writer.put("shared", &vec![1u8, 2, 3], None).unwrap();
    assert_eq!(reader.get::<Vec<u8>>("shared").unwrap(), Some(vec![1, 2, 3]));
}

#[test]
fn test_concurrent_clients() {
    let server = TestServer::start();
    let addr = server.addr;

    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                for i in 0..25 {
                    let key = format!("c{}-{}", t, i);
                    client.put(&key, &i, None).unwrap();
                    assert_eq!(client.get::<i32>(&key).unwrap(), Some(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_zero_ttl_rejected_before_sending() {
    let server = TestServer::start();
    let mut client = server.client();

    let err = client.put("k", "v", Some(Duration::ZERO)).unwrap_err();
    assert!(matches!(err, CacheError::InvalidRequest(_)));

    // Nothing reached the server, so the connection is still usable
    assert_eq!(client.get::<String>("k").unwrap(), None);
    assert_eq!(client.put("k", "v", None).unwrap(), Status::Added);
}

#[test]
fn test_sub_millisecond_ttl_rounds_up() {
    let server = TestServer::start();
    let mut client = server.client();

    let status = client
        .put("k", "v", Some(Duration::from_micros(500)))
        .unwrap();
    assert_eq!(status, Status::Added);

    thread::sleep(Duration::from_millis(20));
    assert_eq!(client.get::<String>("k").unwrap(), None);
}

// =============================================================================
// Raw Protocol Tests
// =============================================================================

#[test]
fn test_send_raw_request() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client
        .send(&Request::with_key_and_data(Command::Put, "raw", vec![7u8], None))
        .unwrap();
    assert_eq!(response.status(), Status::Added);

    let response = client.send(&Request::with_key(Command::Get, "raw")).unwrap();
    assert_eq!(response.status(), Status::Gotten);
    assert_eq!(response.data().as_ref(), &[7]);
}

#[test]
fn test_raw_socket_wire_bytes() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    stream
        .write_all(&encode_request(&Request::empty(Command::Clear)).unwrap())
        .unwrap();

    let mut reply = [0u8; 3];
    stream.read_exact(&mut reply).unwrap();
    assert_eq!(reply, [0x10, 5, 0]);
}

#[test]
fn test_bad_version_closes_connection() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    stream.write_all(&[0x00, 0, 0]).unwrap();

    let mut buf = [0u8; 1];
    let read = stream.read(&mut buf).unwrap_or(0);
    assert_eq!(read, 0);
}

#[test]
fn test_invalid_request_closes_connection() {
    let server = TestServer::start();
    let mut client = server.client();

    // GET without a key can be framed but not executed
    let err = client.send(&Request::empty(Command::Get)).unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));
}

// =============================================================================
// Server Configuration Tests
// =============================================================================

#[test]
fn test_payload_limit_closes_connection() {
    let server = TestServer::start_with(Config::builder().max_payload_size(16));
    let mut client = server.client();

    let err = client.put("big", &vec![0u8; 64], None).unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));
}

#[test]
fn test_idle_connections_do_not_block_new_clients() {
    let server = TestServer::start();

    let idle: Vec<TcpStream> = (0..8)
        .map(|_| TcpStream::connect(server.addr).unwrap())
        .collect();

    let mut client = Client::connect(server.addr).unwrap();
    client.set_timeouts(1000, 1000).unwrap();
    client.clear().unwrap();
    assert_eq!(client.put("k", &1u8, None).unwrap(), Status::Added);

    drop(idle);
}

#[test]
fn test_connections_above_limit_are_closed() {
    let server = TestServer::start_with(Config::builder().max_connections(1));
    let mut first = server.client();
    first.clear().unwrap();

    let mut second = server.client();
    let err = second.clear().unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));

    // The admitted connection keeps working
    first.clear().unwrap();
}

#[test]
fn test_bind_rejects_invalid_config() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .max_connections(0)
        .build();
    let result = Server::bind(config, Arc::new(Engine::new()));
    assert!(matches!(result, Err(CacheError::Config(_))));
}

#[test]
fn test_shutdown_stops_server() {
    let config = Config::builder().listen_addr("127.0.0.1:0").build();
    let server = Server::bind(config, Arc::new(Engine::new())).unwrap();
    let shutdown = server.shutdown_handle();
    let thread = thread::spawn(move || server.run());

    thread::sleep(Duration::from_millis(100));
    shutdown.shutdown();

    assert!(thread.join().unwrap().is_ok());
}

#[test]
fn test_shutdown_closes_idle_connection_without_read_timeout() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .read_timeout_ms(0)
        .build();
    let server = Server::bind(config, Arc::new(Engine::new())).unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let thread = thread::spawn(move || server.run());

    let mut client = Client::connect(addr).unwrap();
    client.set_timeouts(2000, 2000).unwrap();
    client.clear().unwrap();

    shutdown.shutdown();
    assert!(thread.join().unwrap().is_ok());

    // The server side of the idle connection was shut down
    assert!(matches!(client.clear(), Err(CacheError::Io(_))));
}
