//! cachewire Server Binary
//!
//! Starts the TCP server for cachewire.

use std::sync::Arc;

use cachewire::{Config, Engine, Server};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// cachewire Server
#[derive(Parser, Debug)]
#[command(name = "cachewire-server")]
#[command(about = "In-memory cache server speaking the cachewire protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9010")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short = 'c', long, default_value = "1024")]
    max_connections: usize,

    /// Idle read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Maximum payload size in MB
    #[arg(short = 'm', long, default_value = "16")]
    max_payload_mb: u32,

    /// Expired entry sweep interval in milliseconds
    #[arg(short, long, default_value = "1000")]
    eviction_interval_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cachewire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cachewire Server v{}", cachewire::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .max_payload_size(args.max_payload_mb.saturating_mul(1024 * 1024))
        .eviction_interval_ms(args.eviction_interval_ms)
        .build();

    let engine = Arc::new(Engine::new());

    let server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
