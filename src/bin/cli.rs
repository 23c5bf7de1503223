//! cachewire CLI Client
//!
//! Command-line interface for interacting with a cachewire server.
//! Values are stored as strings through the object codec.

use std::time::Duration;

use cachewire::{Client, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// cachewire CLI
#[derive(Parser, Debug)]
#[command(name = "cachewire-cli")]
#[command(about = "CLI for the cachewire cache server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9010")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Store a value
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Time-to-live in milliseconds
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// Remove a key
    Remove {
        /// The key to remove
        key: String,
    },

    /// Remove every key
    Clear,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.get::<String>(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Put { key, value, ttl } => {
            let status = client.put(&key, &value, ttl.map(Duration::from_millis))?;
            println!("{}", status);
        }
        Commands::Remove { key } => {
            if client.remove(&key)? {
                println!("REMOVED");
            } else {
                println!("(not found)");
            }
        }
        Commands::Clear => {
            client.clear()?;
            println!("CLEARED");
        }
    }

    Ok(())
}
