//! # toolbridge Core
//!
//! Core library for toolbridge - a client for remote tool execution servers.
//!
//! A [`RemoteToolClient`] sends tool calls (shell commands, code cells, file
//! edits) to a single HTTP endpoint, retries failed attempts within a fixed
//! budget and returns the server's JSON result untouched.
//!
//! ```no_run
//! use toolbridge_core::{ClientConfig, RemoteToolClient};
//!
//! # async fn run() -> toolbridge_core::Result<()> {
//! let client = RemoteToolClient::connect(ClientConfig::new("http://localhost:8000", "key")).await?;
//! let result = client.execute_bash("ls -la", Some("django.14520"), None).await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod client;
pub mod config;
pub mod error;
pub mod tools;

// Re-export commonly used types
pub use client::{RemoteToolClient, RetryPolicy, Transport};
pub use config::{Backoff, ClientConfig, ConversationIds, RetryOn};
pub use error::{ConfigError, Error, Result, ToolError};
pub use tools::{LineEnd, LineRange, ToolParameters, ToolRequest, ToolResponse};

/// Current version of the toolbridge-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing_with_debug(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
