use std::net::SocketAddr;
use thiserror::Error;

/// Error types for the echoload library
#[derive(Error, Debug)]
pub enum EchoError {
    /// The server could not bind its listening socket
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Reading from a connection failed
    #[error("Read error: {0}")]
    Read(std::io::Error),

    /// Writing to a connection failed
    #[error("Write error: {0}")]
    Write(std::io::Error),

    /// Any other socket or stream error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A result record could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Poisoned locks, failed joins and other faults outside any I/O
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for the echoload library
pub type Result<T> = std::result::Result<T, EchoError>;

pub mod client;
pub mod common;
pub mod server;

// Re-export main types for convenience
pub use client::{
    JsonLineSink, LoadConfig, LoadGenerator, LoadSummary, MemorySink, RecordSink, TaskRecord,
};
pub use server::{EchoServer, ServerConfig};
