//! Raw TCP echo server
//!
//! No framing is imposed: whatever a read returns is written straight back.

pub mod config;
#[allow(clippy::module_inception)]
pub mod server;

pub use config::ServerConfig;
pub use server::{EchoServer, handle_connection};
