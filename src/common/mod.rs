//! Pieces shared by the server, the load client and their binaries
//!
//! Environment parsing, tracing setup, and a helper for running an echo
//! server in the background of tests.

pub mod env;
pub mod logging;
pub mod test_utils;

pub use test_utils::{TestServer, spawn_test_server};
