//! Concurrent load client for the echo server
//!
//! A run fans out a number of independent tasks. Each task dials the server
//! once, exchanges a fixed number of messages one at a time, times each round
//! trip and hands a [`TaskRecord`] to a [`RecordSink`] exactly once.

pub mod config;
pub mod generator;
pub mod record;
pub mod sink;
pub mod task;

pub use config::LoadConfig;
pub use generator::{LoadGenerator, LoadSummary};
pub use record::{PREMATURE_CLOSE, TaskRecord, task_id};
pub use sink::{JsonLineSink, MemorySink, RecordSink, encode_line};
pub use task::{message_payload, run_task};
