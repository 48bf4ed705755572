use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error recorded when the server hangs up while a reply is outstanding
pub const PREMATURE_CLOSE: &str = "server closed connection prematurely";

/// Outcome of one client task, emitted as a single JSON line.
///
/// Field names on the wire follow the log format consumed by downstream
/// tooling, hence the renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "client_full_id")]
    pub task_id: String,
    #[serde(rename = "server_ip")]
    pub target_host: String,
    #[serde(rename = "server_port")]
    pub target_port: u16,
    pub messages_sent: u64,
    pub messages_received: u64,
    #[serde(rename = "connection_success")]
    pub connection_established: bool,
    pub total_latency_ms: f64,
    pub errors: Vec<String>,
    pub average_latency_ms: f64,
}

/// Identifier of task `index` under the base `client_id`
pub fn task_id(client_id: &str, index: usize) -> String {
    format!("{client_id}-{index}")
}

impl TaskRecord {
    /// Fresh record with zeroed counters
    pub fn new(task_id: impl Into<String>, target_host: impl Into<String>, target_port: u16) -> Self {
        Self {
            task_id: task_id.into(),
            target_host: target_host.into(),
            target_port,
            messages_sent: 0,
            messages_received: 0,
            connection_established: false,
            total_latency_ms: 0.0,
            errors: Vec::new(),
            average_latency_ms: 0.0,
        }
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn record_sent(&mut self) {
        self.messages_sent += 1;
    }

    /// Counts a reply that arrived `latency` after its request was written
    pub fn record_round_trip(&mut self, latency: Duration) {
        self.total_latency_ms += latency.as_secs_f64() * 1000.0;
        self.messages_received += 1;
    }

    /// Computes the average latency; the record is not touched afterwards
    pub fn finalize(mut self) -> Self {
        self.average_latency_ms = if self.messages_received > 0 {
            self.total_latency_ms / self.messages_received as f64
        } else {
            0.0
        };
        self
    }

    /// Connected, and every message came back without error
    pub fn is_success(&self) -> bool {
        self.connection_established
            && self.errors.is_empty()
            && self.messages_sent == self.messages_received
    }
}
