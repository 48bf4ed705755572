use super::{LoadConfig, RecordSink, TaskRecord, record::task_id, task::run_task};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{Instrument, debug, error, info};

/// Aggregate view of a finished run, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Tasks that produced a record
    pub tasks: usize,
    /// Tasks whose dial succeeded
    pub tasks_connected: usize,
    /// Tasks that sent and received every message without error
    pub tasks_succeeded: usize,
    pub messages_sent: u64,
    pub messages_received: u64,
    /// Error strings across all records
    pub errors: usize,
    latency_sum_ms: f64,
    tasks_with_latency: usize,
}

impl LoadSummary {
    /// Folds one task record into the summary
    pub fn observe(&mut self, record: &TaskRecord) {
        self.tasks += 1;
        self.tasks_connected += usize::from(record.connection_established);
        self.tasks_succeeded += usize::from(record.is_success());
        self.messages_sent += record.messages_sent;
        self.messages_received += record.messages_received;
        self.errors += record.errors.len();
        if record.messages_received > 0 {
            self.latency_sum_ms += record.average_latency_ms;
            self.tasks_with_latency += 1;
        }
    }

    /// Combines the summaries of two disjoint sets of tasks
    pub fn merge(&mut self, other: LoadSummary) {
        self.tasks += other.tasks;
        self.tasks_connected += other.tasks_connected;
        self.tasks_succeeded += other.tasks_succeeded;
        self.messages_sent += other.messages_sent;
        self.messages_received += other.messages_received;
        self.errors += other.errors;
        self.latency_sum_ms += other.latency_sum_ms;
        self.tasks_with_latency += other.tasks_with_latency;
    }

    /// Mean of the per-task average latencies, over tasks that got replies
    pub fn mean_latency_ms(&self) -> f64 {
        if self.tasks_with_latency > 0 {
            self.latency_sum_ms / self.tasks_with_latency as f64
        } else {
            0.0
        }
    }

    /// Fraction of sent messages that were answered
    pub fn delivery_rate(&self) -> f64 {
        if self.messages_sent > 0 {
            self.messages_received as f64 / self.messages_sent as f64
        } else {
            0.0
        }
    }
}

/// Fans out the configured number of client tasks and waits for all of them
///
/// # Examples
///
/// ```no_run
/// use echoload::client::{JsonLineSink, LoadConfig, LoadGenerator};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let generator = LoadGenerator::new(LoadConfig::from_env(), Arc::new(JsonLineSink::stdout()));
///     let summary = generator.run().await;
///     eprintln!("{} tasks, {} errors", summary.tasks, summary.errors);
/// }
/// ```
pub struct LoadGenerator {
    config: Arc<LoadConfig>,
    sink: Arc<dyn RecordSink>,
}

impl LoadGenerator {
    pub fn new(config: LoadConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            config: Arc::new(config),
            sink,
        }
    }

    /// Runs every task once and returns when all of them have finished.
    ///
    /// Each task emits its own record as soon as it is done. A task that
    /// panics before emitting does not affect its siblings; its record is
    /// built here instead, carrying the panic as its error. Individual task
    /// failures never make the run itself fail.
    pub async fn run(&self) -> LoadSummary {
        let count = self.config.concurrent_tasks;
        info!(
            target_host = %self.config.server_host,
            target_port = self.config.server_port,
            tasks = count,
            messages_per_task = self.config.messages_per_task,
            "Starting load run"
        );

        let mut handles = Vec::with_capacity(count);
        for index in 0..count {
            let config = Arc::clone(&self.config);
            let sink = Arc::clone(&self.sink);
            let span = tracing::info_span!("task", task_id = %task_id(&config.client_id, index));

            let handle = tokio::spawn(
                async move {
                    let record = run_task(index, &config).await;
                    debug!(
                        sent = record.messages_sent,
                        received = record.messages_received,
                        errors = record.errors.len(),
                        "Task finished"
                    );

                    let mut partial = LoadSummary::default();
                    partial.observe(&record);
                    if let Err(e) = sink.emit(record) {
                        error!(error = %e, "Failed to emit task record");
                    }
                    partial
                }
                .instrument(span),
            );
            handles.push((index, handle));
        }

        let mut summary = LoadSummary::default();
        for (index, handle) in handles {
            match handle.await {
                Ok(partial) => summary.merge(partial),
                Err(e) => {
                    let record = self.aborted_record(index, &e);
                    error!(task_id = %record.task_id, error = %e, "Client task aborted");
                    summary.observe(&record);
                    if let Err(e) = self.sink.emit(record) {
                        error!(error = %e, "Failed to emit task record");
                    }
                }
            }
        }

        info!(
            tasks = summary.tasks,
            connected = summary.tasks_connected,
            succeeded = summary.tasks_succeeded,
            sent = summary.messages_sent,
            received = summary.messages_received,
            errors = summary.errors,
            mean_latency_ms = summary.mean_latency_ms(),
            delivery_rate = summary.delivery_rate(),
            "Load run complete"
        );
        summary
    }

    /// Record for a task that died without emitting its own
    fn aborted_record(&self, index: usize, error: &JoinError) -> TaskRecord {
        let mut record = TaskRecord::new(
            task_id(&self.config.client_id, index),
            self.config.server_host.as_str(),
            self.config.server_port,
        );
        record.record_error(format!("Task aborted: {error}"));
        record.finalize()
    }
}
