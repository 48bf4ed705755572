use super::TaskRecord;
use crate::{EchoError, Result};
use std::io::Write;
use std::sync::Mutex;

/// Destination for finished task records
///
/// Implementations are shared by every task of a run and must accept records
/// concurrently. A record is handed over by value exactly once.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: TaskRecord) -> Result<()>;
}

/// Serializes a record as one newline-terminated JSON line
pub fn encode_line(record: &TaskRecord) -> Result<String> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

/// Writes each record as a JSON line to the wrapped writer.
///
/// The whole line is written and flushed under one lock, so lines from
/// tasks finishing at the same moment never interleave.
///
/// # Examples
///
/// ```
/// use echoload::client::{JsonLineSink, RecordSink, TaskRecord};
///
/// let sink = JsonLineSink::new(Vec::new());
/// sink.emit(TaskRecord::new("pod-0", "localhost", 8080)).unwrap();
/// let out = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(out.starts_with(r#"{"client_full_id":"pod-0""#));
/// assert!(out.ends_with('\n'));
/// ```
pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl JsonLineSink<std::io::Stdout> {
    /// Sink for the process's standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> RecordSink for JsonLineSink<W> {
    fn emit(&self, record: TaskRecord) -> Result<()> {
        let line = encode_line(&record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| EchoError::Internal("record writer lock poisoned".to_string()))?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps records in memory, in the order they were emitted
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TaskRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn records(&self) -> Vec<TaskRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: TaskRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| EchoError::Internal("record store lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}
