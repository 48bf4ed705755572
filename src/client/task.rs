use super::LoadConfig;
use super::record::{PREMATURE_CLOSE, TaskRecord, task_id};
use std::fmt::Display;
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Instant, timeout, timeout_at},
};
use tracing::debug;

/// Payload for message `seq` (1-based) of task `task_id`
pub fn message_payload(task_id: &str, seq: usize, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{prefix} (from {task_id} - msg {seq})"),
        None => format!("msg {seq} from {task_id}"),
    }
}

/// Runs one simulated client from dial to last reply and returns its record.
///
/// Never fails: dial errors, I/O errors, an early hang-up and deadline expiry
/// all end the conversation and are written into the record's error list.
/// Messages are strictly sequential; message `i + 1` is not written until
/// message `i` has been answered or has failed.
pub async fn run_task(index: usize, config: &LoadConfig) -> TaskRecord {
    let id = task_id(&config.client_id, index);
    let mut record = TaskRecord::new(id, config.server_host.as_str(), config.server_port);

    let target = (config.server_host.as_str(), config.server_port);
    let mut stream = match timeout(config.dial_timeout, TcpStream::connect(target)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return dial_failed(record, e),
        Err(_) => {
            let reason = format!("timed out after {:?}", config.dial_timeout);
            return dial_failed(record, reason);
        }
    };
    record.connection_established = true;

    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "Failed to set TCP_NODELAY");
    }

    let deadline = io_deadline(Instant::now(), config.io_deadline);
    let mut buffer = vec![0u8; config.buffer_size];

    for seq in 1..=config.messages_per_task {
        let payload = message_payload(&record.task_id, seq, config.message_prefix.as_deref());

        let start = Instant::now();
        let written = match timeout_at(deadline, stream.write_all(payload.as_bytes())).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(elapsed) => Err(elapsed.to_string()),
        };
        if let Err(e) = written {
            record.record_error(format!("Error sending message {seq}: {e}"));
            break;
        }
        record.record_sent();

        let read = match timeout_at(deadline, stream.read(&mut buffer)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(elapsed) => Err(elapsed.to_string()),
        };
        match read {
            Ok(0) => {
                record.record_error(PREMATURE_CLOSE);
                break;
            }
            Ok(n) => {
                record.record_round_trip(start.elapsed());
                debug!(seq, size = n, "Received echo");
            }
            Err(e) => {
                record.record_error(format!("Error receiving response for message {seq}: {e}"));
                break;
            }
        }
    }

    record.finalize()
}

/// Roughly 30 years; stands in for deadlines too far out to represent
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Absolute deadline `budget` after `start`, clamped to one the clock can hold
fn io_deadline(start: Instant, budget: Duration) -> Instant {
    start
        .checked_add(budget)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

fn dial_failed(mut record: TaskRecord, reason: impl Display) -> TaskRecord {
    record.record_error(format!("Connection failed: {reason}"));
    record.finalize()
}
