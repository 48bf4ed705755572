use crate::common::env;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

pub const DEFAULT_SERVER_HOST: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_CLIENT_ID: &str = "default_client_pod";
pub const DEFAULT_MESSAGES_PER_TASK: usize = 1;
pub const DEFAULT_CONCURRENT_TASKS: usize = 1;
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_IO_DEADLINE: Duration = Duration::from_secs(60);
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Configuration for a load run
///
/// Built once at startup and shared read-only by every task.
///
/// # Examples
///
/// ```
/// use echoload::client::LoadConfig;
/// use std::time::Duration;
///
/// let config = LoadConfig {
///     server_host: "127.0.0.1".to_string(),
///     concurrent_tasks: 5,
///     messages_per_task: 3,
///     ..Default::default()
/// };
/// assert_eq!(config.dial_timeout, Duration::from_secs(10));
/// assert_eq!(config.io_deadline, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Host to dial
    pub server_host: String,
    /// Port to dial
    pub server_port: u16,
    /// Base for task identifiers; task `i` is `"{client_id}-{i}"`
    pub client_id: String,
    /// Messages each task sends over its connection
    pub messages_per_task: usize,
    /// Number of tasks run concurrently
    pub concurrent_tasks: usize,
    /// Optional text placed at the front of every payload, from
    /// `MESSAGE_PREFIX` or else `MESSAGE`
    pub message_prefix: Option<String>,
    /// Upper bound on establishing the connection
    pub dial_timeout: Duration,
    /// Deadline for all reads and writes, measured from connect
    pub io_deadline: Duration,
    /// Size of the buffer each reply is read into
    pub buffer_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            messages_per_task: DEFAULT_MESSAGES_PER_TASK,
            concurrent_tasks: DEFAULT_CONCURRENT_TASKS,
            message_prefix: None,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            io_deadline: DEFAULT_IO_DEADLINE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl LoadConfig {
    /// Builds the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from the variables returned by `lookup`.
    ///
    /// Unset variables take their defaults; malformed ones are logged and
    /// also take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dial_default = NonZeroU64::new(DEFAULT_DIAL_TIMEOUT.as_secs()).unwrap_or(NonZeroU64::MIN);
        let deadline_default =
            NonZeroU64::new(DEFAULT_IO_DEADLINE.as_secs()).unwrap_or(NonZeroU64::MIN);
        let buffer_default = NonZeroUsize::new(DEFAULT_BUFFER_SIZE).unwrap_or(NonZeroUsize::MIN);

        Self {
            server_host: env::string_or(&lookup, "SERVER_IP", DEFAULT_SERVER_HOST),
            server_port: env::parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT),
            client_id: env::string_or(&lookup, "CLIENT_ID", DEFAULT_CLIENT_ID),
            messages_per_task: env::parse_or(
                &lookup,
                "NUM_MESSAGES_PER_CLIENT",
                DEFAULT_MESSAGES_PER_TASK,
            ),
            concurrent_tasks: env::parse_or(
                &lookup,
                "NUM_CONCURRENT_CLIENTS",
                DEFAULT_CONCURRENT_TASKS,
            ),
            message_prefix: env::optional_string(&lookup, "MESSAGE_PREFIX")
                .or_else(|| env::optional_string(&lookup, "MESSAGE")),
            dial_timeout: Duration::from_secs(
                env::parse_or(&lookup, "DIAL_TIMEOUT_SECS", dial_default).get(),
            ),
            io_deadline: Duration::from_secs(
                env::parse_or(&lookup, "IO_DEADLINE_SECS", deadline_default).get(),
            ),
            buffer_size: env::parse_or(&lookup, "BUFFER_SIZE", buffer_default).get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> LoadConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoadConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.server_host, "localhost");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.client_id, "default_client_pod");
        assert_eq!(config.messages_per_task, 1);
        assert_eq!(config.concurrent_tasks, 1);
        assert_eq!(config.message_prefix, None);
        assert_eq!(config.dial_timeout, Duration::from_secs(10));
        assert_eq!(config.io_deadline, Duration::from_secs(60));
        assert_eq!(config.buffer_size, 1024);
    }

    #[test]
    fn test_all_variables_read() {
        let config = config_from(&[
            ("SERVER_IP", "echo.default.svc"),
            ("SERVER_PORT", "9000"),
            ("CLIENT_ID", "pod-a"),
            ("NUM_MESSAGES_PER_CLIENT", "3"),
            ("NUM_CONCURRENT_CLIENTS", "5"),
            ("MESSAGE", "Hello from client!"),
            ("DIAL_TIMEOUT_SECS", "2"),
            ("IO_DEADLINE_SECS", "15"),
            ("BUFFER_SIZE", "2048"),
        ]);
        assert_eq!(config.server_host, "echo.default.svc");
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.client_id, "pod-a");
        assert_eq!(config.messages_per_task, 3);
        assert_eq!(config.concurrent_tasks, 5);
        assert_eq!(config.message_prefix.as_deref(), Some("Hello from client!"));
        assert_eq!(config.dial_timeout, Duration::from_secs(2));
        assert_eq!(config.io_deadline, Duration::from_secs(15));
        assert_eq!(config.buffer_size, 2048);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let config = config_from(&[
            ("SERVER_PORT", "http"),
            ("NUM_MESSAGES_PER_CLIENT", "three"),
            ("NUM_CONCURRENT_CLIENTS", "-1"),
            ("DIAL_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.messages_per_task, DEFAULT_MESSAGES_PER_TASK);
        assert_eq!(config.concurrent_tasks, DEFAULT_CONCURRENT_TASKS);
        assert_eq!(config.dial_timeout, DEFAULT_DIAL_TIMEOUT);
    }

    #[test]
    fn test_message_prefix_variable() {
        let config = config_from(&[("MESSAGE_PREFIX", "Hi")]);
        assert_eq!(config.message_prefix.as_deref(), Some("Hi"));

        let config = config_from(&[("MESSAGE_PREFIX", "Hi"), ("MESSAGE", "Hello")]);
        assert_eq!(config.message_prefix.as_deref(), Some("Hi"));

        let config = config_from(&[("MESSAGE_PREFIX", ""), ("MESSAGE", "Hello")]);
        assert_eq!(config.message_prefix.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_oversized_deadline_is_accepted() {
        let max = u64::MAX.to_string();
        let config = config_from(&[("IO_DEADLINE_SECS", max.as_str())]);
        assert_eq!(config.io_deadline, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_zero_concurrency_is_allowed() {
        let config = config_from(&[("NUM_CONCURRENT_CLIENTS", "0")]);
        assert_eq!(config.concurrent_tasks, 0);
    }
}
