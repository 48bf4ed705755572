use crate::common::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

/// Port used when `PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 8080;
/// Size of the per-connection read buffer
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Configuration for the echo server
///
/// # Examples
///
/// ```
/// use echoload::server::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.port, 8080);
/// assert_eq!(config.buffer_size, 1024);
/// assert!(config.idle_timeout.is_none());
/// assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind on
    pub bind_ip: IpAddr,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
    /// Buffer size for reading/writing data
    pub buffer_size: usize,
    /// Close connections that stay silent this long (None for no timeout)
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            idle_timeout: None,
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `PORT`, `BUFFER_SIZE` and
    /// `IDLE_TIMEOUT_SECS` as returned by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let buffer_default =
            NonZeroUsize::new(DEFAULT_BUFFER_SIZE).unwrap_or(NonZeroUsize::MIN);

        Self {
            port: env::parse_or(&lookup, "PORT", DEFAULT_PORT),
            buffer_size: env::parse_or(&lookup, "BUFFER_SIZE", buffer_default).get(),
            idle_timeout: env::parse_optional::<NonZeroU64, _>(&lookup, "IDLE_TIMEOUT_SECS")
                .map(|secs| Duration::from_secs(secs.get())),
            ..defaults
        }
    }

    /// Socket address the listener binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }
}
