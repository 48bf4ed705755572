use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "echoload=info,echo_server=info,echo_load=info";

/// Installs the global tracing subscriber.
///
/// Everything goes to stderr. The load client reserves stdout for result
/// records, so diagnostics must never end up there.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
