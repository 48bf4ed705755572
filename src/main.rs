use color_eyre::eyre::{Result, WrapErr};
use echoload::common::logging;
use echoload::server::{EchoServer, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    logging::init();

    // PORT, BUFFER_SIZE, IDLE_TIMEOUT_SECS
    let config = ServerConfig::from_env();

    info!(
        address = %config.bind_addr(),
        buffer_size = config.buffer_size,
        idle_timeout = ?config.idle_timeout,
        "Starting TCP echo server"
    );

    let server = EchoServer::bind(config)
        .await
        .wrap_err("Failed to start TCP echo server")?;
    server.run().await.wrap_err("TCP echo server failed")?;

    Ok(())
}
