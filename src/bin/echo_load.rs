use color_eyre::eyre::Result;
use echoload::client::{JsonLineSink, LoadConfig, LoadGenerator};
use echoload::common::logging;
use std::sync::Arc;

/// Runs one load pass against the echo server.
///
/// Result records go to stdout, one JSON object per line; everything else
/// goes to stderr. The exit status does not reflect task outcomes.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();

    let config = LoadConfig::from_env();
    let generator = LoadGenerator::new(config, Arc::new(JsonLineSink::stdout()));
    generator.run().await;

    Ok(())
}
