//! Camera Alert Monitor - Main Entry Point

use api::{init_logging, run_server, MonitorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path =
        std::env::var("CAMERA_ALERT_CONFIG").unwrap_or_else(|_| "camera-alert-monitor".to_string());
    let config = MonitorConfig::load(&config_path)?;
    init_logging(&config.log_level);

    info!("=== Camera Alert Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting speed camera monitoring...");

    run_server(config).await?;

    Ok(())
}
