//! Server health check command

use anyhow::{bail, Result};
use serde_json::{json, Value};
use toolbridge_core::RemoteToolClient;

use crate::config::CliConfigLoader;
use crate::output::print_json;

/// Probe the server and report whether it is healthy
pub async fn health_command(config_loader: CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    let client = RemoteToolClient::new(config)?;

    let healthy = client.check_connection().await;
    print_json(&health_report(healthy))?;

    if !healthy {
        bail!("Server at {} is not healthy", client.config().endpoint);
    }
    Ok(())
}

fn health_report(healthy: bool) -> Value {
    json!({ "healthy": healthy })
}
