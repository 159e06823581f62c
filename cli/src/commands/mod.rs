//! CLI command implementations

pub mod health;
pub mod tool;

pub use health::health_command;
pub use tool::{bash_command, edit_command, exec_command, python_command, EditArgs, ToolTarget};

use anyhow::Result;
use toolbridge_core::RemoteToolClient;
use tracing::info;

use crate::config::CliConfigLoader;

/// Resolve configuration and build a probed client
async fn connect_client(config_loader: &CliConfigLoader) -> Result<RemoteToolClient> {
    let config = config_loader.load().await?;
    info!("Using tool server: {}", config.endpoint);
    Ok(RemoteToolClient::connect(config).await?)
}
