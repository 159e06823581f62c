//! Tool execution commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use thiserror::Error;
use toolbridge_core::{LineRange, ToolParameters};
use tracing::debug;

use super::connect_client;
use crate::config::CliConfigLoader;
use crate::output::print_json;

/// `--params` could not be used as a tool parameter mapping
#[derive(Debug, Error)]
pub enum MalformedInput {
    #[error("Invalid JSON in params argument: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Params must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Instance and conversation ids shared by every tool command
#[derive(Debug, Clone, Default)]
pub struct ToolTarget {
    pub instance_id: Option<String>,
    pub conversation_id: Option<String>,
}

/// Arguments for the `edit` command
#[derive(Debug, Clone)]
pub struct EditArgs {
    pub path: String,
    pub content: Option<String>,
    pub content_file: Option<PathBuf>,
    pub start: i64,
    pub end: i64,
}

/// Parse `--params` into a parameter mapping
pub fn parse_parameters(raw: &str) -> std::result::Result<ToolParameters, MalformedInput> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(MalformedInput::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Execute an arbitrary tool with JSON parameters
pub async fn exec_command(
    config_loader: CliConfigLoader,
    tool: String,
    params: String,
    target: ToolTarget,
) -> Result<()> {
    // Reject bad input before touching the network
    let parameters = parse_parameters(&params)?;
    debug!("Executing tool {} with {} parameters", tool, parameters.len());

    let client = connect_client(&config_loader).await?;
    let result = client
        .execute_tool(
            &tool,
            parameters,
            target.instance_id.as_deref(),
            target.conversation_id.as_deref(),
        )
        .await?;

    print_json(&result)
}

/// Run a shell command remotely
pub async fn bash_command(
    config_loader: CliConfigLoader,
    command: String,
    target: ToolTarget,
) -> Result<()> {
    let client = connect_client(&config_loader).await?;
    let result = client
        .execute_bash(
            &command,
            target.instance_id.as_deref(),
            target.conversation_id.as_deref(),
        )
        .await?;

    print_json(&result)
}

/// Run an IPython cell remotely
pub async fn python_command(
    config_loader: CliConfigLoader,
    code: String,
    target: ToolTarget,
) -> Result<()> {
    let client = connect_client(&config_loader).await?;
    let result = client
        .execute_code_cell(
            &code,
            target.instance_id.as_deref(),
            target.conversation_id.as_deref(),
        )
        .await?;

    print_json(&result)
}

/// Replace a line range of a remote file
pub async fn edit_command(
    config_loader: CliConfigLoader,
    args: EditArgs,
    target: ToolTarget,
) -> Result<()> {
    let range = LineRange::from_raw(args.start, args.end)?;
    let content = read_content(&args).await?;

    let client = connect_client(&config_loader).await?;
    let result = client
        .edit_file(
            &args.path,
            &content,
            range,
            target.instance_id.as_deref(),
            target.conversation_id.as_deref(),
        )
        .await?;

    print_json(&result)
}

async fn read_content(args: &EditArgs) -> Result<String> {
    match (&args.content, &args.content_file) {
        (Some(content), _) => Ok(content.clone()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read content file: {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}
