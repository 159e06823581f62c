//! # toolbridge CLI
//!
//! Command-line interface for toolbridge - run tools on a remote execution server.
//!
//! ## Usage
//!
//! - `toolbridge exec --tool execute_bash --params '{"command": "ls"}'` - Execute any tool
//! - `toolbridge bash "ls -la"` - Run a shell command
//! - `toolbridge python "print(1)"` - Run an IPython cell
//! - `toolbridge edit --path app.py --content-file draft.py` - Edit a file
//! - `toolbridge health` - Check that the server is reachable
//! - `toolbridge --tool execute_bash --params '{"command": "ls"}' [--instance ID]` - Flat
//!   form without a subcommand, same as `exec`
//!
//! Results are printed to stdout as indented JSON; logs go to stderr.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{
    bash_command, edit_command, exec_command, health_command, python_command, EditArgs,
    ToolTarget,
};
use config::CliConfigLoader;

/// toolbridge - run tools on a remote execution server
#[derive(Parser)]
#[command(name = "toolbridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Invoke remote tool execution (shell, code, file edits) over HTTP")]
#[command(long_about = None)]
struct Cli {
    /// Tool server URL
    #[arg(long, env = "TOOLBRIDGE_SERVER", global = true)]
    server: Option<String>,

    /// API key
    #[arg(long, env = "TOOLBRIDGE_API_KEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory searched for toolbridge.json
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum number of attempts per call
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Delay between attempts in seconds
    #[arg(long, global = true)]
    retry_delay: Option<u64>,

    /// Fail when the server does not pass its health check
    #[arg(long, global = true)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tool to execute (flat form, without a subcommand)
    #[arg(long, requires = "params")]
    tool: Option<String>,

    /// Tool parameters as JSON (flat form)
    #[arg(long, requires = "tool")]
    params: Option<String>,

    /// Instance ID (flat form)
    #[arg(long, requires = "tool")]
    instance: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct TargetArgs {
    /// Instance ID (e.g. django.14520)
    #[arg(long)]
    instance: Option<String>,

    /// Conversation ID (generated when omitted)
    #[arg(long)]
    conversation: Option<String>,
}

impl From<TargetArgs> for ToolTarget {
    fn from(args: TargetArgs) -> Self {
        ToolTarget {
            instance_id: args.instance,
            conversation_id: args.conversation,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute any tool with JSON parameters
    Exec {
        /// Tool to execute
        #[arg(long)]
        tool: String,

        /// Tool parameters as JSON
        #[arg(long)]
        params: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run a shell command
    Bash {
        /// Command to execute
        command: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run Python code in an IPython cell
    Python {
        /// Code to execute
        code: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Replace a line range of a file
    Edit {
        /// File path on the instance
        #[arg(long)]
        path: String,

        /// New content
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,

        /// Read new content from a local file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// First line to replace (1-indexed, inclusive)
        #[arg(long, default_value_t = 1)]
        start: i64,

        /// Last line to replace (1-indexed, inclusive, -1 for end of file)
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        end: i64,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Check that the server is reachable
    Health,
}

/// What to run once arguments are parsed
enum Invocation {
    Command(Commands),
    Exec {
        tool: String,
        params: String,
        target: ToolTarget,
    },
}

/// Pick a subcommand or the flat `--tool/--params` form
fn resolve_invocation(
    command: Option<Commands>,
    tool: Option<String>,
    params: Option<String>,
    instance: Option<String>,
) -> Result<Invocation> {
    match (command, tool, params) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
            bail!("--tool/--params cannot be combined with a subcommand; use `exec --tool ... --params ...`")
        }
        (Some(command), None, None) => Ok(Invocation::Command(command)),
        (None, Some(tool), Some(params)) => Ok(Invocation::Exec {
            tool,
            params,
            target: ToolTarget {
                instance_id: instance,
                conversation_id: None,
            },
        }),
        (None, _, _) => bail!("Nothing to do: pass --tool and --params, or a subcommand (see --help)"),
    }
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new().with_strict(cli.strict);

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(working_dir) = &cli.working_dir {
        loader = loader.with_working_dir(working_dir.clone());
    }

    if let Some(server) = &cli.server {
        loader = loader.with_server_override(server.clone());
    }

    if let Some(key) = &cli.key {
        loader = loader.with_api_key_override(key.clone());
    }

    if let Some(timeout) = cli.timeout {
        loader = loader.with_timeout_override(timeout);
    }

    if let Some(attempts) = cli.max_attempts {
        loader = loader.with_max_attempts_override(attempts);
    }

    if let Some(delay) = cli.retry_delay {
        loader = loader.with_retry_delay_override(delay);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    toolbridge_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    let command = match resolve_invocation(cli.command, cli.tool, cli.params, cli.instance)? {
        Invocation::Command(command) => command,
        Invocation::Exec {
            tool,
            params,
            target,
        } => return exec_command(config_loader, tool, params, target).await,
    };

    match command {
        Commands::Exec {
            tool,
            params,
            target,
        } => exec_command(config_loader, tool, params, target.into()).await,
        Commands::Bash { command, target } => {
            bash_command(config_loader, command, target.into()).await
        }
        Commands::Python { code, target } => {
            python_command(config_loader, code, target.into()).await
        }
        Commands::Edit {
            path,
            content,
            content_file,
            start,
            end,
            target,
        } => {
            let args = EditArgs {
                path,
                content,
                content_file,
                start,
                end,
            };
            edit_command(config_loader, args, target.into()).await
        }
        Commands::Health => health_command(config_loader).await,
    }
}
