//! Simple CLI configuration loader for toolbridge
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Working directory: ./toolbridge.json or ./.toolbridge/config.json
//! 3. User config dir: <config_dir>/toolbridge/config.json
//! 4. Flags and environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolbridge_core::{Backoff, ClientConfig, ConversationIds, RetryOn};
use tracing::debug;

/// Backoff names accepted in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Tool server base URL
    pub server: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub retry_on: Option<RetryOn>,
    pub backoff: Option<BackoffKind>,
    /// Cap for exponential backoff
    pub max_delay_secs: Option<u64>,
    /// Randomize exponential backoff by +/-25%
    pub jitter: Option<bool>,
    pub conversation_ids: Option<ConversationIds>,
    pub require_healthy: Option<bool>,
}

/// CLI configuration loader
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Directory searched for project config (defaults to the current one)
    working_dir: Option<PathBuf>,
    /// Directory holding `toolbridge/config.json` (defaults to the platform config dir)
    user_config_dir: Option<PathBuf>,
    /// Flag overrides
    server_override: Option<String>,
    api_key_override: Option<String>,
    timeout_override: Option<u64>,
    max_attempts_override: Option<u32>,
    retry_delay_override: Option<u64>,
    strict: bool,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Search this directory instead of the current one
    pub fn with_working_dir(mut self, path: PathBuf) -> Self {
        self.working_dir = Some(path);
        self
    }

    /// Look for `toolbridge/config.json` under this directory instead of the platform one
    pub fn with_user_config_dir(mut self, path: PathBuf) -> Self {
        self.user_config_dir = Some(path);
        self
    }

    /// Set server URL override
    pub fn with_server_override(mut self, server: String) -> Self {
        self.server_override = Some(server);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set request timeout override, in seconds
    pub fn with_timeout_override(mut self, secs: u64) -> Self {
        self.timeout_override = Some(secs);
        self
    }

    /// Set max attempts override
    pub fn with_max_attempts_override(mut self, attempts: u32) -> Self {
        self.max_attempts_override = Some(attempts);
        self
    }

    /// Set retry delay override, in seconds
    pub fn with_retry_delay_override(mut self, secs: u64) -> Self {
        self.retry_delay_override = Some(secs);
        self
    }

    /// Require a healthy server before running a command
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ClientConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?.unwrap_or_default()
        };

        // Step 2: Apply flag overrides
        if let Some(server) = &self.server_override {
            config.server = Some(server.clone());
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = self.timeout_override {
            config.timeout_secs = Some(timeout);
        }
        if let Some(attempts) = self.max_attempts_override {
            config.max_attempts = Some(attempts);
        }
        if let Some(delay) = self.retry_delay_override {
            config.retry_delay_secs = Some(delay);
        }
        if self.strict {
            config.require_healthy = Some(true);
        }

        // Step 3: Resolve to final client config
        resolve_config(config, |name| std::env::var(name).ok())
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<RawConfig>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let mut candidates = vec![
            cwd.join("toolbridge.json"),
            cwd.join(".toolbridge").join("config.json"),
        ];
        if let Some(config_dir) = self.user_config_dir.clone().or_else(dirs::config_dir) {
            candidates.push(config_dir.join("toolbridge").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!("Using config file {}", candidate.display());
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Resolve raw config to a validated [`ClientConfig`]
///
/// `env` looks up variables named by `env:VAR` api keys.
fn resolve_config<F>(config: RawConfig, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = config.server.ok_or_else(|| {
        anyhow!("No server configured. Pass --server, set TOOLBRIDGE_SERVER or add \"server\" to toolbridge.json")
    })?;

    let api_key = config.api_key.ok_or_else(|| {
        anyhow!("No API key configured. Pass --key, set TOOLBRIDGE_API_KEY or add \"api_key\" to toolbridge.json")
    })?;

    // Resolve API key (handle env: prefix)
    let api_key = match api_key.strip_prefix("env:") {
        Some(var_name) => env(var_name)
            .ok_or_else(|| anyhow!("Environment variable not found: {}", var_name))?,
        None => api_key,
    };

    let mut resolved = ClientConfig::new(server, api_key);

    if let Some(secs) = config.timeout_secs {
        resolved = resolved.with_timeout(Duration::from_secs(secs));
    }
    if let Some(attempts) = config.max_attempts {
        resolved = resolved.with_max_attempts(attempts);
    }
    if let Some(secs) = config.retry_delay_secs {
        resolved = resolved.with_retry_delay(Duration::from_secs(secs));
    }
    if let Some(retry_on) = config.retry_on {
        resolved = resolved.with_retry_on(retry_on);
    }
    if let Some(BackoffKind::Exponential) = config.backoff {
        let max_delay = config
            .max_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(toolbridge_core::config::DEFAULT_MAX_DELAY);
        resolved = resolved.with_backoff(Backoff::Exponential {
            max_delay,
            jitter: config.jitter.unwrap_or(true),
        });
    }
    if let Some(style) = config.conversation_ids {
        resolved = resolved.with_conversation_ids(style);
    }
    if let Some(required) = config.require_healthy {
        resolved = resolved.with_require_healthy(required);
    }

    resolved
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    Ok(resolved)
}
