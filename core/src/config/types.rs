//! Client configuration types for toolbridge core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of attempts for a tool call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Default cap for exponential backoff
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Which failed attempts are worth another try
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
    /// Every non-200 status and every transport failure is retried
    #[default]
    All,
    /// Client errors (4xx except 408 and 429) fail immediately
    Transient,
}

/// How the wait between attempts evolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Always wait `retry_delay`
    #[default]
    Fixed,
    /// Double the wait after each failure, up to `max_delay`
    Exponential { max_delay: Duration, jitter: bool },
}

/// How a conversation id is synthesized when the caller omits one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationIds {
    /// `conv-<unix seconds>`; calls within the same second share an id
    #[default]
    Timestamp,
    /// `conv-<uuid>`; unique per call
    Random,
}

/// A fully resolved client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the tool server, without trailing `/`
    pub endpoint: String,
    /// Bearer credential sent with every request
    pub api_key: String,
    /// Timeout applied to each individual HTTP call
    pub timeout: Duration,
    /// Upper bound on tries per tool call (at least 1)
    pub max_attempts: u32,
    /// Base pause between attempts
    pub retry_delay: Duration,
    #[serde(default)]
    pub retry_on: RetryOn,
    #[serde(default)]
    pub backoff: Backoff,
    #[serde(default)]
    pub conversation_ids: ConversationIds,
    /// Fail `connect` when the health probe does not succeed
    #[serde(default)]
    pub require_healthy: bool,
}

impl ClientConfig {
    /// Create a config with default timeout and retry settings
    pub fn new<E: Into<String>, K: Into<String>>(endpoint: E, api_key: K) -> Self {
        Self {
            endpoint: normalize_endpoint(&endpoint.into()),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_on: RetryOn::default(),
            backoff: Backoff::default(),
            conversation_ids: ConversationIds::default(),
            require_healthy: false,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the pause between attempts
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Choose which failures are retried
    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    /// Choose the backoff strategy
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Choose how missing conversation ids are generated
    pub fn with_conversation_ids(mut self, conversation_ids: ConversationIds) -> Self {
        self.conversation_ids = conversation_ids;
        self
    }

    /// Require a successful health probe in `connect`
    pub fn with_require_healthy(mut self, require_healthy: bool) -> Self {
        self.require_healthy = require_healthy;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingField {
                field: "endpoint".to_string(),
            });
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: format!("{} (must start with http:// or https://)", self.endpoint),
            });
        }

        if let Err(e) = url::Url::parse(&self.endpoint) {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: format!("{} ({})", self.endpoint, e),
            });
        }

        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_key".to_string(),
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                value: "0 (must be at least 1)".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                value: "0s".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("retry_on", &self.retry_on)
            .field("backoff", &self.backoff)
            .field("conversation_ids", &self.conversation_ids)
            .field("require_healthy", &self.require_healthy)
            .finish()
    }
}

/// Strip trailing `/` separators from an endpoint
pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://localhost:8000", "secret");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.retry_on, RetryOn::All);
        assert_eq!(config.backoff, Backoff::Fixed);
        assert_eq!(config.conversation_ids, ConversationIds::Timestamp);
        assert!(!config.require_healthy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trailing_separators_are_stripped() {
        let config = ClientConfig::new("http://localhost:8000///", "secret");
        assert_eq!(config.endpoint, "http://localhost:8000");

        assert_eq!(normalize_endpoint("https://host/base/"), "https://host/base");
        assert_eq!(normalize_endpoint("https://host"), "https://host");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let missing_scheme = ClientConfig::new("localhost:8000", "secret");
        assert!(matches!(
            missing_scheme.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "endpoint"
        ));

        let empty_key = ClientConfig::new("http://localhost", "");
        assert_eq!(
            empty_key.validate(),
            Err(ConfigError::MissingField {
                field: "api_key".to_string()
            })
        );

        let zero_attempts = ClientConfig::new("http://localhost", "k").with_max_attempts(0);
        assert!(zero_attempts.validate().is_err());

        let zero_timeout = ClientConfig::new("http://localhost", "k").with_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());

        let empty = ClientConfig::new("/", "k");
        assert!(matches!(
            empty.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("http://localhost", "super-secret-token");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
