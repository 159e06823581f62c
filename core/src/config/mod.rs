//! Minimal configuration module for toolbridge core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    normalize_endpoint, Backoff, ClientConfig, ConversationIds, RetryOn, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};
