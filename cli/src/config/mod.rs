//! CLI configuration discovery and resolution

pub mod loader;

pub use loader::CliConfigLoader;
