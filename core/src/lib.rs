//! Dockermake Core - Shared Types
//!
//! Error type, result alias and the configuration values shared by the
//! Dockerfile parser and the lint engine.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{LintConfig, RegistryDefinition, RegistryPolicy};
pub use error::{DockermakeError, Result};

/// Dockermake version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
