use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(memento::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(memento::config))]
    Config(String),

    #[error("Store error: {0}")]
    #[diagnostic(code(memento::store))]
    Store(String),

    #[error("Backup error: {0}")]
    #[diagnostic(
        code(memento::backup),
        help("Backups are either the exported JSON file or the base64 text from the backup email")
    )]
    Backup(String),

    #[error("Notification error: {0}")]
    #[diagnostic(code(memento::notification))]
    Notification(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(memento::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(memento::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(memento::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(memento::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type MementoResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}

/// Helper to create backup errors
pub fn backup_error(message: &str) -> Error {
    Error::Backup(message.to_string())
}

/// Helper to create notification errors
pub fn notification_error(message: &str) -> Error {
    Error::Notification(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
