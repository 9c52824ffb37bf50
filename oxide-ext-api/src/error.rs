//! Error types for extension authors

use thiserror::Error;

/// Errors that extension hooks and factories can return
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A service the extension depends on is not registered
    #[error("Missing service: {0}")]
    MissingService(&'static str),

    /// A library the extension depends on is not registered
    #[error("Missing library: {0}")]
    MissingLibrary(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl ExtensionError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a missing-service error naming the requested type
    pub fn missing_service<T: ?Sized>() -> Self {
        Self::MissingService(std::any::type_name::<T>())
    }
}
