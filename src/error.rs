// src/error.rs

//! Unified error handling for the stock monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page driver failed (session, navigation, element lookup)
    #[error("Driver error: {0}")]
    Driver(String),

    /// An element reference went stale between lookup and interaction
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Retry budget used up
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: Box<AppError> },

    /// Mail delivery failed
    #[error("Mail error: {0}")]
    Mail(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a driver error.
    pub fn driver(message: impl fmt::Display) -> Self {
        Self::Driver(message.to_string())
    }

    /// Create a stale element error.
    pub fn stale(message: impl fmt::Display) -> Self {
        Self::StaleElement(message.to_string())
    }

    /// Create a mail delivery error.
    pub fn mail(message: impl fmt::Display) -> Self {
        Self::Mail(message.to_string())
    }

    /// Whether this error is a stale element reference.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement(_))
    }
}
