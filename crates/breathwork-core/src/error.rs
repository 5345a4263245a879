//! Core error types for breathwork-core.
//!
//! Only session set-up can fail. Once a [`SchedulerState`](crate::pacer::SchedulerState)
//! exists, ticking, stopping and reading it are infallible.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for breathwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session parameter validation errors
    #[error("Session configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Application configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected session start.
///
/// Returned only while building a [`SessionConfig`](crate::session::SessionConfig);
/// no scheduler state is ever created on this path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Pattern id did not resolve through the catalog
    #[error("Unknown breathing pattern '{0}'")]
    UnknownPattern(String),

    /// Total session duration was zero, negative or not a number
    #[error("Session duration must be greater than zero")]
    NonPositiveDuration,

    /// Tick interval was zero, negative or not a number
    #[error("Tick interval must be greater than zero")]
    NonPositiveTickInterval,

    /// Requested cycle count was zero
    #[error("Cycle count must be greater than zero")]
    NoCycles,

    /// User-authored pattern failed validation
    #[error("Invalid pattern '{id}': {message}")]
    InvalidPattern { id: String, message: String },

    /// User-authored pattern reused an existing id
    #[error("Pattern id '{0}' is already defined")]
    DuplicatePattern(String),
}

/// Application configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-separated key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not determine where configuration lives
    #[error("Configuration directory unavailable: {0}")]
    NoConfigDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
