//! Runtime error types.

use thiserror::Error;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Registration failed during setup.
    #[error("Registration error: {0}")]
    Registry(#[from] braze_core::RegistryError),

    /// Service API call failed.
    #[error("API error: {0}")]
    Api(#[from] braze_core::ApiError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
