//! Unified error types for the braze core.
//!
//! Registration-time errors fail fast and are returned to the caller;
//! handler-body errors are wrapped in [`HandlerError`] and delivered to the
//! error channel by the dispatch engine, never propagated past it.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors that can occur when calling the outbound API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote service rejected the request.
    #[error("api request failed: {status_code}: {message}")]
    Request {
        /// Service status code.
        status_code: i64,
        /// Service-provided message.
        message: String,
    },

    /// The client is not connected or authenticated.
    #[error("client not connected")]
    NotConnected,

    /// The notification has no thread to send into.
    #[error("notification has no originating thread")]
    NoThread,

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for outbound API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors raised synchronously at registration time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A command name or alias collides with an existing key.
    ///
    /// Names and aliases share one key space: a name may not equal another
    /// command's alias and vice versa.
    #[error("command key '{key}' is already registered")]
    DuplicateKey {
        /// The colliding name or alias.
        key: String,
    },

    /// The handler's declared parameter shape is not allowed for the
    /// category or command it was registered against.
    #[error("invalid handler signature for {category}: {reason}")]
    InvalidSignature {
        /// The event category or command the handler targeted.
        category: &'static str,
        /// Why the shape was rejected.
        reason: &'static str,
    },
}

/// Result type for registration operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

// =============================================================================
// Handler Errors
// =============================================================================

/// Wraps an error raised inside a command, event, or task handler body.
///
/// Carries the identity of the failing handler so error callbacks can tell
/// which registration produced it. The original error is preserved as the
/// source.
#[derive(Debug)]
pub struct HandlerError {
    /// Identity of the handler that failed, e.g. `command:ping` or
    /// `event:member_join[0]`.
    pub origin: String,
    /// The error the handler body returned.
    pub source: anyhow::Error,
}

impl HandlerError {
    /// Wraps a handler-body error with the originating handler's identity.
    pub fn new(origin: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            origin: origin.into(),
            source,
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handler '{}' failed: {}", self.origin, self.source)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
