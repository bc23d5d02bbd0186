//! Error types and handling
//!
//! This module provides the error types used throughout the Genie engine.
//! All errors implement the `GenieErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry credential values. Callers that echo service
//! responses into an error must scrub them first.

use thiserror::Error;

/// Trait for Genie error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait GenieErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain secrets
    /// or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors stop the process before a session starts.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Credentials**: Missing API key, keychain failures
///
/// Completion service failures never reach this type; they degrade to text
/// inside the turn.
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, GenieErrorExt};
///
/// let error = EngineError::KeyringError("locked".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::MissingCredential("GROQ_API_KEY".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Credential errors
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),
}

impl GenieErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::MissingCredential(_) => {
                "Set the API key in your environment or a .env file, then restart"
            }
            Self::KeyringError(_) => {
                "Failed to access secure storage. Unlock the system keychain or set the key in your environment"
            }
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Startup faults: the session refuses to run in a degraded mode
            Self::Config(_) | Self::MissingCredential(_) => false,

            // Keychain may be unlocked and the command retried
            Self::KeyringError(_) => true,
        }
    }
}
