//! Genie SDK
//!
//! Shared library providing error and conversation types for Genie components.

/// Error types and handling
pub mod errors;

/// Conversation transcript types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, GenieErrorExt};
pub use types::{Turn, TurnRole};
