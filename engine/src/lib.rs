//! Genie Engine Library
//!
//! This library provides the core functionality of the Genie assistant.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Completion service abstraction layer
pub mod llm;

/// Intent classification module
pub mod intent;

/// Per-session conversation state
pub mod session;

/// Intent-to-prompt task dispatch
pub mod tasks;

/// Response presentation
pub mod formatter;

/// Turn orchestration across the pipeline stages
pub mod pipeline;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
