//! Completion Backend Abstraction Layer
//!
//! This module provides a common interface for text-completion services
//! (Groq, OpenAI, Ollama). The `CompletionProvider` trait is the fallible,
//! vendor-specific seam; [`client::CompletionClient`] wraps one provider with
//! a request timeout and the degraded-service fallback the pipeline relies on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::LLMConfig;
use crate::secrets::SecretManager;
use sdk::errors::EngineError;

pub mod client;
pub mod ollama;
pub mod openai;

#[cfg(test)]
pub mod testing;

pub use client::{CompletionClient, SERVICE_UNAVAILABLE_REPLY};

/// Result type for completion operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during completion calls
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Message sent to a completion service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message
    User,

    /// Assistant message
    Assistant,

    /// System message
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// One completion call: ordered messages plus sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Ordered, role-tagged messages
    pub messages: Vec<Message>,

    /// Sampling temperature
    pub temperature: f32,

    /// Ask the service to constrain its reply to a single JSON object
    pub structured: bool,
}

impl CompletionRequest {
    /// Create a free-text request
    pub fn new(messages: Vec<Message>, temperature: f32) -> Self {
        Self {
            messages,
            temperature,
            structured: false,
        }
    }

    /// Switch the request to structured (JSON object) output
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    /// Total characters across all message bodies
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.len()).sum()
    }
}

/// Completion provider trait that all backends implement
///
/// Structured mode is a contract with the service; providers forward it and
/// do not validate the returned text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "groq", "openai", "ollama")
    fn name(&self) -> &str;

    /// Returns the model the provider sends requests to
    fn model(&self) -> &str;

    /// Send the request and return the top choice's text content
    ///
    /// # Returns
    /// * `Ok(String)` - Reply text, empty when the service returned no content
    /// * `Err(LLMError)` - If the request fails
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Build the provider selected by `config.provider`.
///
/// # Errors
/// Returns `EngineError::MissingCredential` when a hosted backend's API key
/// cannot be resolved, and `EngineError::Config` for an unknown provider.
pub fn build_provider(
    config: &LLMConfig,
    secrets: &SecretManager,
) -> std::result::Result<Arc<dyn CompletionProvider>, EngineError> {
    match config.provider.as_str() {
        "groq" => {
            let key = secrets.resolve(&config.groq.api_key_env)?;
            Ok(Arc::new(openai::OpenAICompatibleProvider::new(
                "groq",
                &config.groq.base_url,
                &config.groq.model,
                key,
            )))
        }
        "openai" => {
            let key = secrets.resolve(&config.openai.api_key_env)?;
            Ok(Arc::new(openai::OpenAICompatibleProvider::new(
                "openai",
                &config.openai.base_url,
                &config.openai.model,
                key,
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            &config.ollama.base_url,
            &config.ollama.model,
        ))),
        other => Err(EngineError::Config(format!(
            "Unknown completion provider '{}'",
            other
        ))),
    }
}
