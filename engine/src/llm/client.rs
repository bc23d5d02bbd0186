//! Completion Client
//!
//! Wraps a single [`CompletionProvider`] with a request timeout and the
//! degraded-service policy: a failed or timed-out call never reaches the
//! caller as an error, it becomes [`SERVICE_UNAVAILABLE_REPLY`].
//!
//! Dropping the future returned by `complete` cancels the in-flight request.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error};

use super::{CompletionProvider, CompletionRequest, LLMError, Message};

/// Reply substituted for any failed completion call
pub const SERVICE_UNAVAILABLE_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my knowledge base right now. Please try again later.";

/// Default timeout for a single completion round-trip
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Best-effort completion client shared by the pipeline stages
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    request_timeout: Duration,
}

impl CompletionClient {
    /// Create a client with the default request timeout
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_timeout(provider, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a specific request timeout
    pub fn with_timeout(provider: Arc<dyn CompletionProvider>, request_timeout: Duration) -> Self {
        Self {
            provider,
            request_timeout,
        }
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one completion request, surfacing failures.
    ///
    /// No retry is attempted. A call exceeding the timeout yields
    /// `LLMError::Timeout`.
    pub async fn try_complete(&self, request: &CompletionRequest) -> super::Result<String> {
        debug!(
            "Completion request: provider={}, model={}, messages={}, chars={}, temperature={}, structured={}",
            self.provider.name(),
            self.provider.model(),
            request.messages.len(),
            request.prompt_chars(),
            request.temperature,
            request.structured
        );

        let start = Instant::now();
        let reply = timeout(self.request_timeout, self.provider.complete(request))
            .await
            .map_err(|_| LLMError::Timeout)??;

        debug!(
            "Completion reply: {} chars in {}ms",
            reply.len(),
            start.elapsed().as_millis()
        );

        Ok(reply)
    }

    /// Send one completion call and return the reply text.
    ///
    /// Never fails: any provider error or timeout is logged and replaced by
    /// [`SERVICE_UNAVAILABLE_REPLY`]. The returned text is not validated,
    /// even in structured mode.
    pub async fn complete(&self, messages: Vec<Message>, temperature: f32, structured: bool) -> String {
        let mut request = CompletionRequest::new(messages, temperature);
        request.structured = structured;

        match self.try_complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    "Error communicating with {}: {}",
                    self.provider.name(),
                    e
                );
                SERVICE_UNAVAILABLE_REPLY.to_string()
            }
        }
    }
}
