//! Pipeline Orchestrator
//!
//! Runs one conversational turn:
//!
//! 1. Classify the input against the session transcript
//! 2. Record the user's turn (intent and entities cleared while pending)
//! 3. Dispatch the task for the classified intent
//! 4. Format the result
//! 5. Record the intent, entities and assistant turn
//!
//! The pipeline holds no session data. Each call borrows the caller's
//! [`ConversationState`], so one pipeline can serve several sessions.
//! Service faults degrade to text inside the stages; a turn always produces
//! a response.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::formatter::ResponseFormatter;
use crate::intent::{Intent, IntentParser};
use crate::llm::{CompletionClient, CompletionProvider};
use crate::session::ConversationState;
use crate::tasks::TaskDispatcher;

/// What a turn produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    /// Classified intent
    pub intent: Intent,

    /// Extracted entities
    pub entities: Vec<String>,

    /// Formatted reply shown to the user
    pub response: String,
}

/// Intent-driven dispatch pipeline
pub struct Pipeline {
    client: Arc<CompletionClient>,
    parser: IntentParser,
    dispatcher: TaskDispatcher,
    formatter: ResponseFormatter,
}

impl Pipeline {
    /// Build a pipeline whose stages share one completion client
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            parser: IntentParser::new(Arc::clone(&client)),
            dispatcher: TaskDispatcher::new(Arc::clone(&client)),
            formatter: ResponseFormatter::new(),
            client,
        }
    }

    /// Build a pipeline from configuration around an existing provider
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        let client = Arc::new(CompletionClient::with_timeout(
            provider,
            Duration::from_secs(config.llm.request_timeout_secs),
        ));

        Self {
            parser: IntentParser::with_temperature(Arc::clone(&client), config.parser.temperature),
            dispatcher: TaskDispatcher::new(Arc::clone(&client)),
            formatter: ResponseFormatter::new(),
            client,
        }
    }

    /// Name of the completion backend behind every stage
    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Run one turn and return the formatted response.
    pub async fn run_turn(&self, input: &str, state: &mut ConversationState) -> TurnOutcome {
        let parsed = self.parser.parse(input, state.history()).await;
        debug!(
            "Classified input as '{}' with entities {:?}",
            parsed.intent, parsed.entities
        );

        // User turn goes in first; intent is finalized with the reply
        state.update_state(None, Vec::new(), Some(input), None);

        let snapshot = state.snapshot();
        let task_result = self
            .dispatcher
            .execute(&parsed.intent, &parsed.entities, &snapshot)
            .await;

        let response = self.formatter.format(&task_result);

        state.update_state(
            Some(parsed.intent.clone()),
            parsed.entities.clone(),
            None,
            Some(&response),
        );

        TurnOutcome {
            intent: parsed.intent,
            entities: parsed.entities,
            response,
        }
    }
}
