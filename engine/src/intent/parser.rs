//! Intent Parser
//!
//! Builds the classification prompt from the rolling transcript and the
//! current input, asks the completion service for a JSON object in
//! structured mode, and decodes it. Any failure yields
//! [`ParsedIntent::unclear`]; no retry is attempted.

use std::sync::Arc;
use tracing::{debug, warn};

use super::ParsedIntent;
use crate::llm::{CompletionClient, Message};
use sdk::types::Turn;

/// Temperature used when none is configured
pub const DEFAULT_PARSER_TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = concat!(
    "You are a highly accurate natural language parser for an AI essay brainstorming assistant. ",
    "Your task is to identify the user's intent and any relevant entities from their query. ",
    "Consider the past conversation history for context, but focus on the current user input for primary intent. ",
    "Respond ONLY with a valid JSON object. ",
    "The JSON object MUST contain 'intent' and 'entities' keys. ",
    "Possible intents include: 'search', 'summarize', 'elaborate', 'general_brainstorm', 'unclear'. ",
    "Entities should be a list of relevant keywords or topics.",
    "\n\nExample Output JSON: {\"intent\": \"search\", \"entities\": [\"World War II\", \"causes\"]}",
    "\nExample Output JSON: {\"intent\": \"elaborate\", \"entities\": [\"Keynesian economics\"]}",
    "\nExample Output JSON: {\"intent\": \"general_brainstorm\", \"entities\": [\"history essay\", \"American Revolution\"]}",
);

/// Classifies user input into an intent and entities
pub struct IntentParser {
    client: Arc<CompletionClient>,
    temperature: f32,
}

impl IntentParser {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self::with_temperature(client, DEFAULT_PARSER_TEMPERATURE)
    }

    pub fn with_temperature(client: Arc<CompletionClient>, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    /// Classify `input`, using `history` as context. Never fails.
    pub async fn parse(&self, input: &str, history: &[Turn]) -> ParsedIntent {
        let messages = build_messages(input, history);
        let reply = self.client.complete(messages, self.temperature, true).await;

        match ParsedIntent::from_reply(&reply) {
            Ok(parsed) => {
                debug!(
                    "Parsed intent '{}' with {} entities",
                    parsed.intent,
                    parsed.entities.len()
                );
                parsed
            }
            Err(e) => {
                warn!(
                    "Completion service returned malformed structured output ({}). Raw response: {}",
                    e, reply
                );
                ParsedIntent::unclear()
            }
        }
    }
}

/// Render the transcript as `role: content` lines
pub fn render_transcript(history: &[Turn]) -> String {
    history
        .iter()
        .map(Turn::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system and user messages for a classification call
pub fn build_messages(input: &str, history: &[Turn]) -> Vec<Message> {
    let transcript = render_transcript(history);

    let mut user_content = format!("Current User Input: \"{}\"", input);
    if !transcript.is_empty() {
        user_content = format!("Conversation History:\n{}\n\n{}", transcript, user_content);
    }

    vec![Message::system(SYSTEM_PROMPT), Message::user(user_content)]
}
