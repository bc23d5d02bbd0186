//! Task Dispatcher
//!
//! Maps a classified [`Intent`] to one prompt template, renders it with the
//! comma-joined entity list, and makes exactly one free-text completion call.
//! Intents without a template get [`UNRECOGNIZED_INTENT_REPLY`] and no call.

use std::sync::Arc;
use tracing::debug;

use crate::intent::Intent;
use crate::llm::{CompletionClient, Message};
use crate::session::ConversationState;

/// Reply for intents the dispatcher has no template for
pub const UNRECOGNIZED_INTENT_REPLY: &str = "I'm not sure how to help with that specific request. Can you rephrase or ask for something like 'search', 'summarize', or 'elaborate', or 'general brainstorm'?";

/// Topic used by the brainstorm template when no entities were extracted
const GENERAL_TOPIC: &str = "a general essay topic";

/// A prompt template and the temperature it is sampled at
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    render: fn(&str) -> String,
    pub temperature: f32,
}

impl TaskTemplate {
    /// Render the prompt for a topic string
    pub fn render(&self, topic: &str) -> String {
        (self.render)(topic)
    }
}

fn search_prompt(topic: &str) -> String {
    format!(
        "You are an AI assistant helping students brainstorm. \
         Provide a brief overview and 3-5 potential essay angles/questions related to '{}'. \
         Focus on historical, social, or thematic perspectives if applicable.",
        topic
    )
}

const SEARCH: TaskTemplate = TaskTemplate {
    render: search_prompt,
    temperature: 0.7,
};

fn summarize_prompt(topic: &str) -> String {
    format!(
        "You are an academic summarizer for college students. \
         Briefly explain '{}' in 2-3 sentences, highlighting its core concept.",
        topic
    )
}

const SUMMARIZE: TaskTemplate = TaskTemplate {
    render: summarize_prompt,
    temperature: 0.4,
};

fn elaborate_prompt(concept: &str) -> String {
    format!(
        "You are an expert academic tutor. Elaborate on the concept of '{}'. \
         Provide 2-3 key aspects, relevant examples, or potential areas for deeper analysis in an essay. \
         Assume the student needs detailed insights for their paper.",
        concept
    )
}

const ELABORATE: TaskTemplate = TaskTemplate {
    render: elaborate_prompt,
    temperature: 0.6,
};

fn brainstorm_prompt(topic: &str) -> String {
    format!(
        "You are a creative essay brainstorming assistant. \
         Suggest 3-5 broad essay ideas or approaches for a student working on '{}'. \
         Think about different disciplines or angles.",
        topic
    )
}

const GENERAL_BRAINSTORM: TaskTemplate = TaskTemplate {
    render: brainstorm_prompt,
    temperature: 0.8,
};

/// Template for an intent, `None` when the intent is not actionable
pub fn template_for(intent: &Intent) -> Option<TaskTemplate> {
    match intent {
        Intent::Search => Some(SEARCH),
        Intent::Summarize => Some(SUMMARIZE),
        Intent::Elaborate => Some(ELABORATE),
        Intent::GeneralBrainstorm => Some(GENERAL_BRAINSTORM),
        Intent::Unclear | Intent::Unrecognized(_) => None,
    }
}

/// Join entities into the topic string a template is rendered with
pub fn topic_for(intent: &Intent, entities: &[String]) -> String {
    if entities.is_empty() && *intent == Intent::GeneralBrainstorm {
        GENERAL_TOPIC.to_string()
    } else {
        entities.join(", ")
    }
}

/// Executes the task selected by a classified intent
pub struct TaskDispatcher {
    client: Arc<CompletionClient>,
}

impl TaskDispatcher {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self { client }
    }

    /// Run the task for `intent` and return the raw result text.
    ///
    /// `_state` is the session snapshot taken after the user's turn was
    /// recorded; current templates do not read it.
    pub async fn execute(
        &self,
        intent: &Intent,
        entities: &[String],
        _state: &ConversationState,
    ) -> String {
        let Some(template) = template_for(intent) else {
            debug!("No task for intent '{}', asking the user to rephrase", intent);
            return UNRECOGNIZED_INTENT_REPLY.to_string();
        };

        let topic = topic_for(intent, entities);
        debug!("Executing '{}' task for topic '{}'", intent, topic);

        let prompt = template.render(&topic);
        self.client
            .complete(vec![Message::user(prompt)], template.temperature, false)
            .await
    }
}
