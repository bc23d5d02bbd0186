//! Intent Classification
//!
//! A user's message is classified into a closed [`Intent`] plus a list of
//! entity strings. Labels outside the known vocabulary are kept as
//! [`Intent::Unrecognized`] so they are visible in logs instead of silently
//! matching a default branch.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub mod parser;

pub use parser::IntentParser;

/// What the user wants done with the extracted entities
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Overview plus essay angles for a topic
    Search,

    /// Short explanation of a topic
    Summarize,

    /// Key aspects, examples and analysis directions
    Elaborate,

    /// Broad essay ideas
    GeneralBrainstorm,

    /// The classifier could not tell, or classification failed
    Unclear,

    /// A label outside the known vocabulary
    Unrecognized(String),
}

impl Intent {
    /// Map a wire label to an intent. Matching is exact after trimming and
    /// lowercasing; an empty label is `Unclear`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "search" => Intent::Search,
            "summarize" => Intent::Summarize,
            "elaborate" => Intent::Elaborate,
            "general_brainstorm" => Intent::GeneralBrainstorm,
            "unclear" | "" => Intent::Unclear,
            _ => Intent::Unrecognized(label.trim().to_string()),
        }
    }

    /// Wire label for this intent
    pub fn label(&self) -> &str {
        match self {
            Intent::Search => "search",
            Intent::Summarize => "summarize",
            Intent::Elaborate => "elaborate",
            Intent::GeneralBrainstorm => "general_brainstorm",
            Intent::Unclear => "unclear",
            Intent::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Intent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Intent::from_label(&label))
    }
}

/// Classification result handed from the parser to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub intent: Intent,
    pub entities: Vec<String>,
}

impl ParsedIntent {
    pub fn new(intent: Intent, entities: Vec<String>) -> Self {
        Self { intent, entities }
    }

    /// Sentinel returned whenever classification fails
    pub fn unclear() -> Self {
        Self::new(Intent::Unclear, Vec::new())
    }

    /// Decode a structured-mode reply.
    ///
    /// The reply must be a JSON object. A missing or null `intent` is
    /// `Unclear`. `entities` may be missing or null (empty list), an array
    /// (strings kept as-is, other scalars rendered as JSON text, nulls
    /// dropped) or a single string (one-element list).
    ///
    /// # Errors
    /// Returns a description of the structural problem.
    pub fn from_reply(reply: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(reply.trim()).map_err(|e| e.to_string())?;

        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;

        let intent = match object.get("intent") {
            None | Some(serde_json::Value::Null) => Intent::Unclear,
            Some(serde_json::Value::String(label)) => Intent::from_label(label),
            Some(other) => return Err(format!("'intent' must be a string, got {}", other)),
        };

        let entities = match object.get("entities") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::String(single)) => vec![single.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
            Some(other) => return Err(format!("'entities' must be a list, got {}", other)),
        };

        Ok(Self::new(intent, entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_known_vocabulary() {
        assert_eq!(Intent::from_label("search"), Intent::Search);
        assert_eq!(Intent::from_label(" Summarize "), Intent::Summarize);
        assert_eq!(Intent::from_label("ELABORATE"), Intent::Elaborate);
        assert_eq!(
            Intent::from_label("general_brainstorm"),
            Intent::GeneralBrainstorm
        );
        assert_eq!(Intent::from_label("unclear"), Intent::Unclear);
        assert_eq!(Intent::from_label(""), Intent::Unclear);
    }

    #[test]
    fn test_from_label_keeps_unknown_label() {
        assert_eq!(
            Intent::from_label("general brainstorm"),
            Intent::Unrecognized("general brainstorm".to_string())
        );
        assert_eq!(
            Intent::from_label("serch"),
            Intent::Unrecognized("serch".to_string())
        );
    }

    #[test]
    fn test_label_round_trip() {
        for intent in [
            Intent::Search,
            Intent::Summarize,
            Intent::Elaborate,
            Intent::GeneralBrainstorm,
            Intent::Unclear,
        ] {
            assert_eq!(Intent::from_label(intent.label()), intent);
        }
    }

    #[test]
    fn test_intent_serializes_as_label() {
        let parsed = ParsedIntent::new(Intent::GeneralBrainstorm, vec!["history".to_string()]);
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(
            json,
            r#"{"intent":"general_brainstorm","entities":["history"]}"#
        );
    }

    #[test]
    fn test_from_reply_well_formed() {
        let parsed =
            ParsedIntent::from_reply(r#"{"intent": "search", "entities": ["World War II", "causes"]}"#)
                .unwrap();
        assert_eq!(parsed.intent, Intent::Search);
        assert_eq!(parsed.entities, vec!["World War II", "causes"]);
    }

    #[test]
    fn test_from_reply_missing_entities_is_empty() {
        let parsed = ParsedIntent::from_reply(r#"{"intent": "elaborate"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::Elaborate);
        assert!(parsed.entities.is_empty());

        let parsed = ParsedIntent::from_reply(r#"{"intent": "elaborate", "entities": null}"#).unwrap();
        assert!(parsed.entities.is_empty());
    }

    #[test]
    fn test_from_reply_missing_intent_is_unclear() {
        let parsed = ParsedIntent::from_reply(r#"{"entities": ["stuff"]}"#).unwrap();
        assert_eq!(parsed.intent, Intent::Unclear);
        assert_eq!(parsed.entities, vec!["stuff"]);
    }

    #[test]
    fn test_from_reply_lenient_entities() {
        let parsed =
            ParsedIntent::from_reply(r#"{"intent": "summarize", "entities": "existentialism"}"#)
                .unwrap();
        assert_eq!(parsed.entities, vec!["existentialism"]);

        let parsed =
            ParsedIntent::from_reply(r#"{"intent": "search", "entities": ["WW", 2, null, true]}"#)
                .unwrap();
        assert_eq!(parsed.entities, vec!["WW", "2", "true"]);
    }

    #[test]
    fn test_from_reply_rejects_non_objects() {
        assert!(ParsedIntent::from_reply("not json at all").is_err());
        assert!(ParsedIntent::from_reply(r#"["search"]"#).is_err());
        assert!(ParsedIntent::from_reply("").is_err());
        assert!(ParsedIntent::from_reply(r#"{"intent": 7}"#).is_err());
        assert!(ParsedIntent::from_reply(r#"{"intent": "search", "entities": {"a": 1}}"#).is_err());
    }
}
