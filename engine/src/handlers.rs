//! Command handlers for CLI operations
//!
//! This module implements the handlers for the CLI commands:
//! - chat: Interactive brainstorming session over stdin/stdout
//! - ask: One turn, printed as text or JSON

use anyhow::{Context, Result};
use sdk::errors::{EngineError, GenieErrorExt};
use std::borrow::Cow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::pipeline::{Pipeline, TurnOutcome};
use crate::session::ConversationState;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

const WELCOME_BANNER: &str = "Welcome to Genie! Your AI essay brainstorming assistant.";
const EXIT_HINT: &str = "Type 'exit' or 'quit' to end the session.";
const GOODBYE: &str = "Genie: Goodbye!";
const RESET_COMMAND: &str = "/reset";

/// Whether a line ends the chat session
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Run an interactive session on the process stdin and stdout
pub async fn handle_chat(
    pipeline: &Pipeline,
    state: &mut ConversationState,
    format: OutputFormat,
) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_chat(pipeline, state, format, stdin, &mut stdout).await
}

/// Chat loop over any line source and sink.
///
/// Lines are passed to the pipeline verbatim, with invalid UTF-8 replaced.
/// `exit`/`quit` and end of input close the session; `/reset` forgets the
/// conversation so far.
pub async fn run_chat<R, W>(
    pipeline: &Pipeline,
    state: &mut ConversationState,
    format: OutputFormat,
    mut reader: R,
    writer: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let text = format == OutputFormat::Text;
    let mut buf = Vec::new();

    if text {
        writer
            .write_all(format!("{}\n{}\n", WELCOME_BANNER, EXIT_HINT).as_bytes())
            .await?;
    }

    loop {
        if text {
            writer.write_all(b"\nYou: ").await?;
        }
        writer.flush().await?;

        let Some(line) = read_line_lossy(&mut reader, &mut buf).await? else {
            debug!("Input closed, ending session");
            if text {
                writer.write_all(format!("\n{}\n", GOODBYE).as_bytes()).await?;
            }
            break;
        };

        if is_exit_command(&line) {
            if text {
                writer.write_all(format!("{}\n", GOODBYE).as_bytes()).await?;
            }
            break;
        }

        if line.trim() == RESET_COMMAND {
            state.clear();
            info!("Session reset");
            if text {
                writer
                    .write_all(b"Genie: Starting a fresh conversation.\n")
                    .await?;
            }
            continue;
        }

        let outcome = pipeline.run_turn(&line, state).await;
        let rendered = render_outcome(&outcome, format)?;
        writer.write_all(rendered.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    Ok(())
}

/// Read one line without its terminator, `None` at end of input
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = reader
        .read_until(b'\n', buf)
        .await
        .context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }

    let line = String::from_utf8_lossy(buf);
    if let Cow::Owned(_) = line {
        warn!("Input line was not valid UTF-8, invalid bytes were replaced");
    }

    Ok(Some(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string()))
}

/// Run one turn against the caller's session and print the result
pub async fn handle_ask(
    text: &str,
    pipeline: &Pipeline,
    state: &mut ConversationState,
    format: OutputFormat,
) -> Result<()> {
    let outcome = pipeline.run_turn(text, state).await;
    println!("{}", render_outcome(&outcome, format)?);
    Ok(())
}

/// Operator-facing report for an error that stops the process before a
/// session starts
pub fn startup_error_report(error: &EngineError) -> String {
    let label = if error.is_recoverable() {
        "Error"
    } else {
        "Fatal"
    };
    format!("{}: {}\nHint: {}", label, error, error.user_hint())
}

fn render_outcome(outcome: &TurnOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("Genie: {}", outcome.response)),
        OutputFormat::Json => {
            serde_json::to_string(outcome).context("Failed to serialize turn outcome")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;
    use crate::llm::testing::ScriptedProvider;
    use crate::llm::CompletionClient;
    use std::sync::Arc;

    fn pipeline_with(provider: &Arc<ScriptedProvider>) -> Pipeline {
        Pipeline::new(Arc::new(CompletionClient::new(Arc::clone(provider) as _)))
    }

    async fn chat(
        provider: &Arc<ScriptedProvider>,
        state: &mut ConversationState,
        format: OutputFormat,
        input: &str,
    ) -> String {
        let pipeline = pipeline_with(provider);
        let mut output = Vec::new();
        run_chat(&pipeline, state, format, input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT \n"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_render_outcome() {
        let outcome = TurnOutcome {
            intent: Intent::Summarize,
            entities: vec!["existentialism".to_string()],
            response: "Here's what I found:\n\nFreedom.".to_string(),
        };

        assert_eq!(
            render_outcome(&outcome, OutputFormat::Text).unwrap(),
            "Genie: Here's what I found:\n\nFreedom."
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_outcome(&outcome, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["intent"], "summarize");
        assert_eq!(json["entities"][0], "existentialism");
    }

    #[tokio::test]
    async fn test_chat_runs_turns_until_exit() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_reply(r#"{"intent": "search", "entities": ["Cold War"]}"#);
        provider.push_reply("Five angles.");
        let mut state = ConversationState::new();

        let output = chat(
            &provider,
            &mut state,
            OutputFormat::Text,
            "Search for the Cold War\nquit\nnever read\n",
        )
        .await;

        assert!(output.starts_with(WELCOME_BANNER));
        assert!(output.contains("Genie: Here's what I found:\n\nFive angles.\n"));
        assert!(output.ends_with("Genie: Goodbye!\n"));
        assert_eq!(provider.call_count(), 2);
        assert_eq!(state.history().len(), 2);
    }

    #[tokio::test]
    async fn test_chat_exit_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut state = ConversationState::new();

        let output = chat(&provider, &mut state, OutputFormat::Text, "EXIT\n").await;

        assert!(output.contains(GOODBYE));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_reset_clears_session() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_reply(r#"{"intent": "summarize", "entities": ["stoicism"]}"#);
        provider.push_reply("Virtue ethics.");
        let mut state = ConversationState::new();

        chat(
            &provider,
            &mut state,
            OutputFormat::Text,
            "Summarize stoicism\n/reset\n",
        )
        .await;

        assert!(state.history().is_empty());
        assert_eq!(state.last_intent, None);
    }

    #[tokio::test]
    async fn test_chat_ends_on_eof() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut state = ConversationState::new();

        let output = chat(&provider, &mut state, OutputFormat::Text, "").await;

        assert!(output.ends_with("Genie: Goodbye!\n"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_survives_invalid_utf8_line() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_reply(r#"{"intent": "unclear", "entities": []}"#);
        provider.push_reply(r#"{"intent": "search", "entities": ["x"]}"#);
        provider.push_reply("Angles on x.");
        let pipeline = pipeline_with(&provider);
        let mut state = ConversationState::new();
        let mut output = Vec::new();

        run_chat(
            &pipeline,
            &mut state,
            OutputFormat::Text,
            &b"caf\xe9 essay\r\nSearch for x\n"[..],
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(provider.call_count(), 3);
        assert_eq!(state.history().len(), 4);
        assert_eq!(state.history()[0].content, "caf\u{FFFD} essay");
        assert_eq!(state.history()[2].content, "Search for x");
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("Genie: Here's what I found:\n\nAngles on x."));
    }

    #[tokio::test]
    async fn test_chat_handles_last_line_without_newline() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_reply(r#"{"intent": "unclear"}"#);
        let mut state = ConversationState::new();

        let output = chat(&provider, &mut state, OutputFormat::Text, "hello").await;

        assert_eq!(state.history()[0].content, "hello");
        assert!(output.ends_with("Genie: Goodbye!\n"));
    }

    #[test]
    fn test_startup_error_report_includes_hint() {
        let report = startup_error_report(&EngineError::MissingCredential(
            "GROQ_API_KEY".to_string(),
        ));
        assert_eq!(
            report,
            "Fatal: Missing credential: GROQ_API_KEY is not set\n\
             Hint: Set the API key in your environment or a .env file, then restart"
        );

        let report = startup_error_report(&EngineError::KeyringError("locked".to_string()));
        assert!(report.starts_with("Error: Keyring error: locked\nHint: "));
    }

    #[tokio::test]
    async fn test_chat_json_emits_one_line_per_turn() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_reply(r#"{"intent": "unclear", "entities": []}"#);
        let mut state = ConversationState::new();

        let output = chat(&provider, &mut state, OutputFormat::Json, "hmm\n").await;

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        let json: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(json["intent"], "unclear");
    }
}
