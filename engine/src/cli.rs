//! CLI interface for Genie
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines the commands and global flags for talking to the assistant.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Genie, an AI essay brainstorming assistant
///
/// Classifies what you ask for (search, summarize, elaborate or brainstorm),
/// runs the matching prompt against the configured completion service, and
/// keeps the conversation as context for follow-up questions.
#[derive(Parser, Debug)]
#[command(name = "genie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run, `chat` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive brainstorming session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question or request
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        // No subcommand means chat
        let cli = Cli::parse_from(["genie"]);
        assert_eq!(cli.command(), Command::Chat);
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["genie", "--json", "--log", "debug", "chat"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert_eq!(cli.command(), Command::Chat);
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from(["genie", "ask", "Summarize the idea of existentialism"]);
        if let Command::Ask { text } = cli.command() {
            assert_eq!(text, "Summarize the idea of existentialism");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "genie",
            "ask",
            "Search for the Cold War",
            "--config",
            "/tmp/genie.toml",
            "--json",
        ]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/genie.toml")));
    }

    #[test]
    fn test_ask_requires_text() {
        assert!(Cli::try_parse_from(["genie", "ask"]).is_err());
    }
}
