// Genie essay brainstorming assistant
// Main entry point for the genie binary

use clap::Parser;

use genie_engine::cli::{Cli, Command};
use genie_engine::config::Config;
use genie_engine::handlers::{handle_ask, handle_chat, startup_error_report, OutputFormat};
use genie_engine::llm::build_provider;
use genie_engine::pipeline::Pipeline;
use genie_engine::secrets::SecretManager;
use genie_engine::session::ConversationState;
use genie_engine::telemetry::init_telemetry_with_level;
use sdk::errors::EngineError;

/// Print the error with its hint and exit; no session can start without it
fn or_exit<T>(result: Result<T, EngineError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}", startup_error_report(&e));
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = or_exit(if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)
    } else {
        Config::load_or_create()
    });

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Genie v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Credentials may live in a .env file next to the working directory
    SecretManager::load_dotenv();
    let secrets = SecretManager::new("genie");
    let provider = or_exit(build_provider(&config.llm, &secrets));

    let pipeline = Pipeline::from_config(provider, &config);
    tracing::info!(
        "Using completion provider '{}' (timeout {}s)",
        pipeline.provider_name(),
        config.llm.request_timeout_secs
    );

    let mut state = ConversationState::with_max_turns(config.session.max_history_turns);

    // Handle commands
    match cli.command() {
        Command::Chat => {
            tracing::info!("Starting chat session");
            handle_chat(&pipeline, &mut state, format).await
        }

        Command::Ask { text } => {
            tracing::info!("Answering single request");
            handle_ask(&text, &pipeline, &mut state, format).await
        }
    }
}
