// Bakebot
// Main entry point for the bakebot binary

use anyhow::Context;
use bakebot_engine::cli::{Cli, Command, ConfigAction};
use bakebot_engine::config::{validate_log_level, Config};
use bakebot_engine::handlers::{
    handle_ask, handle_chat, handle_config_show, handle_doctor, handle_serve, OutputFormat,
};
use bakebot_engine::telemetry::init_telemetry_with_level;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = match &cli.log {
        Some(level) => {
            validate_log_level(level)?;
            level.clone()
        }
        None => config.core.log_level.clone(),
    };
    init_telemetry_with_level(&log_level);

    tracing::info!("Bakebot v{}", env!("CARGO_PKG_VERSION"));

    // Handle commands
    match cli.command {
        Command::Chat { show_intent } => handle_chat(&config, show_intent).await,

        Command::Ask { message } => handle_ask(message, &config, format).await,

        Command::Serve { bind } => handle_serve(&config, bind).await,

        Command::Doctor { offline } => handle_doctor(&config, offline, format).await,

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
        },
    }
}
