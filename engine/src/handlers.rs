//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: Terminal conversation loop
//! - ask: One exchange, reply printed
//! - serve: Web chat page
//! - doctor: Validate configuration and check the remote services
//!   (the Spoonacular probe costs quota points; `--offline` skips the probes)
//! - config show: Print the effective configuration

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::{ClassifierOptions, ConversationAgent};
use crate::config::{Config, ServerConfig};
use crate::llm::gemini::GeminiProvider;
use crate::llm::LanguageModel;
use crate::recipes::spoonacular::SpoonacularClient;
use crate::recipes::RecipeLookup;
use crate::secrets::{scrub_secrets, Credentials};
use crate::server::{self, ChatSession, ServerState};
use sdk::BakebotErrorExt;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Shared HTTP client with the configured request timeout
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.core.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Language model and recipe lookup for the configured services
pub fn build_collaborators(
    config: &Config,
    credentials: &Credentials,
) -> Result<(Arc<dyn LanguageModel>, RecipeLookup)> {
    let client = build_http_client(config)?;

    let model: Arc<dyn LanguageModel> = Arc::new(
        GeminiProvider::new(config.llm.clone(), credentials.google_api_key.clone())
            .with_client(client.clone()),
    );

    let source = SpoonacularClient::new(
        config.recipes.clone(),
        credentials.spoonacular_key.clone(),
    )
    .with_client(client);
    let recipes = RecipeLookup::new(Arc::new(source), config.recipes.result_count);

    Ok((model, recipes))
}

/// A fresh agent for one conversation
pub fn build_agent(config: &Config, credentials: &Credentials) -> Result<ConversationAgent> {
    let (model, recipes) = build_collaborators(config, credentials)?;
    Ok(ConversationAgent::new(
        model,
        ClassifierOptions::from(&config.llm),
        recipes,
    ))
}

/// Run the terminal conversation over any line source and sink.
///
/// Stops at end of input or when the user types `exit` or `quit`. Failed
/// turns print an apology and the loop carries on.
pub async fn run_console<R, W>(
    agent: &mut ConversationAgent,
    reader: R,
    mut writer: W,
    show_intent: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        writer.write_all(b"User: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            writer.write_all(b"\n").await?;
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = match agent.handle(input).await {
            Ok(result) => {
                if show_intent {
                    writer
                        .write_all(format!("[intent] {}\n", result.intent).as_bytes())
                        .await?;
                }
                result.reply
            }
            Err(e) => {
                tracing::error!("Turn failed: {}", scrub_secrets(&e.to_string()));
                e.user_hint().to_string()
            }
        };

        writer
            .write_all(format!("Assistant: {}\n\n", reply).as_bytes())
            .await?;
    }

    writer.flush().await?;
    Ok(())
}

/// Interactive terminal chat
pub async fn handle_chat(config: &Config, show_intent: bool) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let mut agent = build_agent(config, &credentials)?;

    println!("Bakebot is ready. Type 'exit' or 'quit' to leave.");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_console(&mut agent, stdin, tokio::io::stdout(), show_intent).await
}

/// One exchange
pub async fn handle_ask(message: String, config: &Config, format: OutputFormat) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let mut agent = build_agent(config, &credentials)?;

    let reply = agent.respond(&message).await;
    if reply.failed {
        tracing::warn!("Reply is an apology for a failed turn");
    }

    match format {
        OutputFormat::Text => println!("{}", reply.reply),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
    }

    Ok(())
}

/// Serve the chat page until ctrl-c
pub async fn handle_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let addr = match bind {
        Some(bind_address) => ServerConfig { bind_address }.socket_addr()?,
        None => config.server.socket_addr()?,
    };

    let credentials = Credentials::from_env()?;
    let agent = build_agent(config, &credentials)?;
    let state = ServerState::new(ChatSession::new(agent));

    println!("Bakebot chat page at http://{}", addr);
    server::serve(addr, state).await?;
    Ok(())
}

/// Outcome of the doctor checks
#[derive(Debug, Default)]
pub struct Diagnosis {
    pub checks: Vec<(&'static str, String)>,
    pub issues: Vec<String>,
}

/// Run the doctor checks.
///
/// Service probes run only when the credentials are present and `offline`
/// is off. The Spoonacular probe is a one-result search and spends quota.
pub async fn diagnose(
    config: &Config,
    credentials: std::result::Result<Credentials, sdk::EngineError>,
    offline: bool,
) -> Result<Diagnosis> {
    let mut checks = Vec::new();
    let mut issues = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration", "Valid".to_string()));
    checks.push(("Model", config.llm.model.clone()));

    let credentials = match credentials {
        Ok(credentials) => {
            checks.push(("Credentials", "Present".to_string()));
            credentials
        }
        Err(e) => {
            checks.push(("Credentials", "Missing".to_string()));
            issues.push(e.to_string());
            return Ok(Diagnosis { checks, issues });
        }
    };

    if offline {
        checks.push(("Gemini", "Skipped (--offline)".to_string()));
        checks.push(("Spoonacular", "Skipped (--offline)".to_string()));
        return Ok(Diagnosis { checks, issues });
    }

    let (model, recipes) = build_collaborators(config, &credentials)?;

    if model.check_health().await {
        checks.push(("Gemini", "Reachable".to_string()));
    } else {
        checks.push(("Gemini", "Not reachable".to_string()));
        issues.push(format!(
            "Gemini did not answer at {} (check GOOGLE_API_KEY and llm.model)",
            config.llm.base_url
        ));
    }

    if recipes.check_health().await {
        checks.push(("Spoonacular", "Reachable (probe used 1 search)".to_string()));
    } else {
        checks.push(("Spoonacular", "Not reachable".to_string()));
        issues.push(format!(
            "Spoonacular did not answer at {} (check SPOONACULAR_KEY and quota)",
            config.recipes.base_url
        ));
    }

    Ok(Diagnosis { checks, issues })
}

/// Validate configuration and credentials, probe both services
pub async fn handle_doctor(config: &Config, offline: bool, format: OutputFormat) -> Result<()> {
    let Diagnosis { checks, issues } = diagnose(config, Credentials::from_env(), offline).await?;

    match format {
        OutputFormat::Text => {
            println!("Bakebot Diagnostics");
            println!("===================");
            println!();
            println!("System Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretString;

    fn credentials() -> Credentials {
        Credentials {
            google_api_key: SecretString::from("g-key"),
            spoonacular_key: SecretString::from("s-key"),
        }
    }

    #[test]
    fn test_build_agent_starts_idle_and_empty() {
        let agent = build_agent(&Config::default(), &credentials()).unwrap();
        assert!(agent.memory().is_empty());
        assert!(!agent.mode().is_contextual());
    }

    #[tokio::test]
    async fn test_console_exits_on_quit_without_calling_model() {
        // Unroutable endpoints: any request would fail the turn
        let mut config = Config::default();
        config.llm.base_url = "http://127.0.0.1:9".to_string();
        let mut agent = build_agent(&config, &credentials()).unwrap();

        let input: &[u8] = b"\n  \nquit\nHello\n";
        let mut output = Vec::new();
        run_console(&mut agent, input, &mut output, false)
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("User: "));
        assert!(!printed.contains("Assistant:"));
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_config_show() {
        assert!(handle_config_show(&Config::default(), OutputFormat::Text).is_ok());
        assert!(handle_config_show(&Config::default(), OutputFormat::Json).is_ok());
    }
}
