//! CLI interface for Bakebot
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bakebot, a chat companion for bakes and drinks
///
/// Chats casually, fetches recipes for bakery items and beverages, and walks
/// you through them step by step.
#[derive(Parser, Debug)]
#[command(name = "bakebot")]
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
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat in the terminal until EOF, `exit` or `quit`
    Chat {
        /// Print the classified intent of every message
        #[arg(long)]
        show_intent: bool,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,
    },

    /// Serve the chat page over HTTP
    Serve {
        /// Address to bind (overrides server.bind_address)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Check configuration, credentials and service reachability
    Doctor {
        /// Skip the live service probes (the Spoonacular probe spends quota points)
        #[arg(long)]
        offline: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
}
