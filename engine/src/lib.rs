//! Bakebot Engine Library
//!
//! This library provides the core functionality of Bakebot.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Credential loading and redaction
pub mod secrets;

/// Telemetry and Observability
pub mod telemetry;

/// Language model abstraction layer
pub mod llm;

/// Recipe search and detail lookup
pub mod recipes;

/// Conversation agent: intent, memory, mode, dispatch
pub mod agent;

/// Web chat server
pub mod server;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
