//! Error types and handling
//!
//! This module provides the error types used throughout the Bakebot engine.
//! All errors implement the `BakebotErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages carried in variants may contain upstream response bodies and
//! are meant for logs. The hints returned by `user_hint()` are static strings
//! that are safe to show in a chat transcript.

use thiserror::Error;

/// Trait for Bakebot error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait BakebotErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is phrased as a chat reply and does not contain:
    /// - Secrets (API keys)
    /// - Upstream response bodies
    /// - Internal implementation details
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors leave the conversation usable: the user can simply
    /// send another message. Non-recoverable errors need operator action
    /// (configuration, credentials) before the next turn can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid config file, missing credentials
/// - **Dialogue**: Intent classification and the recipe tool-call protocol
/// - **Recipes**: Lookup failures
/// - **Collaborators**: Language model and recipe service transport failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{BakebotErrorExt, EngineError};
///
/// let error = EngineError::RecipeNotFound("unicorn_cake".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::MissingCredential("GOOGLE_API_KEY".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    // Dialogue errors
    #[error("Intent classification failed: {0}")]
    Classification(String),

    #[error("Recipe fetch protocol error: {0}")]
    RecipeFetchProtocol(String),

    // Recipe errors
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    // Collaborator errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Recipe provider error: {0}")]
    RecipeProvider(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BakebotErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "I'm not set up correctly yet. Check the config.toml file",
            Self::MissingCredential(_) => {
                "I'm missing an API key. Set GOOGLE_API_KEY and SPOONACULAR_KEY and restart me"
            }

            // Dialogue errors
            Self::Classification(_) => {
                "Sorry, I couldn't quite work out what you meant. Could you say that another way?"
            }
            Self::RecipeFetchProtocol(_) => {
                "Sorry, I got muddled trying to look that recipe up. Could you ask again?"
            }

            // Recipe errors
            Self::RecipeNotFound(_) => {
                "Sorry, I couldn't find a recipe for that. Maybe try another bake or drink?"
            }

            // Collaborator errors
            Self::LLMProvider(_) => {
                "Sorry, I'm having trouble thinking right now. Please try again in a moment"
            }
            Self::RecipeProvider(_) => {
                "Sorry, my recipe book is unavailable right now. Please try again in a moment"
            }

            // Network errors
            Self::Network(_) => "Sorry, I couldn't reach my services. Check the network connection",

            // Generic IO error
            Self::Io(_) => "Sorry, something went wrong on my side",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::MissingCredential(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
