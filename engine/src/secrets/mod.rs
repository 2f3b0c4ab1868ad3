pub mod string;

pub use string::SecretString;

use regex::Regex;
use sdk::errors::EngineError;
use std::sync::OnceLock;

/// Environment variable holding the Gemini API key
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the Spoonacular API key
pub const SPOONACULAR_KEY_VAR: &str = "SPOONACULAR_KEY";

/// API keys for the two remote collaborators.
///
/// Both keys are required before an agent can be built. They are read from
/// the process environment after loading a `.env` file from the working
/// directory, if one exists.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub google_api_key: SecretString,
    pub spoonacular_key: SecretString,
}

impl Credentials {
    /// Load credentials from `.env` and the process environment.
    ///
    /// # Errors
    /// Returns `EngineError::MissingCredential` naming the first absent
    /// (or blank) variable.
    pub fn from_env() -> Result<Self, EngineError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(SecretString::new)
                .ok_or_else(|| EngineError::MissingCredential(key.to_string()))
        };

        let credentials = Self {
            google_api_key: fetch(GOOGLE_API_KEY_VAR)?,
            spoonacular_key: fetch(SPOONACULAR_KEY_VAR)?,
        };

        tracing::debug!("Loaded credentials for Gemini and Spoonacular");
        Ok(credentials)
    }
}

/// Regex patterns for detecting secrets in text that is about to be logged.
/// These are compiled once and reused for performance.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - Google API keys: AIza[0-9A-Za-z-_]{35}
/// - Query-string keys: key=..., apiKey=...
/// - Key headers echoed back in error bodies: x-api-key / x-goog-api-key
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"AIza[0-9A-Za-z\-_]{35}",
            r"(?i)\b(api_?key|key)=[^&\s]+",
            r"(?i)x-(goog-)?api-key:\s*\S+",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Replace anything that looks like an API key with `[REDACTED]`.
pub fn scrub_secrets(text: &str) -> String {
    get_secret_patterns()
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "[REDACTED]").into_owned()
        })
}
