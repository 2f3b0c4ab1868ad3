//! Recipe Lookup
//!
//! Maps an item name to a full recipe document through a two-step protocol
//! against a recipe search service: a free-text search whose first hit
//! supplies an identifier, then a detail request for that identifier. There is
//! no caching and no retry; failures surface to the caller, which turns them
//! into an apology.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub mod spoonacular;

/// Result type for recipe operations
pub type Result<T> = std::result::Result<T, RecipeError>;

/// Errors that can occur during recipe lookups
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("No recipe found for '{0}'")]
    NotFound(String),

    #[error("Recipe service unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Quota or rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<RecipeError> for sdk::EngineError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::NotFound(item) => sdk::EngineError::RecipeNotFound(item),
            RecipeError::NetworkError(msg) => sdk::EngineError::Network(msg),
            other => sdk::EngineError::RecipeProvider(other.to_string()),
        }
    }
}

/// One search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeSummary {
    pub id: u64,

    #[serde(default)]
    pub title: String,
}

/// Full recipe detail, kept verbatim.
///
/// The body is guaranteed to be well-formed JSON but is otherwise opaque: it
/// is handed to the language model as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDocument {
    body: String,
}

impl RecipeDocument {
    /// Wrap a detail response body, rejecting anything that isn't JSON
    pub fn from_json_text(body: impl Into<String>) -> Result<Self> {
        let body = body.into();
        serde_json::from_str::<serde_json::Value>(&body)
            .map_err(|e| RecipeError::ParseError(format!("Recipe detail is not JSON: {}", e)))?;
        Ok(Self { body })
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Payload for the tool-result turn
    pub fn to_tool_response(&self) -> serde_json::Value {
        serde_json::json!({ "result": self.body })
    }
}

/// A recipe search service
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Returns the name of the service (e.g., "spoonacular")
    fn name(&self) -> &str;

    /// Search recipes by free-text query, best match first
    async fn search(&self, query: &str, number: u32) -> Result<Vec<RecipeSummary>>;

    /// Fetch full recipe detail by identifier
    async fn information(&self, id: u64) -> Result<RecipeDocument>;

    /// Check if the service is currently reachable with our credentials
    async fn check_health(&self) -> bool {
        true
    }
}

/// Turn a classifier-style item name (`sourdough_bread`) into a search query.
pub fn normalize_item(item: &str) -> String {
    item.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search-then-detail lookup over a `RecipeSource`
#[derive(Clone)]
pub struct RecipeLookup {
    source: Arc<dyn RecipeSource>,
    result_count: u32,
}

impl RecipeLookup {
    pub fn new(source: Arc<dyn RecipeSource>, result_count: u32) -> Self {
        Self {
            source,
            result_count: result_count.max(1),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn check_health(&self) -> bool {
        self.source.check_health().await
    }

    /// Fetch the recipe document for an item.
    ///
    /// # Errors
    /// - `RecipeError::NotFound` if the search has no hits or the detail
    ///   request for the first hit fails
    /// - other variants if the search itself fails
    pub async fn fetch(&self, item: &str) -> Result<RecipeDocument> {
        let query = normalize_item(item);
        if query.is_empty() {
            return Err(RecipeError::NotFound(item.to_string()));
        }

        let results = self.source.search(&query, self.result_count).await?;
        let first = results
            .first()
            .ok_or_else(|| RecipeError::NotFound(query.clone()))?;

        debug!(
            "Search for '{}' returned {} result(s), using {} ({})",
            query,
            results.len(),
            first.id,
            first.title
        );

        let document = self.source.information(first.id).await.map_err(|e| {
            RecipeError::NotFound(format!("{} (detail lookup for {} failed: {})", query, first.id, e))
        })?;

        info!("Fetched recipe {} for '{}'", first.id, query);
        Ok(document)
    }
}
