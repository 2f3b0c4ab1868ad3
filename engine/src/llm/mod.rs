//! Language Model Abstraction Layer
//!
//! This module defines the contract between the conversation agent and a hosted
//! language model. A request carries the ordered context turns, an optional
//! system instruction, the tools the model may call and generation options; a
//! response carries the generated content turn, which holds text parts and/or
//! structured function calls. The `LanguageModel` trait lets the agent run
//! against Gemini in production and against scripted fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gemini;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for sdk::EngineError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::NetworkError(msg) => sdk::EngineError::Network(msg),
            LLMError::Timeout => sdk::EngineError::Network("LLM request timed out".to_string()),
            other => sdk::EngineError::LLMProvider(other.to_string()),
        }
    }
}

/// Role of a turn's author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,

    /// Model output (text or function calls)
    Assistant,

    /// Tool result
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// Structured function call emitted by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,

    /// Arguments as a JSON object
    #[serde(default)]
    pub args: serde_json::Value,
}

impl FunctionCall {
    /// Create a new function call
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Get a string argument by key
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(|v| v.as_str())
    }
}

/// Result of a function call, sent back to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// Name of the function that produced the result
    pub name: String,

    /// Result payload as a JSON object
    pub response: serde_json::Value,
}

/// One content part of a turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

/// One unit of dialogue history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    /// Create a turn from a role and parts
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Create a new user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create a new assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![Part::text(text)])
    }

    /// Create a new tool result turn
    pub fn tool_result(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self::new(
            Role::Tool,
            vec![Part::FunctionResponse(FunctionResponse {
                name: name.into(),
                response,
            })],
        )
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All function calls in this turn, in order
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

/// Declaration of a function the model may call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,

    /// Parameter schema (OpenAPI subset, as Gemini expects)
    pub parameters: serde_json::Value,
}

/// Generation options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// When set, the model is asked to answer with JSON matching this schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// A single generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// Ordered context turns
    pub contents: Vec<Turn>,

    pub system_instruction: Option<String>,

    /// Tools the model may call
    pub tools: Vec<FunctionDeclaration>,

    pub options: GenerationOptions,
}

impl GenerateRequest {
    /// Create a request over the given context turns
    pub fn new(contents: Vec<Turn>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Declare a tool
    pub fn with_tool(mut self, tool: FunctionDeclaration) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set generation options
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Response from a language model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    /// Generated content, role is always `Assistant`
    pub content: Turn,
}

impl GenerateResponse {
    /// Wrap generated parts into a response
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            content: Turn::new(Role::Assistant, parts),
        }
    }

    /// Create a text-only response
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Part::text(text)])
    }

    /// Create a response holding a single function call
    pub fn from_function_call(call: FunctionCall) -> Self {
        Self::new(vec![Part::FunctionCall(call)])
    }

    /// Concatenated generated text
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Generated function calls
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content.function_calls()
    }
}

/// Language model trait that all providers must implement
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the name of the provider (e.g., "gemini")
    fn name(&self) -> &str;

    /// Generate content for a request
    ///
    /// # Arguments
    /// * `request` - Context turns, system instruction, tools and options
    ///
    /// # Returns
    /// * `Ok(GenerateResponse)` - Generated text and/or function calls
    /// * `Err(LLMError)` - If the request fails
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// Check if the provider is currently healthy and available
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// Locate a JSON object in model output.
///
/// Handles:
/// 1. Raw JSON: the whole (trimmed) content is an object
/// 2. Fenced JSON (with or without trailing text): ` ```json\n{...}\n``` `
/// 3. An object embedded in prose, found by brace matching
pub fn extract_json_object(content: &str) -> Option<&str> {
    let trimmed = content.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(inner) = extract_fenced_json(trimmed) {
        let inner = inner.trim();
        if inner.starts_with('{') {
            return Some(inner);
        }
    }

    let pos = trimmed.find('{')?;
    extract_balanced_json(&trimmed[pos..])
}

/// Extract the body of the first markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing ```.
/// Returns `None` if no fenced block is found.
fn extract_fenced_json(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

/// Extract a balanced JSON object starting at position 0 of `s`.
///
/// Counts `{` / `}` depth, respecting string literals, to find the
/// matching close brace.
fn extract_balanced_json(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_creation() {
        let user = Turn::user("Hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.text(), "Hello");
        assert!(user.function_calls().is_empty());

        let assistant = Turn::assistant("Hi there");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.text(), "Hi there");

        let tool = Turn::tool_result("fetch_recipe", json!({"result": "{}"}));
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.text(), "");
    }

    #[test]
    fn test_function_call_args() {
        let call = FunctionCall::new("fetch_recipe", json!({"item": "bagel"}));
        assert_eq!(call.arg_str("item"), Some("bagel"));
        assert_eq!(call.arg_str("missing"), None);

        let numeric = FunctionCall::new("fetch_recipe", json!({"item": 3}));
        assert_eq!(numeric.arg_str("item"), None);
    }

    #[test]
    fn test_response_text_and_calls() {
        let response = GenerateResponse::new(vec![
            Part::text("Let me "),
            Part::FunctionCall(FunctionCall::new("fetch_recipe", json!({"item": "scone"}))),
            Part::text("check."),
        ]);
        assert_eq!(response.text(), "Let me check.");
        assert_eq!(response.function_calls().len(), 1);
        assert_eq!(response.content.role, Role::Assistant);
    }

    #[test]
    fn test_request_builder() {
        let request = GenerateRequest::new(vec![Turn::user("hi")])
            .with_system_instruction("be nice")
            .with_options(GenerationOptions {
                max_output_tokens: Some(25),
                temperature: Some(0.2),
                response_schema: None,
            });
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.system_instruction.as_deref(), Some("be nice"));
        assert!(request.tools.is_empty());
        assert_eq!(request.options.max_output_tokens, Some(25));
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn::new(
            Role::Assistant,
            vec![Part::FunctionCall(FunctionCall::new(
                "fetch_recipe",
                json!({"item": "latte"}),
            ))],
        );
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert!(json.contains(r#""type":"function_call""#));
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: sdk::EngineError = LLMError::NetworkError("reset".into()).into();
        assert!(matches!(err, sdk::EngineError::Network(_)));

        let err: sdk::EngineError = LLMError::RateLimitExceeded.into();
        assert!(matches!(err, sdk::EngineError::LLMProvider(_)));
    }

    #[test]
    fn test_extract_json_object_raw() {
        let s = r#"  {"intent": "none"}  "#;
        assert_eq!(extract_json_object(s), Some(r#"{"intent": "none"}"#));
    }

    #[test]
    fn test_extract_json_object_fenced() {
        let s = "```json\n{\"intent\": \"fallback\"}\n```\nThat's my answer.";
        assert_eq!(extract_json_object(s), Some("{\"intent\": \"fallback\"}"));
    }

    #[test]
    fn test_extract_json_object_in_prose() {
        let s = r#"Sure! {"intent": "fetch_recipe", "item": "a {weird} name"} there you go"#;
        assert_eq!(
            extract_json_object(s),
            Some(r#"{"intent": "fetch_recipe", "item": "a {weird} name"}"#)
        );
    }

    #[test]
    fn test_extract_json_object_absent() {
        assert_eq!(extract_json_object("None"), None);
        assert_eq!(extract_json_object("{ unbalanced"), None);
    }
}
