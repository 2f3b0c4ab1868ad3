//! Intent Classifier
//!
//! Labels each user message as casual conversation (`None`), out-of-scope
//! (`Fallback`) or a recipe request (`FetchRecipe`). The model is asked for a
//! small JSON object; when it answers in plain text instead, the literal
//! markers `None` and `Fallback` decide, and anything else is treated as a
//! fetch instruction. A broken JSON answer is an error, never a fetch.

use super::memory::DialogueMemory;
use super::prompts::{intent_schema, INTENT_INSTRUCTION};
use crate::config::LLMConfig;
use crate::llm::{extract_json_object, GenerateRequest, GenerationOptions, LanguageModel, Turn};
use sdk::EngineError;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Classified intent of one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ordinary conversation
    None,

    /// Out of scope: programming, STEM, recipes that are neither bakes nor drinks
    Fallback,

    /// Recipe request; `instruction` is the text handed to the tool-call step
    FetchRecipe { instruction: String },
}

/// Structured classifier answer
#[derive(Debug, Deserialize)]
struct StructuredIntent {
    intent: IntentTag,

    #[serde(default)]
    item: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum IntentTag {
    None,
    Fallback,
    FetchRecipe,
}

impl Intent {
    /// Parse the classifier's answer: structured form first, markers second.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        match Self::parse_structured(text) {
            Some(result) => result,
            None => Self::parse_markers(text),
        }
    }

    /// Parse a `{"intent": ..., "item": ...}` answer.
    ///
    /// Returns `None` when the text is not a structured answer at all. Text
    /// that opens with `{` or names an `"intent"` key but does not deserialize
    /// (cut off at the token cap, stray braces, unknown tag) is a
    /// classification error rather than a fetch instruction.
    pub fn parse_structured(text: &str) -> Option<Result<Self, EngineError>> {
        let parsed = extract_json_object(text)
            .and_then(|json| serde_json::from_str::<StructuredIntent>(json).ok());

        let structured = match parsed {
            Some(structured) => structured,
            None if looks_structured(text) => {
                return Some(Err(EngineError::Classification(format!(
                    "malformed structured intent: {}",
                    text.trim()
                ))));
            }
            None => return None,
        };

        Some(match structured.intent {
            IntentTag::None => Ok(Intent::None),
            IntentTag::Fallback => Ok(Intent::Fallback),
            IntentTag::FetchRecipe => match structured.item.as_deref().map(str::trim) {
                Some(item) if !item.is_empty() => Ok(Intent::FetchRecipe {
                    instruction: format!("Fetch the recipe for {}", item),
                }),
                _ => Err(EngineError::Classification(
                    "fetch_recipe intent without an item".to_string(),
                )),
            },
        })
    }

    /// Parse a plain-text answer by its literal markers.
    ///
    /// `None` wins over `Fallback`; any other non-empty text is passed through
    /// as a fetch instruction.
    pub fn parse_markers(text: &str) -> Result<Self, EngineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Classification(
                "empty classification reply".to_string(),
            ));
        }

        if trimmed.contains("None") {
            Ok(Intent::None)
        } else if trimmed.contains("Fallback") {
            Ok(Intent::Fallback)
        } else {
            Ok(Intent::FetchRecipe {
                instruction: trimmed.to_string(),
            })
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Intent::None => "none",
            Intent::Fallback => "fallback",
            Intent::FetchRecipe { .. } => "fetch_recipe",
        }
    }
}

fn looks_structured(text: &str) -> bool {
    text.trim_start().starts_with('{') || text.contains("\"intent\"")
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::None => write!(f, "None"),
            Intent::Fallback => write!(f, "Fallback"),
            Intent::FetchRecipe { instruction } => write!(f, "{}", instruction),
        }
    }
}

/// Generation options for classification calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl From<&LLMConfig> for ClassifierOptions {
    fn from(config: &LLMConfig) -> Self {
        Self {
            max_output_tokens: config.intent_max_output_tokens,
            temperature: config.intent_temperature,
        }
    }
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self::from(&LLMConfig::default())
    }
}

/// Asks the language model to label the latest user message
#[derive(Clone)]
pub struct IntentClassifier {
    model: Arc<dyn LanguageModel>,
    options: ClassifierOptions,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>, options: ClassifierOptions) -> Self {
        Self { model, options }
    }

    /// Record `text` as a user turn, then classify it.
    ///
    /// The user turn stays in memory even when classification fails. Only that
    /// turn is sent to the model, never the earlier history.
    pub async fn classify(
        &self,
        text: &str,
        memory: &mut DialogueMemory,
    ) -> Result<Intent, EngineError> {
        memory.push(Turn::user(text));

        let latest: Vec<Turn> = memory.last().cloned().into_iter().collect();
        let request = GenerateRequest::new(latest)
            .with_system_instruction(INTENT_INSTRUCTION)
            .with_options(GenerationOptions {
                max_output_tokens: Some(self.options.max_output_tokens),
                temperature: Some(self.options.temperature),
                response_schema: Some(intent_schema()),
            });

        let response = self
            .model
            .generate(&request)
            .await
            .map_err(|e| EngineError::Classification(e.to_string()))?;

        let answer = response.text();
        debug!("Classifier answered {:?}", answer);

        Intent::parse(&answer)
    }
}
