//! Conversation Agent
//!
//! This module implements the per-turn dispatch loop. Every user message goes
//! through the same steps:
//!
//! 1. Record the message and classify it (`IntentClassifier`)
//! 2. Dispatch on the intent:
//!    - `None`: reply from the whole history under the active mode's instruction.
//!      A guided-cooking reply containing `Done` ends the recipe: the agent
//!      returns to casual chat and generates the real reply there.
//!    - `Fallback`: short refusal built only from the latest turn
//!    - `FetchRecipe`: run the `fetch_recipe` tool-call protocol, then
//!      introduce the recipe under the guided-cooking instruction
//! 3. Append the assistant reply to memory
//!
//! The fetch path stages its turns and commits them together with the mode
//! change only after the final reply has been generated, so a failed fetch
//! leaves memory and mode exactly as the classifier left them.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::llm::{FunctionDeclaration, GenerateRequest, GenerateResponse, LanguageModel, Turn};
use crate::recipes::RecipeLookup;
use crate::secrets::scrub_secrets;
use sdk::errors::{BakebotErrorExt, EngineError};
use sdk::ChatReply;

use super::intent::{ClassifierOptions, Intent, IntentClassifier};
use super::memory::DialogueMemory;
use super::mode::Mode;
use super::prompts::{
    fetch_recipe_declaration, DONE_SENTINEL, FALLBACK_INSTRUCTION, FALLBACK_REPLY,
    FETCH_RECIPE_TOOL,
};

/// Outcome of one handled turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    /// How the message was classified
    pub intent: Intent,

    /// Reply shown to the user
    pub reply: String,
}

/// Chat agent owning one conversation's memory and mode
pub struct ConversationAgent {
    /// Language model for replies
    model: Arc<dyn LanguageModel>,

    /// Labels incoming messages
    classifier: IntentClassifier,

    /// Search-then-detail recipe lookup
    recipes: RecipeLookup,

    /// Append-only conversation history
    memory: DialogueMemory,

    mode: Mode,
}

impl ConversationAgent {
    /// Create an agent with empty memory, in `Idle` mode
    pub fn new(
        model: Arc<dyn LanguageModel>,
        classifier_options: ClassifierOptions,
        recipes: RecipeLookup,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(model.clone(), classifier_options),
            model,
            recipes,
            memory: DialogueMemory::new(),
            mode: Mode::Idle,
        }
    }

    pub fn memory(&self) -> &DialogueMemory {
        &self.memory
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// System instruction currently in force
    pub fn active_instruction(&self) -> &'static str {
        self.mode.instruction()
    }

    /// Handle one user message.
    ///
    /// # Errors
    /// - `EngineError::Classification` if the intent cannot be determined
    /// - `EngineError::RecipeFetchProtocol` if the model does not call
    ///   `fetch_recipe` exactly once with an item
    /// - `EngineError::RecipeNotFound` if the lookup has no usable result
    /// - collaborator errors (`LLMProvider`, `RecipeProvider`, `Network`)
    pub async fn handle(&mut self, input: &str) -> Result<TurnResult, EngineError> {
        let intent = self.classifier.classify(input, &mut self.memory).await?;
        info!("Intent: {} (mode: {})", intent.label(), self.mode);

        let reply = match &intent {
            Intent::None => self.chat().await?,
            Intent::Fallback => self.fallback().await,
            Intent::FetchRecipe { instruction } => self.fetch_recipe(instruction).await?,
        };

        debug!(
            "Memory now holds {} turns (~{} tokens)",
            self.memory.len(),
            self.memory.token_count()
        );

        Ok(TurnResult { intent, reply })
    }

    /// Handle one user message, turning any failure into an apology.
    ///
    /// The apology is not recorded in memory.
    pub async fn respond(&mut self, input: &str) -> ChatReply {
        match self.handle(input).await {
            Ok(result) => ChatReply {
                reply: result.reply,
                mode: self.mode.label(),
                failed: false,
            },
            Err(e) => {
                error!("Turn failed: {}", scrub_secrets(&e.to_string()));
                ChatReply {
                    reply: e.user_hint().to_string(),
                    mode: self.mode.label(),
                    failed: true,
                }
            }
        }
    }

    /// `None` intent: reply from the whole history.
    async fn chat(&mut self) -> Result<String, EngineError> {
        let contents = self.memory.turns().to_vec();
        let reply = self
            .generate_text(contents.clone(), self.mode.instruction(), Vec::new())
            .await?;

        let reply = if self.mode.is_contextual() && reply.contains(DONE_SENTINEL) {
            info!("Recipe finished, returning to casual chat");
            let casual = self
                .generate_text(contents, Mode::Idle.instruction(), Vec::new())
                .await?;
            self.mode = Mode::Idle;
            casual
        } else {
            reply
        };

        self.memory.push(Turn::assistant(reply.clone()));
        Ok(reply)
    }

    /// `Fallback` intent: refuse, based on the latest turn only.
    async fn fallback(&mut self) -> String {
        let latest: Vec<Turn> = self.memory.last().cloned().into_iter().collect();

        let reply = match self
            .generate_text(latest, FALLBACK_INSTRUCTION, Vec::new())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "Fallback generation failed, using fixed refusal: {}",
                    scrub_secrets(&e.to_string())
                );
                FALLBACK_REPLY.to_string()
            }
        };

        self.memory.push(Turn::assistant(reply.clone()));
        reply
    }

    /// `FetchRecipe` intent: the `fetch_recipe` tool-call protocol.
    async fn fetch_recipe(&mut self, instruction: &str) -> Result<String, EngineError> {
        let instruction_turn = Turn::user(instruction);

        let request = GenerateRequest::new(vec![instruction_turn.clone()])
            .with_tool(fetch_recipe_declaration());
        let response = self.model.generate(&request).await?;
        let item = requested_item(&response)?;

        info!("Fetching recipe for '{}'", item);
        let document = self.recipes.fetch(&item).await?;

        let mut staged = vec![
            instruction_turn,
            response.content,
            Turn::tool_result(FETCH_RECIPE_TOOL, document.to_tool_response()),
        ];

        let next_mode = Mode::Contextual;
        let mut contents = self.memory.turns().to_vec();
        contents.extend(staged.iter().cloned());

        let reply = self
            .generate_text(
                contents,
                next_mode.instruction(),
                vec![fetch_recipe_declaration()],
            )
            .await?;

        staged.push(Turn::assistant(reply.clone()));
        self.memory.extend(staged);

        if self.mode != next_mode {
            info!("Mode: {} -> {}", self.mode, next_mode);
        }
        self.mode = next_mode;

        Ok(reply)
    }

    /// Generate a text reply; an empty reply is an error.
    async fn generate_text(
        &self,
        contents: Vec<Turn>,
        instruction: &str,
        tools: Vec<FunctionDeclaration>,
    ) -> Result<String, EngineError> {
        let mut request = GenerateRequest::new(contents).with_system_instruction(instruction);
        request.tools = tools;

        let response = self.model.generate(&request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(EngineError::LLMProvider(
                "model returned an empty reply".to_string(),
            ));
        }

        Ok(text)
    }
}

/// The item named by the model's single `fetch_recipe` call
fn requested_item(response: &GenerateResponse) -> Result<String, EngineError> {
    let calls = response.function_calls();

    let call = match calls.as_slice() {
        [call] => *call,
        [] => {
            return Err(EngineError::RecipeFetchProtocol(
                "model did not call fetch_recipe".to_string(),
            ))
        }
        many => {
            return Err(EngineError::RecipeFetchProtocol(format!(
                "expected one function call, got {}",
                many.len()
            )))
        }
    };

    if call.name != FETCH_RECIPE_TOOL {
        return Err(EngineError::RecipeFetchProtocol(format!(
            "unexpected function call '{}'",
            call.name
        )));
    }

    call.arg_str("item")
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            EngineError::RecipeFetchProtocol("fetch_recipe called without an item".to_string())
        })
}
