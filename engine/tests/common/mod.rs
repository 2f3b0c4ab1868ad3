//! Shared fixtures for integration tests: mock Gemini and Spoonacular payloads
#![allow(dead_code)]

use bakebot_engine::agent::ConversationAgent;
use bakebot_engine::config::Config;
use bakebot_engine::handlers::build_agent;
use bakebot_engine::secrets::{Credentials, SecretString};
use serde_json::{json, Value};
use wiremock::{Match, Request};

pub const GOOGLE_KEY: &str = "test-google-key";
pub const SPOONACULAR_KEY: &str = "test-spoonacular-key";

pub const GEMINI_PATH: &str = "/models/gemini-2.0-flash-001:generateContent";

/// Which step of a turn a Gemini request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Intent classification (carries a response schema)
    Classify,
    /// First tool-call request (tool declared, no result yet)
    ToolCall,
    /// Reply after a fetched recipe (carries a function response)
    RecipeReply,
    /// Plain reply: casual, guided or fallback
    Chat,
}

pub fn kind_of(body: &Value) -> Kind {
    if body["generationConfig"]["responseSchema"].is_object() {
        return Kind::Classify;
    }

    let has_function_response = body["contents"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|content| content["parts"].as_array().into_iter().flatten())
        .any(|part| part.get("functionResponse").is_some());

    if has_function_response {
        Kind::RecipeReply
    } else if body["tools"].is_array() {
        Kind::ToolCall
    } else {
        Kind::Chat
    }
}

/// Matches Gemini requests of one kind
pub struct GeminiKind(pub Kind);

impl Match for GeminiKind {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| kind_of(&body) == self.0)
            .unwrap_or(false)
    }
}

/// Gemini response with one text part
pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// Gemini response with one function call
pub fn gemini_call(name: &str, args: Value) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"functionCall": {"name": name, "args": args}}]
            },
            "finishReason": "STOP"
        }]
    })
}

pub fn search_results(hits: &[(u64, &str)]) -> Value {
    let results: Vec<Value> = hits
        .iter()
        .map(|(id, title)| json!({"id": id, "title": title, "imageType": "jpg"}))
        .collect();
    json!({
        "results": results,
        "offset": 0,
        "number": hits.len(),
        "totalResults": hits.len()
    })
}

pub fn sourdough_detail() -> Value {
    json!({
        "id": 716429,
        "title": "Country Sourdough",
        "servings": 1,
        "readyInMinutes": 1440,
        "extendedIngredients": [
            {"name": "bread flour", "amount": 500, "unit": "g"},
            {"name": "water", "amount": 350, "unit": "g"},
            {"name": "sourdough starter", "amount": 100, "unit": "g"},
            {"name": "salt", "amount": 10, "unit": "g"}
        ],
        "instructions": "Feed the starter. Mix. Fold. Proof overnight. Bake at 250C."
    })
}

pub fn credentials() -> Credentials {
    Credentials {
        google_api_key: SecretString::from(GOOGLE_KEY),
        spoonacular_key: SecretString::from(SPOONACULAR_KEY),
    }
}

pub fn test_config(gemini_uri: &str, spoonacular_uri: &str) -> Config {
    let mut config = Config::default();
    config.llm.base_url = gemini_uri.to_string();
    config.recipes.base_url = spoonacular_uri.to_string();
    config.core.request_timeout_secs = 5;
    config
}

pub fn test_agent(gemini_uri: &str, spoonacular_uri: &str) -> ConversationAgent {
    build_agent(&test_config(gemini_uri, spoonacular_uri), &credentials()).unwrap()
}
