use super::{
    FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest, GenerateResponse,
    LLMError, LanguageModel, Part, Role, Turn,
};
use crate::config::LLMConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini `generateContent` client
pub struct GeminiProvider {
    config: LLMConfig,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: LLMConfig, api_key: SecretString) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/models/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            suffix
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,

    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,

    #[serde(default)]
    finish_reason: Option<String>,
}

/// Gemini only knows `user` and `model`; function responses travel as `user`.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::Tool => "user",
    }
}

fn to_wire_content(turn: &Turn) -> WireContent {
    let parts = turn
        .parts
        .iter()
        .map(|part| match part {
            Part::Text { text } => WirePart {
                text: Some(text.clone()),
                ..Default::default()
            },
            Part::FunctionCall(call) => WirePart {
                function_call: Some(call.clone()),
                ..Default::default()
            },
            Part::FunctionResponse(response) => WirePart {
                function_response: Some(response.clone()),
                ..Default::default()
            },
        })
        .collect();

    WireContent {
        role: Some(wire_role(turn.role).to_string()),
        parts,
    }
}

fn build_payload(request: &GenerateRequest) -> WireRequest<'_> {
    let options = &request.options;
    let has_options = options.max_output_tokens.is_some()
        || options.temperature.is_some()
        || options.response_schema.is_some();

    WireRequest {
        contents: request.contents.iter().map(to_wire_content).collect(),
        system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
            role: None,
            parts: vec![WirePart {
                text: Some(text.clone()),
                ..Default::default()
            }],
        }),
        tools: if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![WireTool {
                function_declarations: &request.tools,
            }]
        },
        generation_config: has_options.then(|| WireGenerationConfig {
            max_output_tokens: options.max_output_tokens,
            temperature: options.temperature,
            response_mime_type: options
                .response_schema
                .as_ref()
                .map(|_| "application/json"),
            response_schema: options.response_schema.as_ref(),
        }),
    }
}

fn parse_response(data: WireResponse) -> super::Result<GenerateResponse> {
    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))?;

    if let Some(reason) = &candidate.finish_reason {
        debug!("Gemini finish reason: {}", reason);
    }

    let parts = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| {
            if let Some(call) = part.function_call {
                Some(Part::FunctionCall(call))
            } else {
                part.text.map(Part::text)
            }
        })
        .collect();

    Ok(GenerateResponse::new(parts))
}

#[async_trait]
impl LanguageModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn check_health(&self) -> bool {
        self.client
            .get(self.endpoint(""))
            .header("x-goog-api-key", self.api_key.unsecure())
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn generate(&self, request: &GenerateRequest) -> super::Result<GenerateResponse> {
        let url = self.endpoint(":generateContent");
        let payload = build_payload(request);

        debug!(
            "Gemini request: {} turns, {} tools, system instruction: {}",
            payload.contents.len(),
            request.tools.len(),
            payload.system_instruction.is_some()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.unsecure())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 400 || status.as_u16() == 404 {
                return Err(LLMError::InvalidRequest(text));
            } else if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded);
            } else if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::AuthenticationFailed(text));
            } else {
                return Err(LLMError::ProviderUnavailable(format!(
                    "Gemini API error ({}): {}",
                    status, text
                )));
            }
        }

        let data: WireResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        parse_response(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationOptions;
    use serde_json::json;

    #[test]
    fn test_payload_roles_and_parts() {
        let request = GenerateRequest::new(vec![
            Turn::user("Fetch the recipe for bagel"),
            Turn::new(
                Role::Assistant,
                vec![Part::FunctionCall(FunctionCall::new(
                    "fetch_recipe",
                    json!({"item": "bagel"}),
                ))],
            ),
            Turn::tool_result("fetch_recipe", json!({"result": "{}"})),
        ]);

        let payload = serde_json::to_value(build_payload(&request)).unwrap();
        let contents = payload["contents"].as_array().unwrap();

        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Fetch the recipe for bagel");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "fetch_recipe");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["result"],
            "{}"
        );
        assert!(payload.get("systemInstruction").is_none());
        assert!(payload.get("tools").is_none());
        assert!(payload.get("generationConfig").is_none());
    }

    #[test]
    fn test_payload_instruction_tools_and_config() {
        let request = GenerateRequest::new(vec![Turn::user("hi")])
            .with_system_instruction("Chat casually")
            .with_tool(FunctionDeclaration {
                name: "fetch_recipe".to_string(),
                description: "Fetch a recipe".to_string(),
                parameters: json!({"type": "OBJECT"}),
            })
            .with_options(GenerationOptions {
                max_output_tokens: Some(48),
                temperature: Some(0.2),
                response_schema: Some(json!({"type": "OBJECT"})),
            });

        let payload = serde_json::to_value(build_payload(&request)).unwrap();

        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "Chat casually");
        assert!(payload["systemInstruction"].get("role").is_none());
        assert_eq!(
            payload["tools"][0]["functionDeclarations"][0]["name"],
            "fetch_recipe"
        );
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 48);
        assert_eq!(payload["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(payload["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_parse_text_response() {
        let data: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "baker!"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let response = parse_response(data).unwrap();
        assert_eq!(response.text(), "Hello baker!");
        assert!(response.function_calls().is_empty());
    }

    #[test]
    fn test_parse_function_call_response() {
        let data: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "fetch_recipe", "args": {"item": "croissant"}}}]
                }
            }]
        }))
        .unwrap();

        let response = parse_response(data).unwrap();
        let calls = response.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arg_str("item"), Some("croissant"));
    }

    #[test]
    fn test_parse_no_candidates() {
        let data: WireResponse = serde_json::from_value(json!({"promptFeedback": {}})).unwrap();
        assert!(matches!(parse_response(data), Err(LLMError::ParseError(_))));
    }

    #[test]
    fn test_parse_candidate_without_content() {
        let data: WireResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        let response = parse_response(data).unwrap();
        assert_eq!(response.text(), "");
    }
}
