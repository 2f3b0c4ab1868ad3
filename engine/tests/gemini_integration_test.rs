//! Integration tests for the Gemini provider against a mock HTTP server

mod common;

use bakebot_engine::config::LLMConfig;
use bakebot_engine::llm::gemini::GeminiProvider;
use bakebot_engine::llm::{
    GenerateRequest, GenerationOptions, LLMError, LanguageModel, Turn,
};
use bakebot_engine::secrets::SecretString;
use common::{gemini_call, gemini_text, GEMINI_PATH, GOOGLE_KEY};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn provider(uri: &str) -> GeminiProvider {
    let config = LLMConfig {
        base_url: uri.to_string(),
        ..Default::default()
    };
    GeminiProvider::new(config, SecretString::from(GOOGLE_KEY))
}

#[tokio::test]
async fn test_generate_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", GOOGLE_KEY))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
            "systemInstruction": {"parts": [{"text": "Be kind"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("Hi there!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GenerateRequest::new(vec![Turn::user("Hello")]).with_system_instruction("Be kind");
    let response = provider(&mock_server.uri()).generate(&request).await.unwrap();

    assert_eq!(response.text(), "Hi there!");
    assert!(response.function_calls().is_empty());
}

#[tokio::test]
async fn test_generate_function_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_call("fetch_recipe", json!({"item": "bagel"}))),
        )
        .mount(&mock_server)
        .await;

    let request = GenerateRequest::new(vec![Turn::user("Fetch the recipe for bagel")]);
    let response = provider(&mock_server.uri()).generate(&request).await.unwrap();

    let calls = response.function_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "fetch_recipe");
    assert_eq!(calls[0].arg_str("item"), Some("bagel"));
}

#[tokio::test]
async fn test_generation_config_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {
                "maxOutputTokens": 48,
                "responseMimeType": "application/json"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(r#"{"intent":"none"}"#)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GenerateRequest::new(vec![Turn::user("hi")]).with_options(GenerationOptions {
        max_output_tokens: Some(48),
        temperature: Some(0.2),
        response_schema: Some(json!({"type": "OBJECT"})),
    });
    provider(&mock_server.uri()).generate(&request).await.unwrap();
}

#[tokio::test]
async fn test_error_status_mapping() {
    let cases = [
        (429, "rate"),
        (401, "auth"),
        (400, "invalid"),
        (503, "unavailable"),
    ];

    for (status, label) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let request = GenerateRequest::new(vec![Turn::user("hi")]);
        let err = provider(&mock_server.uri())
            .generate(&request)
            .await
            .unwrap_err();

        let ok = match label {
            "rate" => matches!(err, LLMError::RateLimitExceeded),
            "auth" => matches!(err, LLMError::AuthenticationFailed(_)),
            "invalid" => matches!(err, LLMError::InvalidRequest(_)),
            _ => matches!(err, LLMError::ProviderUnavailable(_)),
        };
        assert!(ok, "status {} mapped to {:?}", status, err);
    }
}

#[tokio::test]
async fn test_no_candidates_is_parse_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&mock_server)
        .await;

    let request = GenerateRequest::new(vec![Turn::user("hi")]);
    let err = provider(&mock_server.uri())
        .generate(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::ParseError(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let request = GenerateRequest::new(vec![Turn::user("hi")]);
    let err = provider("http://127.0.0.1:9")
        .generate(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::NetworkError(_) | LLMError::Timeout));
}

#[tokio::test]
async fn test_check_health() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/gemini-2.0-flash-001"))
        .and(header("x-goog-api-key", GOOGLE_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/gemini-2.0-flash-001"
        })))
        .mount(&mock_server)
        .await;

    assert!(provider(&mock_server.uri()).check_health().await);
    assert!(!provider("http://127.0.0.1:9").check_health().await);
}
