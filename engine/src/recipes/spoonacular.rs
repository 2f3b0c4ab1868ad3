use super::{RecipeDocument, RecipeError, RecipeSource, RecipeSummary};
use crate::config::RecipesConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Spoonacular REST client
pub struct SpoonacularClient {
    config: RecipesConfig,
    api_key: SecretString,
    client: reqwest::Client,
}

/// `GET /recipes/complexSearch` response; only the hits matter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    results: Vec<RecipeSummary>,

    #[serde(default)]
    total_results: Option<u64>,
}

impl SpoonacularClient {
    pub fn new(config: RecipesConfig, api_key: SecretString) -> Self {
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> super::Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header("x-api-key", self.api_key.unsecure())
            .query(query)
            .send()
            .await
            .map_err(|e| RecipeError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(RecipeError::AuthenticationFailed(text)),
            // Spoonacular answers 402 when the daily point quota is spent
            402 | 429 => Err(RecipeError::RateLimitExceeded),
            404 => Err(RecipeError::NotFound(url.to_string())),
            _ => Err(RecipeError::Unavailable(format!(
                "Spoonacular API error ({}): {}",
                status, text
            ))),
        }
    }
}

#[async_trait]
impl RecipeSource for SpoonacularClient {
    fn name(&self) -> &str {
        "spoonacular"
    }

    /// One-result search; Spoonacular has no free endpoint, so this spends quota.
    async fn check_health(&self) -> bool {
        self.search("bread", 1).await.is_ok()
    }

    async fn search(&self, query: &str, number: u32) -> super::Result<Vec<RecipeSummary>> {
        let url = self.url("/recipes/complexSearch");
        let response = self
            .get(
                &url,
                &[("query", query.to_string()), ("number", number.to_string())],
            )
            .await?;

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| RecipeError::ParseError(e.to_string()))?;

        debug!(
            "Spoonacular search '{}': {} hit(s) of {:?}",
            query,
            data.results.len(),
            data.total_results
        );

        Ok(data.results)
    }

    async fn information(&self, id: u64) -> super::Result<RecipeDocument> {
        let url = self.url(&format!("/recipes/{}/information", id));
        let response = self.get(&url, &[]).await?;

        let body = response
            .text()
            .await
            .map_err(|e| RecipeError::NetworkError(e.to_string()))?;

        RecipeDocument::from_json_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_parsing() {
        let data: SearchResponse = serde_json::from_value(json!({
            "results": [
                {"id": 716429, "title": "Sourdough Bread", "image": "x.jpg", "imageType": "jpg"},
                {"id": 715538, "title": "Rye Sourdough"}
            ],
            "offset": 0,
            "number": 2,
            "totalResults": 86
        }))
        .unwrap();

        assert_eq!(data.results.len(), 2);
        assert_eq!(data.results[0].id, 716429);
        assert_eq!(data.results[0].title, "Sourdough Bread");
        assert_eq!(data.total_results, Some(86));
    }

    #[test]
    fn test_search_response_requires_results() {
        assert!(serde_json::from_value::<SearchResponse>(json!({"status": "failure"})).is_err());
    }

    #[test]
    fn test_url_join() {
        let client = SpoonacularClient::new(
            RecipesConfig {
                base_url: "http://localhost:1234/".to_string(),
                result_count: 1,
            },
            SecretString::from("k"),
        );
        assert_eq!(
            client.url("/recipes/7/information"),
            "http://localhost:1234/recipes/7/information"
        );
    }
}
