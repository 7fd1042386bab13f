//! Gemini Client
//!
//! Text completions from Google's Gemini `generateContent` REST endpoint.
//! The rest of the service talks to the model through [`CompletionClient`] so
//! the extractors can be exercised without network access.

use anyhow::{Context, Result};
use async_trait::async_trait;
use packslip_utils::GeminiConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// A text-in, text-out language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier reported by health checks.
    fn model(&self) -> &str;

    /// Complete `prompt`, returning the raw response text.
    async fn generate(&self, prompt: &str, settings: GenerationSettings) -> Result<String>;
}

/// Gemini client for packing slip extraction
pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, settings: GenerationSettings) -> Result<String> {
        let request = GenerateContentRequest::new(prompt, settings);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        result.text().context("Gemini response contained no text")
    }
}

/// Gemini API request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: &str, settings: GenerationSettings) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if it has any text.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::new(
            "PACKING SLIP",
            GenerationSettings {
                temperature: 0.5,
                max_output_tokens: 1000,
            },
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "PACKING SLIP");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1000);
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "[{\"customerId\":" }, { "text": " \"1\"}]" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(response.text().unwrap(), "[{\"customerId\": \"1\"}]");
    }

    #[test]
    fn test_response_without_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap();
        assert!(response.text().is_none());

        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] })).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_endpoint_uses_model() {
        let config = GeminiConfig {
            api_url: "https://example.test/v1beta/".to_string(),
            api_key: "key".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 0.1,
            timeout_seconds: 5,
            single_page_max_tokens: 1000,
            batch_max_tokens: 4000,
            max_calls_per_minute: 15,
        };
        let client = GeminiClient::new(&config).unwrap();

        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-flash-lite");
    }
}
