use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::providers::{
        retry::{with_retry, RetryPolicy},
        TextGenerator,
    },
};

/// Gemini `generateContent` request format
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Gemini `generateContent` response format
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> AppResult<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::ExternalApi(
                "Gemini response contained no text".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Google Gemini text generation client
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: String, api_url: String, model: String, retry: RetryPolicy) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            retry,
        }
    }

    async fn complete_once(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse Gemini response: {}", e))
        })?;

        body.into_text()
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let text = with_retry(&self.retry, "gemini.generateContent", || {
            self.complete_once(prompt)
        })
        .await?;

        tracing::debug!(
            model = %self.model,
            response_chars = text.len(),
            "Gemini completion received"
        );

        Ok(text)
    }
}

/// Stand-in used when no API key is configured; every call fails
#[derive(Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait::async_trait]
impl TextGenerator for DisabledGenerator {
    async fn complete(&self, _prompt: &str) -> AppResult<String> {
        Err(AppError::ExternalApi(
            "Generative suggestions are not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "Suggest films" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Suggest films");
    }

    #[test]
    fn test_response_text_is_joined_from_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "1. Inception\n"}, {"text": "2. Arrival"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "1. Inception\n2. Arrival");
    }

    #[test]
    fn test_response_without_candidates_is_malformed() {
        let response: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(matches!(response.into_text(), Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_disabled_generator_always_fails() {
        assert!(DisabledGenerator.complete("anything").await.is_err());
    }
}
