//! Gemini API client
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//! The planner only depends on the [`GenerativeModel`] trait so tests and the
//! sample-data mode can stand in for the real service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::GeminiConfig;
use crate::{Result, TravelAiError};

/// Prompt sent to each candidate model at startup
pub const PROBE_PROMPT: &str = "List one travel item.";

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Gemini REST client bound to one model
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    /// Create a client for `model` using the configured endpoint and timeout
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>, model: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TravelAI/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelAiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.into(),
            generation: GenerationConfig::default(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.generation,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TravelAiError::api(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => TravelAiError::api(format!(
                    "Gemini rejected the API key ({status}): {error_text}"
                )),
                429 => TravelAiError::api(format!(
                    "Gemini quota exceeded (429): {error_text}"
                )),
                _ => TravelAiError::api(format!("Gemini returned {status}: {error_text}")),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TravelAiError::api(format!("Invalid Gemini response body: {e}")))?;

        let text = parsed
            .into_text()
            .ok_or_else(|| TravelAiError::api("Empty response from Gemini API"))?;

        debug!(
            "Gemini answered with {} chars in {:.3}s",
            text.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}

/// Try each configured model in order and keep the first that answers the
/// probe prompt. Returns `None` without an API key or when every model fails.
pub async fn connect(config: &GeminiConfig) -> Option<Arc<dyn GenerativeModel>> {
    let Some(api_key) = config.api_key.as_deref() else {
        warn!("Gemini API key not found. Using sample data.");
        return None;
    };

    for model in &config.models {
        let client = match GeminiClient::new(config, api_key, model) {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build Gemini client for {model}: {e}");
                continue;
            }
        };

        match client.generate(PROBE_PROMPT).await {
            Ok(_) => {
                info!("Successfully connected using model: {model}");
                return Some(Arc::new(client));
            }
            Err(e) => warn!("Failed to initialize {model}, trying next model: {e}"),
        }
    }

    warn!("All Gemini initialization attempts failed. Using sample data.");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let generation = GenerationConfig::default();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: &generation,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some(r#"{"a":1}"#));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[test]
    fn test_model_prefix_is_stripped() {
        let config = GeminiConfig {
            base_url: "http://localhost:1/v1beta/".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config, "key", "models/gemini-1.5-pro").unwrap();
        assert_eq!(client.name(), "gemini-1.5-pro");
        assert_eq!(
            client.endpoint(),
            "http://localhost:1/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_connect_without_key_is_none() {
        let config = GeminiConfig::default();
        assert!(connect(&config).await.is_none());
    }
}
