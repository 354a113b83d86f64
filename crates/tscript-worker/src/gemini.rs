//! Gemini client for script generation.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{WorkerError, WorkerResult};
use crate::generation::{GenerationConfig, GenerationError};

/// A text-generation API.
///
/// Implementations report quota problems as [`GenerationError::Quota`] so the
/// caller can retry them; every other failure is [`GenerationError::Failed`].
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError>;
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
///
/// The key travels in a header so it never appears in request URLs.
pub struct GeminiBackend {
    endpoint: Url,
    api_key: HeaderValue,
    model: String,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: RequestConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for RequestConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    /// Create a client for `model` at `base_url`.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> WorkerResult<Self> {
        let endpoint = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        ))
        .map_err(|e| WorkerError::config_error(format!("Invalid Gemini base URL: {}", e)))?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|_| WorkerError::config_error("GEMINI_API_KEY contains invalid characters"))?;
        api_key.set_sensitive(true);

        Ok(Self {
            endpoint,
            api_key,
            model: model.to_string(),
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: RequestConfig::from(config),
        };

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            max_output_tokens = config.max_output_tokens,
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.clone())
            .json(&request)
            .send()
            .await
            // Transport failures are never quota problems
            .map_err(|e| {
                GenerationError::failed(format!("Gemini API request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::classify(
                Some(status.as_u16()),
                format!("Gemini API returned {}: {}", status, error_text),
            ));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::failed(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::failed("No content in Gemini response"));
        }

        info!(model = %self.model, chars = text.chars().count(), "Gemini generation complete");
        Ok(text)
    }
}
