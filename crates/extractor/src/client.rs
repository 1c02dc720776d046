//! HTTP client for the hosted LLM extraction service.
//!
//! Sends the communication text to a messages-style completion API and
//! parses the returned JSON array of candidates. Invalid candidates are
//! dropped rather than failing the whole extraction.

use serde::Deserialize;

use crate::{filter_valid, ExtractedField, ExtractorError, FieldExtractor};

/// Fields the prompt asks the model to extract. Kept in sync with
/// `worksite_core::extraction::EXTRACTABLE_FIELDS` by the filter step.
const PROMPT: &str = "Extract the following fields from this construction project \
communication: client_name, project_address, start_date, budget, special_requirements. \
Return a JSON array of objects with field_name, extracted_value, confidence_score (0-1). \
Communication: ";

/// Configuration for the extraction service client.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Base URL of the messages API, e.g. `https://api.anthropic.com`.
    pub api_url: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens for the completion.
    pub max_tokens: u32,
}

impl ExtractorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                     |
    /// |-----------------------|----------|-----------------------------|
    /// | `EXTRACTOR_API_URL`   | no       | `https://api.anthropic.com` |
    /// | `EXTRACTOR_API_KEY`   | **yes**  | --                          |
    /// | `EXTRACTOR_MODEL`     | no       | `claude-3-5-sonnet-latest`  |
    ///
    /// # Panics
    ///
    /// Panics if `EXTRACTOR_API_KEY` is not set.
    pub fn from_env() -> Self {
        let api_url = std::env::var("EXTRACTOR_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".into());
        let api_key =
            std::env::var("EXTRACTOR_API_KEY").expect("EXTRACTOR_API_KEY must be set");
        let model = std::env::var("EXTRACTOR_MODEL")
            .unwrap_or_else(|_| "claude-3-5-sonnet-latest".into());

        Self {
            api_url,
            api_key,
            model,
            max_tokens: 1024,
        }
    }
}

/// Production [`FieldExtractor`] backed by the hosted messages API.
pub struct LlmExtractor {
    config: ExtractorConfig,
    http: reqwest::Client,
}

/// Subset of the messages API response we read.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl LlmExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Parse the model's text output into validated candidates.
    ///
    /// The model is asked for a bare JSON array; anything unparseable is an
    /// [`ExtractorError::InvalidResponse`], while individually malformed
    /// candidates are silently dropped.
    fn parse_candidates(text: &str) -> Result<Vec<ExtractedField>, ExtractorError> {
        let candidates: Vec<ExtractedField> = serde_json::from_str(text)
            .map_err(|e| ExtractorError::InvalidResponse(e.to_string()))?;
        Ok(filter_valid(candidates))
    }
}

#[async_trait::async_trait]
impl FieldExtractor for LlmExtractor {
    async fn extract_fields(&self, text: &str) -> Result<Vec<ExtractedField>, ExtractorError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{
                "role": "user",
                "content": format!("{PROMPT}{text}"),
            }],
        });

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.api_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractorError::Http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ExtractorError::RateLimited);
        }
        if !status.is_success() {
            return Err(ExtractorError::Service(format!(
                "extraction service returned status {status}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ExtractorError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .ok_or_else(|| {
                ExtractorError::InvalidResponse("response carried no text content".into())
            })?;

        let candidates = Self::parse_candidates(text)?;
        tracing::debug!(count = candidates.len(), "Extraction candidates parsed");
        Ok(candidates)
    }
}
