pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::{Candidate, Content, GenerateRequest, GenerateResponse, Part};

use std::time::Duration;

use tracing::info;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for the given model (e.g. "gemini-2.0-flash").
    /// Returns `MissingKey` when the API key is empty so callers can fail
    /// before starting a batch instead of on the first request.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(GeminiError::MissingKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate plain text for a prompt via the generateContent endpoint.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            BASE_URL, self.model, self.api_key
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: GenerateResponse = resp.json().await?;
        let text = data.text().ok_or(GeminiError::EmptyResponse)?;

        info!(model = %self.model, bytes = text.len(), "Gemini generation complete");
        Ok(text)
    }

    /// Generate and parse a JSON value. Models often wrap JSON in markdown
    /// code fences; those are stripped before parsing.
    pub async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value> {
        let text = self.generate(prompt).await?;
        let cleaned = strip_code_fences(&text);
        Ok(serde_json::from_str(cleaned)?)
    }
}

/// Strip a leading/trailing markdown code fence (``` or ```json) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
