// Google Gemini implementation
// Calls the generateContent REST endpoint with an API key from the environment

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::error::{Result, SiftError};
use super::{Analyzer, compose_request, common::BaseAnalyzer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with all of its parts concatenated
    pub fn text(&self) -> Result<String> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(SiftError::Service(format!("Gemini returned no content: {}", reason)));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(SiftError::Service(format!(
                "Empty response from Gemini (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

/// Gemini analyzer
pub struct GeminiAnalyzer {
    base: BaseAnalyzer,
    api_key: Option<String>,
}

impl GeminiAnalyzer {
    /// Create an analyzer reading its key from the configured environment variable
    pub fn from_env(config: AnalyzerConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: AnalyzerConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            base: BaseAnalyzer::new(config)?,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base.endpoint(),
            self.base.config.model
        )
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, content: &str, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SiftError::MissingCredential(self.base.config.api_key_env.clone()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(compose_request(content, prompt)),
                }],
            }],
        };

        let url = self.url();
        debug!("Sending analysis request to: {}", url);
        info!("Analyzing {} characters with {}", content.chars().count(), self.base.config.model);

        let response = self
            .base
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        let response = self.base.check_status(response).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SiftError::Service(format!("Failed to parse Gemini response: {}", e)))?;

        body.text()
    }
}
