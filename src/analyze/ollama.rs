// Ollama implementation
// Uses the non-streaming /api/generate endpoint, no credential required

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::{Result, SiftError};
use super::{Analyzer, compose_request, common::BaseAnalyzer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

pub struct OllamaAnalyzer {
    base: BaseAnalyzer,
}

impl OllamaAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            base: BaseAnalyzer::new(config)?,
        })
    }
}

#[async_trait]
impl Analyzer for OllamaAnalyzer {
    async fn analyze(&self, content: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.base.config.model.clone(),
            prompt: compose_request(content, prompt),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base.endpoint());
        debug!("Sending analysis request to: {}", url);

        let response = self.base.client.post(&url).json(&request).send().await?;
        let response = self.base.check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SiftError::Service(format!("Failed to parse Ollama response: {}", e)))?;

        let text = body.response.trim();
        if text.is_empty() {
            return Err(SiftError::Service("Empty response from Ollama".to_string()));
        }
        Ok(text.to_string())
    }
}
