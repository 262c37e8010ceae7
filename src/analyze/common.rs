use reqwest::{Client, Response};
use tracing::debug;

use crate::config::{AnalyzerConfig, Provider};
use crate::error::{Result, SiftError};

/// HTTP plumbing shared by the analyzer implementations
pub struct BaseAnalyzer {
    pub client: Client,
    pub config: AnalyzerConfig,
}

impl BaseAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Base URL for requests
    pub fn endpoint(&self) -> &str {
        self.config.endpoint()
    }

    /// Turn a non-success HTTP status into a service error carrying the body
    pub async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        debug!("Analysis service returned {}: {}", status, error_text);
        Err(SiftError::Service(format!(
            "{} API error {}: {}",
            self.provider_name(),
            status,
            error_text.trim()
        )))
    }

    pub fn provider_name(&self) -> &'static str {
        match self.config.provider {
            Provider::Gemini => "Gemini",
            Provider::Ollama => "Ollama",
        }
    }
}
