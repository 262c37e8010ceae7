// Modular analysis architecture
//
// The remote model is reached through the Analyzer trait so the workflow can
// be driven by a substitute implementation in tests:
// - Gemini: Google generateContent API
// - Ollama: /api/generate on an Ollama server
//
// Pacing between calls and retries of failed calls live in `pacing`.

pub mod common;
pub mod gemini;
pub mod ollama;
pub mod pacing;

use async_trait::async_trait;

use crate::config::{AnalyzerConfig, Provider};
use crate::error::Result;

pub use pacing::Pacer;

/// Main trait for remote analysis calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Send `content` together with `prompt` and return the model's text
    async fn analyze(&self, content: &str, prompt: &str) -> Result<String>;
}

/// Factory for creating analyzer instances
pub struct AnalyzerFactory;

impl AnalyzerFactory {
    /// Create an analyzer for the configured provider
    pub fn create_analyzer(config: AnalyzerConfig) -> Result<Box<dyn Analyzer>> {
        let analyzer: Box<dyn Analyzer> = match config.provider {
            Provider::Gemini => Box::new(gemini::GeminiAnalyzer::from_env(config)?),
            Provider::Ollama => Box::new(ollama::OllamaAnalyzer::new(config)?),
        };
        Ok(analyzer)
    }
}

/// Build the single text sent to the model for one chunk
pub fn compose_request(content: &str, prompt: &str) -> String {
    format!("{}\n\nContent chunk:\n{}", prompt, content)
}
