use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use crate::error::{Result, SiftError};

/// Default token budget per chunk
pub const DEFAULT_MAX_TOKENS: usize = 14_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub chunking: ChunkingConfig,
    pub pacing: PacingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Which hosted model service to call
    pub provider: Provider,
    /// Base URL of the service; the provider default is used when unset
    pub endpoint: Option<String>,
    /// Model identifier passed through to the service
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini generateContent API
    Gemini,
    /// Local or remote Ollama server
    Ollama,
}

impl Provider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Approximate token budget per chunk (1 token ~ 4 characters)
    pub max_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay observed between successive remote calls
    pub min_delay_ms: u64,
    /// Extra attempts for a chunk whose call failed with a retryable error
    pub max_retries: u32,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f64,
    /// Upper bound for a single backoff delay
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of the prose artifact
    pub prose_extension: String,
    /// Extension of the structured artifact
    pub structured_extension: String,
    /// Sibling extensions whose presence marks an input as already analyzed
    pub skip_extensions: Vec<String>,
    /// Skip inputs that already have a sibling artifact
    pub skip_analyzed: bool,
    pub write_prose: bool,
    pub write_structured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory receiving the rotated log files
    pub dir: String,
    /// Informational log file name
    pub info_file: String,
    /// Verbose log file name
    pub debug_file: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            endpoint: None,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

impl AnalyzerConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_retries: 2,
            backoff_factor: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prose_extension: "md".to_string(),
            structured_extension: "json".to_string(),
            skip_extensions: vec!["txt".to_string(), "md".to_string(), "json".to_string()],
            skip_analyzed: false,
            write_prose: true,
            write_structured: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: ".srtsift/log".to_string(),
            info_file: "srtsift.log".to_string(),
            debug_file: "srtsift-debug.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SiftError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| SiftError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SiftError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SiftError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pacing.backoff_factor < 1.0 {
            return Err(SiftError::Config(format!(
                "backoff_factor must be at least 1.0, got {}",
                self.pacing.backoff_factor
            )));
        }
        if self.output.prose_extension == self.output.structured_extension {
            return Err(SiftError::Config(
                "prose and structured artifacts need different extensions".to_string(),
            ));
        }
        Ok(())
    }
}
