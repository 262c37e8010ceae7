use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, Provider};

pub const DEFAULT_PROMPT: &str =
    "Summarize the content of this transcript. List main topics and key points.";

/// Analyze a subtitle transcript with a hosted language model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the subtitle file
    #[arg(short, long, default_value = "output/transcript.srt")]
    pub file: PathBuf,

    /// Prompt sent along with each transcript chunk
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Model name passed to the analysis service
    #[arg(short, long)]
    pub model: Option<String>,

    /// Analysis service to call
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Approximate token budget per chunk
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Skip files that already have analysis files
    #[arg(long)]
    pub skip_analyzed: bool,

    /// Do not save the analysis as a text file
    #[arg(long)]
    pub no_text_files: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Environment file holding the API key
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl Args {
    /// Overlay command line settings on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(provider) = self.provider {
            if provider != config.analyzer.provider {
                config.analyzer.endpoint = None;
            }
            config.analyzer.provider = provider;
        }
        if let Some(model) = &self.model {
            config.analyzer.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.chunking.max_tokens = max_tokens;
        }
        if self.skip_analyzed {
            config.output.skip_analyzed = true;
        }
        if self.no_text_files {
            config.output.write_prose = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["srtsift"]).unwrap();
        assert_eq!(args.file, PathBuf::from("output/transcript.srt"));
        assert_eq!(args.prompt, DEFAULT_PROMPT);
        assert!(args.model.is_none());

        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.analyzer.model, "gemini-1.5-flash");
        assert_eq!(config.chunking.max_tokens, 14_000);
        assert!(config.output.write_prose);
        assert!(!config.output.skip_analyzed);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "srtsift",
            "-f",
            "talk.srt",
            "-m",
            "gemini-2.0-flash",
            "--max-tokens",
            "2000",
            "--skip-analyzed",
            "--no-text-files",
            "--provider",
            "ollama",
        ])
        .unwrap();

        let mut config = Config::default();
        config.analyzer.endpoint = Some("https://proxy.example".to_string());
        args.apply_to(&mut config);

        assert_eq!(args.file, PathBuf::from("talk.srt"));
        assert_eq!(config.analyzer.provider, Provider::Ollama);
        assert_eq!(config.analyzer.endpoint(), "http://localhost:11434");
        assert_eq!(config.analyzer.model, "gemini-2.0-flash");
        assert_eq!(config.chunking.max_tokens, 2000);
        assert!(config.output.skip_analyzed);
        assert!(!config.output.write_prose);
        assert!(config.output.write_structured);
    }
}
