use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::analyze::{Analyzer, AnalyzerFactory, Pacer};
use crate::assemble::{Assembly, ChunkOutcome, StructuredSource};
use crate::chunk::chunk_text;
use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::persist::{PersistedPaths, Persister};
use crate::subtitle::read_cleaned;

/// Summary of one completed invocation
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub input: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    pub structured_source: StructuredSource,
    pub paths: PersistedPaths,
}

pub struct Workflow {
    config: Config,
    analyzer: Box<dyn Analyzer>,
    pacer: Pacer,
    persister: Persister,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let analyzer = AnalyzerFactory::create_analyzer(config.analyzer.clone())?;
        Ok(Self::with_analyzer(config, analyzer))
    }

    /// Build a workflow around an existing analyzer
    pub fn with_analyzer(config: Config, analyzer: Box<dyn Analyzer>) -> Self {
        let pacer = Pacer::new(config.pacing.clone());
        let persister = Persister::new(&config.output);
        Self {
            config,
            analyzer,
            pacer,
            persister,
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Whether a sibling artifact already marks `input_path` as analyzed
    pub fn is_analyzed(&self, input_path: &Path) -> bool {
        self.config
            .output
            .skip_extensions
            .iter()
            .map(|ext| input_path.with_extension(ext))
            .any(|sibling| sibling.exists())
    }

    /// Analyze, assemble and persist one file.
    ///
    /// Returns `None` when nothing was analyzed, either because the file was
    /// skipped or because it had no content left after cleaning.
    pub async fn run<P: AsRef<Path>>(&self, input_path: P, prompt: &str) -> Result<Option<RunReport>> {
        let input_path = input_path.as_ref();
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);

        self.run_instrumented(run_id, input_path, prompt)
            .instrument(span)
            .await
    }

    async fn run_instrumented(
        &self,
        run_id: Uuid,
        input_path: &Path,
        prompt: &str,
    ) -> Result<Option<RunReport>> {
        let started_at = Local::now();
        let outcomes = self
            .analyze_file(
                input_path,
                prompt,
                self.config.chunking.max_tokens,
                self.config.output.skip_analyzed,
            )
            .await?;

        if outcomes.is_empty() {
            info!("No new analysis for {}", input_path.display());
            return Ok(None);
        }

        let assembly = Assembly::from_outcomes(&outcomes);
        if assembly.failed_chunks > 0 {
            warn!(
                "{} of {} chunks failed for {}",
                assembly.failed_chunks,
                assembly.chunk_count,
                input_path.display()
            );
        }

        let paths = self
            .persister
            .persist(
                &assembly.prose,
                &assembly.structured,
                input_path,
                self.config.output.write_prose,
                self.config.output.write_structured,
            )
            .await;

        Ok(Some(RunReport {
            run_id,
            input: input_path.to_path_buf(),
            started_at,
            finished_at: Local::now(),
            chunk_count: assembly.chunk_count,
            failed_chunks: assembly.failed_chunks,
            structured_source: assembly.source,
            paths,
        }))
    }

    /// Clean and chunk one file, then analyze each chunk in order
    pub async fn analyze_file<P: AsRef<Path>>(
        &self,
        input_path: P,
        prompt: &str,
        max_tokens: usize,
        skip_analyzed: bool,
    ) -> Result<Vec<ChunkOutcome>> {
        let input_path = input_path.as_ref();
        info!("Analyzing subtitle file: {}", input_path.display());

        if skip_analyzed && self.is_analyzed(input_path) {
            info!("Skipping already analyzed file: {}", input_path.display());
            return Ok(Vec::new());
        }

        if !input_path.exists() {
            return Err(SiftError::FileNotFound(input_path.display().to_string()));
        }

        let text = read_cleaned(input_path).await?;
        let chunks = chunk_text(&text, max_tokens);
        let total = chunks.clone().count();
        info!("Split {} into {} chunk(s)", input_path.display(), total);

        Ok(self.analyze_chunks(chunks, total, prompt).await)
    }

    /// Analyze chunks in order; a failing chunk is recorded and skipped over
    pub async fn analyze_chunks<I>(&self, chunks: I, total: usize, prompt: &str) -> Vec<ChunkOutcome>
    where
        I: IntoIterator<Item = String>,
    {
        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut outcomes = Vec::with_capacity(total);
        for (index, chunk) in chunks.into_iter().enumerate() {
            progress.set_message(format!("({} characters)", chunk.chars().count()));

            let outcome = match self
                .pacer
                .call(|| self.analyzer.analyze(&chunk, prompt))
                .await
            {
                Ok(text) => {
                    info!("Chunk {}/{} analyzed", index + 1, total);
                    ChunkOutcome::Analyzed(text)
                }
                Err(e) => {
                    error!("Chunk analysis failed for chunk {}/{}: {}", index + 1, total, e);
                    ChunkOutcome::Failed {
                        index,
                        message: e.to_string(),
                    }
                }
            };

            outcomes.push(outcome);
            progress.inc(1);
        }

        progress.finish_and_clear();
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::MockAnalyzer;
    use assert_fs::prelude::*;
    use serde_json::json;

    const SAMPLE: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello world.\n\n2\n00:00:02,000 --> 00:00:04,000\nGoodbye.\n";

    fn workflow(config: Config, analyzer: MockAnalyzer) -> Workflow {
        Workflow::with_analyzer(config, Box::new(analyzer)).with_pacer(Pacer::immediate())
    }

    #[tokio::test]
    async fn test_skip_analyzed_makes_no_calls() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("talk.srt");
        input.write_str(SAMPLE).unwrap();
        temp.child("talk.txt").write_str("previous").unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().never();

        let outcomes = workflow(Config::default(), analyzer)
            .analyze_file(input.path(), "Summarize", 14_000, true)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_existing_json_also_skips() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("talk.srt");
        input.write_str(SAMPLE).unwrap();
        temp.child("talk.json").write_str("{}").unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().never();

        let wf = workflow(Config::default(), analyzer);
        assert!(wf.is_analyzed(input.path()));
        assert!(wf.analyze_file(input.path(), "p", 14_000, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sends_cleaned_text_once_per_chunk() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("talk.srt");
        input.write_str(SAMPLE).unwrap();
        // an existing artifact is ignored unless skipping is requested
        temp.child("talk.md").write_str("old").unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer
            .expect_analyze()
            .withf(|content, prompt| content == "Hello world.\nGoodbye." && prompt == "Summarize")
            .times(1)
            .returning(|_, _| Ok("A greeting and a farewell.".to_string()));

        let outcomes = workflow(Config::default(), analyzer)
            .analyze_file(input.path(), "Summarize", 14_000, false)
            .await
            .unwrap();
        assert_eq!(outcomes, vec![ChunkOutcome::Analyzed("A greeting and a farewell.".to_string())]);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_going() {
        let mut calls = 0;
        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok("first analysis".to_string())
            } else {
                Err(SiftError::Service("boom".to_string()))
            }
        });

        let chunks = vec!["one".to_string(), "two".to_string()];
        let outcomes = workflow(Config::default(), analyzer)
            .analyze_chunks(chunks, 2, "Summarize")
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].to_string(), "first analysis");
        assert!(outcomes[1].is_failed());
        assert!(outcomes[1].to_string().contains("Chunk analysis failed"));
    }

    #[tokio::test]
    async fn test_missing_input_aborts() {
        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().never();

        let result = workflow(Config::default(), analyzer)
            .analyze_file("/nonexistent/talk.srt", "p", 14_000, false)
            .await;
        assert!(matches!(result, Err(SiftError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_persists_artifacts() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("talk.srt");
        input.write_str(SAMPLE).unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().times(1).returning(|_, _| {
            Ok("Topics below.\n```json\n{\"topics\": [\"greeting\", \"farewell\"]}\n```".to_string())
        });

        let report = workflow(Config::default(), analyzer)
            .run(input.path(), "Summarize")
            .await
            .unwrap()
            .expect("analysis should run");

        assert_eq!(report.chunk_count, 1);
        assert_eq!(report.failed_chunks, 0);
        assert_eq!(report.structured_source, StructuredSource::Embedded);
        assert!(report.finished_at >= report.started_at);

        temp.child("talk.md")
            .assert("Topics below.\n```json\n{\"topics\": [\"greeting\", \"farewell\"]}\n```");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp.child("talk.json").path()).unwrap()).unwrap();
        assert_eq!(written, json!({ "topics": ["greeting", "farewell"] }));
    }

    #[tokio::test]
    async fn test_run_without_prose_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("talk.srt");
        input.write_str(SAMPLE).unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer
            .expect_analyze()
            .returning(|_, _| Err(SiftError::MissingCredential("GOOGLE_API_KEY".to_string())));

        let mut config = Config::default();
        config.output.write_prose = false;
        let report = workflow(config, analyzer)
            .run(input.path(), "Summarize")
            .await
            .unwrap()
            .expect("a failed chunk still counts as analyzed");

        assert_eq!(report.failed_chunks, 1);
        assert_eq!(report.paths.prose, None);
        assert!(!temp.child("talk.md").path().exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp.child("talk.json").path()).unwrap()).unwrap();
        let analysis = written["analysis"].as_str().unwrap();
        assert!(analysis.starts_with("[Chunk analysis failed: GOOGLE_API_KEY environment variable not found"));
    }

    #[tokio::test]
    async fn test_run_on_empty_file_does_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("empty.srt");
        input.write_str("1\n00:00:00,000 --> 00:00:01,000\n\n").unwrap();

        let mut analyzer = MockAnalyzer::new();
        analyzer.expect_analyze().never();

        let report = workflow(Config::default(), analyzer).run(input.path(), "p").await.unwrap();
        assert!(report.is_none());
        assert!(!temp.child("empty.json").path().exists());
    }
}
