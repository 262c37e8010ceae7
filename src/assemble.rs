//! Combining per-chunk responses into the prose and structured results.

use regex::Regex;
use serde_json::{Value, json};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Separator placed between consecutive chunk responses
pub const RESULT_SEPARATOR: &str = "\n\n---\n\n";

/// Marker text carried by a chunk whose analysis failed
pub const FAILURE_MARKER: &str = "Chunk analysis failed";

/// First fenced block tagged `json`, using either backtick or tilde fences
static STRUCTURED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?i:json)\s*([\s\S]*?)\s*```|~~~(?i:json)\s*([\s\S]*?)\s*~~~")
        .expect("valid structured block regex")
});

/// Result of analyzing one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Analyzed(String),
    Failed { index: usize, message: String },
}

impl ChunkOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Response text of a successful chunk
    pub fn analysis(&self) -> Option<&str> {
        match self {
            Self::Analyzed(text) => Some(text),
            Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for ChunkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzed(text) => f.write_str(text),
            Self::Failed { message, .. } => write!(f, "[{}: {}]", FAILURE_MARKER, message),
        }
    }
}

/// Where the structured document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredSource {
    /// Parsed from a fenced json block in the combined text
    Embedded,
    /// The whole combined text wrapped as `{"analysis": ...}`
    Fallback,
}

/// Combined result of one file
#[derive(Debug, Clone)]
pub struct Assembly {
    pub prose: String,
    pub structured: Value,
    pub source: StructuredSource,
    pub chunk_count: usize,
    pub failed_chunks: usize,
}

impl Assembly {
    pub fn from_outcomes(outcomes: &[ChunkOutcome]) -> Self {
        let prose = assemble(outcomes.iter().map(ToString::to_string));
        let (structured, source) = extract_structured(&prose);

        Self {
            prose,
            structured,
            source,
            chunk_count: outcomes.len(),
            failed_chunks: outcomes.iter().filter(|o| o.is_failed()).count(),
        }
    }
}

/// Join chunk results in order with [`RESULT_SEPARATOR`]
pub fn assemble<I, S>(results: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    for (i, result) in results.into_iter().enumerate() {
        if i > 0 {
            combined.push_str(RESULT_SEPARATOR);
        }
        combined.push_str(result.as_ref());
    }
    combined
}

/// Parse the first fenced json block, falling back to `{"analysis": combined}`
pub fn extract_structured(combined: &str) -> (Value, StructuredSource) {
    let block = STRUCTURED_BLOCK
        .captures(combined)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)));

    let Some(block) = block else {
        debug!("No structured block found, wrapping combined text");
        return (fallback(combined), StructuredSource::Fallback);
    };

    match serde_json::from_str::<Value>(block.as_str()) {
        Ok(value) => (value, StructuredSource::Embedded),
        Err(e) => {
            warn!("Structured block is not valid JSON ({}), wrapping combined text", e);
            (fallback(combined), StructuredSource::Fallback)
        }
    }
}

fn fallback(combined: &str) -> Value {
    json!({ "analysis": combined })
}
