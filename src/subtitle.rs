use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

use crate::error::{Result, SiftError};

/// Cue index line, or a line opening with an SRT timestamp (HH:MM:SS,mmm)
static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$|^\d{2}:\d{2}:\d{2},\d{3}").expect("valid metadata regex"));

/// Decode file bytes as UTF-8, dropping invalid sequences instead of failing
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Remove cue indices, timestamp lines and blank lines, returning plain prose
pub fn strip_metadata(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !METADATA_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Read a subtitle file and return its cleaned text
pub async fn read_cleaned<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SiftError::FileNotFound(path.display().to_string()),
        _ => SiftError::Io(e),
    })?;

    let cleaned = strip_metadata(&decode_lossy(&bytes));
    debug!(
        "Cleaned {}: {} bytes in, {} characters out",
        path.display(),
        bytes.len(),
        cleaned.chars().count()
    );
    Ok(cleaned)
}
