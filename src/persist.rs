use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

use crate::config::OutputConfig;
use crate::error::{Result, SiftError};

/// Locations of the artifacts that were actually written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedPaths {
    pub prose: Option<PathBuf>,
    pub structured: Option<PathBuf>,
}

/// Writes the analysis artifacts next to the input file
pub struct Persister {
    prose_extension: String,
    structured_extension: String,
}

impl Persister {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            prose_extension: config.prose_extension.clone(),
            structured_extension: config.structured_extension.clone(),
        }
    }

    pub fn prose_path(&self, base_path: &Path) -> PathBuf {
        base_path.with_extension(&self.prose_extension)
    }

    pub fn structured_path(&self, base_path: &Path) -> PathBuf {
        base_path.with_extension(&self.structured_extension)
    }

    /// Write prose and/or structured artifacts; a failed write is logged and
    /// leaves that path unset without affecting the other artifact
    pub async fn persist(
        &self,
        text: &str,
        structured: &Value,
        base_path: &Path,
        write_text: bool,
        write_structured: bool,
    ) -> PersistedPaths {
        let mut paths = PersistedPaths::default();

        if write_text {
            let path = self.prose_path(base_path);
            match write_prose(text, &path).await {
                Ok(()) => {
                    info!("Saved analysis text to {}", path.display());
                    paths.prose = Some(path);
                }
                Err(e) => error!("Error saving analysis text to {}: {}", path.display(), e),
            }
        }

        if write_structured {
            let path = self.structured_path(base_path);
            match write_structured_document(structured, &path).await {
                Ok(()) => {
                    info!("Saved analysis JSON to {}", path.display());
                    paths.structured = Some(path);
                }
                Err(e) => error!("Error saving analysis JSON to {}: {}", path.display(), e),
            }
        }

        paths
    }
}

async fn write_prose(text: &str, path: &Path) -> Result<()> {
    fs::write(path, text)
        .await
        .map_err(|e| SiftError::Persistence(format!("{}: {}", path.display(), e)))
}

async fn write_structured_document(structured: &Value, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(structured)?;
    fs::write(path, content)
        .await
        .map_err(|e| SiftError::Persistence(format!("{}: {}", path.display(), e)))
}
