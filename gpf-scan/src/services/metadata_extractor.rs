//! Audio tag extraction
//!
//! Reads title, artist and album using lofty. Untagged or unparseable files
//! are normal in a DJ library, so [`MetadataExtractor::analyze`] never fails:
//! any error becomes an empty [`MetadataRecord`].

use crate::models::MetadataRecord;
use lofty::config::ParseOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File could not be opened
    #[error("Failed to open file: {0}")]
    OpenError(String),

    /// File could not be probed or parsed
    #[error("Failed to read tags: {0}")]
    ReadError(String),
}

/// Metadata extractor service
pub struct MetadataExtractor {}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Extract tags, surfacing parse failures
    ///
    /// Uses the primary tag for the format, falling back to the first tag
    /// present. A file without tags yields an empty record.
    pub fn extract(&self, file_path: &Path) -> Result<MetadataRecord, MetadataError> {
        // Audio properties are not needed, only tags
        let options = ParseOptions::new().read_properties(false);

        let tagged_file = Probe::open(file_path)
            .map_err(|e| MetadataError::OpenError(e.to_string()))?
            .options(options)
            .read()
            .map_err(|e| MetadataError::ReadError(e.to_string()))?;

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let record = match tag {
            Some(tag) => MetadataRecord {
                title: tag.title().map(|s| s.to_string()).unwrap_or_default(),
                artist: tag.artist().map(|s| s.to_string()).unwrap_or_default(),
                album: tag.album().map(|s| s.to_string()).unwrap_or_default(),
            },
            None => MetadataRecord::default(),
        };

        tracing::debug!(
            file = %file_path.display(),
            title = %record.title,
            artist = %record.artist,
            "Extracted metadata"
        );

        Ok(record)
    }

    /// Extract tags, degrading to an empty record on any failure
    pub fn analyze(&self, file_path: &Path) -> MetadataRecord {
        match self.extract(file_path) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    file = %file_path.display(),
                    error = %e,
                    "No readable metadata, treating as empty"
                );
                MetadataRecord::default()
            }
        }
    }

    /// [`Self::analyze`] on the blocking thread pool
    pub async fn analyze_async(&self, file_path: PathBuf) -> MetadataRecord {
        let path_for_log = file_path.clone();
        match tokio::task::spawn_blocking(move || MetadataExtractor::new().analyze(&file_path))
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    file = %path_for_log.display(),
                    "Metadata task failed: {}",
                    e
                );
                MetadataRecord::default()
            }
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}
