//! The scan report: the only externally visible artifact of a run

use super::{ContentDigest, FileEntry, LookupSuggestion, MetadataRecord};
use serde::Serialize;
use std::path::PathBuf;

/// Files sharing one content digest
///
/// Always holds at least two files, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub digest: ContentDigest,
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A supported file whose title or artist tag is empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingMetadataEntry {
    pub file: FileEntry,
    pub current: MetadataRecord,
    /// `None` when enrichment was disabled or produced nothing
    pub suggestion: Option<LookupSuggestion>,
}

/// Aggregated findings of a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    #[serde(serialize_with = "super::serialize_path_lossy")]
    pub root: PathBuf,
    pub unsupported_count: usize,
    /// Unsupported file paths, discovery order (JSON output only)
    pub unsupported_files: Vec<FileEntry>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub missing_metadata: Vec<MissingMetadataEntry>,
}

impl ScanReport {
    pub fn duplicate_set_count(&self) -> usize {
        self.duplicate_groups.len()
    }

    pub fn missing_metadata_count(&self) -> usize {
        self.missing_metadata.len()
    }
}
