//! Data models for gpf-scan
//!
//! Everything here is created and owned by a single scan run.

pub mod file_entry;
pub mod scan_report;
pub mod track_metadata;

pub use file_entry::{ContentDigest, FileClass, FileEntry, SUPPORTED_EXTENSIONS};
pub use scan_report::{DuplicateGroup, MissingMetadataEntry, ScanReport};
pub use track_metadata::{FingerprintResult, LookupSuggestion, MetadataRecord};

use serde::Serializer;
use std::path::Path;

/// Serialize a path as a (lossy) UTF-8 string so that non-UTF-8 file
/// names never make JSON rendering fail.
pub(crate) fn serialize_path_lossy<S, P>(path: P, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    P: AsRef<Path>,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}
