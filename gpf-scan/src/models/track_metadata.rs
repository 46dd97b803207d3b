//! Tag metadata, fingerprints and lookup suggestions

use serde::{Deserialize, Serialize};

/// Embedded tag values of one file
///
/// Fields are empty when the tag is absent or the file could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl MetadataRecord {
    /// A track is missing metadata when title or artist is empty.
    /// Album does not participate.
    pub fn is_missing(&self) -> bool {
        self.title.is_empty() || self.artist.is_empty()
    }
}

/// Output of `fpcalc -json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FingerprintResult {
    /// Compressed Chromaprint fingerprint (opaque)
    pub fingerprint: String,
    /// Track duration in seconds
    pub duration: f64,
}

/// Metadata proposed by the remote lookup service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupSuggestion {
    pub title: String,
    pub artist: String,
    pub album: String,
}
