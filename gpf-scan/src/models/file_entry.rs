//! Discovered files and their content digests

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions recognized as DJ-playable audio (lower-case, without dot)
pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["mp3", "wav", "aiff", "aif", "m4a", "aac", "flac", "ogg"];

/// Extension-based classification of a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    Supported,
    Unsupported,
}

impl FileClass {
    /// Classify a lower-cased extension
    pub fn from_extension(ext: &str) -> Self {
        if SUPPORTED_EXTENSIONS.contains(&ext) {
            FileClass::Supported
        } else {
            FileClass::Unsupported
        }
    }
}

/// A regular file found during traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Discovery order within the run (0-based)
    pub index: usize,
    /// Absolute path
    #[serde(serialize_with = "super::serialize_path_lossy")]
    pub path: PathBuf,
    /// Lower-cased extension without the dot ("" if none)
    pub extension: String,
    pub class: FileClass,
}

impl FileEntry {
    /// Build an entry, deriving extension and classification from the path
    pub fn new(index: usize, path: PathBuf) -> Self {
        let extension = extension_of(&path);
        let class = FileClass::from_extension(&extension);
        Self {
            index,
            path,
            extension,
            class,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.class == FileClass::Supported
    }
}

/// Lower-cased extension of a path, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Hex-encoded content hash of a file
///
/// Only meaningful as a grouping key within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
