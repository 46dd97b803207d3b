//! Library file scanner
//!
//! Depth-first discovery of every regular file under a root folder.
//! Hidden directories (name starting with `.`) are pruned. Files are
//! classified by extension only; magic bytes are never inspected.
//!
//! Symlinks are never descended into, so every regular file is yielded once
//! under its real path. A symlink to a file is yielded under the link path;
//! a symlink to a directory is pruned.
//!
//! Error policy:
//! - Root missing, not a directory, or unreadable: fatal [`ScanError`]
//! - Anything below the root (unreadable subdirectory, broken symlink):
//!   logged at `warn` and skipped, counted in [`FileWalk::skipped`]

use crate::models::{FileClass, FileEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use walkdir::{DirEntry, WalkDir};

/// Library scanner errors (all fatal for the run)
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission denied when accessing path
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Cannot access path
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),

    /// Walk interrupted by cancellation
    #[error("Scan cancelled")]
    Cancelled,
}

/// Result of a complete walk
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Absolute, canonical root
    pub root: PathBuf,
    /// Supported files in discovery order
    pub supported: Vec<FileEntry>,
    /// Unsupported files in discovery order
    pub unsupported: Vec<FileEntry>,
    /// Entries skipped because they could not be read
    pub skipped: usize,
}

impl ScanResult {
    pub fn total_files(&self) -> usize {
        self.supported.len() + self.unsupported.len()
    }
}

type EntryFilter = fn(&DirEntry) -> bool;

/// Lazy depth-first sequence of [`FileEntry`]
///
/// Indices are assigned in yield order, so they record discovery order.
pub struct FileWalk {
    inner: walkdir::FilterEntry<walkdir::IntoIter, EntryFilter>,
    next_index: usize,
    skipped: usize,
}

impl FileWalk {
    /// Entries skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for FileWalk {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_symlink() {
                        match std::fs::metadata(entry.path()) {
                            Ok(target) if target.is_file() => {}
                            Ok(_) => {
                                tracing::debug!(
                                    path = %entry.path().display(),
                                    "Not descending into symlinked directory"
                                );
                                continue;
                            }
                            Err(e) => {
                                self.skipped += 1;
                                tracing::warn!(
                                    path = %entry.path().display(),
                                    "Skipping broken symlink: {}",
                                    e
                                );
                                continue;
                            }
                        }
                    } else if !file_type.is_file() {
                        continue;
                    }
                    let file = FileEntry::new(self.next_index, entry.into_path());
                    self.next_index += 1;
                    return Some(file);
                }
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!("Skipping unreadable entry: {}", e);
                }
            }
        }
    }
}

/// Library file scanner
pub struct FileScanner {
    max_depth: Option<usize>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self { max_depth: None }
    }

    /// Limit recursion depth (the root is depth 0)
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Resolve and validate the root folder
    ///
    /// Returns the canonical absolute path.
    pub fn resolve_root(&self, root_path: &Path) -> Result<PathBuf, ScanError> {
        let canonical = root_path
            .canonicalize()
            .map_err(|e| access_error(root_path, e))?;

        if !canonical.is_dir() {
            return Err(ScanError::NotADirectory(canonical));
        }

        // Probe readability up front so an unreadable root fails the run
        // instead of degrading into an empty report.
        std::fs::read_dir(&canonical).map_err(|e| access_error(&canonical, e))?;

        Ok(canonical)
    }

    /// Start a lazy walk over the root
    pub fn walk(&self, root_path: &Path) -> Result<FileWalk, ScanError> {
        let root = self.resolve_root(root_path)?;
        Ok(self.walk_resolved(&root))
    }

    fn walk_resolved(&self, root: &Path) -> FileWalk {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(is_visible as EntryFilter);

        FileWalk {
            inner,
            next_index: 0,
            skipped: 0,
        }
    }

    /// Walk the whole tree, splitting supported from unsupported files
    pub fn scan(&self, root_path: &Path) -> Result<ScanResult, ScanError> {
        self.scan_cancellable(root_path, &CancellationToken::new())
    }

    /// [`Self::scan`], checking `cancel` between entries
    pub fn scan_cancellable(
        &self,
        root_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        let root = self.resolve_root(root_path)?;
        let mut walk = self.walk_resolved(&root);

        let mut supported = Vec::new();
        let mut unsupported = Vec::new();

        for entry in walk.by_ref() {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            match entry.class {
                FileClass::Supported => supported.push(entry),
                FileClass::Unsupported => unsupported.push(entry),
            }
        }

        tracing::debug!(
            supported = supported.len(),
            unsupported = unsupported.len(),
            skipped = walk.skipped(),
            "Directory walk complete"
        );

        Ok(ScanResult {
            root,
            supported,
            unsupported,
            skipped: walk.skipped(),
        })
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Prune hidden directories below the root
fn is_visible(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    !entry.file_name().to_string_lossy().starts_with('.')
}

fn access_error(path: &Path, e: std::io::Error) -> ScanError {
    match e.kind() {
        ErrorKind::NotFound => ScanError::PathNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        _ => ScanError::FileAccessError(path.to_path_buf(), e.to_string()),
    }
}
