//! Streaming content hashing
//!
//! Calculates the SHA-256 of a file's content, reading in bounded chunks so
//! that large lossless files are never held in memory.

use crate::models::ContentDigest;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default read size: 1MB
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Hashing errors (per file, never fatal for the run)
#[derive(Debug, Error)]
pub enum HashError {
    /// File could not be opened or read
    #[error("Failed to hash {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Blocking hash task panicked or was cancelled
    #[error("Hash task failed: {0}")]
    TaskFailed(String),
}

/// Streaming SHA-256 hasher
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set read chunk size (minimum 1 byte)
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Hash everything a reader yields
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ContentDigest> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(ContentDigest::from_hex(format!("{:x}", hasher.finalize())))
    }

    /// Hash a file (blocking)
    pub fn hash_file(&self, path: &Path) -> Result<ContentDigest, HashError> {
        let file = File::open(path).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let digest = self.hash_reader(file).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), digest = %digest, "Calculated hash");
        Ok(digest)
    }

    /// Hash a file on the blocking thread pool
    pub async fn hash_file_async(&self, path: PathBuf) -> Result<ContentDigest, HashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_file(&path))
            .await
            .map_err(|e| HashError::TaskFailed(e.to_string()))?
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
