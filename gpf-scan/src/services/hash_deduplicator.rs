//! Duplicate detection by content digest
//!
//! Groups files sharing a digest. Equal digests are taken to mean equal
//! content; there is no byte-for-byte re-verification, so a SHA-256
//! collision would merge two distinct files into one group.
//!
//! Ordering is a function of discovery order only:
//! - groups are ordered by the discovery index of their first member
//! - members are ordered by discovery index
//!
//! so feeding pairs in completion order (from a worker pool) produces the
//! same groups as feeding them in traversal order.

use crate::models::{ContentDigest, DuplicateGroup, FileEntry};
use std::collections::HashMap;

/// Single-owner collector of (file, digest) pairs
#[derive(Debug, Default)]
pub struct HashDeduplicator {
    by_digest: HashMap<ContentDigest, Vec<FileEntry>>,
}

impl HashDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one hashed file
    pub fn insert(&mut self, file: FileEntry, digest: ContentDigest) {
        self.by_digest.entry(digest).or_default().push(file);
    }

    /// Number of distinct digests seen
    pub fn distinct_digests(&self) -> usize {
        self.by_digest.len()
    }

    /// Groups with two or more members
    pub fn into_duplicate_groups(self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .by_digest
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(digest, mut files)| {
                files.sort_by_key(|f| f.index);
                DuplicateGroup { digest, files }
            })
            .collect();

        groups.sort_by_key(|g| g.files[0].index);

        if !groups.is_empty() {
            tracing::info!(
                groups = groups.len(),
                files = groups.iter().map(DuplicateGroup::len).sum::<usize>(),
                "Duplicate content detected"
            );
        }

        groups
    }
}

/// Group an iterator of (file, digest) pairs
pub fn find_duplicates<I>(pairs: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = (FileEntry, ContentDigest)>,
{
    let mut dedup = HashDeduplicator::new();
    for (file, digest) in pairs {
        dedup.insert(file, digest);
    }
    dedup.into_duplicate_groups()
}
