//! Scan pipeline orchestration
//!
//! Phases:
//! 1. SCANNING: walk the root (blocking pool), split supported/unsupported
//! 2. HASHING: digest supported files, at most `jobs` at a time
//! 3. METADATA: read tags, at most `jobs` at a time
//! 4. ENRICHMENT (optional): `fpcalc` + AcoustID for files missing
//!    metadata, at most `lookup_jobs` at a time
//!
//! Workers return values tagged with their file's discovery index; a single
//! owner aggregates them, so report order never depends on completion order.
//!
//! Only the root check and cancellation abort the run. Every per-file
//! failure degrades to an empty/absent value and is logged.

use crate::config::ScanConfig;
use crate::error::PipelineError;
use crate::models::{
    DuplicateGroup, FileEntry, LookupSuggestion, MetadataRecord, MissingMetadataEntry,
    ScanReport,
};
use crate::services::acoustid_client::AcoustIdClient;
use crate::services::content_hasher::ContentHasher;
use crate::services::file_scanner::{FileScanner, ScanResult};
use crate::services::fingerprinter::{FingerprintOutcome, Fingerprinter};
use crate::services::hash_deduplicator::HashDeduplicator;
use crate::services::metadata_extractor::MetadataExtractor;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Drives one scan from root folder to [`ScanReport`]
pub struct ScanOrchestrator {
    config: ScanConfig,
    hasher: ContentHasher,
    fingerprinter: Fingerprinter,
    lookup: AcoustIdClient,
}

impl ScanOrchestrator {
    pub fn new(config: ScanConfig) -> Result<Self, PipelineError> {
        let fingerprinter = Fingerprinter::new()
            .with_binary(config.fpcalc_path.clone())
            .with_timeout(config.fingerprint_timeout);
        let lookup = AcoustIdClient::new(config.lookup.clone())?;

        Ok(Self {
            config,
            hasher: ContentHasher::new(),
            fingerprinter,
            lookup,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Execute the whole pipeline
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ScanReport, PipelineError> {
        let start_time = Instant::now();

        tracing::info!(root = %self.config.root.display(), "Phase 1: SCANNING");
        let scan = self.phase_scanning(cancel).await?;
        tracing::info!(
            supported = scan.supported.len(),
            unsupported = scan.unsupported.len(),
            skipped = scan.skipped,
            "Discovered {} files",
            scan.total_files()
        );

        tracing::info!(files = scan.supported.len(), "Phase 2: HASHING");
        let duplicate_groups = self.phase_hashing(&scan.supported, cancel).await?;

        tracing::info!(files = scan.supported.len(), "Phase 3: METADATA");
        let missing = self.phase_metadata(&scan.supported, cancel).await?;

        let missing_metadata = if self.enrichment_enabled() {
            tracing::info!(files = missing.len(), "Phase 4: ENRICHMENT");
            self.phase_enrichment(missing, cancel).await?
        } else {
            missing
                .into_iter()
                .map(|(file, current)| MissingMetadataEntry {
                    file,
                    current,
                    suggestion: None,
                })
                .collect()
        };

        let report = ScanReport {
            root: scan.root,
            unsupported_count: scan.unsupported.len(),
            unsupported_files: scan.unsupported,
            duplicate_groups,
            missing_metadata,
        };

        tracing::info!(
            unsupported = report.unsupported_count,
            duplicate_sets = report.duplicate_set_count(),
            missing_metadata = report.missing_metadata_count(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Scan complete"
        );

        Ok(report)
    }

    fn enrichment_enabled(&self) -> bool {
        if !self.config.fingerprint {
            return false;
        }
        if !self.lookup.is_enabled() {
            tracing::warn!(
                "Fingerprinting requested but no AcoustID API key is configured; \
                 suggestions disabled (set {})",
                gpf_common::config::ACOUSTID_API_KEY_ENV
            );
            return false;
        }
        true
    }

    /// Phase 1: walk on the blocking pool
    async fn phase_scanning(&self, cancel: &CancellationToken) -> Result<ScanResult, PipelineError> {
        let root = self.config.root.clone();
        let walk_cancel = cancel.clone();

        let result = tokio::task::spawn_blocking(move || {
            FileScanner::new().scan_cancellable(&root, &walk_cancel)
        })
        .await
        .map_err(|e| PipelineError::Setup(format!("Directory walk task failed: {}", e)))?;

        Ok(result?)
    }

    /// Phase 2: digest every supported file and group duplicates
    ///
    /// Files that cannot be read are logged and left out of duplicate
    /// detection.
    async fn phase_hashing(
        &self,
        files: &[FileEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<DuplicateGroup>, PipelineError> {
        let tasks = files.iter().cloned().map(|file| async move {
            let digest = self.hasher.hash_file_async(file.path.clone()).await;
            (file, digest)
        });

        let results = run_bounded(tasks, self.config.jobs, cancel).await?;

        let mut dedup = HashDeduplicator::new();
        let mut failed = 0usize;
        for (file, digest) in results {
            match digest {
                Ok(digest) => dedup.insert(file, digest),
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Excluded from duplicate detection: {}", e);
                }
            }
        }
        if failed > 0 {
            tracing::warn!(failed, "Some files could not be hashed");
        }

        Ok(dedup.into_duplicate_groups())
    }

    /// Phase 3: read tags, keep files missing title or artist
    async fn phase_metadata(
        &self,
        files: &[FileEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<(FileEntry, MetadataRecord)>, PipelineError> {
        let tasks = files.iter().cloned().map(|file| async move {
            let record = MetadataExtractor::new()
                .analyze_async(file.path.clone())
                .await;
            (file, record)
        });

        let mut results = run_bounded(tasks, self.config.jobs, cancel).await?;
        results.retain(|(_, record)| record.is_missing());
        results.sort_by_key(|(file, _)| file.index);

        Ok(results)
    }

    /// Phase 4: fingerprint + lookup for each file missing metadata
    async fn phase_enrichment(
        &self,
        missing: Vec<(FileEntry, MetadataRecord)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<MissingMetadataEntry>, PipelineError> {
        let fpcalc_warned = AtomicBool::new(false);
        let fpcalc_warned = &fpcalc_warned;
        let tasks = missing.into_iter().map(|(file, current)| async move {
            let suggestion = self.suggest_for(&file, fpcalc_warned).await;
            MissingMetadataEntry {
                file,
                current,
                suggestion,
            }
        });

        let mut entries = run_bounded(tasks, self.config.lookup_jobs, cancel).await?;
        entries.sort_by_key(|entry| entry.file.index);

        let suggested = entries.iter().filter(|e| e.suggestion.is_some()).count();
        tracing::info!(
            suggested,
            total = entries.len(),
            "Enrichment complete"
        );

        Ok(entries)
    }

    /// `fpcalc_warned` is per run: the first unavailable tool warns once
    async fn suggest_for(
        &self,
        file: &FileEntry,
        fpcalc_warned: &AtomicBool,
    ) -> Option<LookupSuggestion> {
        let fingerprint = match self.fingerprinter.fingerprint_file(&file.path).await {
            FingerprintOutcome::Computed(result) => result,
            FingerprintOutcome::Unavailable(reason) => {
                if !fpcalc_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        "fpcalc unavailable, no suggestions will be produced: {}",
                        reason
                    );
                }
                return None;
            }
            FingerprintOutcome::Failed(reason) => {
                tracing::warn!(
                    file = %file.path.display(),
                    "Fingerprinting failed: {}",
                    reason
                );
                return None;
            }
        };

        self.lookup.suggest(&fingerprint).await
    }
}

/// Run futures with at most `limit` in flight, aborting on cancellation
///
/// Results come back in completion order; callers re-sort by discovery
/// index. Dropping the stream on cancellation drops in-flight futures,
/// which kills any running `fpcalc` child.
async fn run_bounded<I, F, T>(
    tasks: I,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<T>, PipelineError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let collect = stream::iter(tasks)
        .buffer_unordered(limit.max(1))
        .collect::<Vec<T>>();

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        results = collect => Ok(results),
    }
}
