//! Service modules for the library scan
//!
//! Each stage of the pipeline is a separate service; the
//! [`ScanOrchestrator`] wires them together.

pub mod acoustid_client;
pub mod content_hasher;
pub mod file_scanner;
pub mod fingerprinter;
pub mod hash_deduplicator;
pub mod metadata_extractor;
pub mod report_generator;
pub mod scan_orchestrator;

pub use acoustid_client::{AcoustIdClient, LookupConfig, LookupError};
pub use content_hasher::{ContentHasher, HashError};
pub use file_scanner::{FileScanner, FileWalk, ScanError, ScanResult};
pub use fingerprinter::{FingerprintOutcome, Fingerprinter};
pub use hash_deduplicator::{find_duplicates, HashDeduplicator};
pub use metadata_extractor::{MetadataError, MetadataExtractor};
pub use report_generator::{ReportError, ReportFormat, ReportGenerator};
pub use scan_orchestrator::ScanOrchestrator;
