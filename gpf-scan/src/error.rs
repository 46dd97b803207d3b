//! Error types for gpf-scan
//!
//! Per-service errors live next to their service. This module holds the
//! run-level error: the only failures that stop a scan and produce exit
//! code 1.

use crate::services::acoustid_client::LookupError;
use crate::services::file_scanner::ScanError;
use crate::services::report_generator::ReportError;
use thiserror::Error;

/// Run-terminating errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Root folder missing or unreadable
    #[error(transparent)]
    Scan(ScanError),

    /// Interrupted before the report was produced
    #[error("Scan cancelled")]
    Cancelled,

    /// Report could not be rendered or written
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Pipeline components could not be constructed
    #[error("Failed to initialize scan: {0}")]
    Setup(String),
}

impl From<ScanError> for PipelineError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Scan(other),
        }
    }
}

impl From<LookupError> for PipelineError {
    fn from(e: LookupError) -> Self {
        PipelineError::Setup(e.to_string())
    }
}

/// Result alias for run-level operations
pub type PipelineResult<T> = Result<T, PipelineError>;
