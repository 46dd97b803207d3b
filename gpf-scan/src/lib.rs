//! gpf-scan library interface
//!
//! Exposes the scan pipeline for the binary and for integration tests.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::ScanConfig;
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::models::ScanReport;
pub use crate::services::{ReportFormat, ReportGenerator, ScanOrchestrator};
