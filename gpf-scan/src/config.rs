//! Scan configuration
//!
//! Built once in `main` from command-line arguments and the TOML config,
//! then passed explicitly into the orchestrator. Nothing below reads the
//! environment.

use crate::services::acoustid_client::{LookupConfig, DEFAULT_REQUESTS_PER_SECOND};
use crate::services::fingerprinter::{DEFAULT_FPCALC, DEFAULT_TIMEOUT};
use gpf_common::config::{resolve_acoustid_api_key, TomlConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on concurrent fingerprint + lookup tasks
pub const DEFAULT_LOOKUP_JOBS: usize = 4;

/// Everything a single scan run needs
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root folder to scan
    pub root: PathBuf,
    /// Run fingerprint + remote lookup for files missing metadata
    pub fingerprint: bool,
    /// Concurrent digest / metadata tasks
    pub jobs: usize,
    /// Concurrent fingerprint / lookup tasks
    pub lookup_jobs: usize,
    /// `fpcalc` executable
    pub fpcalc_path: PathBuf,
    /// Upper bound on one `fpcalc` run
    pub fingerprint_timeout: Duration,
    /// Remote lookup settings (`api_key: None` disables lookups)
    pub lookup: LookupConfig,
}

impl ScanConfig {
    /// Defaults for everything except the root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fingerprint: false,
            jobs: default_jobs(),
            lookup_jobs: DEFAULT_LOOKUP_JOBS,
            fpcalc_path: PathBuf::from(DEFAULT_FPCALC),
            fingerprint_timeout: DEFAULT_TIMEOUT,
            lookup: LookupConfig::disabled(),
        }
    }

    /// Apply TOML settings and resolve the API key
    ///
    /// Values set here are later overridden by explicit CLI flags.
    pub fn with_toml(mut self, toml_config: &TomlConfig) -> Self {
        if let Some(path) = &toml_config.fpcalc_path {
            self.fpcalc_path = path.clone();
        }
        if let Some(secs) = toml_config.fingerprint_timeout_secs {
            self.fingerprint_timeout = Duration::from_secs(secs.max(1));
        }
        self.lookup.requests_per_second = toml_config
            .lookup_requests_per_second
            .unwrap_or(DEFAULT_REQUESTS_PER_SECOND);
        self.lookup.api_key = resolve_acoustid_api_key(toml_config);
        self
    }

    pub fn with_fingerprint(mut self, enabled: bool) -> Self {
        self.fingerprint = enabled;
        self
    }

    /// Set digest/metadata concurrency (minimum 1)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set fingerprint/lookup concurrency (minimum 1)
    pub fn with_lookup_jobs(mut self, jobs: usize) -> Self {
        self.lookup_jobs = jobs.max(1);
        self
    }
}

/// Available parallelism, or 4 if it cannot be determined
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
