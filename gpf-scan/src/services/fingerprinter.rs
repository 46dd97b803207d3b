//! Acoustic fingerprinting via the external `fpcalc` tool
//!
//! Runs `fpcalc -json <file>` (Chromaprint) and parses
//! `{"duration": <secs>, "fingerprint": "<opaque>"}` from stdout.
//!
//! Every failure mode is a value, never an error:
//! - binary missing or not executable → [`FingerprintOutcome::Unavailable`]
//! - non-zero exit, timeout, unparseable output → [`FingerprintOutcome::Failed`]
//!
//! The child is spawned with `kill_on_drop`, so a timeout or a cancelled
//! scan never leaves a running `fpcalc` behind.

use crate::models::FingerprintResult;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default executable name (resolved via PATH)
pub const DEFAULT_FPCALC: &str = "fpcalc";

/// Default upper bound on a single run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of one fingerprinting attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FingerprintOutcome {
    /// Tool ran and produced a fingerprint
    Computed(FingerprintResult),
    /// Tool could not be started
    Unavailable(String),
    /// Tool started but produced no usable result
    Failed(String),
}

impl FingerprintOutcome {
    /// The fingerprint, if one was computed
    pub fn into_result(self) -> Option<FingerprintResult> {
        match self {
            FingerprintOutcome::Computed(result) => Some(result),
            _ => None,
        }
    }
}

/// `fpcalc` subprocess wrapper
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    binary_path: PathBuf,
    timeout: Duration,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(DEFAULT_FPCALC),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a specific `fpcalc` executable
    pub fn with_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Set per-file timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Fingerprint one audio file
    pub async fn fingerprint_file(&self, audio_path: &Path) -> FingerprintOutcome {
        tracing::debug!(
            binary = %self.binary_path.display(),
            file = %audio_path.display(),
            "Running fpcalc"
        );

        let child = Command::new(&self.binary_path)
            .arg("-json")
            .arg(audio_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return FingerprintOutcome::Unavailable(format!(
                    "{}: {}",
                    self.binary_path.display(),
                    e
                ));
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return FingerprintOutcome::Failed(format!("I/O error: {}", e)),
            Err(_) => {
                return FingerprintOutcome::Failed(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return FingerprintOutcome::Failed(format!(
                "Exit code: {:?}, stderr: {}",
                output.status.code(),
                stderr.trim()
            ));
        }

        match parse_fpcalc_output(&output.stdout) {
            Some(result) => {
                tracing::debug!(
                    file = %audio_path.display(),
                    duration = result.duration,
                    fingerprint_len = result.fingerprint.len(),
                    "Fingerprint computed"
                );
                FingerprintOutcome::Computed(result)
            }
            None => FingerprintOutcome::Failed("unparseable fpcalc output".to_string()),
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `fpcalc -json` stdout
///
/// Returns `None` for malformed JSON or an empty fingerprint.
pub fn parse_fpcalc_output(stdout: &[u8]) -> Option<FingerprintResult> {
    let text = String::from_utf8_lossy(stdout);
    let result: FingerprintResult = serde_json::from_str(text.trim()).ok()?;
    if result.fingerprint.is_empty() || !result.duration.is_finite() {
        return None;
    }
    Some(result)
}
