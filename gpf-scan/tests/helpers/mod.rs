//! Test Helper Utilities
//!
//! Shared utilities for testing gpf-scan

#![allow(dead_code, unused_imports)]

pub mod audio_generator;
pub mod fake_services;

// Re-export commonly used items
pub use audio_generator::{generate_tagged_wav, generate_test_wav, write_file, AudioConfig};
#[cfg(unix)]
pub use fake_services::fake_fpcalc;
pub use fake_services::{single_match_body, spawn_mock_acoustid, MockAcoustId};
