//! # Gig Preflight Common Library
//!
//! Shared code for the preflight tools:
//! - Error type used across crates
//! - TOML configuration loading
//! - AcoustID API key resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
