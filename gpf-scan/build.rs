//! Build script for gpf-scan
//!
//! Exposes build identification to `--version`:
//! - `GIT_HASH`: short commit, suffixed `-dirty` for uncommitted changes.
//!   `GPF_BUILD_HASH` overrides it for builds outside a git checkout.
//! - `BUILD_PROFILE`: debug/release

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn build_hash() -> String {
    if let Ok(hash) = std::env::var("GPF_BUILD_HASH") {
        if !hash.trim().is_empty() {
            return hash.trim().to_string();
        }
    }

    match git(&["rev-parse", "--short=8", "HEAD"]).filter(|h| !h.is_empty()) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if dirty {
                format!("{}-dirty", hash)
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", build_hash());
    println!(
        "cargo:rustc-env=BUILD_PROFILE={}",
        std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string())
    );
}
