//! `nvidia-smi` backed capability detection.

use super::CapabilityDetector;
use std::ffi::OsString;
use std::process::Command;
use tracing::{debug, warn};

/// Default GPU query utility.
pub const NVIDIA_SMI: &str = "nvidia-smi";

/// Query for the compute capability column only, one GPU per line.
const QUERY_ARGS: [&str; 2] = ["--query-gpu=compute_cap", "--format=csv,noheader"];

/// Detects compute capability by running `nvidia-smi` once.
#[derive(Debug, Clone)]
pub struct NvidiaSmiDetector {
    program: OsString,
}

impl NvidiaSmiDetector {
    pub fn new() -> Self {
        Self::with_program(NVIDIA_SMI)
    }

    /// Use a specific query utility instead of `nvidia-smi` from `PATH`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NvidiaSmiDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityDetector for NvidiaSmiDetector {
    fn detect(&self) -> Option<String> {
        let program = match which::which(&self.program) {
            Ok(path) => path,
            Err(e) => {
                debug!(
                    "{} not available ({e}), assuming no NVIDIA GPU",
                    self.program.to_string_lossy()
                );
                return None;
            }
        };

        let output = match Command::new(&program).args(QUERY_ARGS).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to run {}: {e}", program.display());
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} exited with {}, assuming no NVIDIA GPU",
                program.display(),
                output.status
            );
            return None;
        }

        parse_compute_capability(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Take the first numeric-looking line of query output.
///
/// A line qualifies if, once trimmed, it starts with a digit and holds only
/// digits and dots. Headers, `N/A` and `[Not Supported]` are skipped.
pub fn parse_compute_capability(output: &str) -> Option<String> {
    let mut capabilities = output
        .lines()
        .map(str::trim)
        .filter(|line| is_numeric_capability(line));

    let first = capabilities.next()?;

    let ignored: Vec<&str> = capabilities.filter(|other| *other != first).collect();
    if !ignored.is_empty() {
        warn!(
            "Multiple GPUs with differing compute capability detected, targeting {first} (ignoring {})",
            ignored.join(", ")
        );
    }

    Some(first.to_string())
}

fn is_numeric_capability(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit())
        && line.chars().all(|c| c.is_ascii_digit() || c == '.')
}
