//! Error types for the build-and-launch pipeline.
//!
//! Every variant here is fatal for the launcher and surfaces to the invoking
//! environment as a process exit code. Conditions that are handled locally
//! (a missing GPU query utility, an undetermined architecture) never become
//! a `LaunchError`.

use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when the build succeeded but the artifact is absent (`EX_NOINPUT`).
pub const ARTIFACT_MISSING_EXIT_CODE: i32 = 66;

/// Exit code used when a process could not be started at all (`EX_OSERR`).
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 71;

/// Errors that end a launch before (or instead of) the artifact running.
#[derive(Debug, Error)]
pub enum LaunchError {
    // === Build ===
    /// The build tool ran and returned a non-zero status.
    #[error("Build failed (exit code: {code})")]
    BuildFailed {
        /// The build tool's own exit code, passed through unchanged.
        code: i32,
    },

    /// The build tool could not be started.
    #[error("Failed to run build tool '{}': {source}", .program.to_string_lossy())]
    BuildSpawn {
        program: OsString,
        #[source]
        source: std::io::Error,
    },

    /// The project directory could not be entered for the build.
    #[error("Failed to enter project directory {}: {source}", .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Artifact ===
    /// The build reported success but produced nothing at the expected path.
    #[error(
        "buddy executable not found at: {}\n\nThe build finished successfully but did not produce the expected artifact.",
        .path.display()
    )]
    ArtifactMissing { path: PathBuf },

    /// The artifact exists but could not be executed.
    #[error("Failed to execute {}: {source}", .path.display())]
    ForwardSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Map the error to the launcher's process exit code.
    ///
    /// - `BuildFailed`: the build tool's own code
    /// - `ArtifactMissing`: 66 (`EX_NOINPUT`)
    /// - anything that failed to spawn: 71 (`EX_OSERR`)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed { code } => *code,
            Self::ArtifactMissing { .. } => ARTIFACT_MISSING_EXIT_CODE,
            Self::BuildSpawn { .. } | Self::WorkingDirectory { .. } | Self::ForwardSpawn { .. } => {
                SPAWN_FAILURE_EXIT_CODE
            }
        }
    }
}

/// Result type alias for launch operations.
pub type LaunchResult<T> = Result<T, LaunchError>;
