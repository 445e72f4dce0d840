//! Build orchestration and launch for buddy.
//!
//! Detects whether a CUDA build is wanted, pins the GPU architecture when it
//! can, runs `cargo build --release` with the matching features, and then
//! hands the original command line to the produced `buddy` executable.
//!
//! ```rust,no_run
//! use buddy_launch_runtime::{InvocationRequest, LaunchEnv, LaunchSettings, Launcher};
//!
//! let env = LaunchEnv::from_env();
//! let settings = LaunchSettings::resolve(&env, std::path::Path::new("."));
//! let code = match Launcher::new(settings, env).run(&InvocationRequest::from_env()) {
//!     Ok(code) => code,
//!     Err(err) => err.exit_code(),
//! };
//! std::process::exit(code);
//! ```
#![deny(unsafe_code)]

pub mod build;
pub mod config;
pub mod error;
pub mod gpu;
pub mod launch;
pub mod process;

pub use build::{BuildConfiguration, BuildInvoker, Selection, SelectionWarning, select};
pub use config::{LaunchEnv, LaunchSettings};
pub use error::{ARTIFACT_MISSING_EXIT_CODE, LaunchError, LaunchResult, SPAWN_FAILURE_EXIT_CODE};
pub use gpu::{CapabilityDetector, CapabilitySignal, NvidiaSmiDetector, probe};
pub use launch::{ExecutableArtifact, Forwarding, InvocationRequest, Launcher};
