//! CLI bootstrap - the composition root.
//!
//! Reads the environment once, resolves where buddy lives (the directory
//! `buddy-run` is invoked from, unless overridden), and wires the launcher
//! together. Nothing outside this module touches the process
//! environment.

use anyhow::{Context, Result, bail};
use buddy_launch_runtime::config::PROJECT_DIR_VAR;
use buddy_launch_runtime::{Forwarding, InvocationRequest, LaunchEnv, LaunchSettings, Launcher};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit code for startup configuration failures (`EX_CONFIG`).
pub const CONFIG_ERROR_EXIT_CODE: i32 = 78;

/// Environment variable holding the launcher's own log filter.
pub const LOG_FILTER_VAR: &str = "BUDDY_LAUNCH_LOG";

/// Bootstrap configuration for the launcher.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub env: LaunchEnv,
    pub settings: LaunchSettings,
}

impl CliConfig {
    /// Read the process environment, defaulting to the current directory.
    pub fn from_env() -> Result<Self> {
        Self::resolve(LaunchEnv::from_env(), &default_project_dir()?)
    }

    /// Resolve settings for `env` and check the project directory exists.
    pub fn resolve(env: LaunchEnv, default_project_dir: &Path) -> Result<Self> {
        let settings = LaunchSettings::resolve(&env, default_project_dir);

        if !settings.project_dir.is_dir() {
            bail!(
                "buddy project directory not found: {}\n\nSet {PROJECT_DIR_VAR} to the directory containing buddy's Cargo.toml.",
                settings.project_dir.display()
            );
        }

        debug!(
            project_dir = %settings.project_dir.display(),
            build_tool = %settings.build_tool.to_string_lossy(),
            "Resolved launch settings"
        );

        Ok(Self { env, settings })
    }
}

/// Directory the launcher was invoked from.
pub fn default_project_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the current directory")
}

/// Hand control to the artifact the way the platform allows.
pub const fn default_forwarding() -> Forwarding {
    #[cfg(unix)]
    {
        Forwarding::Replace
    }
    #[cfg(not(unix))]
    {
        Forwarding::Spawn
    }
}

/// Run the whole pipeline and return the exit code for this process.
pub fn run(request: &InvocationRequest) -> i32 {
    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return CONFIG_ERROR_EXIT_CODE;
        }
    };

    let launcher =
        Launcher::new(config.settings, config.env).with_forwarding(default_forwarding());

    match launcher.run(request) {
        Ok(code) => code,
        Err(err) => {
            debug!("Launch failed: {err:?}");
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

/// Initialize logging to stderr, filtered by `BUDDY_LAUNCH_LOG` (default: warn).
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_env(LOG_FILTER_VAR)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok(); // Ignore error if already initialized
}
