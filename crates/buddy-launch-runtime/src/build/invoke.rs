//! Build tool invocation.

use super::select::BuildConfiguration;
use super::workdir::WorkingDirGuard;
use crate::config::{COMPUTE_CAP_EXPORT_VAR, DEFAULT_BUILD_TOOL};
use crate::error::{LaunchError, LaunchResult};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Runs `cargo build --release` (or a substitute tool) for a configuration.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    program: OsString,
}

impl BuildInvoker {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build inside `working_dir` and return the tool's raw exit status.
    ///
    /// The process working directory is switched for the duration of the
    /// call and restored on every exit path. A non-zero status is returned,
    /// not turned into an error; only failing to start the tool is an error.
    /// A relative tool path is resolved against the caller's directory,
    /// before the switch.
    pub fn build(&self, config: &BuildConfiguration, working_dir: &Path) -> LaunchResult<ExitStatus> {
        info!(
            "Building buddy with {} support in {}",
            config.display_name(),
            working_dir.display()
        );

        let program = resolve_program(&self.program).map_err(|source| LaunchError::BuildSpawn {
            program: self.program.clone(),
            source,
        })?;

        let _cwd = WorkingDirGuard::enter(working_dir).map_err(|source| {
            LaunchError::WorkingDirectory {
                path: working_dir.to_path_buf(),
                source,
            }
        })?;

        let mut cmd = command_for(&program, config);
        debug!("Running {:?}", cmd);

        let status = cmd.status().map_err(|source| LaunchError::BuildSpawn {
            program: self.program.clone(),
            source,
        })?;

        debug!("Build tool exited with {status}");
        Ok(status)
    }

    /// The build command for `config`, without a working directory set.
    pub fn command(&self, config: &BuildConfiguration) -> Command {
        command_for(&self.program, config)
    }
}

fn command_for(program: &OsStr, config: &BuildConfiguration) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(build_args(config));

    // The architecture reaches the nested nvcc step only through the environment
    match config.architecture_id() {
        Some(arch) => {
            cmd.env(COMPUTE_CAP_EXPORT_VAR, arch);
        }
        None => {
            cmd.env_remove(COMPUTE_CAP_EXPORT_VAR);
        }
    }

    cmd
}

/// Pin a relative tool path like `./tools/cargo` to the current directory.
/// Bare names are left to the `PATH` lookup.
fn resolve_program(program: &OsStr) -> io::Result<OsString> {
    let path = Path::new(program);
    if path.is_absolute() || path.components().count() < 2 {
        return Ok(program.to_os_string());
    }
    std::path::absolute(path).map(PathBuf::into_os_string)
}

impl Default for BuildInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_TOOL)
    }
}

/// `build --release [--features a,b]`
pub fn build_args(config: &BuildConfiguration) -> Vec<String> {
    let mut args = vec!["build".to_string(), "--release".to_string()];
    if !config.feature_flags().is_empty() {
        args.push("--features".to_string());
        args.push(config.feature_flags().join(","));
    }
    args
}
