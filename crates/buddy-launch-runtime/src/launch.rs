//! Build-then-run pipeline.
//!
//! `Launcher::run` is linear with an early exit at each step:
//! 1. probe the GPU (opt-in only), select features, run the build
//! 2. verify the artifact exists at its fixed path
//! 3. forward the original arguments to it and report its exit code

use crate::build::{BuildInvoker, Selection, describe_architecture, select};
use crate::config::{COMPUTE_CAP_EXPORT_VAR, LaunchEnv, LaunchSettings};
use crate::error::{LaunchError, LaunchResult};
use crate::gpu::{CapabilityDetector, CapabilitySignal, NvidiaSmiDetector, probe};
use crate::process::exit_code_of;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Arguments to hand to the artifact, captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationRequest {
    argv: Vec<OsString>,
}

impl InvocationRequest {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Every argument of this process except the program name.
    pub fn from_env() -> Self {
        Self::new(std::env::args_os().skip(1))
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }
}

/// Result of the single existence check on the built executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableArtifact {
    path: PathBuf,
    exists: bool,
}

impl ExecutableArtifact {
    pub fn inspect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = path.is_file();
        Self { path, exists }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn exists(&self) -> bool {
        self.exists
    }
}

/// How control is handed to the artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Forwarding {
    /// Spawn the artifact, wait, and return its exit code.
    #[default]
    Spawn,
    /// Replace the current process image. Only returns on failure.
    #[cfg(unix)]
    Replace,
}

/// Builds buddy and forwards execution to it.
pub struct Launcher<D = NvidiaSmiDetector> {
    settings: LaunchSettings,
    env: LaunchEnv,
    detector: D,
    forwarding: Forwarding,
}

impl Launcher<NvidiaSmiDetector> {
    /// Launcher probing the GPU with `nvidia-smi`.
    pub fn new(settings: LaunchSettings, env: LaunchEnv) -> Self {
        Self::with_detector(settings, env, NvidiaSmiDetector::new())
    }
}

impl<D: CapabilityDetector> Launcher<D> {
    pub fn with_detector(settings: LaunchSettings, env: LaunchEnv, detector: D) -> Self {
        Self {
            settings,
            env,
            detector,
            forwarding: Forwarding::Spawn,
        }
    }

    #[must_use]
    pub fn with_forwarding(mut self, forwarding: Forwarding) -> Self {
        self.forwarding = forwarding;
        self
    }

    /// Probe (when the opt-in path needs it) and decide the build configuration.
    pub fn select_configuration(&self) -> Selection {
        let env = &self.env;

        // Only the opt-in path without an override ever looks at the probe
        let signal = if env.cuda_opt_in && env.arch_override.is_none() {
            probe(&self.detector)
        } else {
            CapabilitySignal::empty()
        };

        let selection = select(
            env.cuda_opt_in,
            env.toolkit_path_present(),
            &signal,
            env.arch_override.as_deref(),
        );

        if let Some(warning) = &selection.warning {
            warn!("{warning}");
        }
        if let Some(arch) = selection.config.architecture_id() {
            match describe_architecture(arch) {
                Some(target) => info!("Targeting {target} ({COMPUTE_CAP_EXPORT_VAR}={arch})"),
                None => info!("Targeting compute capability {arch} ({COMPUTE_CAP_EXPORT_VAR}={arch})"),
            }
        }

        selection
    }

    /// Build, verify, and forward. Returns the artifact's exit code.
    pub fn run(&self, request: &InvocationRequest) -> LaunchResult<i32> {
        let selection = self.select_configuration();

        let status = BuildInvoker::new(self.settings.build_tool.clone())
            .build(&selection.config, &self.settings.project_dir)?;
        if !status.success() {
            return Err(LaunchError::BuildFailed {
                code: exit_code_of(status),
            });
        }

        let artifact = ExecutableArtifact::inspect(self.settings.artifact_path());
        if !artifact.exists() {
            return Err(LaunchError::ArtifactMissing {
                path: artifact.path,
            });
        }

        self.forward(&artifact, request)
    }

    fn forward(&self, artifact: &ExecutableArtifact, request: &InvocationRequest) -> LaunchResult<i32> {
        let mut cmd = Command::new(artifact.path());
        cmd.args(request.argv());
        debug!(
            "Forwarding {} argument(s) to {}",
            request.argv().len(),
            artifact.path().display()
        );

        let spawn_error = |source| LaunchError::ForwardSpawn {
            path: artifact.path().to_path_buf(),
            source,
        };

        match self.forwarding {
            Forwarding::Spawn => {
                let status = cmd.status().map_err(spawn_error)?;
                Ok(exit_code_of(status))
            }
            #[cfg(unix)]
            Forwarding::Replace => {
                use std::os::unix::process::CommandExt;
                Err(spawn_error(cmd.exec()))
            }
        }
    }
}
