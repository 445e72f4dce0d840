//! Launch configuration read once from the environment.
//!
//! Recognized variables:
//!
//! | Variable | Effect |
//! |---|---|
//! | `BUDDY_CUDA` | `1` opts in to CUDA acceleration; any other value is ignored |
//! | `CUDA_PATH` | presence alone enables acceleration, whatever its value |
//! | `BUDDY_CUDA_ARCH` | pins the architecture identifier verbatim, skipping the probe |
//! | `BUDDY_PROJECT_DIR` | project root to build instead of the current directory |
//! | `CARGO` | build tool to run instead of `cargo` |

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Acceleration opt-in flag.
pub const CUDA_OPT_IN_VAR: &str = "BUDDY_CUDA";
/// CUDA toolkit installation path.
pub const CUDA_TOOLKIT_PATH_VAR: &str = "CUDA_PATH";
/// Explicit architecture override.
pub const CUDA_ARCH_OVERRIDE_VAR: &str = "BUDDY_CUDA_ARCH";
/// Project directory override.
pub const PROJECT_DIR_VAR: &str = "BUDDY_PROJECT_DIR";
/// Build tool override (cargo's own convention).
pub const BUILD_TOOL_VAR: &str = "CARGO";

/// Variable exported to the build subprocess when an architecture is pinned.
pub const COMPUTE_CAP_EXPORT_VAR: &str = "CUDA_COMPUTE_CAP";

/// Default build tool.
pub const DEFAULT_BUILD_TOOL: &str = "cargo";
/// Name of the executable the build produces.
pub const ARTIFACT_NAME: &str = "buddy";

/// Environment signals that drive feature selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    /// `BUDDY_CUDA=1`
    pub cuda_opt_in: bool,
    /// Value of `CUDA_PATH`, if set at all.
    pub toolkit_path: Option<OsString>,
    /// Non-empty `BUDDY_CUDA_ARCH`.
    pub arch_override: Option<String>,
    /// `BUDDY_PROJECT_DIR`
    pub project_dir: Option<PathBuf>,
    /// `CARGO`
    pub build_tool: Option<OsString>,
}

impl LaunchEnv {
    /// Read the launch environment from the current process.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Read the launch environment through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let cuda_opt_in = match lookup(CUDA_OPT_IN_VAR) {
            Some(value) if value == "1" => true,
            Some(value) => {
                debug!(
                    "{CUDA_OPT_IN_VAR}={} is not \"1\", acceleration opt-in ignored",
                    value.to_string_lossy()
                );
                false
            }
            None => false,
        };

        let arch_override = lookup(CUDA_ARCH_OVERRIDE_VAR).and_then(|value| {
            let value = value.to_string_lossy().into_owned();
            if value.trim().is_empty() {
                debug!("{CUDA_ARCH_OVERRIDE_VAR} is empty, treating as unset");
                None
            } else {
                Some(value)
            }
        });

        Self {
            cuda_opt_in,
            toolkit_path: lookup(CUDA_TOOLKIT_PATH_VAR),
            arch_override,
            project_dir: lookup(PROJECT_DIR_VAR)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            build_tool: lookup(BUILD_TOOL_VAR).filter(|value| !value.is_empty()),
        }
    }

    /// True if `CUDA_PATH` is present.
    pub const fn toolkit_path_present(&self) -> bool {
        self.toolkit_path.is_some()
    }
}

/// Where to build and what to run afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    /// Build project root.
    pub project_dir: PathBuf,
    /// Build tool program.
    pub build_tool: OsString,
    /// Artifact path relative to `project_dir`.
    pub artifact_relative_path: PathBuf,
}

impl LaunchSettings {
    /// Settings for `project_dir` with the default build tool and artifact path.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            build_tool: OsString::from(DEFAULT_BUILD_TOOL),
            artifact_relative_path: default_artifact_relative_path(),
        }
    }

    /// Resolve settings from the environment, falling back to `default_project_dir`.
    pub fn resolve(env: &LaunchEnv, default_project_dir: &Path) -> Self {
        let mut settings = Self::new(
            env.project_dir
                .clone()
                .unwrap_or_else(|| default_project_dir.to_path_buf()),
        );
        if let Some(tool) = &env.build_tool {
            settings.build_tool.clone_from(tool);
        }
        settings
    }

    /// Use a different build tool.
    #[must_use]
    pub fn with_build_tool(mut self, tool: impl Into<OsString>) -> Self {
        self.build_tool = tool.into();
        self
    }

    /// Absolute location of the artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.project_dir.join(&self.artifact_relative_path)
    }
}

/// `target/release/buddy`, with the platform executable suffix.
pub fn default_artifact_relative_path() -> PathBuf {
    Path::new("target")
        .join("release")
        .join(format!("{ARTIFACT_NAME}{}", std::env::consts::EXE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> LaunchEnv {
        let vars: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(v)))
            .collect();
        LaunchEnv::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment() {
        let env = env_from(&[]);
        assert_eq!(env, LaunchEnv::default());
        assert!(!env.toolkit_path_present());
    }

    #[test]
    fn test_opt_in_requires_exact_one() {
        assert!(env_from(&[("BUDDY_CUDA", "1")]).cuda_opt_in);
        assert!(!env_from(&[("BUDDY_CUDA", "true")]).cuda_opt_in);
        assert!(!env_from(&[("BUDDY_CUDA", "0")]).cuda_opt_in);
        assert!(!env_from(&[("BUDDY_CUDA", " 1")]).cuda_opt_in);
    }

    #[test]
    fn test_toolkit_path_presence_ignores_value() {
        assert!(env_from(&[("CUDA_PATH", "/opt/cuda")]).toolkit_path_present());
        assert!(env_from(&[("CUDA_PATH", "")]).toolkit_path_present());
    }

    #[test]
    fn test_arch_override_verbatim_and_blank_ignored() {
        let env = env_from(&[("BUDDY_CUDA_ARCH", "sm_90a")]);
        assert_eq!(env.arch_override.as_deref(), Some("sm_90a"));

        let env = env_from(&[("BUDDY_CUDA_ARCH", "   ")]);
        assert_eq!(env.arch_override, None);
    }

    #[test]
    fn test_settings_resolution() {
        let env = env_from(&[("BUDDY_PROJECT_DIR", "/work/buddy"), ("CARGO", "/bin/cargo")]);
        let settings = LaunchSettings::resolve(&env, Path::new("/default"));
        assert_eq!(settings.project_dir, PathBuf::from("/work/buddy"));
        assert_eq!(settings.build_tool, OsString::from("/bin/cargo"));

        let settings = LaunchSettings::resolve(&LaunchEnv::default(), Path::new("/default"));
        assert_eq!(settings.project_dir, PathBuf::from("/default"));
        assert_eq!(settings.build_tool, OsString::from("cargo"));
    }

    #[test]
    fn test_artifact_path_is_fixed() {
        let settings = LaunchSettings::new("/repo");
        let expected = PathBuf::from("/repo")
            .join("target")
            .join("release")
            .join(format!("buddy{}", std::env::consts::EXE_SUFFIX));
        assert_eq!(settings.artifact_path(), expected);
    }
}
