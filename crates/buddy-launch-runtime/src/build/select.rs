//! Build feature selection.
//!
//! Pure decision logic: given the environment signals and an already-taken
//! probe, decide whether to enable CUDA and which architecture to pin.

use crate::gpu::CapabilitySignal;
use std::fmt;

/// Cargo feature that enables GPU code paths in buddy.
pub const CUDA_FEATURE: &str = "cuda";

/// Characters removed when compacting a compute capability.
const ARCH_SEPARATORS: [char; 3] = ['.', '_', '-'];

/// Decided build configuration. Immutable once selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfiguration {
    acceleration_enabled: bool,
    architecture_id: Option<String>,
    feature_flags: Vec<String>,
}

impl BuildConfiguration {
    /// CPU-only configuration.
    pub fn cpu() -> Self {
        Self::default()
    }

    pub const fn acceleration_enabled(&self) -> bool {
        self.acceleration_enabled
    }

    /// Architecture identifier to export, e.g. `"86"`.
    pub fn architecture_id(&self) -> Option<&str> {
        self.architecture_id.as_deref()
    }

    /// Cargo features to enable, in order.
    pub fn feature_flags(&self) -> &[String] {
        &self.feature_flags
    }

    /// Name used in progress output.
    pub const fn display_name(&self) -> &'static str {
        if self.acceleration_enabled { "CUDA" } else { "CPU" }
    }
}

/// Non-fatal selection diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionWarning {
    /// Acceleration is on but no architecture could be pinned; the build
    /// falls back to its own default targeting.
    ArchitectureUndetermined {
        /// Acceleration came from `CUDA_PATH` alone, which never probes.
        toolkit_only: bool,
    },
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArchitectureUndetermined { toolkit_only: true } => write!(
                f,
                "CUDA enabled via CUDA_PATH but no architecture pinned; set BUDDY_CUDA_ARCH to target a specific GPU"
            ),
            Self::ArchitectureUndetermined {
                toolkit_only: false,
            } => write!(
                f,
                "CUDA enabled but GPU compute capability could not be detected; building for the default architecture"
            ),
        }
    }
}

/// Selected configuration plus any diagnostic raised while choosing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub config: BuildConfiguration,
    pub warning: Option<SelectionWarning>,
}

/// Decide the build configuration.
///
/// 1. Acceleration is enabled by either `opt_in` or `toolkit_path_present`.
/// 2. An explicit architecture wins verbatim.
/// 3. Otherwise, only the opt-in path consults the probe signal, normalized.
/// 4. Acceleration without an architecture yields a warning, not a failure.
pub fn select(
    opt_in: bool,
    toolkit_path_present: bool,
    signal: &CapabilitySignal,
    explicit_arch: Option<&str>,
) -> Selection {
    let acceleration_enabled = opt_in || toolkit_path_present;
    if !acceleration_enabled {
        return Selection {
            config: BuildConfiguration::cpu(),
            warning: None,
        };
    }

    let architecture_id = match explicit_arch {
        Some(arch) => Some(arch.to_string()),
        None if opt_in => signal
            .raw()
            .map(normalize_architecture)
            .filter(|arch| !arch.is_empty()),
        None => None,
    };

    let warning = architecture_id
        .is_none()
        .then_some(SelectionWarning::ArchitectureUndetermined {
            toolkit_only: !opt_in,
        });

    Selection {
        config: BuildConfiguration {
            acceleration_enabled,
            architecture_id,
            feature_flags: vec![CUDA_FEATURE.to_string()],
        },
        warning,
    }
}

/// Compact a compute capability: `"8.6"` becomes `"86"`.
///
/// Idempotent; only separator characters are removed.
pub fn normalize_architecture(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !ARCH_SEPARATORS.contains(c))
        .collect()
}

/// Human-readable target for well-known architecture identifiers.
pub fn describe_architecture(arch: &str) -> Option<&'static str> {
    match arch {
        "75" => Some("SM 7.5 (RTX 20xx, T4, Quadro RTX)"),
        "80" => Some("SM 8.0 (A100, A30)"),
        "86" => Some("SM 8.6 (RTX 30xx, A40, RTX A2000-A6000)"),
        "89" => Some("SM 8.9 (RTX 40xx, L4, L40)"),
        "90" => Some("SM 9.0 (H100, H200, GH200)"),
        "100" => Some("SM 10.0 (B200, GB200)"),
        "120" => Some("SM 12.0 (RTX 50xx, RTX PRO Blackwell)"),
        _ => None,
    }
}
