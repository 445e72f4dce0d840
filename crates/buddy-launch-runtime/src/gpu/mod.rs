//! GPU compute capability probing.
//!
//! The probe is the only part of the pipeline that talks to the GPU driver
//! stack. It sits behind [`CapabilityDetector`] so feature selection and the
//! launcher can be exercised with a fake detector.

mod nvidia;

pub use nvidia::{NvidiaSmiDetector, parse_compute_capability};

/// Source of a raw compute capability string.
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityDetector {
    /// Return the raw compute capability (e.g. `"8.6"`), or `None` if no GPU
    /// could be queried. Absence and query failure are indistinguishable.
    fn detect(&self) -> Option<String>;
}

/// Outcome of a single probe. Consumed once by feature selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySignal {
    raw_compute_capability: Option<String>,
}

impl CapabilitySignal {
    /// A signal carrying `raw`.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw_compute_capability: Some(raw.into()),
        }
    }

    /// The "no GPU detected" signal.
    pub const fn empty() -> Self {
        Self {
            raw_compute_capability: None,
        }
    }

    /// The raw capability string, if one was obtained.
    pub fn raw(&self) -> Option<&str> {
        self.raw_compute_capability.as_deref()
    }

    pub const fn is_empty(&self) -> bool {
        self.raw_compute_capability.is_none()
    }
}

impl From<Option<String>> for CapabilitySignal {
    fn from(raw: Option<String>) -> Self {
        Self {
            raw_compute_capability: raw,
        }
    }
}

/// Run `detector` exactly once and wrap the result.
pub fn probe(detector: &dyn CapabilityDetector) -> CapabilitySignal {
    let signal = CapabilitySignal::from(detector.detect());
    match signal.raw() {
        Some(raw) => tracing::debug!("Detected GPU compute capability {raw}"),
        None => tracing::debug!("No GPU compute capability detected"),
    }
    signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_wraps_detected_value() {
        let mut detector = MockCapabilityDetector::new();
        detector
            .expect_detect()
            .times(1)
            .returning(|| Some("7.5".to_string()));

        let signal = probe(&detector);
        assert_eq!(signal.raw(), Some("7.5"));
    }

    #[test]
    fn test_probe_absent_gpu_is_empty_signal() {
        let mut detector = MockCapabilityDetector::new();
        detector.expect_detect().times(1).returning(|| None);

        let signal = probe(&detector);
        assert!(signal.is_empty());
        assert_eq!(signal, CapabilitySignal::empty());
    }
}
