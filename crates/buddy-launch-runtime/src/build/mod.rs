//! Build configuration and invocation for buddy.

mod invoke;
mod select;
mod workdir;

pub use invoke::{BuildInvoker, build_args};
pub use select::{
    BuildConfiguration, CUDA_FEATURE, Selection, SelectionWarning, describe_architecture,
    normalize_architecture, select,
};
pub use workdir::WorkingDirGuard;
