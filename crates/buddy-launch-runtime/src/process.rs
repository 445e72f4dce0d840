//! Exit status helpers shared by the build and forwarding steps.

use std::process::ExitStatus;

/// Fallback when a status carries neither a code nor a signal.
const UNKNOWN_STATUS_EXIT_CODE: i32 = 1;

/// Convert a child's exit status into the code this process should exit with.
///
/// Signal terminations map to `128 + signal`, as a shell would report them.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_STATUS_EXIT_CODE
}
