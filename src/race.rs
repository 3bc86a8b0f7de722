//! Race-aware error policy and the shared exit-status cell.

use crate::errors::StatError;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// The exit-status cell: begins at success, mutated by any error path or
/// `-exit`. `Send + Sync` so the traversal engine and the driver
/// can share it without extra locking machinery.
pub struct SharedExitStatus {
    failed: AtomicBool,
    exit_code: AtomicI32,
}

impl SharedExitStatus {
    pub fn new() -> Self {
        SharedExitStatus {
            failed: AtomicBool::new(false),
            exit_code: AtomicI32::new(0),
        }
    }

    pub fn mark_failure(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    /// `-exit N` additionally pins the process exit code to N.
    pub fn set_exit_code(&self, code: i32) {
        self.exit_code.store(code, Ordering::SeqCst);
    }

    /// The overall process exit status is success iff no error was
    /// recorded AND no `-exit` action supplied a nonzero status.
    pub fn code(&self) -> i32 {
        let explicit = self.exit_code.load(Ordering::SeqCst);
        if explicit != 0 {
            explicit
        } else if self.failed.load(Ordering::SeqCst) {
            1
        } else {
            0
        }
    }
}

impl Default for SharedExitStatus {
    fn default() -> Self {
        SharedExitStatus::new()
    }
}

/// Applies the race policy to an error encountered while stat'ing
/// or otherwise syscall-ing a path at the given depth. Returns `true` if
/// the error was suppressed (no message, no exit-status mutation).
pub fn report_error(path: &str, error: &StatError, depth: u32, ignore_races: bool, exit_status: &SharedExitStatus) -> bool {
    if ignore_races && error.is_nonexistence() && depth > 0 {
        return true;
    }
    eprintln!("{}: {}", path.red(), error);
    exit_status.mark_failure();
    false
}

/// Same policy, for a plain message rather than a structured [`StatError`]
/// (e.g. xargs-safety diagnostics, which are never suppressed by the race
/// policy since they are not filesystem races).
pub fn report_message(path: &str, message: &str, exit_status: &SharedExitStatus) {
    eprintln!("{}: {}", path.red(), message);
    exit_status.mark_failure();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonexistence() -> StatError {
        StatError {
            message: "No such file or directory".to_string(),
            raw_os_error: Some(libc::ENOENT),
        }
    }

    #[test]
    fn suppresses_nonexistence_at_depth_above_root_when_ignoring_races() {
        let status = SharedExitStatus::new();
        let suppressed = report_error("/t/a/b", &nonexistence(), 1, true, &status);
        assert!(suppressed);
        assert_eq!(status.code(), 0);
    }

    #[test]
    fn never_suppresses_at_the_root() {
        let status = SharedExitStatus::new();
        let suppressed = report_error("/t", &nonexistence(), 0, true, &status);
        assert!(!suppressed);
        assert_eq!(status.code(), 1);
    }

    #[test]
    fn exit_code_wins_over_plain_failure() {
        let status = SharedExitStatus::new();
        status.mark_failure();
        status.set_exit_code(7);
        assert_eq!(status.code(), 7);
    }
}
