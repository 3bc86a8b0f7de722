//! Access / ACL / xattr / capability predicates. Each is a ternary
//! syscall wrapper (true / false / error) routed through the race policy —
//! none of these "fail" the overall run on their own; they report through
//! [`super::stat_or_report`]'s sibling, [`report_syscall_error`], and fall
//! through to `false`.

use crate::eval::EvalState;
use crate::node::Node;
use nix::unistd::{self, AccessFlags};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

fn report_syscall_error(state: &EvalState, err: nix::Error) {
    let stat_error = crate::errors::StatError {
        message: err.to_string(),
        raw_os_error: Some(err as i32),
    };
    crate::race::report_error(
        state.visit.path_str(),
        &stat_error,
        state.visit.depth,
        state.config.ignore_races,
        state.exit_status,
    );
}

/// `-readable`/`-writable`/`-executable` family: `node.operand.file_mode`
/// carries the requested `AccessFlags` bits, encoded by the parser.
pub fn eval_access(node: &Node, state: &mut EvalState) -> bool {
    let Some(requested) = node.operand.file_mode else {
        return false;
    };
    let Some(flags) = AccessFlags::from_bits(requested as i32) else {
        return false;
    };
    match unistd::access(state.visit.path.as_path(), flags) {
        Ok(()) => true,
        Err(nix::Error::EACCES) => false,
        Err(e) => {
            report_syscall_error(state, e);
            false
        }
    }
}

/// Linux stores a POSIX ACL as the `system.posix_acl_access` extended
/// attribute; `-acl` is true iff that attribute is present.
pub fn eval_acl(_node: &Node, state: &mut EvalState) -> bool {
    has_xattr(state, "system.posix_acl_access")
}

/// `-xattr`: true iff the file carries any extended attribute at all.
pub fn eval_xattr(_node: &Node, state: &mut EvalState) -> bool {
    match listxattr_len(state.visit.path.as_path()) {
        Ok(len) => len > 0,
        Err(errno) => {
            report_xattr_errno(state, errno);
            false
        }
    }
}

/// Linux file capabilities live in the `security.capability` extended
/// attribute; `-capable` is true iff it is set.
pub fn eval_capability(_node: &Node, state: &mut EvalState) -> bool {
    has_xattr(state, "security.capability")
}

fn has_xattr(state: &mut EvalState, name: &str) -> bool {
    match getxattr_present(state.visit.path.as_path(), name) {
        Ok(present) => present,
        Err(errno) => {
            report_xattr_errno(state, errno);
            false
        }
    }
}

fn report_xattr_errno(state: &EvalState, errno: i32) {
    // ENODATA/ENOTSUP mean "attribute absent" or "filesystem doesn't
    // support xattrs at all" — both are normal `false` outcomes, not
    // errors worth surfacing.
    if errno == libc::ENODATA || errno == libc::ENOTSUP {
        return;
    }
    report_syscall_error(state, nix::Error::from_i32(errno));
}

fn listxattr_len(path: &std::path::Path) -> Result<usize, i32> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| libc::EINVAL)?;
    let len = unsafe { libc::listxattr(c_path.as_ptr(), std::ptr::null_mut(), 0) };
    if len < 0 {
        Err(std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO))
    } else {
        Ok(len as usize)
    }
}

fn getxattr_present(path: &std::path::Path, name: &str) -> Result<bool, i32> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| libc::EINVAL)?;
    let c_name = CString::new(name).map_err(|_| libc::EINVAL)?;
    let len = unsafe { libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), std::ptr::null_mut(), 0) };
    if len >= 0 {
        Ok(true)
    } else {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
        if errno == libc::ENODATA {
            Ok(false)
        } else {
            Err(errno)
        }
    }
}
