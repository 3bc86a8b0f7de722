//! `-delete`: unlinks the visited entry after confirming it isn't
//! `.` — removing the node's own root would leave the traversal standing
//! on nothing — and routes directories through `AT_REMOVEDIR`.

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::TypeTag;
use nix::unistd::{unlinkat, UnlinkatFlags};
use std::os::unix::io::AsRawFd;

pub fn eval(_node: &Node, state: &mut EvalState) -> bool {
    if state.visit.base == "." {
        crate::race::report_message(
            state.visit.path_str(),
            "refusing to delete '.'",
            state.exit_status,
        );
        return false;
    }

    let flags = if state.visit.type_tag == TypeTag::Directory {
        UnlinkatFlags::RemoveDir
    } else {
        UnlinkatFlags::NoRemoveDir
    };

    let dir_fd = state.visit.at_fd.as_ref().map(|f| f.as_raw_fd());
    let result = match dir_fd {
        Some(fd) => unlinkat(Some(fd), state.visit.base.as_str(), flags),
        None => unlinkat(None, state.visit.path.as_path(), flags),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            let stat_error = crate::errors::StatError {
                message: e.to_string(),
                raw_os_error: Some(e as i32),
            };
            crate::race::report_error(
                state.visit.path_str(),
                &stat_error,
                state.visit.depth,
                state.config.ignore_races,
                state.exit_status,
            );
            false
        }
    }
}
