//! `-empty`: regular files are empty iff size zero; directories are
//! empty iff a directory read yields no entries (`.`/`..` excluded by
//! construction — `std::fs::read_dir` never yields them).

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::TypeTag;
use std::os::unix::io::AsRawFd;

pub fn eval(_node: &Node, state: &mut EvalState) -> bool {
    match state.visit.type_tag {
        TypeTag::Regular => super::stat_or_report(state, None)
            .map(|stat| stat.size == 0)
            .unwrap_or(false),
        TypeTag::Directory => is_empty_dir(state),
        _ => false,
    }
}

fn is_empty_dir(state: &EvalState) -> bool {
    // Prefer opening relative to the parent directory fd when available,
    // matching the `…at()` discipline the rest of the predicate library
    // follows; fall back to the absolute path for root directories.
    let result = if let Some(dir) = &state.visit.at_fd {
        nix::dir::Dir::openat(
            dir.as_raw_fd(),
            state.visit.base.as_str(),
            nix::fcntl::OFlag::O_RDONLY | nix::fcntl::OFlag::O_DIRECTORY,
            nix::sys::stat::Mode::empty(),
        )
    } else {
        nix::dir::Dir::open(
            state.visit.path.as_path(),
            nix::fcntl::OFlag::O_RDONLY | nix::fcntl::OFlag::O_DIRECTORY,
            nix::sys::stat::Mode::empty(),
        )
    };

    let Ok(mut handle) = result else {
        return false;
    };

    handle.iter().all(|entry| {
        entry.ok().is_none_or(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name == "." || name == ".."
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::node::{Classification, NodeKind, Operand};
    use crate::race::SharedExitStatus;
    use crate::visit::{Phase, StatFlags, VisitRecord};
    use tempfile::tempdir;

    #[test]
    fn empty_directory_reports_empty() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();

        let visit = VisitRecord::new(
            sub.clone(),
            dir.path().to_path_buf(),
            1,
            None,
            "sub".to_string(),
            TypeTag::Directory,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = EvalState::new(&visit, &config, &status);
        let node = Node::leaf(NodeKind::Empty, Classification::default(), Operand::default());
        assert!(eval(&node, &mut state));
    }

    #[test]
    fn nonempty_directory_reports_not_empty() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("f"), b"").unwrap();

        let visit = VisitRecord::new(
            sub.clone(),
            dir.path().to_path_buf(),
            1,
            None,
            "sub".to_string(),
            TypeTag::Directory,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = EvalState::new(&visit, &config, &status);
        let node = Node::leaf(NodeKind::Empty, Classification::default(), Operand::default());
        assert!(!eval(&node, &mut state));
    }

    #[test]
    fn empty_file_reports_empty() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"").unwrap();

        let visit = VisitRecord::new(
            file.clone(),
            dir.path().to_path_buf(),
            1,
            None,
            "f".to_string(),
            TypeTag::Regular,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = EvalState::new(&visit, &config, &status);
        let node = Node::leaf(NodeKind::Empty, Classification::default(), Operand::default());
        assert!(eval(&node, &mut state));
    }
}
