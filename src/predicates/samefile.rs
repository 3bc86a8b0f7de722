//! `-samefile`: true iff the visited entry's `(dev, ino)` matches a
//! reference pair captured from the argument file at parse time.

use crate::eval::EvalState;
use crate::node::Node;

pub fn eval(node: &Node, state: &mut EvalState) -> bool {
    let Some((dev, ino)) = node.operand.samefile else {
        return false;
    };
    let Some(stat) = super::stat_or_report(state, None) else {
        return false;
    };
    stat.dev == dev && stat.ino == ino
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::node::{Classification, NodeKind, Operand};
    use crate::race::SharedExitStatus;
    use crate::visit::{Phase, StatFlags, TypeTag, VisitRecord};
    use tempfile::tempdir;

    #[test]
    fn matches_only_the_same_device_and_inode() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        let meta = std::fs::metadata(&file).unwrap();
        use std::os::unix::fs::MetadataExt;

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

        let mut operand = Operand::default();
        operand.samefile = Some((meta.dev(), meta.ino()));
        let node = Node::leaf(NodeKind::Samefile, Classification::default(), operand);
        assert!(eval(&node, &mut state));

        let mut mismatched = Operand::default();
        mismatched.samefile = Some((meta.dev(), meta.ino().wrapping_add(1)));
        let node2 = Node::leaf(NodeKind::Samefile, Classification::default(), mismatched);
        assert!(!eval(&node2, &mut state));
    }
}
