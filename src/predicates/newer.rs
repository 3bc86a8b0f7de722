//! `-newer FILE`: true iff the visited entry's `mtime` is more recent than
//! a reference file's `mtime`, captured once at parse time (the same
//! "stat the reference argument eagerly" discipline as `-samefile`'s
//! `(dev, ino)` pair). Unlike `-mtime`/`-atime`/`-ctime`, the comparison is
//! an exact `(sec, nsec)` ordering — no unit conversion or day truncation.

use crate::eval::EvalState;
use crate::node::Node;

pub fn eval(node: &Node, state: &mut EvalState) -> bool {
    let Some(reference) = node.operand.reference_time else {
        return false;
    };
    let Some(stat) = super::stat_or_report(state, None) else {
        return false;
    };
    stat.mtime > reference
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
    fn true_only_when_strictly_newer_than_the_reference() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();

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

        let mut older_reference = Operand::default();
        older_reference.reference_time = Some((0, 0));
        let node = Node::leaf(NodeKind::Newer, Classification::default(), older_reference);
        assert!(eval(&node, &mut state));

        let mut future_reference = Operand::default();
        future_reference.reference_time = Some((i64::MAX, 0));
        let node2 = Node::leaf(NodeKind::Newer, Classification::default(), future_reference);
        assert!(!eval(&node2, &mut state));
    }
}
