//! Comparison predicates: `-size`, `-mtime`/`-atime`/`-ctime`,
//! `-links`, `-inum`, `-uid`, `-gid`. Shares one dispatch body keyed by the
//! node's `stat_field` operand.

use crate::eval::EvalState;
use crate::node::{Node, StatField};
use crate::size_util::round_up;
use crate::time_util::diff_in_unit;

pub fn eval(node: &Node, state: &mut EvalState) -> bool {
    let field = node
        .operand
        .stat_field
        .expect("comparison node must have a stat_field");
    let mode = node
        .operand
        .compare_mode
        .expect("comparison node must have a compare_mode");

    // Depth is a property of the visit itself, not of a `stat` call; skip
    // the stat entirely rather than querying metadata nothing needs.
    if field == StatField::Depth {
        return mode.matches(state.visit.depth as i64, node.operand.int_comparand);
    }

    let Some(stat) = super::stat_or_report(state, None) else {
        return false;
    };

    let actual: i64 = match field {
        StatField::Size => {
            let unit = node.operand.size_unit.unwrap_or(crate::size_util::SizeUnit::Blocks512);
            round_up(stat.size, unit) as i64
        }
        StatField::Links => stat.nlink as i64,
        StatField::Inum => stat.ino as i64,
        StatField::Uid => stat.uid as i64,
        StatField::Gid => stat.gid as i64,
        StatField::Atime | StatField::Mtime | StatField::Ctime => {
            let reference = node.operand.reference_time.unwrap_or_else(crate::node::now_reference);
            let stat_time = match field {
                StatField::Atime => stat.atime,
                StatField::Mtime => stat.mtime,
                StatField::Ctime => stat.ctime,
                _ => unreachable!(),
            };
            let unit = node.operand.time_unit.unwrap_or(crate::time_util::TimeUnit::Days);
            diff_in_unit(reference, stat_time, unit)
        }
        StatField::Depth => unreachable!("handled above"),
    };

    mode.matches(actual, node.operand.int_comparand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::node::{Classification, CompareMode, NodeKind, Operand};
    use crate::race::SharedExitStatus;
    use crate::visit::{Phase, StatFlags, TypeTag, VisitRecord};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn size_rounds_up_to_the_configured_unit() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, vec![0u8; 1025]).unwrap();

        let visit = VisitRecord::new(
            file.clone(),
            dir.path().to_path_buf(),
            1,
            None,
            file.file_name().unwrap().to_string_lossy().into_owned(),
            TypeTag::Regular,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = EvalState::new(&visit, &config, &status);

        let mut operand = Operand::default();
        operand.stat_field = Some(StatField::Size);
        operand.compare_mode = Some(CompareMode::Equal);
        operand.size_unit = Some(crate::size_util::SizeUnit::KiB);
        operand.int_comparand = 2; // ceil(1025/1024) == 2
        let node = Node::leaf(NodeKind::Comparison, Classification::default(), operand);

        assert!(eval(&node, &mut state));
    }
}
