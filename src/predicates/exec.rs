//! `-exec`/`-execdir`: per-file invocation substitutes `{}`
//! directly; batched invocation (`+` terminator) defers to the shared
//! [`ExecBatch`], flushed at thresholds and again at traversal end via
//! [`crate::node::Node::finish`].

use crate::eval::EvalState;
use crate::node::{ExecMode, Node};
use std::process::Command;

pub fn eval(node: &Node, state: &mut EvalState) -> bool {
    match node.operand.exec_mode {
        Some(ExecMode::PerFile) => eval_per_file(node, state),
        Some(ExecMode::Batched) => eval_batched(node, state),
        None => false,
    }
}

fn eval_per_file(node: &Node, state: &mut EvalState) -> bool {
    let path = state.visit.path_str();
    let argv: Vec<String> = node
        .operand
        .exec_argv
        .iter()
        .map(|arg| if arg == "{}" { path.to_string() } else { arg.clone() })
        .collect();

    let Some((program, rest)) = argv.split_first() else {
        return false;
    };

    match Command::new(program).args(rest).status() {
        Ok(status) => status.success(),
        Err(e) => {
            crate::race::report_message(path, &format!("exec failed: {e}"), state.exit_status);
            false
        }
    }
}

fn eval_batched(node: &Node, state: &mut EvalState) -> bool {
    let Some(batch) = &node.operand.exec_batch else {
        return false;
    };
    let mut batch = batch.lock().unwrap();
    match batch.push(state.visit.path_str()) {
        Ok(()) => true,
        Err(e) => {
            crate::race::report_message(
                state.visit.path_str(),
                &format!("exec batch push failed: {e}"),
                state.exit_status,
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::exec_batch::ExecBatch;
    use crate::node::{Classification, NodeKind, Operand};
    use crate::race::SharedExitStatus;
    use crate::visit::{Phase, StatFlags, TypeTag, VisitRecord};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn per_file_substitutes_placeholder_and_runs() {
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

        let mut operand = Operand::default();
        operand.exec_mode = Some(ExecMode::PerFile);
        operand.exec_argv = vec!["true".to_string(), "{}".to_string()];
        let node = Node::leaf(NodeKind::Exec, Classification::default(), operand);

        assert!(eval(&node, &mut state));
    }

    #[test]
    fn batched_mode_accumulates_without_launching() {
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

        let mut operand = Operand::default();
        operand.exec_mode = Some(ExecMode::Batched);
        operand.exec_batch = Some(Mutex::new(ExecBatch::new(vec!["true".to_string(), "{}".to_string()])));
        let node = Node::leaf(NodeKind::Exec, Classification::default(), operand);

        assert!(eval(&node, &mut state));
    }
}
