//! Control actions: `-prune` sets the visit's action without
//! touching the quit flag; `-quit`/`-exit` are `never_returns` nodes — they
//! always set `state.quit` (checked by
//! [`crate::node::Node::dispatch`]'s `debug_assert!`s).

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::Action;

pub fn eval_prune(_node: &Node, state: &mut EvalState) -> bool {
    state.action = Action::Prune;
    true
}

pub fn eval_quit(_node: &Node, state: &mut EvalState) -> bool {
    state.action = Action::Stop;
    state.quit = true;
    true
}

pub fn eval_exit(node: &Node, state: &mut EvalState) -> bool {
    state.exit_status.set_exit_code(node.operand.exit_code);
    state.action = Action::Stop;
    state.quit = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::node::{Classification, NodeKind, Operand};
    use crate::race::SharedExitStatus;
    use crate::visit::{Phase, StatFlags, TypeTag, VisitRecord};
    use std::path::PathBuf;

    fn state_fixture<'a>(
        visit: &'a VisitRecord,
        config: &'a Config,
        status: &'a SharedExitStatus,
    ) -> EvalState<'a> {
        EvalState::new(visit, config, status)
    }

    #[test]
    fn quit_sets_the_quit_flag_and_stop_action() {
        let visit = VisitRecord::new(
            PathBuf::from("/t"),
            PathBuf::from("/t"),
            0,
            None,
            "t".to_string(),
            TypeTag::Directory,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = state_fixture(&visit, &config, &status);
        let node = Node::leaf(NodeKind::Quit, Classification::default(), Operand::default());
        assert!(eval_quit(&node, &mut state));
        assert!(state.quit);
        assert_eq!(state.action, Action::Stop);
    }

    #[test]
    fn exit_pins_the_process_exit_code() {
        let visit = VisitRecord::new(
            PathBuf::from("/t"),
            PathBuf::from("/t"),
            0,
            None,
            "t".to_string(),
            TypeTag::Directory,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = state_fixture(&visit, &config, &status);
        let mut operand = Operand::default();
        operand.exit_code = 3;
        let node = Node::leaf(NodeKind::Exit, Classification::default(), operand);
        assert!(eval_exit(&node, &mut state));
        assert!(state.quit);
        assert_eq!(status.code(), 3);
    }

    #[test]
    fn prune_sets_action_without_quitting() {
        let visit = VisitRecord::new(
            PathBuf::from("/t"),
            PathBuf::from("/t"),
            0,
            None,
            "t".to_string(),
            TypeTag::Directory,
            Phase::Pre,
            None,
            StatFlags { default_follow: false },
        );
        let config = Config::minimal();
        let status = SharedExitStatus::new();
        let mut state = state_fixture(&visit, &config, &status);
        let node = Node::leaf(NodeKind::Prune, Classification::default(), Operand::default());
        assert!(eval_prune(&node, &mut state));
        assert!(!state.quit);
        assert_eq!(state.action, Action::Prune);
    }
}
