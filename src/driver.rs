//! The evaluation driver: the function the traversal engine calls
//! once per visit. Everything here runs before/around the expression tree
//! itself — `-unique` consultation, xargs-safety, depth gating, phase
//! selection — the tree only sees step 6.

use crate::config::Config;
use crate::eval::EvalState;
use crate::identity::IdentitySet;
use crate::node::Node;
use crate::race::SharedExitStatus;
use crate::visit::{Action, Phase, VisitRecord};

/// Characters that make a path unsafe to hand to `xargs` unquoted (
/// step 3): space, tab, newline, and the quoting/escaping characters
/// themselves.
const XARGS_UNSAFE: &[char] = &[' ', '\t', '\n', '\'', '"', '\\'];

pub struct Driver<'a> {
    root: &'a Node,
    config: &'a Config,
    identity: &'a IdentitySet,
    exit_status: &'a SharedExitStatus,
}

impl<'a> Driver<'a> {
    pub fn new(
        root: &'a Node,
        config: &'a Config,
        identity: &'a IdentitySet,
        exit_status: &'a SharedExitStatus,
    ) -> Self {
        Driver {
            root,
            config,
            identity,
            exit_status,
        }
    }

    /// Runs the full sequence for one visit, returning the action to
    /// report back to the traversal engine.
    pub fn visit(&self, visit: &VisitRecord) -> Action {
        // Step 1: a visit record carrying its own error (type = error) is
        // never evaluated against the tree; it is reported and pruned.
        if let Some(err) = &visit.error {
            let suppressed = crate::race::report_error(
                visit.path_str(),
                err,
                visit.depth,
                self.config.ignore_races,
                self.exit_status,
            );
            let _ = suppressed;
            return Action::Prune;
        }

        // Step 2: `-unique` consultation, pre-order only.
        if self.config.unique && visit.phase == Phase::Pre {
            if let Ok(stat) = visit.stat_default() {
                if !self.identity.insert_if_new(stat.dev, stat.ino) {
                    return self.finish_visit(visit, Action::Prune);
                }
            }
        }

        // Step 3: xargs-safety check.
        if self.config.xargs_safe && visit.path_str().chars().any(|c| XARGS_UNSAFE.contains(&c)) {
            crate::race::report_message(
                visit.path_str(),
                "path is not safe to pass to xargs",
                self.exit_status,
            );
            return Action::Prune;
        }

        let mut action = Action::Continue;

        // Step 4: maxdepth pruning (post-order visits still occur).
        if self.config.maxdepth < 0 || visit.depth as i64 >= self.config.maxdepth {
            action = Action::Prune;
        }

        // Step 5: expected visit phase.
        let expects_post = self.config.depth
            && (self.config.strategy == crate::config::Strategy::IterativeDeepening
                || visit.type_tag == crate::visit::TypeTag::Directory)
            && (visit.depth as i64) < self.config.maxdepth;
        let expected_phase = if expects_post { Phase::Post } else { Phase::Pre };

        // Step 6: evaluate the root expression iff the phase matches and
        // the visit is within [mindepth, maxdepth].
        if visit.phase == expected_phase
            && visit.depth >= self.config.mindepth
            && (visit.depth as i64) <= self.config.maxdepth
        {
            let mut state = EvalState::new(visit, self.config, self.exit_status);
            self.root.dispatch(&mut state);
            if state.action == Action::Prune {
                action = Action::Prune;
            }
            if state.quit {
                action = Action::Stop;
            }
        }

        // Step 7: debug tracing.
        self.trace(visit);

        // Step 8: return the accumulated action.
        action
    }

    fn finish_visit(&self, visit: &VisitRecord, action: Action) -> Action {
        self.trace(visit);
        action
    }

    fn trace(&self, visit: &VisitRecord) {
        if self.config.debug.search {
            log::debug!(
                "SEARCH path={} depth={} phase={:?} type={:?}",
                visit.path_str(),
                visit.depth,
                visit.phase,
                visit.type_tag
            );
        }
        if self.config.debug.stat {
            log::debug!("STAT path={} default_stat_queried", visit.path_str());
        }
    }

    /// Per-node rate dump for the `RATES` debug channel, called once after
    /// traversal ends.
    pub fn dump_rates(&self) {
        if !self.config.debug.rates {
            return;
        }
        Self::dump_rates_node(self.root, 0);
    }

    fn dump_rates_node(node: &Node, depth: usize) {
        log::info!(
            "{:indent$}evaluations={} successes={} elapsed={}.{:09}s",
            "",
            node.counters.evaluations.get(),
            node.counters.successes.get(),
            node.counters.elapsed_secs.get(),
            node.counters.elapsed_nanos.get(),
            indent = depth * 2
        );
        if let Some(left) = &node.left {
            Self::dump_rates_node(left, depth + 1);
        }
        if let Some(right) = &node.right {
            Self::dump_rates_node(right, depth + 1);
        }
    }
}
