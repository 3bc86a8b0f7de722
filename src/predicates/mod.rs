//! Concrete predicate and action implementations. Every function
//! here has the shape `fn(&Node, &mut EvalState) -> bool` and is reached
//! through [`crate::node::Node::dispatch`].

pub mod access;
pub mod comparison;
pub mod control;
pub mod delete;
pub mod empty;
pub mod exec;
pub mod ls;
pub mod mode;
pub mod name;
pub mod newer;
pub mod print;
pub mod samefile;
pub mod type_pred;

use crate::errors::StatError;
use crate::eval::EvalState;
use crate::visit::{Follow, Stat};

/// The single helper through which metadata-needing predicates request a
/// `stat`: honors the visit's default follow policy, and on failure
/// routes the error through the race-aware reporter, returning `None` so
/// the caller can fall through to `false` without itself touching the
/// exit-status cell.
pub fn stat_or_report(state: &EvalState, follow: Option<bool>) -> Option<Stat> {
    let follow = match follow {
        Some(f) => {
            if f {
                Follow::Yes
            } else {
                Follow::No
            }
        }
        None => {
            if state.visit.stat_flags.default_follow {
                Follow::Yes
            } else {
                Follow::No
            }
        }
    };

    match state.visit.stat(follow) {
        Ok(stat) => Some(stat),
        Err(err) => {
            report(state, &err);
            None
        }
    }
}

fn report(state: &EvalState, err: &StatError) {
    crate::race::report_error(
        state.visit.path_str(),
        err,
        state.visit.depth,
        state.config.ignore_races,
        state.exit_status,
    );
}
