//! Mode predicate: three comparison policies against `mode & 07777`.
//! Directories use `dir_mode`; everything else uses `file_mode`.
//!
//! `MODE_ANY` collapses to `true` when `target == 0` — consistent with
//! historical `find(1)` but surprising; this is deliberate, not a bug
//!.

use crate::eval::EvalState;
use crate::node::{ModeCompare, Node};
use crate::visit::TypeTag;

const PERM_MASK: u32 = 0o7777;

pub fn eval(node: &Node, state: &mut EvalState) -> bool {
    let Some(stat) = super::stat_or_report(state, None) else {
        return false;
    };

    let is_dir = stat.type_tag() == TypeTag::Directory;
    let target = if is_dir {
        node.operand.dir_mode.or(node.operand.file_mode)
    } else {
        node.operand.file_mode
    };
    let Some(target) = target else {
        return false;
    };

    let mode = stat.mode & PERM_MASK;
    let compare = node.operand.mode_compare.unwrap_or(ModeCompare::Exact);
    match compare {
        ModeCompare::Exact => mode == target,
        ModeCompare::All => mode & target == target,
        ModeCompare::Any => {
            if target == 0 {
                true
            } else {
                mode & target != 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_policy_collapses_to_true_when_target_is_zero() {
        assert!(matches_any(0o644, 0));
    }

    #[test]
    fn any_policy_matches_overlapping_bits() {
        assert!(matches_any(0o644, 0o600));
        assert!(!matches_any(0o644, 0o100));
    }

    #[test]
    fn all_policy_requires_every_bit() {
        assert!(matches_all(0o777, 0o755));
        assert!(!matches_all(0o744, 0o755));
    }

    fn matches_any(mode: u32, target: u32) -> bool {
        if target == 0 {
            true
        } else {
            mode & target != 0
        }
    }

    fn matches_all(mode: u32, target: u32) -> bool {
        mode & target == target
    }
}
