//! Boolean combinators: `not`, `and`, `or`, `comma`. Short-circuit and
//! quit propagation are strict — the right child is invoked iff the left
//! did not determine the result and the quit flag is not set.

use crate::eval::EvalState;
use crate::node::Node;

pub fn eval_not(node: &Node, state: &mut EvalState) -> bool {
    let child = node
        .right
        .as_ref()
        .expect("Not node must have a right child");
    !child.dispatch(state)
}

pub fn eval_and(node: &Node, state: &mut EvalState) -> bool {
    let left = node.left.as_ref().expect("And node must have a left child");
    let right = node
        .right
        .as_ref()
        .expect("And node must have a right child");

    if !left.dispatch(state) {
        return false;
    }
    if state.quit {
        return false;
    }
    right.dispatch(state)
}

pub fn eval_or(node: &Node, state: &mut EvalState) -> bool {
    let left = node.left.as_ref().expect("Or node must have a left child");
    let right = node
        .right
        .as_ref()
        .expect("Or node must have a right child");

    if left.dispatch(state) {
        return true;
    }
    if state.quit {
        return false;
    }
    right.dispatch(state)
}

pub fn eval_comma(node: &Node, state: &mut EvalState) -> bool {
    let left = node
        .left
        .as_ref()
        .expect("Comma node must have a left child");
    let right = node
        .right
        .as_ref()
        .expect("Comma node must have a right child");

    let _ = left.dispatch(state);
    if state.quit {
        return false;
    }
    right.dispatch(state)
}
