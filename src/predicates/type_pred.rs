//! Type predicates: `-type` masks the visit's own type tag;
//! `-xtype` inverts the follow/nofollow policy before requesting the type.

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::TypeTag;

pub fn type_bit(tag: TypeTag) -> u32 {
    match tag {
        TypeTag::Block => 1 << 0,
        TypeTag::Char => 1 << 1,
        TypeTag::Directory => 1 << 2,
        TypeTag::Door => 1 << 3,
        TypeTag::Fifo => 1 << 4,
        TypeTag::Symlink => 1 << 5,
        TypeTag::Port => 1 << 6,
        TypeTag::Regular => 1 << 7,
        TypeTag::Socket => 1 << 8,
        TypeTag::Whiteout => 1 << 9,
        TypeTag::Unknown => 1 << 10,
        TypeTag::Error => 0,
    }
}

pub fn eval_type(node: &Node, state: &mut EvalState) -> bool {
    type_bit(state.visit.type_tag) & node.operand.type_bits != 0
}

/// `-xtype`: request the type with the follow policy inverted from the
/// visit's default.
pub fn eval_xtype(node: &Node, state: &mut EvalState) -> bool {
    let invert_follow = !state.visit.stat_flags.default_follow;
    let Some(stat) = super::stat_or_report(state, Some(invert_follow)) else {
        return false;
    };
    type_bit(stat.type_tag()) & node.operand.type_bits != 0
}
