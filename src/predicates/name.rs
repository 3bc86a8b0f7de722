//! Name-family predicates: `-name`, `-path`, `-lname`, `-regex`.

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::basename_no_trailing_slash;
use std::ffi::CString;

/// `fnmatch(3)`, the real POSIX glob matcher (bracket ranges, backslash
/// escapes, `*`/`?`), invoked via FFI rather than reimplemented — the same
/// "reach for `libc`'s raw binding" discipline as the xattr/ACL lookups in
/// [`super::access`]. Patterns or candidates with embedded NULs can't match
/// anything, matching `fnmatch`'s own C-string contract.
fn fnmatch(pattern: &str, candidate: &str, case_insensitive: bool) -> bool {
    let Ok(c_pattern) = CString::new(pattern) else {
        return false;
    };
    let Ok(c_candidate) = CString::new(candidate) else {
        return false;
    };
    let flags = if case_insensitive { libc::FNM_CASEFOLD } else { 0 };
    let rc = unsafe { libc::fnmatch(c_pattern.as_ptr(), c_candidate.as_ptr(), flags) };
    rc == 0
}

pub fn eval_name(node: &Node, state: &mut EvalState) -> bool {
    let pattern = node.operand.string_operand.as_deref().unwrap_or("");
    let basename = basename_no_trailing_slash(state.visit.path.as_path());
    fnmatch(pattern, &basename, node.operand.case_insensitive)
}

pub fn eval_path(node: &Node, state: &mut EvalState) -> bool {
    let pattern = node.operand.string_operand.as_deref().unwrap_or("");
    fnmatch(pattern, state.visit.path_str(), node.operand.case_insensitive)
}

pub fn eval_lname(node: &Node, state: &mut EvalState) -> bool {
    let pattern = node.operand.string_operand.as_deref().unwrap_or("");
    let Ok(target) = std::fs::read_link(&state.visit.path) else {
        return false;
    };
    fnmatch(pattern, &target.to_string_lossy(), node.operand.case_insensitive)
}

/// Full-string anchored regex match: accepted only if the match
/// spans the entire candidate, offsets `0..len`.
pub fn eval_regex(node: &Node, state: &mut EvalState) -> bool {
    let Some(regex) = &node.operand.regex else {
        return false;
    };
    match regex.find(state.visit.path_str()) {
        Some(m) => m.start() == 0 && m.end() == state.visit.path_str().len(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        assert!(fnmatch("*.log", "x.log", false));
        assert!(!fnmatch("*.log", "x.tmp", false));
    }

    #[test]
    fn question_mark_matches_single_char() {
        assert!(fnmatch("a?c", "abc", false));
        assert!(!fnmatch("a?c", "abbc", false));
    }

    #[test]
    fn character_class_matches_including_ranges() {
        assert!(fnmatch("[ab]x", "ax", false));
        assert!(fnmatch("[ab]x", "bx", false));
        assert!(!fnmatch("[ab]x", "cx", false));
        assert!(fnmatch("[!ab]x", "cx", false));
        assert!(fnmatch("[a-c]x", "bx", false));
    }

    #[test]
    fn case_insensitive_flag_folds_case() {
        assert!(fnmatch("*.LOG", "x.log", true));
        assert!(!fnmatch("*.LOG", "x.log", false));
    }

    #[test]
    fn regex_requires_full_string_anchored_match() {
        let re = regex::Regex::new("a").unwrap();
        assert!(re.find("a").map(|m| m.start() == 0 && m.end() == 1).unwrap_or(false));
        // "ab" and "xa" must not match per the anchored-match requirement,
        // even though the pattern matches a substring of each.
        let m_ab = re.find("ab").unwrap();
        assert!(!(m_ab.start() == 0 && m_ab.end() == "ab".len()));
        let m_xa = re.find("xa").unwrap();
        assert!(!(m_xa.start() == 0 && m_xa.end() == "xa".len()));
    }
}
