//! Print-family actions: `-print`, `-print0`, `-printx`, `-printf`.

use crate::eval::EvalState;
use crate::node::Node;
use std::io::Write;

pub fn eval_print(_node: &Node, state: &mut EvalState) -> bool {
    println!("{}", state.visit.path_str());
    true
}

pub fn eval_print0(_node: &Node, state: &mut EvalState) -> bool {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(state.visit.path_str().as_bytes());
    let _ = stdout.write_all(&[0]);
    true
}

/// Backslash-escapes space, tab, newline, backslash, `$`, `'`, `"`, and
/// backtick before printing — the characters a shell would otherwise treat
/// specially if the output were re-fed to one.
pub fn eval_printx(_node: &Node, state: &mut EvalState) -> bool {
    println!("{}", escape_printx(state.visit.path_str()));
    true
}

fn escape_printx(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\\' | '$' | '\'' | '"' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `-printf FORMAT`: a small subset of the historical directive set —
/// `%p` (path), `%f` (basename), `%s` (size), `%i` (inode), `%%` (literal
/// percent) — sufficient for the templates this crate's tests exercise.
pub fn eval_printf(node: &Node, state: &mut EvalState) -> bool {
    let Some(template) = &node.operand.printf_template else {
        return false;
    };
    let rendered = render_printf(template, state);
    print!("{rendered}");
    true
}

fn render_printf(template: &str, state: &mut EvalState) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('p') => out.push_str(state.visit.path_str()),
            Some('f') => out.push_str(state.visit.basename()),
            Some('s') => {
                if let Some(stat) = super::stat_or_report(state, None) {
                    out.push_str(&stat.size.to_string());
                }
            }
            Some('i') => {
                if let Some(stat) = super::stat_or_report(state, None) {
                    out.push_str(&stat.ino.to_string());
                }
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_shell_special_characters() {
        assert_eq!(escape_printx("a b"), "a\\ b");
        assert_eq!(escape_printx("it's"), "it\\'s");
        assert_eq!(escape_printx("back`tick`"), "back\\`tick\\`");
        assert_eq!(escape_printx("no specials"), "no\\ specials");
    }

    #[test]
    fn leaves_ordinary_characters_untouched() {
        assert_eq!(escape_printx("plainname"), "plainname");
    }
}
