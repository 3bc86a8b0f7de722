//! The argv expression parser: a small recursive-descent parser
//! over an already-shell-split `Vec<String>`, turning tests/operators into
//! a [`Node`] tree, plus the top-level [`Cli`] struct for roots and flags.

use crate::errors::ParseError;
use crate::exec_batch::ExecBatch;
use crate::node::{
    Classification, CompareMode, ExecMode, ModeCompare, Node, NodeKind, Operand, StatField,
};
use crate::size_util::SizeUnit;
use crate::time_util::TimeUnit;
use clap::Parser;
use std::sync::Mutex;

/// Top-level invocation: roots plus the engine/strategy flags that aren't
/// themselves expression tests (`-L`, `-mount`, `-xdev`, `-ignore_races`,
/// `-unique`, `-xargs_safe`, `-depth` as the bare traversal-order flag is
/// folded into the expression grammar below since it shares a name with the
/// `-depth N` comparand form).
#[derive(Parser, Debug)]
#[command(name = "bfind", about = "A POSIX find(1)-style evaluator")]
pub struct Cli {
    /// One or more root paths to traverse.
    #[arg(required = true)]
    pub roots: Vec<String>,

    #[arg(short = 'L', long = "follow")]
    pub logical: bool,

    /// Historical `-H`: follow symlinks named directly as root-path
    /// arguments, but not elsewhere during traversal.
    #[arg(short = 'H')]
    pub comfollow: bool,

    #[arg(long)]
    pub mount: bool,

    #[arg(long)]
    pub xdev: bool,

    #[arg(long = "ignore-races")]
    pub ignore_races: bool,

    #[arg(long = "xargs-safe")]
    pub xargs_safe: bool,

    /// The remaining expression tokens, collected verbatim.
    #[arg(last = true)]
    pub expr: Vec<String>,
}

struct Parser2<'a> {
    tokens: &'a [String],
    pos: usize,
    /// Set when the bare `-depth` traversal-order flag (arity 0) is seen,
    /// as opposed to the `-depth N` comparand form.
    depth_flag: bool,
}

/// Parses `tokens` (the expression portion of argv, after root paths and
/// engine flags) into an expression tree. Implicit `-a` is inserted
/// between adjacent tests with no explicit operator between them, matching
/// historical `find` grammar.
pub fn parse_expression(tokens: &[String]) -> Result<Node, ParseError> {
    parse_expression_full(tokens).map(|(node, _depth_flag)| node)
}

/// Like [`parse_expression`], but also reports whether the bare `-depth`
/// traversal-order flag appeared in the expression — that flag is a
/// side-effect on the traversal `Config` rather than something a `Node`
/// can express, so the caller (the top-level driver) needs it out of band.
pub fn parse_expression_full(tokens: &[String]) -> Result<(Node, bool), ParseError> {
    if tokens.is_empty() {
        return Ok((Node::leaf(NodeKind::True, Classification::default(), Operand::default()), false));
    }
    let mut p = Parser2 { tokens, pos: 0, depth_flag: false };
    let node = p.parse_comma()?;
    if p.pos != p.tokens.len() {
        return Err(ParseError::UnknownToken(p.tokens[p.pos].clone()));
    }
    Ok((node, p.depth_flag))
}

impl<'a> Parser2<'a> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) -> Option<String> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_comma(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_or()?;
        while self.peek() == Some(",") {
            self.advance();
            let right = self.parse_or()?;
            left = Node::combinator(NodeKind::Comma, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some("-o") | Some("-or")) {
            self.advance();
            let right = self.parse_and()?;
            left = Node::combinator(NodeKind::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_not()?;
        loop {
            match self.peek() {
                Some("-a") | Some("-and") => {
                    self.advance();
                    let right = self.parse_not()?;
                    left = Node::combinator(NodeKind::And, left, right);
                }
                // Implicit `-a`: another test/operand begins right away.
                Some(tok) if tok != ")" && tok != "," && tok != "-o" && tok != "-or" => {
                    let right = self.parse_not()?;
                    left = Node::combinator(NodeKind::And, left, right);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if matches!(self.peek(), Some("!") | Some("-not")) {
            self.advance();
            let child = self.parse_not()?;
            return Ok(Node::not(child));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some("(") => {
                self.advance();
                let inner = self.parse_comma()?;
                match self.advance().as_deref() {
                    Some(")") => Ok(inner),
                    _ => Err(ParseError::UnbalancedParens),
                }
            }
            Some(_) => self.parse_test(),
            None => Err(ParseError::EmptyExpression),
        }
    }

    fn require_operand(&mut self, flag: &str) -> Result<String, ParseError> {
        self.advance()
            .ok_or_else(|| ParseError::MissingArgument(flag.to_string()))
    }

    fn parse_test(&mut self) -> Result<Node, ParseError> {
        let flag = self.advance().expect("parse_test called with no token");
        match flag.as_str() {
            "-true" => Ok(Node::leaf(NodeKind::True, always_true(), Operand::default())),
            "-false" => Ok(Node::leaf(NodeKind::False, always_false(), Operand::default())),

            "-name" | "-iname" => {
                let pattern = self.require_operand(&flag)?;
                let mut operand = Operand::default();
                operand.string_operand = Some(pattern);
                operand.case_insensitive = flag == "-iname";
                Ok(Node::leaf(NodeKind::Name, Classification::default(), operand))
            }
            "-path" | "-ipath" => {
                let pattern = self.require_operand(&flag)?;
                let mut operand = Operand::default();
                operand.string_operand = Some(pattern);
                operand.case_insensitive = flag == "-ipath";
                Ok(Node::leaf(NodeKind::Path, Classification::default(), operand))
            }
            "-lname" | "-ilname" => {
                let pattern = self.require_operand(&flag)?;
                let mut operand = Operand::default();
                operand.string_operand = Some(pattern);
                operand.case_insensitive = flag == "-ilname";
                Ok(Node::leaf(NodeKind::Lname, Classification::default(), operand))
            }
            "-regex" => {
                let pattern = self.require_operand(&flag)?;
                let regex = regex::Regex::new(&pattern).map_err(|e| ParseError::BadRegex(pattern, e))?;
                let mut operand = Operand::default();
                operand.regex = Some(regex);
                Ok(Node::leaf(NodeKind::Regex, Classification::default(), operand))
            }

            "-type" | "-xtype" => {
                let spec = self.require_operand(&flag)?;
                let mut operand = Operand::default();
                operand.type_bits = type_bits_from_spec(&spec);
                let kind = if flag == "-type" { NodeKind::Type } else { NodeKind::Xtype };
                Ok(Node::leaf(kind, Classification::default(), operand))
            }

            "-size" => {
                let spec = self.require_operand(&flag)?;
                let (mode, value, unit) = parse_int_with_unit(&spec, &flag, SizeUnit::Blocks512, |c| SizeUnit::from_suffix(c))?;
                let mut operand = Operand::default();
                operand.stat_field = Some(StatField::Size);
                operand.compare_mode = Some(mode);
                operand.int_comparand = value;
                operand.size_unit = Some(unit);
                Ok(Node::leaf(NodeKind::Comparison, Classification::default(), operand))
            }

            "-mtime" | "-atime" | "-ctime" | "-mmin" | "-amin" | "-cmin" => {
                let spec = self.require_operand(&flag)?;
                let (mode, value) = parse_int_comparand(&spec, &flag)?;
                let (field, unit) = match flag.as_str() {
                    "-mtime" => (StatField::Mtime, TimeUnit::Days),
                    "-atime" => (StatField::Atime, TimeUnit::Days),
                    "-ctime" => (StatField::Ctime, TimeUnit::Days),
                    "-mmin" => (StatField::Mtime, TimeUnit::Minutes),
                    "-amin" => (StatField::Atime, TimeUnit::Minutes),
                    "-cmin" => (StatField::Ctime, TimeUnit::Minutes),
                    _ => unreachable!(),
                };
                let mut operand = Operand::default();
                operand.stat_field = Some(field);
                operand.compare_mode = Some(mode);
                operand.int_comparand = value;
                operand.time_unit = Some(unit);
                Ok(Node::leaf(NodeKind::Comparison, Classification::default(), operand))
            }

            "-links" | "-inum" | "-uid" | "-gid" => {
                let spec = self.require_operand(&flag)?;
                let (mode, value) = parse_int_comparand(&spec, &flag)?;
                let field = match flag.as_str() {
                    "-links" => StatField::Links,
                    "-inum" => StatField::Inum,
                    "-uid" => StatField::Uid,
                    "-gid" => StatField::Gid,
                    _ => unreachable!(),
                };
                let mut operand = Operand::default();
                operand.stat_field = Some(field);
                operand.compare_mode = Some(mode);
                operand.int_comparand = value;
                Ok(Node::leaf(NodeKind::Comparison, Classification::default(), operand))
            }

            "-perm" => {
                let spec = self.require_operand(&flag)?;
                let (compare, digits) = if let Some(rest) = spec.strip_prefix('-') {
                    (ModeCompare::All, rest)
                } else if let Some(rest) = spec.strip_prefix('/') {
                    (ModeCompare::Any, rest)
                } else {
                    (ModeCompare::Exact, spec.as_str())
                };
                let mode = u32::from_str_radix(digits, 8).map_err(|_| ParseError::InvalidOperand {
                    flag: flag.clone(),
                    value: spec.clone(),
                })?;
                let mut operand = Operand::default();
                operand.mode_compare = Some(compare);
                operand.file_mode = Some(mode);
                operand.dir_mode = Some(mode);
                Ok(Node::leaf(NodeKind::Mode, Classification::default(), operand))
            }

            "-empty" => Ok(Node::leaf(NodeKind::Empty, Classification::default(), Operand::default())),

            "-depth" => {
                // Overloaded: `-depth N` is an integer comparand against the
                // visit's own traversal depth (like `-links`/`-inum`);
                // bare `-depth` is the historical always-true flag whose
                // real effect is forcing post-order traversal. Disambiguated
                // purely by whether an integer token follows.
                let looks_like_comparand = self.peek().is_some_and(|tok| {
                    let (_, digits) = split_comparand_prefix(tok);
                    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
                });
                if looks_like_comparand {
                    let spec = self.require_operand(&flag)?;
                    let (mode, value) = parse_int_comparand(&spec, &flag)?;
                    let mut operand = Operand::default();
                    operand.stat_field = Some(StatField::Depth);
                    operand.compare_mode = Some(mode);
                    operand.int_comparand = value;
                    Ok(Node::leaf(NodeKind::Comparison, Classification::default(), operand))
                } else {
                    self.depth_flag = true;
                    Ok(Node::leaf(NodeKind::True, always_true(), Operand::default()))
                }
            }

            "-newer" => {
                let reference = self.require_operand(&flag)?;
                let meta = std::fs::metadata(&reference).map_err(|_| ParseError::InvalidOperand {
                    flag: flag.clone(),
                    value: reference.clone(),
                })?;
                use std::os::unix::fs::MetadataExt;
                let mut operand = Operand::default();
                operand.reference_time = Some((meta.mtime(), meta.mtime_nsec() as i64));
                Ok(Node::leaf(NodeKind::Newer, Classification::default(), operand))
            }

            "-samefile" => {
                let reference = self.require_operand(&flag)?;
                let meta = std::fs::metadata(&reference).map_err(|_| ParseError::InvalidOperand {
                    flag: flag.clone(),
                    value: reference.clone(),
                })?;
                use std::os::unix::fs::MetadataExt;
                let mut operand = Operand::default();
                operand.samefile = Some((meta.dev(), meta.ino()));
                Ok(Node::leaf(NodeKind::Samefile, Classification::default(), operand))
            }

            "-print" => Ok(Node::leaf(NodeKind::Print, always_true(), Operand::default())),
            "-print0" => Ok(Node::leaf(NodeKind::Print0, always_true(), Operand::default())),
            "-printx" => Ok(Node::leaf(NodeKind::Printx, always_true(), Operand::default())),
            "-printf" => {
                let template = self.require_operand(&flag)?;
                let mut operand = Operand::default();
                operand.printf_template = Some(template);
                Ok(Node::leaf(NodeKind::Printf, always_true(), operand))
            }
            "-ls" | "-fls" => Ok(Node::leaf(NodeKind::Ls, always_true(), Operand::default())),
            "-delete" => Ok(Node::leaf(
                NodeKind::Delete,
                Classification { ephemeral_fds: 1, ..Default::default() },
                Operand::default(),
            )),

            "-exec" => self.parse_exec(),

            "-prune" => Ok(Node::leaf(NodeKind::Prune, Classification::default(), Operand::default())),
            "-quit" => Ok(Node::leaf(NodeKind::Quit, Classification { never_returns: true, ..Default::default() }, Operand::default())),
            "-exit" => {
                let code = match self.peek() {
                    Some(tok) if tok.parse::<i32>().is_ok() => {
                        self.advance().unwrap().parse().unwrap()
                    }
                    _ => 0,
                };
                let mut operand = Operand::default();
                operand.exit_code = code;
                Ok(Node::leaf(
                    NodeKind::Exit,
                    Classification { never_returns: true, ..Default::default() },
                    operand,
                ))
            }

            other => Err(ParseError::UnknownToken(other.to_string())),
        }
    }

    fn parse_exec(&mut self) -> Result<Node, ParseError> {
        let mut argv = Vec::new();
        let mode = loop {
            match self.advance() {
                Some(tok) if tok == ";" => break ExecMode::PerFile,
                Some(tok) if tok == "+" => break ExecMode::Batched,
                Some(tok) => argv.push(tok),
                None => return Err(ParseError::MissingArgument("-exec".to_string())),
            }
        };
        let mut operand = Operand::default();
        operand.exec_mode = Some(mode);
        if mode == ExecMode::Batched {
            operand.exec_batch = Some(Mutex::new(ExecBatch::new(argv.clone())));
        }
        operand.exec_argv = argv;
        Ok(Node::leaf(
            NodeKind::Exec,
            Classification { ephemeral_fds: 1, ..Default::default() },
            operand,
        ))
    }
}

fn always_true() -> Classification {
    Classification { always_true: true, ..Default::default() }
}

fn always_false() -> Classification {
    Classification { always_false: true, ..Default::default() }
}

fn parse_int_comparand(spec: &str, flag: &str) -> Result<(CompareMode, i64), ParseError> {
    let (mode, digits) = split_comparand_prefix(spec);
    let value: i64 = digits.parse().map_err(|_| ParseError::InvalidOperand {
        flag: flag.to_string(),
        value: spec.to_string(),
    })?;
    Ok((mode, value))
}

fn parse_int_with_unit(
    spec: &str,
    flag: &str,
    default_unit: SizeUnit,
    from_suffix: impl Fn(char) -> Option<SizeUnit>,
) -> Result<(CompareMode, i64, SizeUnit), ParseError> {
    let (mode, rest) = split_comparand_prefix(spec);
    let (digits, unit) = match rest.chars().last().and_then(&from_suffix) {
        Some(unit) => (&rest[..rest.len() - 1], unit),
        None => (rest, default_unit),
    };
    let value: i64 = digits.parse().map_err(|_| ParseError::InvalidOperand {
        flag: flag.to_string(),
        value: spec.to_string(),
    })?;
    Ok((mode, value, unit))
}

fn split_comparand_prefix(spec: &str) -> (CompareMode, &str) {
    if let Some(rest) = spec.strip_prefix('+') {
        (CompareMode::GreaterThan, rest)
    } else if let Some(rest) = spec.strip_prefix('-') {
        (CompareMode::LessThan, rest)
    } else {
        (CompareMode::Equal, spec)
    }
}

fn type_bits_from_spec(spec: &str) -> u32 {
    spec.split(',')
        .filter_map(|tok| tok.chars().next())
        .map(type_bit_for_char)
        .fold(0u32, |acc, bit| acc | bit)
}

fn type_bit_for_char(c: char) -> u32 {
    use crate::predicates::type_pred::type_bit;
    use crate::visit::TypeTag;
    match c {
        'b' => type_bit(TypeTag::Block),
        'c' => type_bit(TypeTag::Char),
        'd' => type_bit(TypeTag::Directory),
        'D' => type_bit(TypeTag::Door),
        'p' => type_bit(TypeTag::Fifo),
        'l' => type_bit(TypeTag::Symlink),
        'P' => type_bit(TypeTag::Port),
        'f' => type_bit(TypeTag::Regular),
        's' => type_bit(TypeTag::Socket),
        'w' => type_bit(TypeTag::Whiteout),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn implicit_and_between_adjacent_tests() {
        let tree = parse_expression(&tokens(&["-name", "*.rs", "-type", "f"])).unwrap();
        assert!(matches!(tree.kind, NodeKind::And));
    }

    #[test]
    fn explicit_or_binds_looser_than_and() {
        let tree = parse_expression(&tokens(&["-true", "-o", "-true", "-a", "-false"])).unwrap();
        assert!(matches!(tree.kind, NodeKind::Or));
        let right = tree.right.unwrap();
        assert!(matches!(right.kind, NodeKind::And));
    }

    #[test]
    fn not_binds_to_the_single_following_test() {
        let tree = parse_expression(&tokens(&["!", "-empty"])).unwrap();
        assert!(matches!(tree.kind, NodeKind::Not));
    }

    #[test]
    fn bare_depth_sets_the_traversal_order_flag() {
        let (tree, depth_flag) = parse_expression_full(&tokens(&["-depth", "-type", "d"])).unwrap();
        assert!(depth_flag);
        assert!(matches!(tree.kind, NodeKind::And));
    }

    #[test]
    fn depth_with_an_integer_operand_is_a_comparand() {
        let (tree, depth_flag) = parse_expression_full(&tokens(&["-depth", "2"])).unwrap();
        assert!(!depth_flag);
        assert!(matches!(tree.kind, NodeKind::Comparison));
        assert_eq!(tree.operand.stat_field, Some(StatField::Depth));
        assert_eq!(tree.operand.int_comparand, 2);
    }

    #[test]
    fn newer_captures_the_reference_files_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref");
        std::fs::write(&reference, b"x").unwrap();
        let tree = parse_expression(&tokens(&["-newer", reference.to_str().unwrap()])).unwrap();
        assert!(matches!(tree.kind, NodeKind::Newer));
        assert!(tree.operand.reference_time.is_some());
    }

    #[test]
    fn perm_parses_all_any_exact_prefixes() {
        let exact = parse_expression(&tokens(&["-perm", "644"])).unwrap();
        assert_eq!(exact.operand.mode_compare, Some(ModeCompare::Exact));
        let all = parse_expression(&tokens(&["-perm", "-644"])).unwrap();
        assert_eq!(all.operand.mode_compare, Some(ModeCompare::All));
        let any = parse_expression(&tokens(&["-perm", "/644"])).unwrap();
        assert_eq!(any.operand.mode_compare, Some(ModeCompare::Any));
    }

    #[test]
    fn exec_per_file_terminator_is_semicolon() {
        let tree = parse_expression(&tokens(&["-exec", "echo", "{}", ";"])).unwrap();
        assert!(matches!(tree.kind, NodeKind::Exec));
        assert_eq!(tree.operand.exec_mode, Some(ExecMode::PerFile));
    }

    #[test]
    fn exec_batched_terminator_is_plus() {
        let tree = parse_expression(&tokens(&["-exec", "echo", "{}", "+"])).unwrap();
        assert_eq!(tree.operand.exec_mode, Some(ExecMode::Batched));
        assert!(tree.operand.exec_batch.is_some());
    }

    #[test]
    fn parenthesized_group_parses_as_a_single_primary() {
        let tree = parse_expression(&tokens(&["(", "-true", "-o", "-false", ")"])).unwrap();
        assert!(matches!(tree.kind, NodeKind::Or));
    }
}
