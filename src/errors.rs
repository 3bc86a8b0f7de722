//! Error taxonomy: one small enum per concern rather than a single
//! monolithic error type.

use thiserror::Error;

/// Errors raised while parsing an argv expression. These are the
/// only fatal tier: they abort the program before traversal starts.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing argument for '{0}'")]
    MissingArgument(String),

    #[error("unknown predicate or operator '{0}'")]
    UnknownToken(String),

    #[error("invalid operand for '{flag}': '{value}'")]
    InvalidOperand { flag: String, value: String },

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("empty expression")]
    EmptyExpression,

    #[error("invalid regex '{0}': {1}")]
    BadRegex(String, regex::Error),

    #[error("no root paths given")]
    NoRoots,
}

/// Errors surfaced by the traversal engine itself (distinct from a
/// per-visit `type = Error`, which is not fatal and is folded into
/// [`crate::race`] handling instead).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open root '{path}': {source}")]
    RootUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A lightweight, `Clone`-able stand-in for `std::io::Error` so that stat
/// results can be cached by value. Carries just enough to format a
/// diagnostic and to classify nonexistence for the race policy.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StatError {
    pub message: String,
    pub raw_os_error: Option<i32>,
}

impl StatError {
    pub fn from_io(err: &std::io::Error) -> Self {
        StatError {
            message: err.to_string(),
            raw_os_error: err.raw_os_error(),
        }
    }

    /// True for ENOENT/ENOTDIR — the "nonexistence" class.
    pub fn is_nonexistence(&self) -> bool {
        matches!(self.raw_os_error, Some(errno) if errno == libc::ENOENT || errno == libc::ENOTDIR)
    }
}

impl From<std::io::Error> for StatError {
    fn from(err: std::io::Error) -> Self {
        StatError::from_io(&err)
    }
}

impl From<nix::Error> for StatError {
    fn from(err: nix::Error) -> Self {
        StatError {
            message: err.to_string(),
            raw_os_error: Some(err as i32),
        }
    }
}
