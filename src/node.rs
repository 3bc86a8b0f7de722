//! Expression node.
//!
//! A node is modeled as a tagged variant (`NodeKind`) carrying its own
//! operand payload, plus the counters and classification bits that are
//! intrinsic to every node regardless of kind. Dispatch is a single method,
//! [`Node::dispatch`], matched on `kind` — the "interface-like capability
//! with one method" alternative, chosen over a boxed-trait-object forest
//! because the set of kinds is closed and the payloads are small.

use crate::eval::EvalState;
use crate::exec_batch::ExecBatch;
use regex::Regex;
use std::cell::Cell;
use std::sync::Mutex;
use std::time::SystemTime;

/// Comparison mode for integer comparison predicates (`-size`, `-mtime`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Equal,
    LessThan,
    GreaterThan,
}

impl CompareMode {
    pub fn matches(self, actual: i64, comparand: i64) -> bool {
        match self {
            CompareMode::Equal => actual == comparand,
            CompareMode::LessThan => actual < comparand,
            CompareMode::GreaterThan => actual > comparand,
        }
    }
}

/// Mode-predicate comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCompare {
    Exact,
    All,
    Any,
}

/// A stat field a comparison predicate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Size,
    Links,
    Inum,
    Uid,
    Gid,
    Atime,
    Mtime,
    Ctime,
    /// The visit's own traversal depth, not a `stat` field at all — the
    /// comparison dispatch special-cases this one to skip the `stat` call.
    Depth,
}

/// Which of `-exec`'s batching disciplines a given exec node uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// `-exec cmd {} ;` — one process launch per visit.
    PerFile,
    /// `-exec cmd {} +` — batched, flushed at thresholds and at traversal end.
    Batched,
}

/// The full operand payload a node can carry. Most nodes use only a few of
/// these fields; unused fields simply stay at their default.
#[derive(Default)]
pub struct Operand {
    pub int_comparand: i64,
    pub compare_mode: Option<CompareMode>,
    pub string_operand: Option<String>,
    pub size_unit: Option<crate::size_util::SizeUnit>,
    pub time_unit: Option<crate::time_util::TimeUnit>,
    pub stat_field: Option<StatField>,
    pub reference_time: Option<(i64, i64)>,
    pub mode_compare: Option<ModeCompare>,
    pub file_mode: Option<u32>,
    pub dir_mode: Option<u32>,
    pub regex: Option<Regex>,
    pub type_bits: u32,
    pub follow_override: Option<bool>,
    pub printf_template: Option<String>,
    pub exec_argv: Vec<String>,
    pub exec_mode: Option<ExecMode>,
    pub exec_batch: Option<Mutex<ExecBatch>>,
    pub samefile: Option<(u64, u64)>,
    pub exit_code: i32,
    pub case_insensitive: bool,
}

/// The discriminator for a node's dispatch function. Combinators and
/// predicates/actions are both represented here; combinators additionally
/// use `left`/`right` on [`Node`], predicates/actions use only `right` when
/// they need a single child (none currently do) and are otherwise leaves.
pub enum NodeKind {
    // Combinators
    Not,
    And,
    Or,
    Comma,

    // Trivial predicates
    True,
    False,

    // Comparison predicates
    Comparison,

    // Name-family predicates
    Name,
    Path,
    Lname,
    Regex,

    // Mode / type
    Mode,
    Type,
    Xtype,

    Empty,

    // access / acl / xattr / capability
    Access,
    Acl,
    Xattr,
    Capability,

    Samefile,
    Newer,

    // Actions
    Print,
    Print0,
    Printx,
    Printf,
    Ls,
    Delete,
    Exec,
    Prune,
    Quit,
    Exit,
}

/// Per-node counters, updated only by the driver.
#[derive(Default)]
pub struct Counters {
    pub evaluations: Cell<u64>,
    pub successes: Cell<u64>,
    pub elapsed_secs: Cell<u64>,
    pub elapsed_nanos: Cell<u32>,
}

impl Counters {
    pub fn record(&self, success: bool, elapsed: Option<(u64, u32)>) {
        self.evaluations.set(self.evaluations.get() + 1);
        if success {
            self.successes.set(self.successes.get() + 1);
        }
        if let Some((secs, nanos)) = elapsed {
            let mut total_secs = self.elapsed_secs.get() + secs;
            let mut total_nanos = self.elapsed_nanos.get() + nanos;
            if total_nanos >= 1_000_000_000 {
                total_nanos -= 1_000_000_000;
                total_secs += 1;
            }
            self.elapsed_secs.set(total_secs);
            self.elapsed_nanos.set(total_nanos);
        }
    }
}

/// Static classification bits.
#[derive(Default, Clone, Copy)]
pub struct Classification {
    pub always_true: bool,
    pub always_false: bool,
    pub never_returns: bool,
    pub persistent_fds: u32,
    pub ephemeral_fds: u32,
}

/// An expression tree node. The tree is acyclic and owns its children
///.
pub struct Node {
    pub kind: NodeKind,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
    pub classification: Classification,
    pub counters: Counters,
    pub operand: Operand,
}

impl Node {
    pub fn leaf(kind: NodeKind, classification: Classification, operand: Operand) -> Node {
        Node {
            kind,
            left: None,
            right: None,
            classification,
            counters: Counters::default(),
            operand,
        }
    }

    pub fn combinator(kind: NodeKind, left: Node, right: Node) -> Node {
        let classification = Classification::default();
        Node {
            kind,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            classification,
            counters: Counters::default(),
            operand: Operand::default(),
        }
    }

    pub fn not(child: Node) -> Node {
        Node {
            kind: NodeKind::Not,
            left: None,
            right: Some(Box::new(child)),
            classification: Classification::default(),
            counters: Counters::default(),
            operand: Operand::default(),
        }
    }

    /// The dispatch wrapper: samples the clock, invokes the
    /// predicate/combinator implementation, updates counters, and
    /// sanity-checks the `always_*`/`never_returns` contract.
    pub fn dispatch(&self, state: &mut EvalState) -> bool {
        let start = crate::time_util::sample_clock();
        let result = self.run(state);
        let end = crate::time_util::sample_clock();
        let elapsed = crate::time_util::elapsed_since(start, end);
        self.counters.record(result, elapsed);

        debug_assert!(
            !(self.classification.always_true && !state.quit && !result),
            "always_true node returned false without quitting"
        );
        debug_assert!(
            !(self.classification.always_false && !state.quit && result),
            "always_false node returned true without quitting"
        );
        debug_assert!(
            !(self.classification.never_returns && !state.quit),
            "never_returns node returned without setting the quit flag"
        );

        result
    }

    fn run(&self, state: &mut EvalState) -> bool {
        match self.kind {
            NodeKind::Not => crate::combinators::eval_not(self, state),
            NodeKind::And => crate::combinators::eval_and(self, state),
            NodeKind::Or => crate::combinators::eval_or(self, state),
            NodeKind::Comma => crate::combinators::eval_comma(self, state),

            NodeKind::True => true,
            NodeKind::False => false,

            NodeKind::Comparison => crate::predicates::comparison::eval(self, state),
            NodeKind::Name => crate::predicates::name::eval_name(self, state),
            NodeKind::Path => crate::predicates::name::eval_path(self, state),
            NodeKind::Lname => crate::predicates::name::eval_lname(self, state),
            NodeKind::Regex => crate::predicates::name::eval_regex(self, state),

            NodeKind::Mode => crate::predicates::mode::eval(self, state),
            NodeKind::Type => crate::predicates::type_pred::eval_type(self, state),
            NodeKind::Xtype => crate::predicates::type_pred::eval_xtype(self, state),

            NodeKind::Empty => crate::predicates::empty::eval(self, state),

            NodeKind::Access => crate::predicates::access::eval_access(self, state),
            NodeKind::Acl => crate::predicates::access::eval_acl(self, state),
            NodeKind::Xattr => crate::predicates::access::eval_xattr(self, state),
            NodeKind::Capability => crate::predicates::access::eval_capability(self, state),

            NodeKind::Samefile => crate::predicates::samefile::eval(self, state),
            NodeKind::Newer => crate::predicates::newer::eval(self, state),

            NodeKind::Print => crate::predicates::print::eval_print(self, state),
            NodeKind::Print0 => crate::predicates::print::eval_print0(self, state),
            NodeKind::Printx => crate::predicates::print::eval_printx(self, state),
            NodeKind::Printf => crate::predicates::print::eval_printf(self, state),
            NodeKind::Ls => crate::predicates::ls::eval(self, state),
            NodeKind::Delete => crate::predicates::delete::eval(self, state),
            NodeKind::Exec => crate::predicates::exec::eval(self, state),
            NodeKind::Prune => crate::predicates::control::eval_prune(self, state),
            NodeKind::Quit => crate::predicates::control::eval_quit(self, state),
            NodeKind::Exit => crate::predicates::control::eval_exit(self, state),
        }
    }

    /// Walk the tree, flushing every exec batch exactly once. Errors
    /// during flush propagate into the shared exit status but do not abort
    /// siblings.
    pub fn finish(&self, exit_status: &crate::race::SharedExitStatus) {
        if let Some(left) = &self.left {
            left.finish(exit_status);
        }
        if let Some(right) = &self.right {
            right.finish(exit_status);
        }
        if matches!(self.kind, NodeKind::Exec) {
            if let Some(batch) = &self.operand.exec_batch {
                let mut batch = batch.lock().unwrap();
                if let Err(e) = batch.flush() {
                    log::error!("exec batch flush failed: {e}");
                    exit_status.mark_failure();
                }
            }
        }
    }
}

/// Captures the program-start reference time for predicates that need it
/// (`-newer`'s implicit comparand uses an explicit reference file instead,
/// but `-mtime`/`-atime`/`-ctime` default to "now").
pub fn now_reference() -> (i64, i64) {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() as i64, now.subsec_nanos() as i64)
}
