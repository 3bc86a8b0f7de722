//! bfind — a POSIX find(1)-style predicate/action evaluator and traversal driver.
//!
//! Module layout:
//!   - node          — expression node, counters, classification bits, operand payload
//!   - combinators   — not/and/or/comma dispatch
//!   - eval          — per-visit evaluation state and the dispatch wrapper (clock + counters)
//!   - driver        — the per-visit evaluation driver
//!   - identity      — the `-unique` device+inode set
//!   - race          — the race-aware error policy and colored diagnostics
//!   - exec_batch    — `-exec ... +` argv accumulation and flush
//!   - fd_budget     — the concurrent-fd budget estimator
//!   - collaborators — user/group and mount-table lookup services
//!   - time_util     — reference-time capture, monotonic-clock fallback, unit conversion
//!   - size_util     — size-unit rounding
//!   - config        — the shared, read-only evaluation configuration
//!   - visit         — the visit record and stat cache contract
//!   - traversal     — the traversal engine trait and its std::fs-based implementation
//!   - predicates    — concrete test/action implementations
//!   - cli           — the argv expression parser

pub mod collaborators;
pub mod combinators;
pub mod config;
pub mod driver;
pub mod errors;
pub mod eval;
pub mod exec_batch;
pub mod fd_budget;
pub mod identity;
pub mod node;
pub mod predicates;
pub mod race;
pub mod size_util;
pub mod time_util;
pub mod traversal;
pub mod visit;

pub mod cli;

pub use config::Config;
pub use eval::EvalState;
pub use node::Node;
pub use visit::{Action, Phase, TypeTag, VisitRecord};
