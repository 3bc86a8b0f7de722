//! The traversal engine contract, and a concrete,
//! single-threaded `std::fs`-based implementation.

mod std_engine;

pub use std_engine::StdTraversalEngine;

use crate::visit::{Action, VisitRecord};

/// Consumed contract: a list of root paths, a callback, an fd budget,
/// flags, and a strategy. The engine returns zero on clean completion,
/// nonzero on fatal internal error.
pub trait TraversalEngine {
    fn run<F>(&self, roots: &[std::path::PathBuf], callback: F) -> i32
    where
        F: FnMut(&VisitRecord) -> Action;
}
