//! Per-visit evaluation state.

use crate::config::Config;
use crate::race::SharedExitStatus;
use crate::visit::{Action, VisitRecord};

pub struct EvalState<'a> {
    pub visit: &'a VisitRecord,
    pub config: &'a Config,
    pub action: Action,
    pub exit_status: &'a SharedExitStatus,
    pub quit: bool,
}

impl<'a> EvalState<'a> {
    pub fn new(visit: &'a VisitRecord, config: &'a Config, exit_status: &'a SharedExitStatus) -> Self {
        EvalState {
            visit,
            config,
            action: Action::Continue,
            exit_status,
            quit: false,
        }
    }
}
