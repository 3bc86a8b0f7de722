//! Shared, read-only evaluation configuration.

use crate::collaborators::{MountTableService, StdMountTable, StdUserGroupService, UserGroupService};
use std::path::PathBuf;

/// The traversal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
    IterativeDeepening,
}

/// Debug channels: `SEARCH` traces visit records, `STAT` traces cached
/// stat activity, `RATES` dumps per-node counters at the end of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugFlags {
    pub search: bool,
    pub stat: bool,
    pub rates: bool,
}

pub struct Config {
    pub root_paths: Vec<PathBuf>,

    pub depth: bool,
    pub logical: bool,
    pub detect_cycles: bool,
    pub mount: bool,
    pub xdev: bool,
    pub recover: bool,
    pub stat_eager: bool,
    pub comfollow: bool,

    pub strategy: Strategy,
    pub mindepth: u32,
    pub maxdepth: i64,

    pub ignore_races: bool,
    pub unique: bool,
    pub xargs_safe: bool,

    pub debug: DebugFlags,

    pub user_group: Box<dyn UserGroupService>,
    pub mount_table: Box<dyn MountTableService>,
}

impl Config {
    /// A config suitable for driving a single visit in a unit test: no
    /// roots, defaults for every flag, `maxdepth` effectively unbounded.
    pub fn minimal() -> Config {
        Config {
            root_paths: Vec::new(),
            depth: false,
            logical: false,
            detect_cycles: false,
            mount: false,
            xdev: false,
            recover: false,
            stat_eager: false,
            comfollow: false,
            strategy: Strategy::DepthFirst,
            mindepth: 0,
            maxdepth: i64::MAX,
            ignore_races: false,
            unique: false,
            xargs_safe: false,
            debug: DebugFlags::default(),
            user_group: Box::new(StdUserGroupService),
            mount_table: Box::new(StdMountTable::default()),
        }
    }
}
