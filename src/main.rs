use bfind::cli::{self, Cli};
use bfind::config::{Config, Strategy};
use bfind::driver::Driver;
use bfind::fd_budget;
use bfind::identity::IdentitySet;
use bfind::race::SharedExitStatus;
use bfind::traversal::{StdTraversalEngine, TraversalEngine};
use clap::Parser;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let (root, depth_flag) = match cli::parse_expression_full(&cli.expr) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("bfind: {e}");
            std::process::exit(1);
        }
    };

    let root_paths: Vec<PathBuf> = cli.roots.iter().map(PathBuf::from).collect();

    let mut config = Config::minimal();
    config.root_paths = root_paths.clone();
    config.logical = cli.logical;
    config.comfollow = cli.comfollow;
    config.mount = cli.mount;
    config.xdev = cli.xdev;
    config.ignore_races = cli.ignore_races;
    config.xargs_safe = cli.xargs_safe;
    config.strategy = Strategy::DepthFirst;
    config.depth = depth_flag;

    let budget = fd_budget::estimate(
        root.classification.persistent_fds,
        root.classification.ephemeral_fds,
    );
    log::debug!("fd budget: {budget}");

    let engine = StdTraversalEngine {
        strategy: config.strategy,
        logical: config.logical,
        comfollow: config.comfollow,
        mount: config.mount,
        xdev: config.xdev,
    };

    let identity = IdentitySet::new();
    let exit_status = SharedExitStatus::new();
    let driver = Driver::new(&root, &config, &identity, &exit_status);

    let engine_result = engine.run(&root_paths, |visit| driver.visit(visit));
    if engine_result != 0 {
        exit_status.mark_failure();
    }

    root.finish(&exit_status);
    driver.dump_rates();

    std::process::exit(exit_status.code());
}
