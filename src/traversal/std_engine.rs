//! A concrete, single-threaded, `std::fs`-based traversal engine.
//!
//! Uses an explicit work stack rather than recursion, so a pathologically
//! deep tree cannot blow the Rust call stack. Every directory gets both a
//! pre-order and a post-order visit; non-directories additionally get a
//! post-order visit when the strategy is [`Strategy::IterativeDeepening`]
//!.

use super::TraversalEngine;
use crate::config::Strategy;
use crate::errors::StatError;
use crate::visit::{stat_at, Action, Phase, StatFlags, TypeTag, VisitRecord};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct StdTraversalEngine {
    pub strategy: Strategy,
    /// `-L`: follow symlinks when classifying and descending, everywhere.
    pub logical: bool,
    /// Historical `-H`: follow symlinks only when they're named directly as
    /// a root-path argument (depth 0); everywhere deeper is unaffected.
    pub comfollow: bool,
    /// Don't cross filesystem boundaries from each root.
    pub mount: bool,
    /// Like `mount`, but specifically `-xdev` phrasing; both map to the
    /// same device-boundary check here.
    pub xdev: bool,
}

impl StdTraversalEngine {
    /// Whether symlinks should be followed for a visit at `depth`, per
    /// the `logical`/`comfollow` policy.
    fn follow_at(&self, depth: u32) -> bool {
        self.logical || (self.comfollow && depth == 0)
    }
}

/// One pending unit of work on the traversal stack.
enum WorkItem {
    /// Visit `path` (pre-order), optionally followed by descending into it.
    Enter {
        path: PathBuf,
        root: PathBuf,
        depth: u32,
        at_fd: Option<Arc<File>>,
        base: String,
        parent_dev: Option<u64>,
    },
    /// Emit the deferred post-order visit for a directory that was entered
    /// and (unless pruned) already had its children pushed.
    Leave {
        path: PathBuf,
        root: PathBuf,
        depth: u32,
        at_fd: Option<Arc<File>>,
        base: String,
    },
}

impl TraversalEngine for StdTraversalEngine {
    fn run<F>(&self, roots: &[PathBuf], mut callback: F) -> i32
    where
        F: FnMut(&VisitRecord) -> Action,
    {
        let mut stack: Vec<WorkItem> = Vec::new();
        for root in roots.iter().rev() {
            let base = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.to_string_lossy().into_owned());
            stack.push(WorkItem::Enter {
                path: root.clone(),
                root: root.clone(),
                depth: 0,
                at_fd: None,
                base,
                parent_dev: None,
            });
        }

        while let Some(item) = stack.pop() {
            match item {
                WorkItem::Enter {
                    path,
                    root,
                    depth,
                    at_fd,
                    base,
                    parent_dev,
                } => {
                    let dir_fd = at_fd.as_ref().map(|f| f.as_raw_fd());
                    let rel = if at_fd.is_some() { Path::new(base.as_str()) } else { path.as_path() };
                    let follow = self.follow_at(depth);

                    let classify = stat_at(dir_fd, rel, follow)
                        .or_else(|_| stat_at(dir_fd, rel, false));

                    let (type_tag, dev) = match &classify {
                        Ok(stat) => (stat.type_tag(), Some(stat.dev)),
                        Err(_) => (TypeTag::Error, None),
                    };

                    let error = classify.as_ref().err().cloned();

                    let visit = VisitRecord::new(
                        path.clone(),
                        root.clone(),
                        depth,
                        at_fd.clone(),
                        base.clone(),
                        type_tag,
                        Phase::Pre,
                        error,
                        StatFlags {
                            default_follow: follow,
                        },
                    );

                    let action = callback(&visit);
                    if action == Action::Stop {
                        return 0;
                    }

                    let should_descend = type_tag == TypeTag::Directory
                        && action != Action::Prune
                        && !self.crosses_boundary(parent_dev, dev);

                    if type_tag == TypeTag::Directory && action != Action::Prune {
                        if should_descend {
                            if let Some(dir) = self.open_dir(&path) {
                                let dir = Arc::new(dir);
                                let children = self.read_children(&path);
                                stack.push(WorkItem::Leave {
                                    path: path.clone(),
                                    root: root.clone(),
                                    depth,
                                    at_fd: at_fd.clone(),
                                    base: base.clone(),
                                });
                                // `children` is sorted ascending; push in
                                // reverse so popping the LIFO stack yields
                                // them back in ascending (readdir-stable) order.
                                for child_name in children.into_iter().rev() {
                                    let child_path = path.join(&child_name);
                                    stack.push(WorkItem::Enter {
                                        path: child_path,
                                        root: root.clone(),
                                        depth: depth + 1,
                                        at_fd: Some(Arc::clone(&dir)),
                                        base: child_name,
                                        parent_dev: dev,
                                    });
                                }
                            } else {
                                // Couldn't open for reading; still emit the
                                // post-order visit so phase bookkeeping stays
                                // consistent.
                                stack.push(WorkItem::Leave {
                                    path,
                                    root,
                                    depth,
                                    at_fd,
                                    base,
                                });
                            }
                        } else {
                            // Pruned by a mount/xdev boundary: still post-visit,
                            // matching a directory that was entered but not
                            // expanded.
                            stack.push(WorkItem::Leave {
                                path,
                                root,
                                depth,
                                at_fd,
                                base,
                            });
                        }
                    } else if type_tag != TypeTag::Directory
                        && self.strategy == Strategy::IterativeDeepening
                    {
                        let post_visit = VisitRecord::new(
                            path,
                            root,
                            depth,
                            at_fd,
                            base,
                            type_tag,
                            Phase::Post,
                            None,
                            StatFlags {
                                default_follow: self.follow_at(depth),
                            },
                        );
                        if callback(&post_visit) == Action::Stop {
                            return 0;
                        }
                    }
                }

                WorkItem::Leave {
                    path,
                    root,
                    depth,
                    at_fd,
                    base,
                } => {
                    let visit = VisitRecord::new(
                        path,
                        root,
                        depth,
                        at_fd,
                        base,
                        TypeTag::Directory,
                        Phase::Post,
                        None,
                        StatFlags {
                            default_follow: self.follow_at(depth),
                        },
                    );
                    if callback(&visit) == Action::Stop {
                        return 0;
                    }
                }
            }
        }

        0
    }
}

impl StdTraversalEngine {
    fn crosses_boundary(&self, parent_dev: Option<u64>, dev: Option<u64>) -> bool {
        if !self.mount && !self.xdev {
            return false;
        }
        match (parent_dev, dev) {
            (Some(p), Some(d)) => p != d,
            _ => false,
        }
    }

    fn open_dir(&self, path: &Path) -> Option<File> {
        File::open(path).ok()
    }

    fn read_children(&self, path: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(path) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::Action;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn visits_every_file_pre_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), b"").unwrap();
        fs::write(dir.path().join("b"), b"x").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let engine = StdTraversalEngine {
            strategy: Strategy::DepthFirst,
            logical: false,
            comfollow: false,
            mount: false,
            xdev: false,
        };

        let mut seen = Vec::new();
        engine.run(&[dir.path().to_path_buf()], |visit| {
            if visit.phase == Phase::Pre {
                seen.push(visit.path_str().to_string());
            }
            Action::Continue
        });

        assert!(seen.iter().any(|p| p.ends_with("/a")));
        assert!(seen.iter().any(|p| p.ends_with("/b")));
        assert!(seen.iter().any(|p| p.ends_with("/c")));
    }

    #[test]
    fn directories_get_pre_and_post_visits_children_first() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let engine = StdTraversalEngine {
            strategy: Strategy::DepthFirst,
            logical: false,
            comfollow: false,
            mount: false,
            xdev: false,
        };

        let mut order = Vec::new();
        engine.run(&[dir.path().to_path_buf()], |visit| {
            if visit.type_tag == TypeTag::Directory && visit.phase == Phase::Post {
                order.push(visit.path_str().to_string());
            }
            Action::Continue
        });

        let pos = |suffix: &str| order.iter().position(|p| p.ends_with(suffix)).unwrap();
        assert!(pos("/a/b") < pos("/a"));
        assert!(pos("/a") < pos(dir.path().to_str().unwrap()));
    }

    #[test]
    fn prune_stops_descent() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("skip")).unwrap();
        fs::write(dir.path().join("skip/x"), b"").unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("keep/y"), b"").unwrap();

        let engine = StdTraversalEngine {
            strategy: Strategy::DepthFirst,
            logical: false,
            comfollow: false,
            mount: false,
            xdev: false,
        };

        let mut seen = Vec::new();
        engine.run(&[dir.path().to_path_buf()], |visit| {
            if visit.phase == Phase::Pre {
                seen.push(visit.path_str().to_string());
                if visit.path_str().ends_with("/skip") {
                    return Action::Prune;
                }
            }
            Action::Continue
        });

        assert!(!seen.iter().any(|p| p.ends_with("/skip/x")));
        assert!(seen.iter().any(|p| p.ends_with("/keep/y")));
    }
}
