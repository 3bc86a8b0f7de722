//! The visit record and the lazily-populated `stat` cache contract consumed
//! from the traversal layer.

use crate::errors::StatError;
use std::cell::RefCell;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One of the type tags a visit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Block,
    Char,
    Directory,
    Door,
    Fifo,
    Symlink,
    Port,
    Regular,
    Socket,
    Whiteout,
    Unknown,
    Error,
}

/// Visit phase: before descending into a directory's children, or after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Post,
}

/// The action returned to the traversal engine per visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Prune,
    Stop,
}

/// A flattened `stat(2)` result, independent of the `follow`/`nofollow`
/// variant that produced it. `Clone` so it can live in the visit's cache
/// cell without re-querying the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    /// 512-byte blocks actually allocated, as reported by the filesystem.
    pub blocks: u64,
    pub atime: (i64, i64),
    pub mtime: (i64, i64),
    pub ctime: (i64, i64),
}

impl Stat {
    pub fn type_tag(&self) -> TypeTag {
        match self.mode & libc::S_IFMT {
            libc::S_IFREG => TypeTag::Regular,
            libc::S_IFDIR => TypeTag::Directory,
            libc::S_IFLNK => TypeTag::Symlink,
            libc::S_IFBLK => TypeTag::Block,
            libc::S_IFCHR => TypeTag::Char,
            libc::S_IFIFO => TypeTag::Fifo,
            libc::S_IFSOCK => TypeTag::Socket,
            _ => TypeTag::Unknown,
        }
    }
}

type StatResult = Result<Stat, StatError>;

/// Which `stat` variant a predicate is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    Yes,
    No,
}

/// Requested stat-flags for this visit — whether predicates should default
/// to following symlinks (`-L`/`-follow`/`comfollow`) or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFlags {
    pub default_follow: bool,
}

/// One invocation's worth of traversal state, as handed to the evaluation
/// driver. `at_fd` is the open directory this entry was
/// read from (for `…at()` syscalls); it is `None` for root paths, which are
/// addressed directly. Both fields and the stat caches are valid only for
/// the duration of the callback that owns this record, matching the
/// traversal-engine contract.
pub struct VisitRecord {
    pub path: PathBuf,
    pub root: PathBuf,
    pub depth: u32,
    pub at_fd: Option<Arc<File>>,
    pub base: String,
    pub type_tag: TypeTag,
    pub phase: Phase,
    pub error: Option<StatError>,
    pub stat_flags: StatFlags,
    stat_follow: RefCell<Option<StatResult>>,
    stat_nofollow: RefCell<Option<StatResult>>,
}

impl VisitRecord {
    pub fn new(
        path: PathBuf,
        root: PathBuf,
        depth: u32,
        at_fd: Option<Arc<File>>,
        base: String,
        type_tag: TypeTag,
        phase: Phase,
        error: Option<StatError>,
        stat_flags: StatFlags,
    ) -> Self {
        VisitRecord {
            path,
            root,
            depth,
            at_fd,
            base,
            type_tag,
            phase,
            error,
            stat_flags,
            stat_follow: RefCell::new(None),
            stat_nofollow: RefCell::new(None),
        }
    }

    /// Fetch (and cache) the `stat` result for the requested follow policy.
    /// Predicates that don't care about symlink-following should pass
    /// `Follow::Yes`/`Follow::No` explicitly per their own semantics (e.g.
    /// `-type` vs `-xtype`); predicates that defer to the visit's default
    /// should use [`VisitRecord::stat_default`].
    pub fn stat(&self, follow: Follow) -> StatResult {
        let cache = match follow {
            Follow::Yes => &self.stat_follow,
            Follow::No => &self.stat_nofollow,
        };
        if let Some(cached) = cache.borrow().as_ref() {
            return cached.clone();
        }
        let result = self.query_stat(follow);
        *cache.borrow_mut() = Some(result.clone());
        result
    }

    pub fn stat_default(&self) -> StatResult {
        self.stat(if self.stat_flags.default_follow {
            Follow::Yes
        } else {
            Follow::No
        })
    }

    fn query_stat(&self, follow: Follow) -> StatResult {
        match &self.at_fd {
            Some(dir) => stat_at(Some(dir.as_raw_fd()), Path::new(&self.base), follow == Follow::Yes),
            // Root paths have no parent directory fd; address them directly.
            None => stat_at(None, self.path.as_path(), follow == Follow::Yes),
        }
    }

    /// Absolute path, with any trailing slash from the root argument
    /// stripped — used by the `-name` predicate.
    pub fn basename(&self) -> &str {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.is_empty() {
            self.path.to_str().unwrap_or("")
        } else {
            name
        }
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().unwrap_or("")
    }
}

impl Stat {
    fn from_filestat(fs: nix::sys::stat::FileStat) -> Stat {
        Stat {
            dev: fs.st_dev as u64,
            ino: fs.st_ino as u64,
            mode: fs.st_mode as u32,
            nlink: fs.st_nlink as u64,
            uid: fs.st_uid,
            gid: fs.st_gid,
            rdev: fs.st_rdev as u64,
            size: fs.st_size.max(0) as u64,
            blocks: fs.st_blocks.max(0) as u64,
            atime: (fs.st_atime as i64, fs.st_atime_nsec as i64),
            mtime: (fs.st_mtime as i64, fs.st_mtime_nsec as i64),
            ctime: (fs.st_ctime as i64, fs.st_ctime_nsec as i64),
        }
    }
}

/// Shared `fstatat` helper: stats `path` relative to `dir_fd` (or
/// absolutely, when `dir_fd` is `None`), honoring the follow policy. Used
/// both by [`VisitRecord::stat`] and by the traversal engine, which needs
/// the same call to classify an entry before deciding whether to descend.
pub fn stat_at(dir_fd: Option<std::os::unix::io::RawFd>, path: &Path, follow: bool) -> StatResult {
    use nix::fcntl::AtFlags;
    use nix::sys::stat::fstatat;

    let flags = if follow {
        AtFlags::empty()
    } else {
        AtFlags::AT_SYMLINK_NOFOLLOW
    };

    fstatat(dir_fd, path, flags)
        .map(Stat::from_filestat)
        .map_err(StatError::from)
}

/// Strip a single trailing slash the way a root-path basename needs to
/// before matching against `-name`: `"/t/skip/"` -> basename `"skip"`.
pub fn basename_no_trailing_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches('/');
    Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string())
}
