//! User/group and mount-table lookup services.
//! Absence is a normal outcome ("unknown"), not an error — callers fall
//! back to the raw numeric id.

/// A resolved passwd entry, trimmed to what `-ls`/`-printf %u` need.
pub struct Passwd {
    pub name: String,
}

/// A resolved group entry, trimmed to what `-ls`/`-printf %g` need.
pub struct Group {
    pub name: String,
}

pub trait UserGroupService: Send + Sync {
    fn lookup_uid(&self, uid: u32) -> Option<Passwd>;
    fn lookup_gid(&self, gid: u32) -> Option<Group>;
}

/// Backed by the `users` crate, which wraps `getpwuid`/`getgrgid`.
pub struct StdUserGroupService;

impl UserGroupService for StdUserGroupService {
    fn lookup_uid(&self, uid: u32) -> Option<Passwd> {
        users::get_user_by_uid(uid).map(|u| Passwd {
            name: u.name().to_string_lossy().into_owned(),
        })
    }

    fn lookup_gid(&self, gid: u32) -> Option<Group> {
        users::get_group_by_gid(gid).map(|g| Group {
            name: g.name().to_string_lossy().into_owned(),
        })
    }
}

pub trait MountTableService: Send + Sync {
    /// Never fails; returns an empty string if the filesystem type for
    /// this device is unknown.
    fn fstype_of(&self, dev: u64) -> String;
}

/// A mount table backed by `/proc/mounts`, resolving a device id to its
/// filesystem type via `stat` on each mount point. Falls back to an empty
/// table (every lookup returns `""`) if `/proc/mounts` is unreadable,
/// e.g. inside a restrictive sandbox.
pub struct StdMountTable {
    entries: Vec<(u64, String)>,
}

impl StdMountTable {
    pub fn load() -> StdMountTable {
        let mut entries = Vec::new();
        if let Ok(contents) = std::fs::read_to_string("/proc/mounts") {
            for line in contents.lines() {
                let mut fields = line.split_whitespace();
                let Some(_device) = fields.next() else {
                    continue;
                };
                let (Some(mount_point), Some(fstype)) = (fields.next(), fields.next()) else {
                    continue;
                };
                if let Ok(meta) = std::fs::metadata(mount_point) {
                    use std::os::unix::fs::MetadataExt;
                    entries.push((meta.dev(), fstype.to_string()));
                }
            }
        }
        StdMountTable { entries }
    }
}

impl Default for StdMountTable {
    fn default() -> Self {
        StdMountTable::load()
    }
}

impl MountTableService for StdMountTable {
    fn fstype_of(&self, dev: u64) -> String {
        self.entries
            .iter()
            .find(|(d, _)| *d == dev)
            .map(|(_, fstype)| fstype.clone())
            .unwrap_or_default()
    }
}
