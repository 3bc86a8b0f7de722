//! The `-unique` file identity set: records already-visited
//! `(device, inode)` pairs for one traversal's lifetime.

use fnv::FnvHashSet;
use std::sync::Mutex;

/// Keyed by `(dev, ino)`. A hash set is enough here; the specific choice
/// of `trie` vs. hash table is an implementation detail, not a contract
/// requirement (see DESIGN.md).
pub struct IdentitySet {
    seen: Mutex<FnvHashSet<(u64, u64)>>,
}

impl IdentitySet {
    pub fn new() -> Self {
        IdentitySet {
            seen: Mutex::new(FnvHashSet::default()),
        }
    }

    /// First occurrence: insert and return `true` (proceed). Repeat
    /// occurrence: return `false` (caller should `PRUNE`).
    pub fn insert_if_new(&self, dev: u64, ino: u64) -> bool {
        self.seen.lock().unwrap().insert((dev, ino))
    }
}

impl Default for IdentitySet {
    fn default() -> Self {
        IdentitySet::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_proceeds_repeat_is_rejected() {
        let set = IdentitySet::new();
        assert!(set.insert_if_new(1, 42));
        assert!(!set.insert_if_new(1, 42));
        assert!(set.insert_if_new(1, 43));
        assert!(set.insert_if_new(2, 42));
    }
}
