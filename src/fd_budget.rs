//! FD budget estimator: derives the concurrent-open-directory limit
//! for the traversal engine.

use nix::sys::resource::{getrlimit, Resource};

const DEFAULT_FDLIMIT: u64 = 4096;
const STDIO_FDS: u64 = 3;
const FLOOR: u64 = 2;

/// Mirrors the original `infer_fdlimit()`: start from `RLIMIT_NOFILE` (or a
/// default), subtract stdio plus the expression's declared persistent fds,
/// subtract already-open descriptors (counted via `/proc/self/fd` or
/// `/dev/fd`), subtract the expression's ephemeral fds, floor at 2.
pub fn estimate(persistent_fds: u32, ephemeral_fds: u32) -> u64 {
    let limit = match getrlimit(Resource::RLIMIT_NOFILE) {
        Ok((soft, _hard)) if soft != libc::RLIM_INFINITY => soft,
        _ => DEFAULT_FDLIMIT,
    };

    let already_open = count_open_fds().unwrap_or(STDIO_FDS);

    let budget = limit
        .saturating_sub(STDIO_FDS)
        .saturating_sub(persistent_fds as u64)
        .saturating_sub(already_open.saturating_sub(STDIO_FDS))
        .saturating_sub(ephemeral_fds as u64);

    budget.max(FLOOR)
}

fn count_open_fds() -> Option<u64> {
    for candidate in ["/proc/self/fd", "/dev/fd"] {
        if let Ok(entries) = std::fs::read_dir(candidate) {
            // The directory handle opened to enumerate these is itself one
            // of the fds being counted; subtract it back out.
            let count = entries.count() as u64;
            return Some(count.saturating_sub(1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_at_two_even_with_huge_reservations() {
        assert_eq!(estimate(u32::MAX, u32::MAX), FLOOR);
    }

    #[test]
    fn returns_a_sane_budget_under_normal_conditions() {
        let budget = estimate(0, 0);
        assert!(budget >= FLOOR);
    }
}
