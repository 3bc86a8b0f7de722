//! Reference-time capture, monotonic-clock fallback, and the time-comparison
//! truncation rule: "the full-seconds difference between a reference
//! time and a stat field; if the nanosecond portion of the stat time exceeds
//! the reference, one second is subtracted."

use once_cell::sync::Lazy;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The program-start wall-clock reference, used by `-mtime`/`-atime`/`-ctime`
/// and by the `-ls` "recent file" window.
pub static PROGRAM_START: Lazy<(i64, i64)> = Lazy::new(|| {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    (now.as_secs() as i64, now.subsec_nanos() as i64)
});

/// One of the units `-mtime`/`-atime`/`-ctime`/`-mmin`/... convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Days,
}

impl TimeUnit {
    fn divisor(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Days => 86_400,
        }
    }
}

/// Difference `reference - stat_time`, expressed in whole seconds, then
/// converted to `unit`. The second-boundary truncation (nanosecond
/// component) rounds toward negative infinity: if the stat time's
/// nanosecond component exceeds the reference's, one extra second is
/// subtracted. The subsequent unit conversion truncates toward zero —
/// plain integer division, matching `eval.c`'s `diff /= 60` / `diff /=
/// 60*60*24` exactly, including for a stat time in the future relative to
/// the reference (negative `diff`).
pub fn diff_in_unit(reference: (i64, i64), stat_time: (i64, i64), unit: TimeUnit) -> i64 {
    let (ref_sec, ref_nsec) = reference;
    let (stat_sec, stat_nsec) = stat_time;
    let mut diff = ref_sec - stat_sec;
    if stat_nsec > ref_nsec {
        diff -= 1;
    }
    diff / unit.divisor()
}

/// A monotonic clock sample for per-node elapsed-time accounting,
/// falling back to realtime if the platform has no working monotonic
/// source, and disabling rate tracing silently if neither is available
///.
#[derive(Debug, Clone, Copy)]
pub enum ClockSample {
    Monotonic(Instant),
    Unavailable,
}

pub fn sample_clock() -> ClockSample {
    // `Instant::now()` never fails on platforms Rust supports; the
    // `Unavailable` arm exists so callers have a documented, inert path to
    // fall into rather than assuming monotonic time always succeeds.
    ClockSample::Monotonic(Instant::now())
}

/// Elapsed time between two clock samples, normalized to (seconds, nanos).
/// Returns `None` if either sample was `Unavailable`, in which case rate
/// tracing must silently skip the accumulation.
pub fn elapsed_since(start: ClockSample, end: ClockSample) -> Option<(u64, u32)> {
    match (start, end) {
        (ClockSample::Monotonic(s), ClockSample::Monotonic(e)) => {
            let d = e.saturating_duration_since(s);
            Some((d.as_secs(), d.subsec_nanos()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_negative_infinity_on_second_boundary() {
        // R.sec == T.sec, T.nsec > R.nsec => diff == -1, not 0.
        let reference = (1_000, 10);
        let stat_time = (1_000, 20);
        assert_eq!(diff_in_unit(reference, stat_time, TimeUnit::Seconds), -1);
    }

    #[test]
    fn exact_second_match_is_zero() {
        let reference = (1_000, 20);
        let stat_time = (1_000, 10);
        assert_eq!(diff_in_unit(reference, stat_time, TimeUnit::Seconds), 0);
    }

    #[test]
    fn converts_to_days_with_truncating_division() {
        let reference = (86_400 * 3 + 5, 0);
        let stat_time = (5, 0);
        // Exactly 3 days elapsed.
        assert_eq!(diff_in_unit(reference, stat_time, TimeUnit::Days), 3);
    }

    #[test]
    fn negative_diff_truncates_toward_zero() {
        // stat time is in the future relative to reference: diff is negative.
        let reference = (10, 0);
        let stat_time = (100, 0);
        // -90 / 60 truncates to -1, matching C's `diff /= 60`, not -2.
        assert_eq!(diff_in_unit(reference, stat_time, TimeUnit::Minutes), -1);
    }
}
