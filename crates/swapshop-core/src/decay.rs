// crates/swapshop-core/src/decay.rs
//
// Inactivity decay for trust scores.
//
// A user with no ledger activity for 12 or more months loses a flat 20
// points. Months are measured as fixed 30-day spans of wall-clock time,
// not calendar months. The penalty is applied once; it does not grow with
// further inactivity and is lifted by the next event.

use chrono::{DateTime, Duration, Utc};

/// Days in one inactivity month.
pub const DAYS_PER_MONTH: i64 = 30;

/// Months without activity before the penalty applies.
pub const INACTIVITY_THRESHOLD_MONTHS: u32 = 12;

/// Flat points subtracted from the raw score while inactive.
pub const INACTIVITY_PENALTY: i64 = 20;

/// Whole 30-day months elapsed from `since` to `now`.
///
/// Returns 0 if `now` is not after `since` (clock skew, future timestamps).
pub fn months_between(since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = now.signed_duration_since(since);
    if elapsed <= Duration::zero() {
        return 0;
    }
    let months = elapsed.num_days() / DAYS_PER_MONTH;
    u32::try_from(months).unwrap_or(u32::MAX)
}

/// Whether a months-inactive counter carries the inactivity penalty.
pub fn is_inactive(months_inactive: u32) -> bool {
    months_inactive >= INACTIVITY_THRESHOLD_MONTHS
}
