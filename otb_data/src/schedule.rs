//! The fixed lead-time bucket schedule
//!
//! Snapshots are taken on a non-uniform grid of lead times: monthly from a
//! year out, weekly from about six months out, daily over the final month.
//! The grid is deliberately kept as plain integer day counts - snapshot
//! values are stored in a `days_out -> value` map, so adding buckets never
//! requires schema changes.

/// Longest lead time observed, in days
pub const MAX_DAYS_OUT: u16 = 365;

/// Lead time at which weekly observation starts
pub const WEEKLY_MAX: u16 = 177;

/// Lead time at which daily observation starts
pub const DAILY_MAX: u16 = 30;

const MONTHLY_STEP: u16 = 31;
const WEEKLY_STEP: u16 = 7;

/// The full snapshot schedule, in descending days-out order
///
/// 6 monthly buckets (365 down to 210), 21 weekly buckets (177 down to 37)
/// and 31 daily buckets (30 down to 0) - 58 buckets in total.
pub fn snapshot_buckets() -> Vec<u16> {
    let monthly = (0..6u16).map(|i| MAX_DAYS_OUT - i * MONTHLY_STEP);
    let weekly = (0..21u16).map(|i| WEEKLY_MAX - i * WEEKLY_STEP);
    let daily = (0..=DAILY_MAX).rev();
    monthly.chain(weekly).chain(daily).collect()
}

/// Whether a lead time falls on the snapshot schedule
pub fn is_snapshot_bucket(days_out: u16) -> bool {
    if days_out <= DAILY_MAX {
        return true;
    }
    if (37..=WEEKLY_MAX).contains(&days_out) {
        return (WEEKLY_MAX - days_out) % WEEKLY_STEP == 0;
    }
    if (210..=MAX_DAYS_OUT).contains(&days_out) {
        return (MAX_DAYS_OUT - days_out) % MONTHLY_STEP == 0;
    }
    false
}

/// The tightest scheduled bucket at or above a lead time
///
/// This is the lead time of the most recent observation that can exist for
/// a date seen `lead` days ahead: snapshots at smaller days-out values lie
/// in the future. Returns `None` when the lead time is beyond the
/// observation horizon.
pub fn bucket_at_or_above(lead: u16) -> Option<u16> {
    if lead > MAX_DAYS_OUT {
        return None;
    }
    snapshot_buckets().into_iter().rev().find(|&b| b >= lead)
}
