//! Minute-of-day tolerance window with midnight wraparound
//!
//! The sole primitive for "is it approximately time T now". Every scheduling
//! decision routes through it, so the wraparound cases at the day boundary
//! are safety-critical for the whole engine.

const MINUTES_PER_DAY: i64 = 1440;

/// True when `current` falls inside `[target - tolerance, target + tolerance]`
/// inclusive, with both endpoints wrapped modulo 1440.
///
/// Three cases: the window dips below minute 0 (near midnight from below),
/// extends past 1439 (near midnight from above), or sits wholly inside the
/// day.
pub fn is_within_window(current: u32, target: u32, tolerance: u32) -> bool {
    let current = (current as i64).rem_euclid(MINUTES_PER_DAY);
    let target = (target as i64).rem_euclid(MINUTES_PER_DAY);
    let tolerance = tolerance as i64;

    let lower = target - tolerance;
    let upper = target + tolerance;

    if lower < 0 {
        // Window wraps below midnight: [lower+1440, 1439] ∪ [0, upper]
        current >= lower + MINUTES_PER_DAY || current <= upper
    } else if upper >= MINUTES_PER_DAY {
        // Window wraps above midnight: [lower, 1439] ∪ [0, upper-1440]
        current >= lower || current <= upper - MINUTES_PER_DAY
    } else {
        current >= lower && current <= upper
    }
}
