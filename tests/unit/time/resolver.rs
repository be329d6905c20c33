use adpulse::time::{local_date, minute_of_day};

use crate::test_utils::utc;

#[test]
fn resolves_utc_minute_and_date() {
    let instant = utc(2026, 1, 15, 12, 30);
    assert_eq!(minute_of_day("UTC", instant), 750);
    assert_eq!(local_date("UTC", instant), "2026-01-15");
}

#[test]
fn resolves_fixed_offset_zone() {
    // Tokyo has no DST: 12:30 UTC is always 21:30 local
    let instant = utc(2026, 1, 15, 12, 30);
    assert_eq!(minute_of_day("Asia/Tokyo", instant), 21 * 60 + 30);
    assert_eq!(local_date("Asia/Tokyo", instant), "2026-01-15");
}

#[test]
fn resolves_dst_zone_in_winter() {
    // Mid-January: America/New_York is UTC-5
    let instant = utc(2026, 1, 15, 12, 30);
    assert_eq!(minute_of_day("America/New_York", instant), 7 * 60 + 30);
}

#[test]
fn local_date_crosses_day_boundary() {
    // 23:00 UTC is already the next day in Tokyo
    let instant = utc(2026, 1, 15, 23, 0);
    assert_eq!(local_date("Asia/Tokyo", instant), "2026-01-16");
    // ...and still the previous day in New York
    let instant = utc(2026, 1, 15, 3, 0);
    assert_eq!(local_date("America/New_York", instant), "2026-01-14");
}

#[test]
fn unknown_timezone_falls_back_without_panicking() {
    let instant = utc(2026, 1, 15, 12, 30);
    // Minute degrades to the process-local clock; still a valid minute-of-day
    assert!(minute_of_day("Not/AZone", instant) <= 1439);
    // Date degrades to UTC
    assert_eq!(local_date("Not/AZone", instant), "2026-01-15");
}
