use std::collections::BTreeMap;

use adpulse::models::execution::EntityStatus;
use adpulse::models::schedule::{CyclePoint, SlotAction};

use crate::test_utils::{calendar, recurring, slot};

#[test]
fn four_point_cycle_order() {
    assert_eq!(CyclePoint::Stop1.next(true), Some(CyclePoint::Active1));
    assert_eq!(CyclePoint::Active1.next(true), Some(CyclePoint::Stop2));
    assert_eq!(CyclePoint::Stop2.next(true), Some(CyclePoint::Active2));
    assert_eq!(CyclePoint::Active2.next(true), None);
}

#[test]
fn two_point_cycle_ends_after_first_activation() {
    assert_eq!(CyclePoint::Stop1.next(false), Some(CyclePoint::Active1));
    assert_eq!(CyclePoint::Active1.next(false), None);
}

#[test]
fn cycle_points_drive_expected_statuses() {
    assert_eq!(CyclePoint::Stop1.desired_status(), EntityStatus::Paused);
    assert_eq!(CyclePoint::Stop2.desired_status(), EntityStatus::Paused);
    assert_eq!(CyclePoint::Active1.desired_status(), EntityStatus::Active);
    assert_eq!(CyclePoint::Active2.desired_status(), EntityStatus::Active);
}

#[test]
fn cycle_point_parse_rejects_unknown() {
    assert_eq!(CyclePoint::parse("STOP_1"), Some(CyclePoint::Stop1));
    assert_eq!(CyclePoint::parse("STOP_3"), None);
}

#[test]
fn recurring_validate_rejects_out_of_range_minute() {
    let schedule = recurring("o1", "e1", 480, 1440, None, None);
    assert!(schedule.validate().is_err());
}

#[test]
fn recurring_validate_rejects_unpaired_second_cycle() {
    let schedule = recurring("o1", "e1", 480, 600, Some(720), None);
    assert!(schedule.validate().is_err());
}

#[test]
fn recurring_points_follow_cycle_shape() {
    let two = recurring("o1", "e1", 480, 600, None, None);
    assert!(!two.is_four_point());
    assert_eq!(two.points(), vec![CyclePoint::Stop1, CyclePoint::Active1]);
    assert_eq!(two.final_point(), CyclePoint::Active1);
    assert_eq!(two.target_minute(CyclePoint::Stop2), None);

    let four = recurring("o1", "e1", 480, 600, Some(720), Some(840));
    assert!(four.is_four_point());
    assert_eq!(four.points().len(), 4);
    assert_eq!(four.final_point(), CyclePoint::Active2);
    assert_eq!(four.target_minute(CyclePoint::Active2), Some(840));
}

#[test]
fn time_slot_validate_requires_start_before_stop() {
    assert!(slot("s1", 540, 700).validate().is_ok());
    assert!(slot("s1", 700, 540).validate().is_err());
    assert!(slot("s1", 540, 540).validate().is_err());
    assert!(slot("s1", 540, 1440).validate().is_err());
}

#[test]
fn calendar_enabled_slot_detection() {
    let mut disabled = slot("s1", 540, 700);
    disabled.enabled = false;
    let schedule = calendar("o1", "e1", "2026-03-10", vec![disabled]);
    assert!(!schedule.has_enabled_slot());

    let schedule = calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)]);
    assert!(schedule.has_enabled_slot());
}

#[test]
fn calendar_date_prefilter_is_lexicographic_from() {
    let schedule = calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)]);
    assert!(schedule.has_date_from("2026-03-10"));
    assert!(schedule.has_date_from("2026-03-09"));
    assert!(!schedule.has_date_from("2026-03-11"));
}

#[test]
fn calendar_merge_replaces_per_date() {
    let mut schedule = calendar("o1", "e1", "2026-03-10", vec![slot("s1", 540, 700)]);
    let mut incoming = BTreeMap::new();
    incoming.insert("2026-03-10".to_string(), vec![slot("s2", 60, 120)]);
    incoming.insert("2026-03-11".to_string(), vec![slot("s3", 540, 700)]);
    schedule.merge_days(incoming);

    assert_eq!(schedule.days.len(), 2);
    assert_eq!(schedule.days["2026-03-10"][0].id, "s2");
    assert_eq!(schedule.days["2026-03-11"][0].id, "s3");
}

#[test]
fn slot_action_statuses_and_parse() {
    assert_eq!(SlotAction::Activate.desired_status(), EntityStatus::Active);
    assert_eq!(SlotAction::Stop.desired_status(), EntityStatus::Paused);
    assert_eq!(SlotAction::parse("stop"), Some(SlotAction::Stop));
    assert_eq!(SlotAction::parse("STOP"), None);
}
