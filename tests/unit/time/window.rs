use adpulse::time::is_within_window;

#[test]
fn matches_inside_tolerance() {
    assert!(is_within_window(100, 100, 5));
    assert!(is_within_window(95, 100, 5));
    assert!(is_within_window(105, 100, 5));
}

#[test]
fn rejects_outside_tolerance() {
    assert!(!is_within_window(94, 100, 5));
    assert!(!is_within_window(106, 100, 5));
    assert!(!is_within_window(6, 0, 5));
}

#[test]
fn boundary_is_inclusive() {
    assert!(is_within_window(5, 0, 5));
    assert!(is_within_window(1434, 1439, 5));
}

#[test]
fn wraps_before_midnight_target() {
    // 23:58 against a midnight target is 2 minutes away, not 1438
    assert!(is_within_window(1438, 0, 5));
    assert!(is_within_window(1435, 0, 5));
    assert!(!is_within_window(1434, 0, 5));
}

#[test]
fn wraps_after_midnight_target() {
    // 00:02 against a 23:58 target is 4 minutes away
    assert!(is_within_window(2, 1438, 5));
    assert!(!is_within_window(4, 1438, 2));
}

#[test]
fn zero_tolerance_requires_exact_match() {
    assert!(is_within_window(720, 720, 0));
    assert!(!is_within_window(721, 720, 0));
}
