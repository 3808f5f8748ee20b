// tests/fromnow_tests.rs

use chrono::{DateTime, Duration, Utc};

use jsone::fromnow::{format_iso, parse_offset};

// ============================================================================
// Offset parsing
// ============================================================================

#[test]
fn parses_simple_offset() {
    let d = parse_offset("1 day").unwrap();
    assert_eq!(d, Duration::days(1));
}

#[test]
fn parses_negative_offset() {
    let d = parse_offset("-2 hours").unwrap();
    assert_eq!(d, Duration::hours(-2));
}

#[test]
fn parses_compound_offset_in_order() {
    let d = parse_offset("1 year 2 days").unwrap();
    assert_eq!(d, Duration::days(365 + 2));
}

#[test]
fn comma_separated_groups_are_tolerated() {
    let d = parse_offset("1 year, 2 days").unwrap();
    assert_eq!(d, Duration::days(365 + 2));
}

#[test]
fn out_of_order_units_rejected() {
    assert!(parse_offset("1 day 2 years").is_err());
}

#[test]
fn short_spellings_supported() {
    assert_eq!(parse_offset("1 yr").unwrap(), Duration::days(365));
    assert_eq!(parse_offset("2 wk").unwrap(), Duration::days(14));
    assert_eq!(parse_offset("3 hr").unwrap(), Duration::hours(3));
}

// ============================================================================
// ISO formatting
// ============================================================================

#[test]
fn format_iso_matches_expected_shape() {
    let dt = DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
    assert_eq!(format_iso(dt), "2021-01-01T00:00:00.000Z");
}
