use proptest::prelude::*;
use slugsync_types::{DateParts, DateSource, FixedDate, SystemDate};

#[test]
fn segments_are_zero_padded() {
    let date = DateParts::new(2024, 3, 7).unwrap();
    assert_eq!(date.year_segment(), "2024");
    assert_eq!(date.month_segment(), "03");
    assert_eq!(date.day_segment(), "07");
}

#[test]
fn two_digit_components_are_unchanged() {
    let date = DateParts::new(1999, 12, 31).unwrap();
    assert_eq!(date.month_segment(), "12");
    assert_eq!(date.day_segment(), "31");
}

#[test]
fn invalid_dates_are_rejected() {
    assert!(DateParts::new(2023, 2, 29).is_err());
    assert!(DateParts::new(2024, 13, 1).is_err());
    assert!(DateParts::new(2024, 4, 31).is_err());
}

#[test]
fn leap_day_is_accepted() {
    assert!(DateParts::new(2024, 2, 29).is_ok());
}

#[test]
fn display_is_iso_like() {
    let date = DateParts::new(2024, 1, 2).unwrap();
    assert_eq!(date.to_string(), "2024-01-02");
}

#[test]
fn fixed_date_source_is_stable() {
    let date = DateParts::new(2020, 5, 17).unwrap();
    let source = FixedDate(date);
    assert_eq!(source.today(), date);
    assert_eq!(source.today(), source.today());
}

#[test]
fn system_date_source_is_valid() {
    let today = SystemDate.today();
    assert!((1..=12).contains(&today.month()));
    assert!((1..=31).contains(&today.day()));
}

proptest! {
    #[test]
    fn padded_segments_are_two_chars(year in 1970i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let date = DateParts::new(year, month, day).unwrap();
        prop_assert_eq!(date.month_segment().len(), 2);
        prop_assert_eq!(date.day_segment().len(), 2);
        prop_assert_eq!(date.month_segment().parse::<u32>().unwrap(), month);
        prop_assert_eq!(date.day_segment().parse::<u32>().unwrap(), day);
    }
}
