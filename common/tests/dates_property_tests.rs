// Property-based tests for calendar grouping and relative times

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use common::dates::{
    day_range, month_bounds, notification_section, relative_time, section_rank,
    transaction_section, week_bounds, Period, EARLIER_THIS_WEEK, TODAY, YESTERDAY,
};
use common::report::week_windows;
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3_650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
    })
}

// Weeks run Monday through Sunday and contain the date they were built from
#[test]
fn property_week_bounds_contain_date() {
    proptest!(|(date in date_strategy())| {
        let (monday, sunday) = week_bounds(date);
        prop_assert_eq!(monday.weekday(), Weekday::Mon);
        prop_assert_eq!(sunday - monday, Duration::days(6));
        prop_assert!(monday <= date && date <= sunday);
    });
}

// Month bounds cover the whole month and nothing outside it
#[test]
fn property_month_bounds_cover_month() {
    proptest!(|(date in date_strategy())| {
        let (first, last) = month_bounds(date.year(), date.month()).expect("valid month");
        prop_assert_eq!(first.day(), 1);
        prop_assert!(first <= date && date <= last);
        prop_assert_eq!(last.month(), date.month());
        prop_assert_ne!((last + Duration::days(1)).month(), date.month());
        prop_assert_eq!(Period::Month.bounds(date), Some((first, last)));
    });
}

// Day ranges are half-open over whole days
#[test]
fn property_day_range_is_half_open() {
    proptest!(|(start in date_strategy(), len in 0i64..60)| {
        let end = start + Duration::days(len);
        let (from, to) = day_range(start, end).unwrap();
        prop_assert_eq!(to - from, Duration::days(len + 1));
        prop_assert_eq!(from.date_naive(), start);
    });
}

// Recent dates land in named sections whose rank follows recency
#[test]
fn property_sections_follow_recency() {
    proptest!(|(today in date_strategy(), age in 0i64..120)| {
        let date = today - Duration::days(age);
        let section = transaction_section(date, today);
        match age {
            0 => prop_assert_eq!(section.as_str(), TODAY),
            1 => prop_assert_eq!(section.as_str(), YESTERDAY),
            2..=7 => prop_assert_eq!(section.as_str(), EARLIER_THIS_WEEK),
            _ => prop_assert!(section_rank(&section) >= 3),
        }

        let older = transaction_section(date - Duration::days(1), today);
        prop_assert!(section_rank(&older) >= section_rank(&section));

        let group = notification_section(date, today);
        prop_assert!(section_rank(&group) <= 4);
    });
}

// Relative times pick the largest whole unit
#[test]
fn property_relative_time_units() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    proptest!(|(seconds in 0i64..10_000_000)| {
        let label = relative_time(now - Duration::seconds(seconds), now);
        let expected_unit = match seconds {
            0..=59 => None,
            60..=3_599 => Some("minute"),
            3_600..=86_399 => Some("hour"),
            86_400..=604_799 => Some("day"),
            _ => Some("week"),
        };
        match expected_unit {
            None => prop_assert_eq!(label, "just now"),
            Some(unit) => {
                prop_assert!(label.contains(unit), "{} should mention {}", label, unit);
                prop_assert!(label.ends_with(" ago"));
            }
        }
    });
}

// Trend windows start on Mondays, newest first, and never pass today
#[test]
fn property_week_windows_are_ordered() {
    proptest!(|(today in date_strategy(), count in 1u32..12)| {
        let windows = week_windows(today, count);
        prop_assert_eq!(windows.len(), count as usize);
        for (i, (number, start, end)) in windows.iter().enumerate() {
            prop_assert_eq!(*number, i as u32 + 1);
            prop_assert_eq!(start.weekday(), Weekday::Mon);
            prop_assert!(start <= end && *end <= today);
        }
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].1 - pair[1].1, Duration::days(7));
        }
    });
}
