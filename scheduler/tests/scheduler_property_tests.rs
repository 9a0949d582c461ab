// Property-based tests for the scheduler triggers

use chrono::{Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
use common::config::{SchedulerConfig, Settings};
use common::schedule::CronTrigger;
use proptest::prelude::*;

const TIMEZONES: &[chrono_tz::Tz] = &[
    chrono_tz::UTC,
    chrono_tz::Asia::Almaty,
    chrono_tz::Europe::Moscow,
    chrono_tz::America::New_York,
];

proptest! {
    #[test]
    fn prop_next_fire_is_strictly_later(offset_minutes in 0i64..(60 * 24 * 400)) {
        let trigger = CronTrigger::new("0 0 9 * * * *", chrono_tz::UTC).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset_minutes);
        let next = trigger.next_after(now).unwrap();

        prop_assert!(next > now);
        prop_assert!(next - now <= Duration::days(1));
    }

    #[test]
    fn prop_weekly_reports_land_on_friday_evening_local(
        offset_hours in 0i64..(24 * 365),
        tz_index in 0usize..TIMEZONES.len(),
    ) {
        let tz = TIMEZONES[tz_index];
        let trigger = CronTrigger::new(&SchedulerConfig::default().weekly_report_cron, tz).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(offset_hours);
        let local = trigger.next_after(now).unwrap().with_timezone(&tz);

        prop_assert_eq!(local.weekday(), Weekday::Fri);
        prop_assert_eq!(local.hour(), 18);
        prop_assert_eq!(local.minute(), 0);
    }

    #[test]
    fn prop_consecutive_bill_checks_are_a_day_apart(offset_hours in 0i64..(24 * 365)) {
        let trigger = CronTrigger::new(&SchedulerConfig::default().bill_check_cron, chrono_tz::UTC).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(offset_hours);
        let first = trigger.next_after(now).unwrap();
        let second = trigger.next_after(first).unwrap();

        prop_assert_eq!(second - first, Duration::days(1));
    }
}

#[test]
fn test_default_scheduler_settings_validate() {
    assert!(Settings::default().validate().is_ok());
}

#[test]
fn test_invalid_cron_fails_validation() {
    let mut settings = Settings::default();
    settings.scheduler.bill_check_cron = "daily at nine".to_string();
    assert!(settings.validate().is_err());
}
