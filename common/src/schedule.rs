// Cron parsing and next-fire calculation for the scheduler jobs

use crate::errors::ScheduleError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::str::FromStr;

/// Parse a seven-field cron expression (seconds through year)
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    CronSchedule::from_str(expression).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name).map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// A cron expression bound to the timezone it is evaluated in
#[derive(Debug, Clone)]
pub struct CronTrigger {
    expression: String,
    schedule: CronSchedule,
    timezone: Tz,
}

impl CronTrigger {
    pub fn new(expression: &str, timezone: Tz) -> Result<Self, ScheduleError> {
        Ok(Self {
            expression: expression.to_string(),
            schedule: parse_cron_expression(expression)?,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First fire time strictly after `after`, returned in UTC
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        let local = after.with_timezone(&self.timezone);
        self.schedule
            .after(&local)
            .next()
            .map(|next| next.with_timezone(&Utc))
            .ok_or_else(|| ScheduleError::NoNextExecution {
                schedule: self.expression.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Weekday};

    #[test]
    fn test_parse_valid_cron_expression() {
        assert!(parse_cron_expression("0 0 18 * * Fri *").is_ok());
        assert!(parse_cron_expression("0 0 9 * * * *").is_ok());
    }

    #[test]
    fn test_parse_invalid_cron_expression() {
        let err = parse_cron_expression("every friday").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidCronExpression { .. }));
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/London").unwrap(), chrono_tz::Europe::London);
        assert!(matches!(
            parse_timezone("Nowhere/Special"),
            Err(ScheduleError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_weekly_report_fires_friday_evening() {
        let trigger = CronTrigger::new("0 0 18 * * Fri *", chrono_tz::UTC).unwrap();
        // Wednesday
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let next = trigger.next_after(now).unwrap();

        assert_eq!(next.weekday(), Weekday::Fri);
        assert_eq!(next.day(), 17);
        assert_eq!(next.hour(), 18);
    }

    #[test]
    fn test_next_fire_is_strictly_after() {
        let trigger = CronTrigger::new("0 0 9 * * * *", chrono_tz::UTC).unwrap();
        let at_nine = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
        let next = trigger.next_after(at_nine).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 16, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_respects_timezone() {
        let trigger = CronTrigger::new("0 0 9 * * * *", chrono_tz::Asia::Almaty).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let next = trigger.next_after(now).unwrap();

        let local = next.with_timezone(&chrono_tz::Asia::Almaty);
        assert_eq!(local.hour(), 9);
        assert_ne!(next.hour(), 9);
    }

    #[test]
    fn test_expired_year_has_no_next_fire() {
        let trigger = CronTrigger::new("0 0 9 1 1 * 2020", chrono_tz::UTC).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        assert!(matches!(
            trigger.next_after(now),
            Err(ScheduleError::NoNextExecution { .. })
        ));
    }
}
