// Calendar helpers shared by transactions, budgets, notifications and reports

use crate::errors::ValidationError;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc};
use std::str::FromStr;

pub const TODAY: &str = "Today";
pub const YESTERDAY: &str = "Yesterday";
pub const EARLIER_THIS_WEEK: &str = "Earlier This Week";
pub const THIS_MONTH: &str = "This Month";

/// Midnight UTC at the start of `date`
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Midnight UTC after `date`, the exclusive end of a whole-day range
pub fn day_end(date: NaiveDate) -> Result<DateTime<Utc>, ValidationError> {
    date.succ_opt()
        .map(day_start)
        .ok_or_else(|| ValidationError::invalid("end_date", "Date is out of range"))
}

/// `[start, end)` covering whole days from `start` through `end`
pub fn day_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    Ok((day_start(start), day_end(end)?))
}

/// First and last day of a month, `None` for an invalid month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}

/// Monday and Sunday of the week containing `date`
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// "September 2023"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Section a transaction dated `date` is listed under
pub fn transaction_section(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        TODAY.to_string()
    } else if date == today - Duration::days(1) {
        YESTERDAY.to_string()
    } else if date >= today - Duration::days(7) {
        EARLIER_THIS_WEEK.to_string()
    } else if date.month() == today.month() && date.year() == today.year() {
        THIS_MONTH.to_string()
    } else {
        month_label(date)
    }
}

/// Group a notification created on `date` is listed under
pub fn notification_section(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        TODAY.to_string()
    } else if date == today - Duration::days(1) {
        YESTERDAY.to_string()
    } else if date > today - Duration::days(7) {
        EARLIER_THIS_WEEK.to_string()
    } else {
        month_label(date)
    }
}

/// Sort rank of a section title; month sections share the last rank
pub fn section_rank(title: &str) -> u8 {
    match title {
        TODAY => 0,
        YESTERDAY => 1,
        EARLIER_THIS_WEEK => 2,
        THIS_MONTH => 3,
        _ => 4,
    }
}

/// "just now", "5 minutes ago", "1 hour ago", "3 days ago", "2 weeks ago"
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();

    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    }

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        plural(seconds / 60, "minute")
    } else if seconds < 86_400 {
        plural(seconds / 3_600, "hour")
    } else if seconds < 604_800 {
        plural(seconds / 86_400, "day")
    } else {
        plural(seconds / 604_800, "week")
    }
}

/// Named listing window for transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            _ => Err(
                "Invalid period. Must be one of: day, week, month, year, all".to_string(),
            ),
        }
    }
}

impl Period {
    /// First and last day of the window containing `date`
    ///
    /// `None` for `All` and for windows that fall outside the calendar.
    pub fn bounds(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Period::Day => Some((date, date)),
            Period::Week => {
                let offset = date.weekday().num_days_from_monday() as u64;
                let monday = date.checked_sub_days(Days::new(offset))?;
                Some((monday, monday.checked_add_days(Days::new(6))?))
            }
            Period::Month => month_bounds(date.year(), date.month()),
            Period::Year => Some((
                NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(date.year(), 12, 31)?,
            )),
            Period::All => None,
        }
    }
}
