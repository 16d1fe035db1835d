use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::Serialize;

/// One ISO week in UTC, bounded by epoch seconds.
/// `after` is Monday 00:00:00, `before` is the following Monday 00:00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub year: i32,
    pub week: u32,
    pub after: i64,
    pub before: i64,
}

impl WeekRange {
    /// Returns `None` when the year has no such ISO week.
    pub fn iso(year: i32, week: u32) -> Option<Self> {
        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
        Some(Self::from_monday(monday))
    }

    pub fn containing(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        let back = i64::from(date.weekday().num_days_from_monday());
        Self::from_monday(date - Duration::days(back))
    }

    fn from_monday(monday: NaiveDate) -> Self {
        let iso = monday.iso_week();
        let start = monday.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(7);
        Self {
            year: iso.year(),
            week: iso.week(),
            after: start.timestamp(),
            before: end.timestamp(),
        }
    }
}
