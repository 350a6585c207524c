//! Sunday-to-Saturday reporting weeks.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// A reporting week, Sunday through Saturday inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_sunday());
        // Both shifts stay far inside NaiveDate's range for any real date.
        let start = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
        let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
        Self { start, end }
    }

    /// Display label such as `Oct 18 - Oct 24`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%b %-d"),
            self.end.format("%b %-d")
        )
    }

    /// ISO date of the first day, as stored in `period_start`.
    pub fn start_key(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// ISO date of the last day, as stored in `period_end`.
    pub fn end_key(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2026-10-18 is a Sunday.
        let sunday = date(2026, 10, 18);
        for day in 18..=24 {
            let week = WeekRange::containing(date(2026, 10, day));
            assert_eq!(week.start, sunday);
            assert_eq!(week.end, date(2026, 10, 24));
        }
        assert_eq!(WeekRange::containing(date(2026, 10, 25)).start, date(2026, 10, 25));
    }

    #[test]
    fn test_label_format() {
        let week = WeekRange::containing(date(2026, 10, 21));
        assert_eq!(week.label(), "Oct 18 - Oct 24");

        let across_months = WeekRange::containing(date(2026, 11, 2));
        assert_eq!(across_months.label(), "Nov 1 - Nov 7");

        let across_years = WeekRange::containing(date(2026, 12, 31));
        assert_eq!(across_years.label(), "Dec 27 - Jan 2");
    }

    #[test]
    fn test_keys() {
        let week = WeekRange::containing(date(2026, 3, 4));
        assert_eq!(week.start_key(), "2026-03-01");
        assert_eq!(week.end_key(), "2026-03-07");
    }
}
