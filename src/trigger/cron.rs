// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Five-field cron schedules evaluated in UTC

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::errors::ScrapeflowError;

/// Upper bound on the search for the next fire time
const SEARCH_YEARS: i64 = 5;

/// A parsed cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expr: String,
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    /// Parse `minute hour day-of-month month day-of-week`
    pub fn parse(expr: &str) -> Result<Self, ScrapeflowError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid(
                expr,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        }

        let minutes = parse_field(expr, fields[0], 0, 59, "minute")?;
        let hours = parse_field(expr, fields[1], 0, 23, "hour")?;
        let days_of_month = parse_field(expr, fields[2], 1, 31, "day-of-month")?;
        let months = parse_field(expr, fields[3], 1, 12, "month")?;
        let mut days_of_week = parse_field(expr, fields[4], 0, 7, "day-of-week")?;

        // 7 is an alias for Sunday
        if days_of_week & (1 << 7) != 0 {
            days_of_week = (days_of_week & !(1 << 7)) | 1;
        }

        Ok(Self {
            expr: fields.join(" "),
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    /// The normalized expression text
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Whether the schedule fires during the minute containing `t`
    pub fn matches(&self, t: &DateTime<Utc>) -> bool {
        let naive = t.naive_utc();
        self.day_matches(naive.date())
            && bit(self.hours, naive.hour())
            && bit(self.minutes, naive.minute())
    }

    /// First fire time strictly after `after`
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let naive = after.naive_utc();
        let limit = naive + Duration::days(366 * SEARCH_YEARS);
        let mut current = naive
            .date()
            .and_hms_opt(naive.hour(), naive.minute(), 0)?
            + Duration::minutes(1);

        while current <= limit {
            let date = current.date();

            if !bit(self.months, date.month()) {
                current = first_of_next_month(date)?.and_hms_opt(0, 0, 0)?;
                continue;
            }

            if !self.day_matches(date) {
                current = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }

            if !bit(self.hours, current.hour()) {
                current = truncate_to_hour(current)? + Duration::hours(1);
                continue;
            }

            if !bit(self.minutes, current.minute()) {
                current += Duration::minutes(1);
                continue;
            }

            return Some(current.and_utc());
        }

        None
    }

    /// The next `count` fire times after `after`
    pub fn upcoming(&self, after: &DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut times = Vec::with_capacity(count);
        let mut cursor = *after;

        while times.len() < count {
            match self.next_after(&cursor) {
                Some(next) => {
                    times.push(next);
                    cursor = next;
                }
                None => break,
            }
        }

        times
    }

    /// Short human description, e.g. "daily at 16:00 UTC"
    pub fn describe(&self) -> String {
        let single = |mask: u64| mask.count_ones() == 1;
        let daily = !self.dom_restricted && !self.dow_restricted && self.months == full(1, 12);

        if daily && single(self.minutes) && single(self.hours) {
            format!(
                "daily at {:02}:{:02} UTC",
                self.hours.trailing_zeros(),
                self.minutes.trailing_zeros()
            )
        } else {
            format!("cron '{}' (UTC)", self.expr)
        }
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = bit(self.days_of_month, date.day());
        let dow = bit(self.days_of_week, date.weekday().num_days_from_sunday());

        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl std::str::FromStr for CronSchedule {
    type Err = ScrapeflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(expr: &str, reason: String) -> ScrapeflowError {
    ScrapeflowError::InvalidSchedule {
        expr: expr.to_string(),
        reason,
    }
}

fn bit(mask: u64, value: u32) -> bool {
    mask & (1 << value) != 0
}

fn full(min: u32, max: u32) -> u64 {
    (min..=max).fold(0, |acc, v| acc | (1 << v))
}

fn parse_field(expr: &str, field: &str, min: u32, max: u32, name: &str) -> Result<u64, ScrapeflowError> {
    let mut mask = 0u64;

    for part in field.split(',') {
        if part.is_empty() {
            return Err(invalid(expr, format!("empty list item in {} field", name)));
        }

        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| invalid(expr, format!("invalid step '{}' in {} field", step, name)))?;
                if step == 0 {
                    return Err(invalid(expr, format!("step of zero in {} field", name)));
                }
                (range, step)
            }
            None => (part, 1),
        };

        let (start, end) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(expr, a, min, max, name)?, parse_value(expr, b, min, max, name)?)
        } else {
            let v = parse_value(expr, range, min, max, name)?;
            // `5/15` means "from 5 to the end, every 15"
            if part.contains('/') {
                (v, max)
            } else {
                (v, v)
            }
        };

        if start > end {
            return Err(invalid(expr, format!("range {}-{} is reversed in {} field", start, end, name)));
        }

        let mut v = start;
        while v <= end {
            mask |= 1 << v;
            v += step;
        }
    }

    Ok(mask)
}

fn parse_value(expr: &str, value: &str, min: u32, max: u32, name: &str) -> Result<u32, ScrapeflowError> {
    let v: u32 = value
        .parse()
        .map_err(|_| invalid(expr, format!("'{}' is not a number in {} field", value, name)))?;

    if v < min || v > max {
        return Err(invalid(
            expr,
            format!("{} is outside {}-{} in {} field", v, min, max, name),
        ));
    }

    Ok(v)
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn truncate_to_hour(t: NaiveDateTime) -> Option<NaiveDateTime> {
    t.date().and_hms_opt(t.hour(), 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_daily_schedule_matches_its_minute() {
        let cron = CronSchedule::parse("0 16 * * *").unwrap();
        assert!(cron.matches(&at(2025, 5, 1, 16, 0)));
        assert!(!cron.matches(&at(2025, 5, 1, 16, 1)));
        assert!(!cron.matches(&at(2025, 5, 1, 12, 0)));
    }

    #[test]
    fn test_next_after_rolls_to_next_day() {
        let cron = CronSchedule::parse("0 16 * * *").unwrap();
        assert_eq!(cron.next_after(&at(2025, 5, 1, 16, 0)), Some(at(2025, 5, 2, 16, 0)));
        assert_eq!(cron.next_after(&at(2025, 5, 1, 15, 59)), Some(at(2025, 5, 1, 16, 0)));
    }

    #[test]
    fn test_next_after_year_boundary() {
        let cron = CronSchedule::parse("0 12 * * *").unwrap();
        assert_eq!(cron.next_after(&at(2025, 12, 31, 13, 0)), Some(at(2026, 1, 1, 12, 0)));
    }

    #[test]
    fn test_steps_ranges_and_lists() {
        let cron = CronSchedule::parse("*/15 9-17/4 1,15 * *").unwrap();
        assert!(cron.matches(&at(2025, 3, 15, 13, 45)));
        assert!(!cron.matches(&at(2025, 3, 15, 11, 45)));
        assert!(!cron.matches(&at(2025, 3, 16, 13, 45)));
    }

    #[test]
    fn test_day_of_month_or_day_of_week() {
        // The 1st of the month, or any Monday
        let cron = CronSchedule::parse("0 0 1 * 1").unwrap();
        // 2025-05-05 is a Monday
        assert!(cron.matches(&at(2025, 5, 5, 0, 0)));
        // 2025-05-01 is a Thursday
        assert!(cron.matches(&at(2025, 5, 1, 0, 0)));
        assert!(!cron.matches(&at(2025, 5, 6, 0, 0)));
    }

    #[test]
    fn test_sunday_alias() {
        let seven = CronSchedule::parse("0 0 * * 7").unwrap();
        let zero = CronSchedule::parse("0 0 * * 0").unwrap();
        // 2025-05-04 is a Sunday
        assert!(seven.matches(&at(2025, 5, 4, 0, 0)));
        assert_eq!(seven.next_after(&at(2025, 5, 1, 0, 0)), zero.next_after(&at(2025, 5, 1, 0, 0)));
    }

    #[test]
    fn test_leap_day_schedule() {
        let cron = CronSchedule::parse("30 6 29 2 *").unwrap();
        assert_eq!(cron.next_after(&at(2025, 1, 1, 0, 0)), Some(at(2028, 2, 29, 6, 30)));
    }

    #[test]
    fn test_impossible_date_has_no_next() {
        let cron = CronSchedule::parse("0 0 31 2 *").unwrap();
        assert_eq!(cron.next_after(&at(2025, 1, 1, 0, 0)), None);
    }

    #[test]
    fn test_invalid_expressions() {
        for expr in ["", "0 16 * *", "60 * * * *", "* 24 * * *", "*/0 * * * *", "5-1 * * * *", "a * * * *", "0,,1 * * * *"] {
            assert!(CronSchedule::parse(expr).is_err(), "{expr} should be rejected");
        }
    }

    #[test]
    fn test_upcoming_and_describe() {
        let cron = CronSchedule::parse("0 12 * * *").unwrap();
        let times = cron.upcoming(&at(2025, 5, 1, 0, 0), 3);
        assert_eq!(times, vec![at(2025, 5, 1, 12, 0), at(2025, 5, 2, 12, 0), at(2025, 5, 3, 12, 0)]);
        assert_eq!(cron.describe(), "daily at 12:00 UTC");
        assert_eq!(CronSchedule::parse("0 12 * * 1").unwrap().describe(), "cron '0 12 * * 1' (UTC)");
    }
}
