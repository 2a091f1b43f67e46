// src/services/week.rs
//
// ISO-8601 week arithmetic. Weeks run Monday through Sunday; week 1 is
// the week containing the year's first Thursday, so the ISO year can
// differ from the calendar year around January 1st.
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::error::AppError;

/// Monday (00:00 of day 1) of the ISO week containing `date`. Sunday
/// counts as day 7 and maps back to the preceding Monday.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn monday_of_previous_week(date: NaiveDate) -> NaiveDate {
    monday_of_week(date) - Duration::days(7)
}

/// ISO year/week pair for `date`. Dec 31 can land in week 1 of the
/// next year and Jan 1 in week 52/53 of the previous one.
pub fn iso_week(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// External "YYYY-Wnn" label of the week containing `date`.
pub fn week_label(date: NaiveDate) -> String {
    let (year, week) = iso_week(date);
    format!("{:04}-W{:02}", year, week)
}

/// Parses a "YYYY-Wnn" label back to the Monday of that week.
/// Exact inverse of `week_label`.
pub fn parse_week_label(label: &str) -> Result<NaiveDate, AppError> {
    let (year_part, week_part) = label
        .split_once("-W")
        .ok_or_else(|| AppError::validation(format!("Invalid week label: {}", label)))?;

    let year: i32 = year_part
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid week label: {}", label)))?;
    let week: u32 = week_part
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid week label: {}", label)))?;

    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or_else(|| AppError::validation(format!("Week out of range: {}", label)))
}

/// Canonical wire form of a week start: UTC midnight of the Monday.
pub fn week_start_utc(monday: NaiveDate) -> DateTime<Utc> {
    monday.and_time(NaiveTime::MIN).and_utc()
}
