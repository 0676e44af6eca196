//! Cell coercion: numbers, whole-number years and calendar dates.
//!
//! Every function returns `None` for a cell it cannot interpret; callers decide
//! whether that drops a value or a whole row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::io::raw::Cell;

/// Coerce a cell to a finite number.
///
/// `NaN`/`inf` spellings are rejected along with anything non-numeric.
pub fn parse_number(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Coerce a cell to a whole-number year (`2000`, `"2000"`, `"2000.0"`).
///
/// Range checks are left to the caller.
pub fn parse_year(cell: &Cell) -> Option<i32> {
    if let Cell::Text(s) = cell {
        if let Ok(year) = s.trim().parse::<i32>() {
            return Some(year);
        }
    }
    let value = parse_number(cell)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Parse a calendar date in one of the usual year-month(-day) spellings.
///
/// Month-only values (`2000-01`) resolve to the first of the month and a bare
/// year (`2000`) to January 1st. Time-of-day suffixes, with or without fractional
/// seconds or a UTC offset, are accepted and ignored.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(_) => parse_year(cell).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        Cell::Text(s) => parse_date_str(s.trim()),
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ"];

    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Offset timestamps keep the calendar date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Year-month: chrono needs a day, so pin it to the first.
    for (sep, fmt) in [('-', "%Y-%m-%d"), ('/', "%Y/%m/%d")] {
        if s.matches(sep).count() == 1 {
            if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}{sep}01"), fmt) {
                return Some(d);
            }
        }
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }

    None
}
