//! Calendar month windows for payout reconciliation
//!
//! A payout period is a "YYYY-MM" key. Windows are half-open UTC ranges:
//! the first instant of the month up to (excluding) the first instant of
//! the next month, so adjacent periods never overlap.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::errors::{LedgerError, Result};

/// Parse a "YYYY-MM" period key into its half-open UTC window.
pub fn month_window(period: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (year, month) = parse_period_key(period)?;

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::validation(format!("Invalid period: {}", period)))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| LedgerError::validation(format!("Invalid period: {}", period)))?;

    Ok((
        Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
        Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)),
    ))
}

fn parse_period_key(period: &str) -> Result<(i32, u32)> {
    let err = || LedgerError::validation(format!("Period must be YYYY-MM, got: {}", period));

    let (y, m) = period.split_once('-').ok_or_else(err)?;
    if y.len() != 4
        || m.len() != 2
        || !y.bytes().all(|b| b.is_ascii_digit())
        || !m.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(err());
    }

    let year: i32 = y.parse().map_err(|_| err())?;
    let month: u32 = m.parse().map_err(|_| err())?;
    if !(1..=12).contains(&month) {
        return Err(LedgerError::validation(format!(
            "Period month out of range: {}",
            period
        )));
    }

    Ok((year, month))
}
