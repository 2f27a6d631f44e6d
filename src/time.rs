// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Combining the GPS date stamp and GPS time stamp into a UTC instant.
//!
//! GPS date stamps are "YYYY:MM:DD" and GPS time stamps are three rationals
//! for hour, minute and second, always in UTC.

use crate::Error::*;
use crate::Result;
use chrono::prelude::*;
use chrono::TimeDelta;
use tracing::debug;

/// Hour, minute and second of a GPS time stamp, truncated to whole numbers.
pub type HourMinuteSecond = (i64, i64, i64);

/// Lenient conversion of GPS date and time to UTC.
///
/// Missing or non-numeric date components are read as zero, and so is any
/// month outside 1 to 12. Month 0 is December of the previous year and days
/// and times roll over, so day 0 is the last day of the previous month.
/// Returns `None` only when the result cannot be represented.
pub fn lenient_date_time(date_stamp: &str, time: HourMinuteSecond) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = date_stamp.trim_end_matches('\0').split(':').collect();

    let component = |index: usize, name: &str| -> i64 {
        match parts.get(index).and_then(|s| s.parse::<i64>().ok()) {
            Some(value) => value,
            None => {
                debug!(
                    "GPS date stamp {:?} has no usable {}, using 0",
                    date_stamp, name
                );
                0
            }
        }
    };

    let year = component(0, "year");
    let month = match component(1, "month") {
        month @ 1..=12 => month,
        month => {
            debug!("GPS date stamp {:?} has month {}, using 0", date_stamp, month);
            0
        }
    };
    let day = component(2, "day");
    let (hour, minute, second) = time;

    let months = month.checked_sub(1)?;
    let year = year.checked_add(months.div_euclid(12))?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;

    let first_of_month = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();

    let offset = TimeDelta::try_days(day.checked_sub(1)?)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?
        .checked_add(&TimeDelta::try_seconds(second)?)?;

    first_of_month.checked_add_signed(offset)
}

/// Strict conversion of GPS date and time to UTC.
/// The date must be exactly three numeric components forming a real calendar
/// date and the time must be a valid time of day.
pub fn strict_date_time(date_stamp: &str, time: HourMinuteSecond) -> Result<DateTime<Utc>> {
    let trimmed = date_stamp.trim_end_matches('\0');
    let parts: Vec<&str> = trimmed.split(':').collect();

    let [year, month, day] = parts.as_slice() else {
        return Err(MalformedDate(format!("date stamp {:?}", trimmed)));
    };

    let year: i32 = parse_part(year, trimmed)?;
    let month: u32 = parse_part(month, trimmed)?;
    let day: u32 = parse_part(day, trimmed)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| MalformedDate(format!("no such date {:?}", trimmed)))?;

    let (hour, minute, second) = time;
    let time = u32::try_from(hour)
        .ok()
        .zip(u32::try_from(minute).ok())
        .zip(u32::try_from(second).ok())
        .and_then(|((h, m), s)| NaiveTime::from_hms_opt(h, m, s))
        .ok_or_else(|| MalformedDate(format!("no such time {}:{}:{}", hour, minute, second)))?;

    Ok(date.and_time(time).and_utc())
}

fn parse_part<T: std::str::FromStr>(part: &str, date_stamp: &str) -> Result<T> {
    part.parse::<T>()
        .map_err(|_| MalformedDate(format!("non-numeric {:?} in {:?}", part, date_stamp)))
}
