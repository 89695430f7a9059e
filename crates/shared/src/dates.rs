//! The service reads dates as `YYYY-MM-DD` strings but writes them back as a
//! `[year, month, day]` array.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::DateFormatError;

const SERVICE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Kept as the verbatim JSON value so a malformed date from the service stays
/// in the cache untouched and simply renders as unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceDate(pub Value);

impl ServiceDate {
    pub fn from_parts(year: i64, month: i64, day: i64) -> Self {
        Self(json!([year, month, day]))
    }

    /// `(year, month, day)` when the value is a 3-element integer array.
    pub fn parts(&self) -> Option<(i64, i64, i64)> {
        let Value::Array(items) = &self.0 else {
            return None;
        };
        let [year, month, day] = items.as_slice() else {
            return None;
        };
        Some((year.as_i64()?, month.as_i64()?, day.as_i64()?))
    }
}

/// Converts `DD/MM/YYYY` into the `YYYY-MM-DD` string the service accepts.
///
/// Day and month are left-padded to two digits; the year passes through as
/// typed. Calendar validity is not checked, so `31/04/2020` becomes
/// `2020-04-31`.
pub fn to_service_form(display: &str) -> Result<String, DateFormatError> {
    let display = display.trim();
    let parts: Vec<&str> = display.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(DateFormatError::NotDayMonthYear {
            input: display.to_string(),
        });
    };

    let day = numeric_part("day", day, display)?;
    let month = numeric_part("month", month, display)?;
    let year = numeric_part("year", year, display)?;

    Ok(format!("{year}-{month:0>2}-{day:0>2}"))
}

/// Renders a service date as `D/MM/YYYY`.
///
/// Only the month is zero-padded. Anything other than a 3-element integer
/// array yields an empty string, which callers must treat as "unknown".
pub fn to_display_form(service: &ServiceDate) -> String {
    match service.parts() {
        Some((year, month, day)) => format!("{day}/{month:02}/{year}"),
        None => String::new(),
    }
}

fn numeric_part<'a>(
    part: &'static str,
    value: &'a str,
    input: &str,
) -> Result<&'a str, DateFormatError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateFormatError::NonNumericPart {
            part,
            input: input.to_string(),
        });
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses operator text, rejecting dates such as `31/04/2020` that
    /// [`to_service_form`] would let through.
    pub fn parse_display(display: &str) -> Result<Self, DateFormatError> {
        let service = to_service_form(display)?;
        NaiveDate::parse_from_str(&service, SERVICE_FORMAT)
            .map(Self)
            .map_err(|_| DateFormatError::NotACalendarDate {
                input: display.trim().to_string(),
            })
    }

    pub fn from_service(service: &ServiceDate) -> Option<Self> {
        let (year, month, day) = service.parts()?;
        NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        )
        .map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn to_service_form(&self) -> String {
        self.0.format(SERVICE_FORMAT).to_string()
    }

    pub fn to_service_date(&self) -> ServiceDate {
        ServiceDate::from_parts(
            i64::from(self.0.year()),
            i64::from(self.0.month()),
            i64::from(self.0.day()),
        )
    }

    /// `DD/MM/YYYY` with both day and month padded.
    pub fn to_display_form(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }
}

#[cfg(test)]
#[path = "tests/dates_tests.rs"]
mod tests;
