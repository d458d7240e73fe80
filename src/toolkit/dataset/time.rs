/*
Copyright 2024 Jakub Lewandowski

This file is part of Wave Model Verification Toolkit (WMVT).

Wave Model Verification Toolkit (WMVT) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

Wave Model Verification Toolkit (WMVT) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Wave Model Verification Toolkit (WMVT). If not, see https://www.gnu.org/licenses/.
*/

//! Decoding and encoding of CF time coordinates.
//!
//! Times are kept as [`NaiveDateTime`] rounded to whole seconds,
//! so series stored with different units or reference dates
//! can be compared with exact equality.

use crate::constants::{SECONDS_IN_DAY, SECONDS_IN_HOUR, SECONDS_IN_MINUTE};
use crate::errors::DatasetError;
use crate::Float;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest offset (in seconds) accepted when decoding,
/// roughly 30 million years.
const MAX_OFFSET_SECONDS: Float = 1.0e15;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parsed `"<unit> since <reference>"` attribute.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct TimeUnits {
    step_seconds: Float,
    reference: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self, DatasetError> {
        let mut parts = units.split_whitespace();

        let step_seconds = match parts.next().map(str::to_lowercase).as_deref() {
            Some("seconds" | "second" | "secs" | "sec" | "s") => 1.0,
            Some("minutes" | "minute" | "mins" | "min") => SECONDS_IN_MINUTE,
            Some("hours" | "hour" | "hrs" | "hr" | "h") => SECONDS_IN_HOUR,
            Some("days" | "day" | "d") => SECONDS_IN_DAY,
            _ => {
                return Err(DatasetError::InvalidTime(format!(
                    "unsupported time units: '{}'",
                    units
                )))
            }
        };

        if parts.next().map(str::to_lowercase).as_deref() != Some("since") {
            return Err(DatasetError::InvalidTime(format!(
                "unexpected time units format: '{}'",
                units
            )));
        }

        let reference_str = parts.collect::<Vec<_>>().join(" ");
        let reference = parse_reference(&reference_str)?;

        Ok(TimeUnits {
            step_seconds,
            reference,
        })
    }

    pub fn decode(&self, offset: Float) -> Result<NaiveDateTime, DatasetError> {
        let seconds = offset * self.step_seconds;

        if !seconds.is_finite() || seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(DatasetError::InvalidTime(format!(
                "time offset {} cannot be represented",
                offset
            )));
        }

        self.reference
            .checked_add_signed(Duration::seconds(seconds.round() as i64))
            .ok_or_else(|| {
                DatasetError::InvalidTime(format!("date overflow for time offset {}", offset))
            })
    }

    /// Offset of the time from reference, in units of this struct.
    pub fn encode(&self, time: NaiveDateTime) -> Float {
        (time - self.reference).num_seconds() as Float / self.step_seconds
    }
}

/// Reference datetime may come with or without time of day
/// and with a trailing timezone marker, which is ignored.
fn parse_reference(reference: &str) -> Result<NaiveDateTime, DatasetError> {
    let trimmed = reference
        .trim()
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            DatasetError::InvalidTime(format!("cannot parse reference date '{}'", reference))
        })
}
