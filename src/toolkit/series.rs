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

//! Module with the time series type shared by
//! the extraction and comparison steps.
//!
//! Missing values are stored as NaN.

use super::configuration::Period;
use crate::errors::SeriesError;
use crate::Float;
use chrono::{NaiveDateTime, Timelike};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Values of one variable at one location,
/// ordered by time.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    values: Vec<Float>,
}

impl TimeSeries {
    pub fn new(times: Vec<NaiveDateTime>, values: Vec<Float>) -> Result<Self, SeriesError> {
        if times.len() != values.len() {
            return Err(SeriesError::LengthMismatch(times.len(), values.len()));
        }

        Ok(TimeSeries { times, values })
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn values(&self) -> &[Float] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First time that is not later than its predecessor, if any.
    pub fn first_unordered_time(&self) -> Option<NaiveDateTime> {
        self.times
            .windows(2)
            .find(|pair| pair[1] <= pair[0])
            .map(|pair| pair[1])
    }

    /// Set of times at which the value is not missing.
    pub fn valid_times(&self) -> FxHashSet<NaiveDateTime> {
        self.times
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !v.is_nan())
            .map(|(t, _)| *t)
            .collect()
    }

    /// Keeps only entries with times contained in the set,
    /// order is preserved.
    pub fn restrict_to(&self, times: &FxHashSet<NaiveDateTime>) -> TimeSeries {
        self.filter_entries(|t| times.contains(t))
    }

    /// Keeps only entries within the period (inclusive).
    pub fn select_period(&self, period: &Period) -> TimeSeries {
        self.filter_entries(|t| *t >= period.start && *t <= period.end)
    }

    /// Averages values within each clock hour.
    ///
    /// Each output time is the start of the hour. Missing values
    /// are left out of the mean, an hour with only missing
    /// values becomes missing. Hours without any samples
    /// are not present in the output.
    pub fn resample_hourly(&self) -> TimeSeries {
        let mut times = vec![];
        let mut values = vec![];

        // (hour, sum of valid values, count of valid values)
        let mut bucket: Option<(NaiveDateTime, Float, usize)> = None;

        for (time, value) in self.times.iter().zip(&self.values) {
            let hour = floor_to_hour(*time);

            let same_hour = matches!(bucket, Some((bucket_hour, _, _)) if bucket_hour == hour);

            if same_hour {
                if let Some((_, sum, count)) = bucket.as_mut() {
                    if !value.is_nan() {
                        *sum += value;
                        *count += 1;
                    }
                }
                continue;
            }

            if let Some((bucket_hour, sum, count)) = bucket.take() {
                times.push(bucket_hour);
                values.push(bucket_mean(sum, count));
            }

            bucket = if value.is_nan() {
                Some((hour, 0.0, 0))
            } else {
                Some((hour, *value, 1))
            };
        }

        if let Some((bucket_hour, sum, count)) = bucket {
            times.push(bucket_hour);
            values.push(bucket_mean(sum, count));
        }

        TimeSeries { times, values }
    }

    fn filter_entries<F: Fn(&NaiveDateTime) -> bool>(&self, keep: F) -> TimeSeries {
        let (times, values) = self
            .times
            .iter()
            .zip(&self.values)
            .filter(|(t, _)| keep(*t))
            .map(|(t, v)| (*t, *v))
            .unzip();

        TimeSeries { times, values }
    }
}

/// Several variables sharing one time axis,
/// extracted at a single station.
#[derive(Clone, PartialEq, Debug)]
pub struct StationSeries {
    pub station: String,

    /// Coordinates (lon, lat) of the grid point data was taken from.
    pub point_coords: (Float, Float),

    times: Vec<NaiveDateTime>,
    variables: BTreeMap<String, Vec<Float>>,
}

impl StationSeries {
    pub fn new(station: &str, point_coords: (Float, Float), variables: &[String]) -> Self {
        StationSeries {
            station: station.to_string(),
            point_coords,
            times: vec![],
            variables: variables.iter().map(|v| (v.clone(), vec![])).collect(),
        }
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn variables(&self) -> &BTreeMap<String, Vec<Float>> {
        &self.variables
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<TimeSeries> {
        self.variables.get(name).map(|values| TimeSeries {
            times: self.times.clone(),
            values: values.clone(),
        })
    }

    /// Appends a chunk of data along the time axis.
    ///
    /// Times in the chunk must be strictly increasing and later
    /// than all times already stored, overlapping chunks are
    /// rejected as they are not deduplicated. Variables absent
    /// from the chunk are filled with missing values.
    pub fn append(
        &mut self,
        times: Vec<NaiveDateTime>,
        mut chunk: BTreeMap<String, Vec<Float>>,
    ) -> Result<(), SeriesError> {
        let mut previous = self.times.last().copied();

        for time in &times {
            if let Some(previous) = previous {
                if *time <= previous {
                    return Err(SeriesError::Overlap(*time));
                }
            }
            previous = Some(*time);
        }

        let mut columns = Vec::with_capacity(self.variables.len());

        for name in self.variables.keys() {
            let column = chunk
                .remove(name)
                .unwrap_or_else(|| vec![Float::NAN; times.len()]);

            if column.len() != times.len() {
                return Err(SeriesError::LengthMismatch(times.len(), column.len()));
            }

            columns.push(column);
        }

        for (values, column) in self.variables.values_mut().zip(columns) {
            values.extend(column);
        }

        self.times.extend(times);

        Ok(())
    }
}

fn floor_to_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

fn bucket_mean(sum: Float, count: usize) -> Float {
    if count == 0 {
        return Float::NAN;
    }

    sum / count as Float
}

#[cfg(test)]
mod tests {
    use super::{StationSeries, TimeSeries};
    use crate::errors::SeriesError;
    use crate::toolkit::configuration::Period;
    use chrono::{NaiveDate, NaiveDateTime};
    use float_cmp::approx_eq;
    use std::collections::BTreeMap;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn length_mismatch() {
        let result = TimeSeries::new(vec![at(1, 0, 0)], vec![]);
        assert!(matches!(result, Err(SeriesError::LengthMismatch(1, 0))));
    }

    #[test]
    fn valid_times_skip_missing() {
        let series = TimeSeries::new(
            vec![at(1, 0, 0), at(1, 1, 0), at(1, 2, 0)],
            vec![1.0, f64::NAN, 2.0],
        )
        .unwrap();

        let valid = series.valid_times();
        assert_eq!(valid.len(), 2);
        assert!(valid.contains(&at(1, 0, 0)));
        assert!(!valid.contains(&at(1, 1, 0)));
    }

    #[test]
    fn unordered_times_detected() {
        let ordered = TimeSeries::new(vec![at(1, 0, 0), at(1, 1, 0)], vec![1.0, 1.0]).unwrap();
        assert_eq!(ordered.first_unordered_time(), None);

        let repeated = TimeSeries::new(
            vec![at(1, 0, 0), at(1, 1, 0), at(1, 1, 0)],
            vec![1.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(repeated.first_unordered_time(), Some(at(1, 1, 0)));
    }

    #[test]
    fn period_is_inclusive() {
        let series = TimeSeries::new(
            vec![at(1, 0, 0), at(2, 0, 0), at(3, 0, 0), at(4, 0, 0)],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();

        let period = Period {
            start: at(2, 0, 0),
            end: at(3, 0, 0),
        };

        let selected = series.select_period(&period);
        assert_eq!(selected.times(), &[at(2, 0, 0), at(3, 0, 0)]);
        assert_eq!(selected.values(), &[2.0, 3.0]);
    }

    #[test]
    fn hourly_means() {
        let series = TimeSeries::new(
            vec![
                at(1, 0, 0),
                at(1, 0, 30),
                at(1, 1, 10),
                at(1, 1, 40),
                at(1, 3, 0),
            ],
            vec![1.0, 2.0, f64::NAN, f64::NAN, 5.0],
        )
        .unwrap();

        let hourly = series.resample_hourly();

        assert_eq!(hourly.times(), &[at(1, 0, 0), at(1, 1, 0), at(1, 3, 0)]);
        assert!(approx_eq!(f64, hourly.values()[0], 1.5, ulps = 2));
        assert!(hourly.values()[1].is_nan());
        assert!(approx_eq!(f64, hourly.values()[2], 5.0, ulps = 2));
    }

    #[test]
    fn station_chunks_concatenate() {
        let vars = vec!["hs".to_string(), "t02".to_string()];
        let mut station = StationSeries::new("41040", (-53.0, 14.5), &vars);

        let mut first = BTreeMap::new();
        first.insert("hs".to_string(), vec![1.0, 2.0]);
        first.insert("t02".to_string(), vec![5.0, 6.0]);
        station.append(vec![at(1, 0, 0), at(1, 1, 0)], first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("hs".to_string(), vec![3.0]);
        station.append(vec![at(1, 2, 0)], second).unwrap();

        let hs = station.series("hs").unwrap();
        assert_eq!(hs.times(), &[at(1, 0, 0), at(1, 1, 0), at(1, 2, 0)]);
        assert_eq!(hs.values(), &[1.0, 2.0, 3.0]);

        let t02 = station.series("t02").unwrap();
        assert!(t02.values()[2].is_nan());
        assert!(station.series("dir").is_none());
    }

    #[test]
    fn overlapping_chunks_rejected() {
        let vars = vec!["hs".to_string()];
        let mut station = StationSeries::new("41040", (0.0, 0.0), &vars);

        let mut first = BTreeMap::new();
        first.insert("hs".to_string(), vec![1.0, 2.0]);
        station.append(vec![at(1, 0, 0), at(1, 1, 0)], first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("hs".to_string(), vec![3.0, 4.0]);
        let result = station.append(vec![at(1, 1, 0), at(1, 2, 0)], second);

        assert!(matches!(result, Err(SeriesError::Overlap(t)) if t == at(1, 1, 0)));
        // nothing from the rejected chunk is kept
        assert_eq!(station.times().len(), 2);
    }

    #[test]
    fn hourly_of_empty_series() {
        assert!(TimeSeries::default().resample_hourly().is_empty());
    }
}
