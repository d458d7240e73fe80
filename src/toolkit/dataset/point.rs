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

//! Reading and writing of point series files, that is
//! buoy observations and series extracted at stations.

use super::{read_times, read_values, TimeUnits};
use crate::constants::{OUTPUT_TIME_UNITS, TIME_NAME};
use crate::errors::{DatasetError, SeriesError};
use crate::toolkit::series::{StationSeries, TimeSeries};
use crate::Float;
use chrono::NaiveDateTime;
use log::debug;
use std::path::Path;

/// Reads the variable from a file with the `time` dimension.
///
/// The variable must have `time` as its first dimension,
/// any other dimensions must be of length one (as in
/// buoy files with singleton `latitude` and `longitude`).
/// Any problem with the file is reported as
/// [`SeriesError::InvalidSeries`].
pub fn read_point_series(path: &Path, variable: &str) -> Result<TimeSeries, SeriesError> {
    debug!("Reading {} series from {}", variable, path.display());

    let invalid = |source: DatasetError| SeriesError::InvalidSeries {
        path: path.to_path_buf(),
        source,
    };

    let (times, values) = read_point_data(path, variable).map_err(invalid)?;
    let series = TimeSeries::new(times, values)?;

    if let Some(time) = series.first_unordered_time() {
        return Err(invalid(DatasetError::InvalidTime(format!(
            "time {} is not later than the previous time step",
            time
        ))));
    }

    Ok(series)
}

fn read_point_data(
    path: &Path,
    variable: &str,
) -> Result<(Vec<NaiveDateTime>, Vec<Float>), DatasetError> {
    let file = netcdf::open(path)?;
    let times = read_times(&file)?;

    let var = file
        .variable(variable)
        .ok_or_else(|| DatasetError::MissingVariable(variable.to_string()))?;

    let dims = var.dimensions();
    let time_first = dims.first().map_or(false, |dim| dim.name() == TIME_NAME);
    let others_singular = dims.iter().skip(1).all(|dim| dim.len() == 1);

    if !time_first || !others_singular {
        return Err(DatasetError::DimensionMismatch {
            name: variable.to_string(),
            expected: 1,
            got: dims.len(),
        });
    }

    let values = read_values(&var)?;

    Ok((times, values))
}

/// Writes series extracted at a station into a new file.
///
/// The file has a single `time` dimension, one variable
/// per extracted name and global attributes with the station
/// name and coordinates of the grid point used.
/// The series must not be empty.
pub fn write_station_series(path: &Path, series: &StationSeries) -> Result<(), DatasetError> {
    debug!(
        "Writing {} time steps for station {} to {}",
        series.times().len(),
        series.station,
        path.display()
    );

    let units = TimeUnits::parse(OUTPUT_TIME_UNITS)?;
    let offsets: Vec<Float> = series.times().iter().map(|t| units.encode(*t)).collect();

    let mut file = netcdf::create(path)?;

    file.add_attribute("station", series.station.as_str())?;
    file.add_attribute("point_longitude", series.point_coords.0)?;
    file.add_attribute("point_latitude", series.point_coords.1)?;

    file.add_dimension(TIME_NAME, offsets.len())?;

    {
        let mut var = file.add_variable::<Float>(TIME_NAME, &[TIME_NAME])?;
        var.put_attribute("units", OUTPUT_TIME_UNITS)?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&offsets, ..)?;
    }

    for (name, values) in series.variables() {
        let mut var = file.add_variable::<Float>(name, &[TIME_NAME])?;
        var.put_attribute("_FillValue", Float::NAN)?;
        var.put_values(values, ..)?;
    }

    Ok(())
}
