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

//! Module providing narrow access to WAVEWATCH III
//! NetCDF files.
//!
//! Only coordinates, variables by name and the time axis
//! are exposed. Nothing else is assumed about the file.
//! File handles are closed when the owning struct is dropped.

mod point;
mod time;

pub use self::point::{read_point_series, write_station_series};
use self::time::TimeUnits;

use crate::constants::{
    ADD_OFFSET_ATTR, FILL_VALUE_ATTRS, LAT_NAME, LON_NAME, NODE_DIM, SCALE_FACTOR_ATTR, TIME_NAME,
};
use crate::errors::DatasetError;
use crate::Float;
use chrono::NaiveDateTime;
use log::debug;
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};

/// Spatial organisation of model output.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Layout {
    /// Variables on `(time, node)`, coordinates on `node`.
    Unstructured,

    /// Variables on `(time, latitude, longitude)`,
    /// coordinates are 1-D axes.
    Regular,
}

/// Location of a point inside the dataset grid.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GridPoint {
    Node(usize),
    Cell { lat: usize, lon: usize },
}

/// Single model output file.
pub struct MeshDataset {
    file: netcdf::File,
    path: PathBuf,
    layout: Layout,
}

impl MeshDataset {
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        debug!("Opening dataset {}", path.display());

        let file = netcdf::open(path)?;
        let layout = detect_layout(&file)?;

        Ok(MeshDataset {
            file,
            path: path.to_path_buf(),
            layout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn longitudes(&self) -> Result<Vec<Float>, DatasetError> {
        read_variable(&self.file, LON_NAME)
    }

    pub fn latitudes(&self) -> Result<Vec<Float>, DatasetError> {
        read_variable(&self.file, LAT_NAME)
    }

    /// Length of the time axis, `None` when the file has no time dimension.
    pub fn time_len(&self) -> Option<usize> {
        self.file.dimension(TIME_NAME).map(|dim| dim.len())
    }

    pub fn times(&self) -> Result<Vec<NaiveDateTime>, DatasetError> {
        read_times(&self.file)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Values of the variable at the grid point for all times in the file.
    pub fn series_at(&self, name: &str, point: GridPoint) -> Result<Vec<Float>, DatasetError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| DatasetError::MissingVariable(name.to_string()))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        check_time_first(name, &var)?;

        let raw = match (self.layout, point) {
            (Layout::Unstructured, GridPoint::Node(node)) => {
                if shape.len() != 2 {
                    return Err(DatasetError::DimensionMismatch {
                        name: name.to_string(),
                        expected: 2,
                        got: shape.len(),
                    });
                }

                if node >= shape[1] {
                    return Err(DatasetError::OutsideGrid(format!("{:?}", point)));
                }

                var.get_values::<Float, _>((.., node))?
            }
            (Layout::Regular, GridPoint::Cell { lat, lon }) => {
                if shape.len() != 3 {
                    return Err(DatasetError::DimensionMismatch {
                        name: name.to_string(),
                        expected: 3,
                        got: shape.len(),
                    });
                }

                if lat >= shape[1] || lon >= shape[2] {
                    return Err(DatasetError::OutsideGrid(format!("{:?}", point)));
                }

                var.get_values::<Float, _>((.., lat, lon))?
            }
            _ => {
                return Err(DatasetError::UnknownLayout(
                    "grid point does not match dataset layout",
                ))
            }
        };

        Ok(unpack(&var, raw))
    }
}

/// Files with the `node` dimension are unstructured meshes,
/// files with 1-D coordinate axes are regular grids.
fn detect_layout(file: &netcdf::File) -> Result<Layout, DatasetError> {
    if file.dimension(NODE_DIM).is_some() {
        return Ok(Layout::Unstructured);
    }

    let lon = file
        .variable(LON_NAME)
        .ok_or_else(|| DatasetError::MissingVariable(LON_NAME.to_string()))?;
    let lat = file
        .variable(LAT_NAME)
        .ok_or_else(|| DatasetError::MissingVariable(LAT_NAME.to_string()))?;

    let lon_dims = lon.dimensions();
    let lat_dims = lat.dimensions();

    if lon_dims.len() == 1 && lat_dims.len() == 1 && lon_dims[0].name() != lat_dims[0].name() {
        return Ok(Layout::Regular);
    }

    Err(DatasetError::UnknownLayout(
        "neither node dimension nor 1-D coordinate axes found",
    ))
}

fn check_time_first(name: &str, var: &netcdf::Variable) -> Result<(), DatasetError> {
    match var.dimensions().first() {
        Some(dim) if dim.name() == TIME_NAME => Ok(()),
        _ => Err(DatasetError::MissingDimension(format!(
            "{} (as the first dimension of {})",
            TIME_NAME, name
        ))),
    }
}

pub(crate) fn read_variable(file: &netcdf::File, name: &str) -> Result<Vec<Float>, DatasetError> {
    let var = file
        .variable(name)
        .ok_or_else(|| DatasetError::MissingVariable(name.to_string()))?;

    read_values(&var)
}

/// Reads all values of the variable, unpacked.
pub(crate) fn read_values(var: &netcdf::Variable) -> Result<Vec<Float>, DatasetError> {
    let raw = var.get_values::<Float, _>(..)?;
    Ok(unpack(var, raw))
}

/// Replaces fill values with NaN, then applies `scale_factor`
/// and `add_offset` of packed variables.
///
/// Fill values are compared in the packed domain.
fn unpack(var: &netcdf::Variable, mut values: Vec<Float>) -> Vec<Float> {
    for attr in FILL_VALUE_ATTRS {
        let fill = match numeric_attribute(var, attr) {
            Some(fill) if !fill.is_nan() => fill,
            _ => continue,
        };

        for value in values.iter_mut() {
            if *value == fill {
                *value = Float::NAN;
            }
        }
    }

    let scale = numeric_attribute(var, SCALE_FACTOR_ATTR).unwrap_or(1.0);
    let offset = numeric_attribute(var, ADD_OFFSET_ATTR).unwrap_or(0.0);

    if scale != 1.0 || offset != 0.0 {
        for value in values.iter_mut() {
            *value = *value * scale + offset;
        }
    }

    values
}

fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<Float> {
    match var.attribute_value(name) {
        Some(Ok(AttributeValue::Double(value))) => Some(value),
        Some(Ok(AttributeValue::Float(value))) => Some(Float::from(value)),
        Some(Ok(AttributeValue::Int(value))) => Some(Float::from(value)),
        Some(Ok(AttributeValue::Short(value))) => Some(Float::from(value)),
        _ => None,
    }
}

pub(crate) fn read_times(file: &netcdf::File) -> Result<Vec<NaiveDateTime>, DatasetError> {
    if file.dimension(TIME_NAME).is_none() {
        return Err(DatasetError::MissingDimension(TIME_NAME.to_string()));
    }

    let var = file
        .variable(TIME_NAME)
        .ok_or_else(|| DatasetError::MissingVariable(TIME_NAME.to_string()))?;

    let units: String = match var.attribute_value("units") {
        Some(Ok(AttributeValue::Str(units))) => units,
        _ => {
            return Err(DatasetError::InvalidTime(
                "time variable has no 'units' attribute".to_string(),
            ))
        }
    };

    let units = TimeUnits::parse(&units)?;
    let offsets = var.get_values::<Float, _>(..)?;

    offsets.into_iter().map(|offset| units.decode(offset)).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders of small NetCDF files for tests.

    use crate::Float;
    use std::path::{Path, PathBuf};

    pub const DAYS_UNITS: &str = "days since 2020-01-01 00:00:00";

    /// Writes an unstructured mesh file with `hs` on `(time, node)`.
    ///
    /// `hs` is given per time step, one value per node.
    pub fn write_mesh(
        dir: &Path,
        name: &str,
        lons: &[Float],
        lats: &[Float],
        times_days: &[Float],
        hs: &[Vec<Float>],
    ) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension("time", times_days.len()).expect("add dim time");
        file.add_dimension("node", lons.len()).expect("add dim node");

        {
            let mut var = file
                .add_variable::<f64>("longitude", &["node"])
                .expect("add var longitude");
            var.put_values(lons, ..).expect("put longitude");
        }
        {
            let mut var = file
                .add_variable::<f64>("latitude", &["node"])
                .expect("add var latitude");
            var.put_values(lats, ..).expect("put latitude");
        }
        {
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add var time");
            var.put_attribute("units", DAYS_UNITS).expect("add time units");
            var.put_values(times_days, ..).expect("put time");
        }
        {
            let flat: Vec<Float> = hs.iter().flatten().copied().collect();
            let mut var = file
                .add_variable::<f64>("hs", &["time", "node"])
                .expect("add var hs");
            var.put_attribute("_FillValue", -999.0).expect("add hs fill");
            var.put_values(&flat, ..).expect("put hs");
        }

        path
    }

    /// Writes an unstructured mesh with `hs` packed as `short`,
    /// the way WAVEWATCH III stores it.
    pub fn write_packed_mesh(
        dir: &Path,
        name: &str,
        lons: &[Float],
        times_days: &[Float],
        hs: &[i16],
        scale_factor: Float,
        add_offset: Float,
    ) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension("time", times_days.len()).expect("add dim time");
        file.add_dimension("node", lons.len()).expect("add dim node");

        for coord in ["longitude", "latitude"] {
            let mut var = file
                .add_variable::<f64>(coord, &["node"])
                .expect("add coordinate");
            var.put_values(lons, ..).expect("put coordinate");
        }
        {
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add var time");
            var.put_attribute("units", DAYS_UNITS).expect("add time units");
            var.put_values(times_days, ..).expect("put time");
        }
        {
            let mut var = file
                .add_variable::<i16>("hs", &["time", "node"])
                .expect("add var hs");
            var.put_attribute("_FillValue", -32767i16).expect("add hs fill");
            var.put_attribute("scale_factor", scale_factor)
                .expect("add hs scale");
            var.put_attribute("add_offset", add_offset).expect("add hs offset");
            var.put_values(hs, ..).expect("put hs");
        }

        path
    }

    /// Writes a regular grid file with `hs` on `(time, latitude, longitude)`.
    ///
    /// `hs` is flattened in that order.
    pub fn write_regular(
        dir: &Path,
        name: &str,
        lons: &[Float],
        lats: &[Float],
        times_days: &[Float],
        hs: &[Float],
    ) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension("time", times_days.len()).expect("add dim time");
        file.add_dimension("latitude", lats.len()).expect("add dim latitude");
        file.add_dimension("longitude", lons.len()).expect("add dim longitude");

        {
            let mut var = file
                .add_variable::<f64>("longitude", &["longitude"])
                .expect("add var longitude");
            var.put_values(lons, ..).expect("put longitude");
        }
        {
            let mut var = file
                .add_variable::<f64>("latitude", &["latitude"])
                .expect("add var latitude");
            var.put_values(lats, ..).expect("put latitude");
        }
        {
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add var time");
            var.put_attribute("units", DAYS_UNITS).expect("add time units");
            var.put_values(times_days, ..).expect("put time");
        }
        {
            let mut var = file
                .add_variable::<f64>("hs", &["time", "latitude", "longitude"])
                .expect("add var hs");
            var.put_values(hs, ..).expect("put hs");
        }

        path
    }

    /// Writes a point (buoy) file with `hs` on `time`.
    pub fn write_point(
        dir: &Path,
        name: &str,
        units: &str,
        offsets: &[Float],
        hs: &[Float],
    ) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        file.add_dimension("time", offsets.len()).expect("add dim time");

        {
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add var time");
            var.put_attribute("units", units).expect("add time units");
            var.put_values(offsets, ..).expect("put time");
        }
        {
            let mut var = file
                .add_variable::<f64>("hs", &["time"])
                .expect("add var hs");
            var.put_values(hs, ..).expect("put hs");
        }

        path
    }
}
