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

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Error while reading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while creating ThreadPool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Cannot cap the memory at {0} MB, more is already allocated")]
    MemoryLimit(usize),

    #[error("Error while preparing output directory: {0}")]
    FaultyOutput(#[from] std::io::Error),

    #[error("Error while preparing extraction: {0}")]
    Extraction(#[from] ExtractionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open configuration file: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize configuration file: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds: {0}")]
    OutOfBounds(&'static str),
}

/// Errors raised while reading or writing NetCDF datasets.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("NetCDF library error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("Variable {0} not found in dataset")]
    MissingVariable(String),

    #[error("Dimension {0} not found in dataset")]
    MissingDimension(String),

    #[error("Variable {name} has unexpected shape: expected {expected} dimensions, got {got}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Cannot decode time coordinate: {0}")]
    InvalidTime(String),

    #[error("Dataset layout not recognised: {0}")]
    UnknownLayout(&'static str),

    #[error("Grid point {0} is outside the dataset grid")]
    OutsideGrid(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("Cannot search nearest point in an empty mesh")]
    EmptyMesh,

    #[error("Longitude and latitude arrays differ in length ({0} and {1})")]
    CoordsMismatch(usize, usize),
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No files match the pattern {0}")]
    SourceNotFound(String),

    #[error("Incorrect file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("All {files} input files were skipped for station {station}, no valid data to extract")]
    NoValidData { station: String, files: usize },

    #[error("File did not pass the quality check: {0}")]
    QualityCheck(String),

    #[error("Time {time} in {} is not later than the previous time step, input files overlap", path.display())]
    OverlappingTimes { path: PathBuf, time: NaiveDateTime },

    #[error("Nearest point search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Dataset handling failed: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Extracted series are inconsistent: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Invalid series in {}: {source}", path.display())]
    InvalidSeries {
        path: PathBuf,
        source: DatasetError,
    },

    #[error("Times and values differ in length ({0} and {1})")]
    LengthMismatch(usize, usize),

    #[error("Time {0} is not later than the previous time step")]
    Overlap(NaiveDateTime),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Observed and modeled values differ in length ({0} and {1})")]
    LengthMismatch(usize, usize),

    /// Raised when the sum of valid observations is zero or negative.
    /// Zero would divide by zero, a negative sum would turn the
    /// normalized RMSE into NaN.
    #[error("Sum of observed values is not positive, cannot normalize metrics")]
    DegenerateNormalization,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Cannot write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot create report file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("{0}")]
    Series(#[from] SeriesError),

    #[error("{0}")]
    Metrics(#[from] MetricsError),

    #[error("{0}")]
    Report(#[from] ReportError),
}
