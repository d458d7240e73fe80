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

//! Module responsible for extracting model time series
//! at station locations.
//!
//! Model output is split into many files (usually one per
//! forecast cycle). For every file the grid point nearest to
//! the station is found, requested variables are read there and
//! the pieces are concatenated along time into one series per
//! station, which is then saved as a separate file.
//!
//! A file that cannot be read or does not pass the quality check
//! is skipped with a warning. Extraction fails only when every
//! file is skipped, or when files overlap in time.

use super::configuration::Extraction;
use super::dataset::{write_station_series, GridPoint, Layout, MeshDataset};
use super::locator::{locate, locate_regular};
use super::natsort;
use super::series::StationSeries;
use super::stations::{Coords, Station};
use crate::constants::{LAT_NAME, LON_NAME};
use crate::errors::{ExtractionError, SeriesError};
use crate::Float;
use chrono::NaiveDateTime;
use log::{debug, warn};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Data-quality check deciding whether a model file
/// can be used for extraction.
pub trait QualityCheck: Send + Sync {
    /// Returns the reason for rejecting the file, if any.
    fn check(&self, dataset: &MeshDataset, variables: &[String]) -> Result<(), String>;
}

/// Default check accepting files with a non-empty time axis,
/// coordinates and all requested variables.
#[derive(Copy, Clone, Debug, Default)]
pub struct StructureCheck;

impl QualityCheck for StructureCheck {
    fn check(&self, dataset: &MeshDataset, variables: &[String]) -> Result<(), String> {
        match dataset.time_len() {
            None => return Err("no time dimension".to_string()),
            Some(0) => return Err("time dimension is empty".to_string()),
            Some(_) => (),
        }

        for name in [LON_NAME, LAT_NAME] {
            if !dataset.has_variable(name) {
                return Err(format!("coordinate {} is missing", name));
            }
        }

        for name in variables {
            if !dataset.has_variable(name) {
                return Err(format!("variable {} is missing", name));
            }
        }

        Ok(())
    }
}

/// Outcome of the extraction at one station.
#[derive(Clone, PartialEq, Debug)]
pub struct StationExtraction {
    pub series: StationSeries,
    pub skipped: Vec<PathBuf>,
}

/// Data read from a single file.
struct Chunk {
    point_coords: (Float, Float),
    times: Vec<NaiveDateTime>,
    values: BTreeMap<String, Vec<Float>>,
}

/// Expands the glob pattern into the list of model files
/// in natural order.
pub fn find_sources(pattern: &str) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut paths = vec![];

    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => warn!("Cannot access {}: {}", err.path().display(), err),
        }
    }

    if paths.is_empty() {
        return Err(ExtractionError::SourceNotFound(pattern.to_string()));
    }

    natsort::sort_paths(&mut paths);

    debug!("Found {} files matching {}", paths.len(), pattern);

    Ok(paths)
}

/// Extracts requested variables at the station from all files,
/// in the given order.
pub fn extract(
    sources: &[PathBuf],
    station: &Station,
    variables: &[String],
    check: &dyn QualityCheck,
) -> Result<StationExtraction, ExtractionError> {
    let mut series: Option<StationSeries> = None;
    let mut skipped = vec![];

    for path in sources {
        let chunk = match read_chunk(path, station.coords, variables, check) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(
                    "Skipping {} for station {}: {}",
                    path.display(),
                    station.id,
                    err
                );
                skipped.push(path.clone());
                continue;
            }
        };

        let series = series.get_or_insert_with(|| {
            StationSeries::new(&station.id, chunk.point_coords, variables)
        });

        if series.point_coords != chunk.point_coords {
            debug!(
                "Station {} mapped to a different point ({:.4}, {:.4}) in {}",
                station.id,
                chunk.point_coords.0,
                chunk.point_coords.1,
                path.display()
            );
        }

        series
            .append(chunk.times, chunk.values)
            .map_err(|err| match err {
                SeriesError::Overlap(time) => ExtractionError::OverlappingTimes {
                    path: path.clone(),
                    time,
                },
                other => ExtractionError::Series(other),
            })?;
    }

    match series {
        Some(series) if !series.is_empty() => Ok(StationExtraction { series, skipped }),
        _ => Err(ExtractionError::NoValidData {
            station: station.id.clone(),
            files: sources.len(),
        }),
    }
}

/// Extracts the station and saves the result as
/// `<output_dir>/<prefix><station>.nc`.
pub fn extract_station(
    sources: &[PathBuf],
    station: &Station,
    config: &Extraction,
    check: &dyn QualityCheck,
) -> Result<(PathBuf, StationExtraction), ExtractionError> {
    let extraction = extract(sources, station, &config.variables, check)?;

    let out_path = output_path(&config.output_dir, &config.prefix, &station.id);
    write_station_series(&out_path, &extraction.series)?;

    Ok((out_path, extraction))
}

pub fn output_path(output_dir: &Path, prefix: &str, station_id: &str) -> PathBuf {
    output_dir.join(format!("{}{}.nc", prefix, station_id))
}

fn read_chunk(
    path: &Path,
    coords: Coords,
    variables: &[String],
    check: &dyn QualityCheck,
) -> Result<Chunk, ExtractionError> {
    let dataset = MeshDataset::open(path)?;
    debug!("Checking {} ({:?} layout)", dataset.path().display(), dataset.layout());

    check
        .check(&dataset, variables)
        .map_err(ExtractionError::QualityCheck)?;

    let (point, point_coords) = nearest_point(&dataset, coords)?;
    let times = dataset.times()?;

    let mut values = BTreeMap::new();
    for name in variables {
        values.insert(name.clone(), dataset.series_at(name, point)?);
    }

    Ok(Chunk {
        point_coords,
        times,
        values,
    })
}

fn nearest_point(
    dataset: &MeshDataset,
    coords: Coords,
) -> Result<(GridPoint, (Float, Float)), ExtractionError> {
    let lons = dataset.longitudes()?;
    let lats = dataset.latitudes()?;

    match dataset.layout() {
        Layout::Unstructured => {
            let node = locate(&lons, &lats, coords.x, coords.y)?;
            Ok((GridPoint::Node(node), (lons[node], lats[node])))
        }
        Layout::Regular => {
            let (lat, lon) = locate_regular(&lons, &lats, coords.x, coords.y)?;
            Ok((GridPoint::Cell { lat, lon }, (lons[lon], lats[lat])))
        }
    }
}
