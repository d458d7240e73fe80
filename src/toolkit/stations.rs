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

//! Module with the station registry.
//!
//! The registry is a JSON (or YAML) document mapping
//! station names to their coordinates:
//!
//! ```json
//! { "41040": { "x": -53.0, "y": 14.5 } }
//! ```
//!
//! As YAML is a superset of JSON, `serde_yaml` reads both.

use crate::errors::ConfigError;
use crate::Float;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

/// Target coordinates of a station.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Coords {
    /// Longitude in degrees.
    pub x: Float,

    /// Latitude in degrees.
    pub y: Float,
}

/// Station (buoy) at which model data is extracted.
#[derive(Clone, PartialEq, PartialOrd, Debug)]
pub struct Station {
    pub id: String,
    pub coords: Coords,
}

/// Reads the station registry, stations are returned
/// ordered by their identifiers.
pub fn load_registry(file_path: &Path) -> Result<Vec<Station>, ConfigError> {
    let data = fs::read(file_path)?;
    parse_registry(data.as_slice())
}

fn parse_registry(data: &[u8]) -> Result<Vec<Station>, ConfigError> {
    let registry: BTreeMap<String, Coords> = serde_yaml::from_slice(data)?;

    if registry.is_empty() {
        return Err(ConfigError::OutOfBounds("Station registry cannot be empty"));
    }

    let stations = registry
        .into_iter()
        .map(|(id, coords)| Station { id, coords })
        .collect::<Vec<_>>();

    for station in &stations {
        if !station.coords.x.is_finite() || !station.coords.y.is_finite() {
            return Err(ConfigError::OutOfBounds(
                "Station coordinates must be finite",
            ));
        }

        if !(-90.0..=90.0).contains(&station.coords.y) {
            return Err(ConfigError::OutOfBounds(
                "Station latitude is too low or too high",
            ));
        }
    }

    Ok(stations)
}
