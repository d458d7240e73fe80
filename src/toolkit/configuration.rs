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

//! Module responsible for parsing and checking the configuration file.
//!
//! To provide meaningful error messages. The configuration file uses
//! [YAML](https://en.wikipedia.org/wiki/YAML) and `serde` to enforce
//! strong typing and automatic type checking.
//!
//! The structures and their fields in this module directly correspond to
//! the fields inside `config.yaml` so you can check this documentation
//! for more details how to set the config file.
//!
//! All paths used by the toolkit come from here, nothing
//! is hardcoded in the code.

use crate::constants::HS_NAME;
use crate::errors::ConfigError;
use chrono::NaiveDateTime;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Fields describing extraction of model time series
/// at station locations.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Extraction {
    /// Glob pattern matching model output files, e.g. `/data/ww3/ww3.*.nc`.
    ///
    /// Matched files are processed in natural order, so `ww3.10.nc`
    /// comes after `ww3.2.nc`.
    pub model_files: String,

    /// Path to the station registry (JSON or YAML) mapping
    /// station names to `{x: lon, y: lat}`.
    pub stations: PathBuf,

    /// _(Optional)_ Variables to extract at each station.
    ///
    /// Defaults to `["hs"]`. Cannot be empty.
    #[serde(default = "Extraction::default_variables")]
    pub variables: Vec<String>,

    /// Directory where the per-station files are written.
    pub output_dir: PathBuf,

    /// _(Optional)_ Prefix of per-station output files.
    ///
    /// Output file is named `<prefix><station>.nc`. Defaults to `ww3_`.
    #[serde(default = "Extraction::default_prefix")]
    pub prefix: String,
}

impl Extraction {
    fn default_variables() -> Vec<String> {
        vec![HS_NAME.to_string()]
    }

    fn default_prefix() -> String {
        "ww3_".to_string()
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.model_files.trim().is_empty() {
            return Err(ConfigError::OutOfBounds(
                "Model files pattern cannot be empty",
            ));
        }

        if self.variables.is_empty() {
            return Err(ConfigError::OutOfBounds(
                "At least one variable must be extracted",
            ));
        }

        if self.variables.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::OutOfBounds("Variable name cannot be empty"));
        }

        Ok(())
    }
}

/// Time window, both ends inclusive.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Single buoy-model comparison.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Case {
    /// Experiment identifier, used to name the report.
    pub experiment: String,

    /// Buoy observations file with `time` dimension.
    pub buoy_file: PathBuf,

    /// Model series file, usually one written by the extraction.
    pub model_file: PathBuf,
}

/// Fields describing comparisons of model series
/// against buoy observations.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Comparison {
    /// _(Optional)_ Compared variable, must be present in both files.
    ///
    /// Defaults to `hs`.
    #[serde(default = "Comparison::default_variable")]
    pub variable: String,

    /// Directory where reports are written.
    pub output_dir: PathBuf,

    /// _(Optional)_ Only data within this period is compared.
    #[serde(default)]
    pub period: Option<Period>,

    /// _(Optional)_ Average both series to hourly means
    /// before looking for common dates. Defaults to `false`.
    #[serde(default)]
    pub resample_hourly: bool,

    /// List of comparisons to run. Experiment names must be unique.
    pub cases: Vec<Case>,
}

impl Comparison {
    fn default_variable() -> String {
        HS_NAME.to_string()
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.cases.is_empty() {
            return Err(ConfigError::OutOfBounds(
                "At least one comparison case must be given",
            ));
        }

        if let Some(period) = self.period {
            if period.start > period.end {
                return Err(ConfigError::OutOfBounds(
                    "Period start cannot be after its end",
                ));
            }
        }

        let mut experiments = FxHashSet::default();

        for case in &self.cases {
            if case.experiment.trim().is_empty() {
                return Err(ConfigError::OutOfBounds(
                    "Experiment name cannot be empty",
                ));
            }

            if case.experiment.contains(['/', '\\'])
                || case.experiment.starts_with('.')
            {
                return Err(ConfigError::OutOfBounds(
                    "Experiment name cannot contain path separators or start with a dot",
                ));
            }

            if !experiments.insert(case.experiment.as_str()) {
                return Err(ConfigError::OutOfBounds(
                    "Experiment names must be unique",
                ));
            }
        }

        Ok(())
    }
}

/// _(Optional)_ Fields with information about
/// resources available for the toolkit.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Resources {
    /// _(Optional)_ Thread count used for extraction.
    /// Stations are extracted in parallel with
    /// up to this number of workers.
    ///
    /// Cannot be less than `1`. Defaults to `1`.
    #[serde(default = "Resources::default_threads")]
    pub threads: u16,

    /// _(Optional)_ Heap memory limit in MB.
    /// Useful for enabling meaningful Out-of-memory error messages
    /// when large mesh files are read.
    ///
    /// Cannot be less than `128`. Defaults to whole addressable-space
    /// (`2^32` or `2^64` bytes).
    #[serde(default = "Resources::default_memory")]
    pub memory: usize,
}

impl Resources {
    fn default_threads() -> u16 {
        1
    }

    fn default_memory() -> usize {
        usize::MAX / (1024 * 1024)
    }

    /// Checks if thread count and memory limit are
    /// above limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::OutOfBounds(
                "Available threads cannot be less than 1",
            ));
        }

        if self.memory < 128 {
            return Err(ConfigError::OutOfBounds(
                "Available memory cannot be less than 128 MB",
            ));
        }

        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            threads: Resources::default_threads(),
            memory: Resources::default_memory(),
        }
    }
}

/// Main config structure representing the fields in
/// configuration file.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: Option<Extraction>,

    #[serde(default)]
    pub comparison: Option<Comparison>,

    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        Config::new_from_slice(data.as_slice())
    }

    fn new_from_slice(data: &[u8]) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_slice(data)?;

        if config.extraction.is_none() && config.comparison.is_none() {
            return Err(ConfigError::OutOfBounds(
                "Nothing to do, provide extraction or comparison section",
            ));
        }

        if let Some(extraction) = &config.extraction {
            extraction.check_bounds()?;
        }

        if let Some(comparison) = &config.comparison {
            comparison.check_bounds()?;
        }

        config.resources.check_bounds()?;

        Ok(config)
    }
}
