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

//! Module containing the actual toolkit code.
//!
//! A run consists of two optional stages, each enabled by
//! its section in the configuration file:
//!
//! 1. **Extraction** - model files matched by a glob pattern are
//!    read in natural order, the grid point nearest to each station
//!    is found and the requested variables are concatenated along
//!    time into one NetCDF file per station. Stations are
//!    extracted in parallel on the threadpool.
//!
//! 2. **Comparison** - for each configured case the buoy and model
//!    series are paired on common dates, verification metrics
//!    (RMSE, bias and their normalized versions) are computed and
//!    a report is written.
//!
//! Extraction runs first, so comparison cases can point
//! at files written in the same run.

mod aligner;
mod comparison;
mod configuration;
mod dataset;
mod extractor;
mod locator;
mod metrics;
mod natsort;
mod report;
mod series;
mod stations;


use crate::{errors::ToolkitError, ALLOCATOR};
use comparison::{run_case, ComparisonOutcome};
use configuration::{Comparison, Config, Extraction};
use extractor::{extract_station, find_sources, QualityCheck, StructureCheck};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rayon::{ThreadPool, ThreadPoolBuilder};
use report::CsvReport;
use std::{
    fs,
    path::Path,
    sync::{mpsc, Arc},
};

/// Main toolkit function, runs all stages enabled
/// in the configuration.
pub fn main(config_path: &Path) -> Result<(), ToolkitError> {
    info!("Preparing the toolkit core");

    let core = Core::new(config_path)?;

    if let Some(extraction) = &core.config.extraction {
        run_extraction(extraction, &core.threadpool)?;
    }

    if let Some(comparison) = &core.config.comparison {
        run_comparisons(comparison)?;
    }

    Ok(())
}

/// Structure containing the checked configuration
/// and resources shared by the stages.
#[derive(Debug)]
pub struct Core {
    pub config: Config,
    pub threadpool: ThreadPool,
}

impl Core {
    /// Toolkit [`Core`] constructor.
    ///
    /// Reads and checks the configuration, then caps the memory
    /// and sets up the threadpool as requested there.
    pub fn new(config_path: &Path) -> Result<Self, ToolkitError> {
        debug!("Reading configuration from {}", config_path.display());
        let config = Config::new_from_file(config_path)?;

        debug!("Setting memory limit");
        ALLOCATOR
            .set_limit(config.resources.memory * 1024 * 1024)
            .map_err(|_| ToolkitError::MemoryLimit(config.resources.memory))?;

        debug!("Setting up ThreadPool");
        let threadpool = ThreadPoolBuilder::new()
            .num_threads(config.resources.threads as usize)
            .stack_size(2 * 1024 * 1024)
            .build()?;

        Ok(Core { config, threadpool })
    }
}

fn run_extraction(config: &Extraction, threadpool: &ThreadPool) -> Result<(), ToolkitError> {
    info!("Extracting station series");

    let stations = stations::load_registry(&config.stations)?;
    let stations_count = stations.len();

    let sources = find_sources(&config.model_files)?;
    info!(
        "Found {} model files for {} stations",
        sources.len(),
        stations_count
    );

    fs::create_dir_all(&config.output_dir)?;

    let sources = Arc::new(sources);
    let config = Arc::new(config.clone());
    let check: Arc<dyn QualityCheck> = Arc::new(StructureCheck);

    let stations_bar = ProgressBar::new(stations_count as u64);
    stations_bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"),
    );
    stations_bar.set_prefix("Extracted stations");

    let (tx, rx) = mpsc::channel();

    for station in stations {
        let tx = tx.clone();
        let sources = Arc::clone(&sources);
        let config = Arc::clone(&config);
        let check = Arc::clone(&check);

        threadpool.spawn(move || {
            let result = extract_station(&sources, &station, &config, &*check);

            if let Err(err) = tx.send((station.id, result)) {
                error!("Cannot pass extraction result: {}", err);
            }
        });
    }

    // the loop below ends when all workers dropped their senders
    drop(tx);

    let mut extracted = 0;

    for (station_id, result) in rx {
        match result {
            Ok((out_path, extraction)) => {
                extracted += 1;
                debug!(
                    "Station {} written to {} ({} time steps, {} files skipped)",
                    station_id,
                    out_path.display(),
                    extraction.series.times().len(),
                    extraction.skipped.len()
                );
            }
            Err(err) => {
                error!("Extraction of station {} failed: {}", station_id, err);
                // make sure the message is written before the progress bar updates
                println!();
            }
        }
        stations_bar.inc(1);
    }

    stations_bar.finish_with_message("All stations processed");
    info!(
        "Extracted {} of {} stations into {}",
        extracted,
        stations_count,
        config.output_dir.display()
    );

    Ok(())
}

fn run_comparisons(config: &Comparison) -> Result<(), ToolkitError> {
    info!("Running {} comparisons", config.cases.len());

    fs::create_dir_all(&config.output_dir)?;

    let renderer = CsvReport::new(&config.output_dir);

    for case in &config.cases {
        match run_case(case, config, &renderer) {
            Ok(ComparisonOutcome::Reported { artifacts, .. }) => {
                debug!(
                    "Report of experiment {} written to {} files",
                    case.experiment,
                    artifacts.len()
                );
            }
            Ok(ComparisonOutcome::NoOverlap) => (),
            Err(err) => error!("Comparison of experiment {} failed: {}", case.experiment, err),
        }
    }

    Ok(())
}
