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

//! Wave Model Verification Toolkit (WMVT) post-processes
//! WAVEWATCH III output stored in NetCDF files.
//!
//! It extracts significant wave height time series at buoy
//! locations from unstructured (and regular) model grids,
//! pairs them with buoy observations and computes verification
//! statistics for each comparison.
//!
//! What the toolkit does in a run is decided entirely by the
//! configuration file, see [`toolkit::main`].

mod constants;
mod errors;
mod toolkit;

use cap::Cap;
use env_logger::Env;
use log::{error, info};
use std::{alloc, path::PathBuf};

type Float = f64;

/// Global allocator used by the toolkit.
///
/// Use of static global allocator allows for capping the memory to the limit set by user
/// in configuration file and in effect provide better [OOM error](https://en.wikipedia.org/wiki/Out_of_memory) handling.
#[global_allocator]
static ALLOCATOR: Cap<alloc::System> = Cap::new(alloc::System, usize::MAX);

/// The main program function.
/// Prepares the runtime environment and calls the [`toolkit::main`].
///
/// The only accepted argument is an optional path to the configuration
/// file, `config.yaml` in the working directory is used otherwise.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("WMVT_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("WMVT_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("config.yaml"), PathBuf::from);

    match toolkit::main(&config_path) {
        Ok(_) => info!("Toolkit execution finished. Check the output directories and log."),
        Err(err) => error!("Toolkit execution failed with error: {}", err),
    }
}
