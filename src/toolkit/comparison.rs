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

//! Module running buoy-model comparisons.
//!
//! Each case reads the observed and modeled series, optionally
//! restricts them to the configured period and averages them
//! to hourly means, pairs them on common dates, computes
//! metrics and hands everything to the report renderer.

use super::aligner::align;
use super::configuration::{Case, Comparison};
use super::dataset::read_point_series;
use super::metrics::{compute, Metrics};
use super::report::ReportRenderer;
use super::series::TimeSeries;
use crate::errors::ComparisonError;
use log::{debug, info};
use std::path::PathBuf;

/// Result of a single comparison case.
#[derive(Clone, PartialEq, Debug)]
pub enum ComparisonOutcome {
    /// Series overlapped and the report was written.
    /// Metrics are `None` when no common value was valid.
    Reported {
        metrics: Option<Metrics>,
        artifacts: Vec<PathBuf>,
    },

    /// Series have no common dates, nothing was written.
    NoOverlap,
}

pub fn run_case(
    case: &Case,
    config: &Comparison,
    renderer: &dyn ReportRenderer,
) -> Result<ComparisonOutcome, ComparisonError> {
    debug!("Reading series of experiment {}", case.experiment);

    let observed = prepare(read_point_series(&case.buoy_file, &config.variable)?, config);
    let modeled = prepare(read_point_series(&case.model_file, &config.variable)?, config);

    let paired = match align(&observed, &modeled) {
        Some(paired) => paired,
        None => {
            info!(
                "No common dates between {} and {}, nothing plotted for experiment {}",
                case.buoy_file.display(),
                case.model_file.display(),
                case.experiment
            );
            return Ok(ComparisonOutcome::NoOverlap);
        }
    };

    let metrics = compute(paired.observed.values(), paired.modeled.values())?;

    match &metrics {
        Some(metrics) => info!("Experiment {}: {}", case.experiment, metrics),
        None => info!(
            "Experiment {}: metrics undefined, no valid common values",
            case.experiment
        ),
    }

    let artifacts = renderer.render(&case.experiment, &paired, metrics.as_ref())?;

    Ok(ComparisonOutcome::Reported { metrics, artifacts })
}

fn prepare(series: TimeSeries, config: &Comparison) -> TimeSeries {
    let series = match &config.period {
        Some(period) => series.select_period(period),
        None => series,
    };

    if config.resample_hourly {
        series.resample_hourly()
    } else {
        series
    }
}
