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

//! Module producing comparison reports.
//!
//! Rendering is hidden behind [`ReportRenderer`] so that
//! a plotting backend can be plugged in. The toolkit ships
//! with [`CsvReport`] that writes the paired series and the
//! metrics as CSV files, ready for plotting elsewhere.

use super::aligner::PairedSeries;
use super::metrics::Metrics;
use crate::errors::ReportError;
use log::debug;
use std::path::{Path, PathBuf};

const METRICS_HEADER: [&str; 5] = ["rmse", "bias", "nrmse", "nbias", "nobs"];

pub trait ReportRenderer {
    /// Renders the comparison of one experiment and
    /// returns paths of created files.
    ///
    /// `None` metrics mean they are undefined and must
    /// not be presented as numbers.
    fn render(
        &self,
        experiment: &str,
        paired: &PairedSeries,
        metrics: Option<&Metrics>,
    ) -> Result<Vec<PathBuf>, ReportError>;
}

/// Writes `ww3xbuoy_<experiment>.csv` with the paired series
/// and `ww3xbuoy_<experiment>_metrics.csv` with the metrics.
#[derive(Clone, PartialEq, Debug)]
pub struct CsvReport {
    output_dir: PathBuf,
}

impl CsvReport {
    pub fn new(output_dir: &Path) -> Self {
        CsvReport {
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn series_path(&self, experiment: &str) -> PathBuf {
        self.output_dir.join(format!("ww3xbuoy_{}.csv", experiment))
    }

    fn metrics_path(&self, experiment: &str) -> PathBuf {
        self.output_dir
            .join(format!("ww3xbuoy_{}_metrics.csv", experiment))
    }
}

impl ReportRenderer for CsvReport {
    fn render(
        &self,
        experiment: &str,
        paired: &PairedSeries,
        metrics: Option<&Metrics>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let series_path = self.series_path(experiment);
        debug!("Writing paired series to {}", series_path.display());

        let mut out_file = csv::Writer::from_path(&series_path)?;

        out_file.write_record(&["time", "observed", "modeled"])?;

        for ((time, observed), modeled) in paired
            .times()
            .iter()
            .zip(paired.observed.values())
            .zip(paired.modeled.values())
        {
            out_file.write_record(&[
                time.format("%Y-%m-%dT%H:%M:%S").to_string(),
                observed.to_string(),
                modeled.to_string(),
            ])?;
        }

        out_file.flush()?;

        let metrics_path = self.metrics_path(experiment);
        debug!("Writing metrics to {}", metrics_path.display());

        let mut out_file = csv::Writer::from_path(&metrics_path)?;

        match metrics {
            Some(metrics) => out_file.serialize(metrics)?,
            None => {
                out_file.write_record(&METRICS_HEADER)?;
                out_file.write_record(&["", "", "", "", "0"])?;
            }
        }

        out_file.flush()?;

        Ok(vec![series_path, metrics_path])
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvReport, ReportRenderer};
    use crate::toolkit::aligner::align;
    use crate::toolkit::metrics::compute;
    use crate::toolkit::series::TimeSeries;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn series_and_metrics_files() {
        let dir = tempdir().unwrap();
        let t0 = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let t1 = t0 + chrono::Duration::hours(1);

        let observed = TimeSeries::new(vec![t0, t1], vec![1.0, 2.0]).unwrap();
        let modeled = TimeSeries::new(vec![t0, t1], vec![1.5, 2.5]).unwrap();
        let paired = align(&observed, &modeled).unwrap();
        let metrics = compute(paired.observed.values(), paired.modeled.values())
            .unwrap()
            .unwrap();

        let report = CsvReport::new(dir.path());
        let written = report.render("exp1", &paired, Some(&metrics)).unwrap();

        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("ww3xbuoy_exp1.csv"));

        let series = fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<_> = series.lines().collect();
        assert_eq!(lines[0], "time,observed,modeled");
        assert_eq!(lines[1], "2020-01-01T00:00:00,1,1.5");
        assert_eq!(lines.len(), 3);

        let metrics_csv = fs::read_to_string(&written[1]).unwrap();
        let lines: Vec<_> = metrics_csv.lines().collect();
        assert_eq!(lines[0], "rmse,bias,nrmse,nbias,nobs");
        assert_eq!(lines[1].split(',').last(), Some("2"));
    }

    #[test]
    fn undefined_metrics_left_blank() {
        let dir = tempdir().unwrap();
        let t0 = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let series = TimeSeries::new(vec![t0], vec![1.0]).unwrap();
        let paired = align(&series, &series).unwrap();

        let written = CsvReport::new(dir.path())
            .render("exp2", &paired, None)
            .unwrap();

        let metrics_csv = fs::read_to_string(&written[1]).unwrap();
        assert_eq!(metrics_csv, "rmse,bias,nrmse,nbias,nobs\n,,,,0\n");
    }
}
