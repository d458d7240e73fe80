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

//! Module computing verification metrics of modeled
//! values against observations.
//!
//! Normalized metrics are divided by the **sum** of observed
//! values (not their mean). This convention is kept so that
//! results stay comparable with earlier verification reports.

use crate::errors::MetricsError;
use crate::Float;
use ndarray::Array1;
use serde::Serialize;
use std::fmt;

/// Verification metrics of one paired series.
///
/// Only produced when at least one valid pair exists,
/// so `n_obs` is never zero.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Serialize)]
pub struct Metrics {
    pub rmse: Float,
    pub bias: Float,

    #[serde(rename = "nrmse")]
    pub normalized_rmse: Float,

    #[serde(rename = "nbias")]
    pub normalized_bias: Float,

    #[serde(rename = "nobs")]
    pub n_obs: usize,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RMSE: {:.2}, BIAS: {:.2}, NRMSE: {:.2}, NBIAS: {:.2}, Number of Observations: {}",
            self.rmse, self.bias, self.normalized_rmse, self.normalized_bias, self.n_obs
        )
    }
}

/// Computes metrics over positions where neither value is missing.
///
/// Both slices must be aligned by index. Returns `Ok(None)` when
/// there is no valid pair, metrics are undefined then.
///
/// `bias = mean(m - o)`, `rmse = sqrt(mean((m - o)^2))`,
/// `nbias = sum(m - o) / sum(o)`, `nrmse = sqrt(sum((m - o)^2) / sum(o))`
pub fn compute(observed: &[Float], modeled: &[Float]) -> Result<Option<Metrics>, MetricsError> {
    if observed.len() != modeled.len() {
        return Err(MetricsError::LengthMismatch(observed.len(), modeled.len()));
    }

    let (valid_observed, valid_modeled): (Vec<Float>, Vec<Float>) = observed
        .iter()
        .zip(modeled)
        .filter(|(o, m)| !o.is_nan() && !m.is_nan())
        .map(|(o, m)| (*o, *m))
        .unzip();

    if valid_observed.is_empty() {
        return Ok(None);
    }

    let n_obs = valid_observed.len();
    let observed = Array1::from(valid_observed);
    let modeled = Array1::from(valid_modeled);

    let observed_sum = observed.sum();

    // a negative sum would also make nrmse undefined
    if observed_sum <= 0.0 {
        return Err(MetricsError::DegenerateNormalization);
    }

    let errors = &modeled - &observed;
    let errors_sum = errors.sum();
    let squared_errors_sum = errors.mapv(|e| e * e).sum();

    let bias = errors_sum / n_obs as Float;
    let rmse = (squared_errors_sum / n_obs as Float).sqrt();
    let normalized_bias = errors_sum / observed_sum;
    let normalized_rmse = (squared_errors_sum / observed_sum).sqrt();

    Ok(Some(Metrics {
        rmse,
        bias,
        normalized_rmse,
        normalized_bias,
        n_obs,
    }))
}

#[cfg(test)]
mod tests {
    use super::compute;
    use crate::errors::MetricsError;
    use float_cmp::approx_eq;

    #[test]
    fn reference_case() {
        let observed = [1.0, 2.0, f64::NAN, 4.0];
        let modeled = [1.5, 1.5, 3.0, 4.5];

        let metrics = compute(&observed, &modeled).unwrap().unwrap();

        assert_eq!(metrics.n_obs, 3);
        assert!(approx_eq!(f64, metrics.bias, 0.5 / 3.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, metrics.rmse, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, metrics.normalized_bias, 0.5 / 7.0, epsilon = 1e-12));
        assert!(approx_eq!(
            f64,
            metrics.normalized_rmse,
            (0.75_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        ));
        assert!(approx_eq!(f64, metrics.normalized_rmse, 0.327, epsilon = 5e-4));
    }

    #[test]
    fn nrmse_normalized_by_sum_not_mean() {
        let observed = [4.0, 4.0];
        let modeled = [5.0, 5.0];

        let metrics = compute(&observed, &modeled).unwrap().unwrap();

        // sqrt(2 / 8), normalizing rmse by the mean would give 0.25
        assert!(approx_eq!(f64, metrics.normalized_rmse, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, metrics.normalized_bias, 0.25, epsilon = 1e-12));
    }

    #[test]
    fn identical_series() {
        let values = [0.5, 1.25, 2.0, 3.5, 1.0];

        let metrics = compute(&values, &values).unwrap().unwrap();

        assert_eq!(metrics.n_obs, values.len());
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.bias, 0.0);
        assert_eq!(metrics.normalized_rmse, 0.0);
        assert_eq!(metrics.normalized_bias, 0.0);
    }

    #[test]
    fn no_valid_pairs_is_undefined() {
        let observed = [f64::NAN, 1.0];
        let modeled = [2.0, f64::NAN];

        assert_eq!(compute(&observed, &modeled), Ok(None));
        assert_eq!(compute(&[], &[]), Ok(None));
    }

    #[test]
    fn zero_observed_sum() {
        let observed = [0.0, 0.0];
        let modeled = [0.1, 0.2];

        assert_eq!(
            compute(&observed, &modeled),
            Err(MetricsError::DegenerateNormalization)
        );
    }

    #[test]
    fn negative_observed_sum() {
        let observed = [-1.0, 0.5];
        let modeled = [0.0, 0.0];

        assert_eq!(
            compute(&observed, &modeled),
            Err(MetricsError::DegenerateNormalization)
        );
    }

    #[test]
    fn length_mismatch() {
        assert_eq!(
            compute(&[1.0], &[1.0, 2.0]),
            Err(MetricsError::LengthMismatch(1, 2))
        );
    }
}
