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

//! Module pairing observed and modeled series
//! on their common times.

use super::series::TimeSeries;
use chrono::NaiveDateTime;
use rustc_hash::FxHashSet;

/// Observed and modeled series restricted to the same times,
/// at which both have values.
#[derive(Clone, PartialEq, Debug)]
pub struct PairedSeries {
    pub observed: TimeSeries,
    pub modeled: TimeSeries,
}

impl PairedSeries {
    pub fn times(&self) -> &[NaiveDateTime] {
        self.observed.times()
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }
}

/// Restricts both series to times where both have non-missing values.
///
/// Times are matched exactly, series are filtered and never
/// interpolated. Returns `None` when there are no common times,
/// which is a normal outcome and not an error.
pub fn align(observed: &TimeSeries, modeled: &TimeSeries) -> Option<PairedSeries> {
    let observed_times = observed.valid_times();
    let modeled_times = modeled.valid_times();

    let common: FxHashSet<NaiveDateTime> = observed_times
        .intersection(&modeled_times)
        .copied()
        .collect();

    if common.is_empty() {
        return None;
    }

    Some(PairedSeries {
        observed: observed.restrict_to(&common),
        modeled: modeled.restrict_to(&common),
    })
}
