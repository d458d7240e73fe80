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

//! Module containing names and constants shared by the toolkit.
//!
//! WAVEWATCH III output follows CF conventions loosely, so
//! only the names actually used by the post-processing
//! scripts are fixed here.

use crate::Float;

/// Name of the time dimension and coordinate variable.
pub const TIME_NAME: &str = "time";

/// Name of the node dimension in unstructured mesh files.
pub const NODE_DIM: &str = "node";

/// Name of the longitude coordinate variable.
pub const LON_NAME: &str = "longitude";

/// Name of the latitude coordinate variable.
pub const LAT_NAME: &str = "latitude";

/// Significant wave height, the primary verified variable.
pub const HS_NAME: &str = "hs";

/// Units of the time coordinate written to station files.
pub const OUTPUT_TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

/// Attributes marking missing values in input variables.
pub const FILL_VALUE_ATTRS: [&str; 2] = ["_FillValue", "missing_value"];
pub const SCALE_FACTOR_ATTR: &str = "scale_factor";
pub const ADD_OFFSET_ATTR: &str = "add_offset";

pub const SECONDS_IN_MINUTE: Float = 60.0;
pub const SECONDS_IN_HOUR: Float = 3_600.0;
pub const SECONDS_IN_DAY: Float = 86_400.0;
