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

//! Module with nearest point search in model grids.
//!
//! Distances are measured in coordinate-degree space with
//! Manhattan (L1) metric, not along the great circle. Station
//! files extracted earlier were assigned to nodes that way,
//! and changing the metric would move stations to other nodes.

use crate::errors::SearchError;
use crate::Float;

/// Index of the node nearest to the target point
/// in an unstructured mesh.
///
/// Returns the node minimising `|lon - x| + |lat - y|`.
/// On ties the first node wins. Nodes with non-finite
/// coordinates are never selected unless no other node exists.
pub fn locate(lons: &[Float], lats: &[Float], x: Float, y: Float) -> Result<usize, SearchError> {
    if lons.len() != lats.len() {
        return Err(SearchError::CoordsMismatch(lons.len(), lats.len()));
    }

    if lons.is_empty() {
        return Err(SearchError::EmptyMesh);
    }

    let mut best_index = 0;
    let mut best_distance = Float::INFINITY;

    for (i, (lon, lat)) in lons.iter().zip(lats).enumerate() {
        let distance = (lon - x).abs() + (lat - y).abs();

        if distance < best_distance {
            best_index = i;
            best_distance = distance;
        }
    }

    Ok(best_index)
}

/// Indices `(lat_index, lon_index)` of the grid point nearest
/// to the target point in a regular grid.
///
/// Each axis is searched independently, first occurrence wins on ties.
pub fn locate_regular(
    lons: &[Float],
    lats: &[Float],
    x: Float,
    y: Float,
) -> Result<(usize, usize), SearchError> {
    let lon_index = nearest_on_axis(lons, x)?;
    let lat_index = nearest_on_axis(lats, y)?;

    Ok((lat_index, lon_index))
}

fn nearest_on_axis(axis: &[Float], target: Float) -> Result<usize, SearchError> {
    if axis.is_empty() {
        return Err(SearchError::EmptyMesh);
    }

    let mut best_index = 0;
    let mut best_distance = Float::INFINITY;

    for (i, value) in axis.iter().enumerate() {
        let distance = (value - target).abs();

        if distance < best_distance {
            best_index = i;
            best_distance = distance;
        }
    }

    Ok(best_index)
}

#[cfg(test)]
mod tests {
    use super::{locate, locate_regular};
    use crate::errors::SearchError;

    #[test]
    fn nearest_node() {
        let lons = [0.0, 1.0, 5.0];
        let lats = [0.0, 1.0, 5.0];

        assert_eq!(locate(&lons, &lats, 0.9, 0.9), Ok(1));
        assert_eq!(locate(&lons, &lats, 4.0, 3.9), Ok(2));
        assert_eq!(locate(&lons, &lats, -10.0, 0.0), Ok(0));
    }

    #[test]
    fn ties_resolve_to_first() {
        let lons = [1.0, 0.0, 1.0];
        let lats = [0.0, 1.0, 0.0];

        // all nodes are 1.0 away from the origin
        assert_eq!(locate(&lons, &lats, 0.0, 0.0), Ok(0));
        assert_eq!(locate(&lons, &lats, 1.0, 0.0), Ok(0));
    }

    #[test]
    fn manhattan_not_euclidean() {
        // euclidean distance would pick node 1 (sqrt(0.5) < 0.8)
        let lons = [0.8, 0.5];
        let lats = [0.0, 0.5];

        assert_eq!(locate(&lons, &lats, 0.0, 0.0), Ok(0));
    }

    #[test]
    fn no_strictly_closer_node() {
        let lons: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let lats: Vec<f64> = (0..50).map(|i| (i as f64 * 0.71).cos() * 10.0).collect();
        let (x, y) = (2.5, -3.1);

        let found = locate(&lons, &lats, x, y).unwrap();
        let found_dist = (lons[found] - x).abs() + (lats[found] - y).abs();

        for i in 0..lons.len() {
            let dist = (lons[i] - x).abs() + (lats[i] - y).abs();
            assert!(dist >= found_dist);
            if dist == found_dist {
                assert!(i >= found);
            }
        }
    }

    #[test]
    fn empty_mesh() {
        assert_eq!(locate(&[], &[], 0.0, 0.0), Err(SearchError::EmptyMesh));
        assert_eq!(
            locate(&[0.0], &[], 0.0, 0.0),
            Err(SearchError::CoordsMismatch(1, 0))
        );
    }

    #[test]
    fn regular_grid() {
        let lons = [-60.0, -59.5, -59.0, -58.5];
        let lats = [10.0, 10.5, 11.0];

        assert_eq!(locate_regular(&lons, &lats, -59.1, 10.6), Ok((1, 2)));
        assert_eq!(locate_regular(&lons, &[], 0.0, 0.0), Err(SearchError::EmptyMesh));
    }
}
