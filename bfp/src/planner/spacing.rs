// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The bfp developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Viewpoint spacing.
//!
//! Version 1 of the formula: the sensor footprint at standoff distance d is
//! 2·d·tan(FOV/2) for a wide-angle mapping camera, and consecutive
//! viewpoints advance by footprint·(1 − overlap). The formula is monotone
//! decreasing in overlap, floored so a tight overlap cannot collapse the
//! spacing to zero, and depends on nothing but its inputs.

/// Version tag carried in the configuration; bump on any formula change.
pub const SPACING_FORMULA_VERSION: u32 = 1;

/// Horizontal field of view of the mapping camera, degrees.
pub const CAMERA_FOV_DEG: f64 = 84.0;

/// Lower bound on viewpoint spacing, meters.
pub const MIN_SPACING: f64 = 0.5;

/// Ground footprint of the sensor at the given standoff distance.
pub fn sensor_footprint(standoff: f64) -> f64 {
    2.0 * standoff.max(0.0) * (CAMERA_FOV_DEG / 2.0).to_radians().tan()
}

/// Viewpoint spacing for a standoff distance and an overlap fraction.
pub fn viewpoint_spacing(standoff: f64, overlap: f64) -> f64 {
    let overlap = overlap.clamp(0.0, 0.99);
    (sensor_footprint(standoff) * (1.0 - overlap)).max(MIN_SPACING)
}

/// Evenly spaced stations over [start, end], both ends included.
///
/// The count is chosen so consecutive stations are no farther apart than
/// `spacing`, with at least two stations per interval.
pub fn stations(start: f64, end: f64, spacing: f64) -> Vec<f64> {
    debug_assert!(end >= start);
    let length = end - start;
    let count = ((length / spacing.max(MIN_SPACING)).ceil() as usize + 1).max(2);

    (0..count)
        .map(|i| start + length * i as f64 / (count as f64 - 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_is_monotone_decreasing_in_overlap() {
        let overlaps = [0.1, 0.3, 0.5, 0.7, 0.9];
        let spacings: Vec<f64> = overlaps.iter().map(|&o| viewpoint_spacing(10.0, o)).collect();

        for pair in spacings.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn spacing_never_collapses() {
        assert!(viewpoint_spacing(0.01, 0.99) >= MIN_SPACING);
    }

    #[test]
    fn stations_cover_the_interval() {
        let s = stations(10.0, 50.0, 7.0);

        assert!(s.len() >= 2);
        assert_eq!(*s.first().unwrap(), 10.0);
        assert_eq!(*s.last().unwrap(), 50.0);

        for pair in s.windows(2) {
            assert!(pair[1] - pair[0] <= 7.0 + 1e-9);
        }
    }

    #[test]
    fn at_least_two_stations_per_interval() {
        // Even a tiny interval keeps its two endpoint stations.
        assert_eq!(stations(0.0, 0.1, 50.0).len(), 2);
    }

    #[test]
    fn identical_inputs_give_identical_stations() {
        assert_eq!(stations(0.0, 100.0, 9.3), stations(0.0, 100.0, 9.3));
    }
}
