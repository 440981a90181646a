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

use geo::{Coord, Polygon};

use super::{point_in_polygon, Point3};

/// A vertical prism: a 2-D footprint extruded between two altitudes.
#[derive(Clone, PartialEq, Debug)]
pub struct Prism {
    pub footprint: Polygon<f64>,
    pub z_min: f64,
    pub z_max: f64,
}

impl Prism {
    pub fn new(footprint: Polygon<f64>, z_min: f64, z_max: f64) -> Self {
        Self {
            footprint,
            z_min,
            z_max,
        }
    }

    /// An axis-aligned rectangle footprint between two altitudes.
    pub fn rectangle(min: (f64, f64), max: (f64, f64), z_min: f64, z_max: f64) -> Self {
        let footprint = Polygon::new(
            geo::LineString::from(vec![
                Coord { x: min.0, y: min.1 },
                Coord { x: max.0, y: min.1 },
                Coord { x: max.0, y: max.1 },
                Coord { x: min.0, y: max.1 },
            ]),
            vec![],
        );
        Self::new(footprint, z_min, z_max)
    }

    /// Whether a 3-D point is inside the prism: its projection must be in
    /// the footprint (subject to the boundary threshold) and its altitude
    /// within [z_min, z_max].
    pub fn contains(&self, p: &Point3, boundary_threshold: f64) -> bool {
        if p.z < self.z_min || p.z > self.z_max {
            return false;
        }
        point_in_polygon(&self.footprint, Coord { x: p.x, y: p.y }, boundary_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_respects_z_bounds() {
        let prism = Prism::rectangle((0.0, 0.0), (10.0, 10.0), 0.0, 30.0);

        assert!(prism.contains(&Point3::new(5.0, 5.0, 15.0), 0.0));
        assert!(!prism.contains(&Point3::new(5.0, 5.0, 31.0), 0.0));
        assert!(!prism.contains(&Point3::new(5.0, 5.0, -0.5), 0.0));
        assert!(!prism.contains(&Point3::new(15.0, 5.0, 15.0), 0.0));
    }

    #[test]
    fn boundary_threshold_applies_to_footprint() {
        let prism = Prism::rectangle((0.0, 0.0), (10.0, 10.0), 0.0, 30.0);

        let grazing = Point3::new(9.9, 5.0, 15.0);
        assert!(prism.contains(&grazing, 0.0));
        assert!(!prism.contains(&grazing, 0.2));
    }
}
