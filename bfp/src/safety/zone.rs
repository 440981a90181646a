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

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::config::SafetyConfig;
use crate::error::{Error, Result};
use crate::geom::{is_simple, normalize_ccw, Prism};

/// A no-fly zone as given in the compile request: a 2-D polygon with
/// optional altitude bounds. Zones may overlap; each one is independent.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SafetyZone {
    /// Footprint vertices in the planning frame.
    pub polygon: Vec<[f64; 2]>,

    /// Prism floor; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_min: Option<f64>,

    /// Prism ceiling; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_max: Option<f64>,
}

impl SafetyZone {
    pub fn new(polygon: Vec<[f64; 2]>, z_min: Option<f64>, z_max: Option<f64>) -> Self {
        Self {
            polygon,
            z_min,
            z_max,
        }
    }

    /// Normalizes the zone into a prism, applying the configured default
    /// altitude bounds where the zone has none.
    pub fn to_prism(&self, config: &SafetyConfig) -> Result<Prism> {
        for p in &self.polygon {
            if !p[0].is_finite() || !p[1].is_finite() {
                return Err(Error::InvalidCoordinate {
                    entity: "safety zone",
                    reason: format!("({}, {})", p[0], p[1]),
                });
            }
        }

        if self.polygon.len() < 3 {
            return Err(Error::InputInvalid {
                entity: "safety zone",
                reason: format!("{} vertices, need at least 3", self.polygon.len()),
            });
        }

        let z_min = self.z_min.unwrap_or(config.default_z_min);
        let z_max = self.z_max.unwrap_or(config.default_z_max);
        if z_min > z_max {
            return Err(Error::InputInvalid {
                entity: "safety zone",
                reason: format!("z_min {z_min} exceeds z_max {z_max}"),
            });
        }

        let ring: Vec<Coord<f64>> = self
            .polygon
            .iter()
            .map(|p| Coord { x: p[0], y: p[1] })
            .collect();
        let polygon = normalize_ccw(&Polygon::new(LineString::from(ring), vec![]));

        if !is_simple(&polygon) {
            return Err(Error::InputInvalid {
                entity: "safety zone",
                reason: "polygon is self-intersecting".to_string(),
            });
        }

        Ok(Prism::new(polygon, z_min, z_max))
    }
}
