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

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geom::Point3;

/// Earth radius used by the tangent-plane approximation, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Maximum distance from the frame center before a point is rejected.
pub const EXTENT_LIMIT: f64 = 50_000.0;

/// Local-metric ENU frame centered on the bridge.
///
/// A tangent-plane approximation: x grows east, y north, z is the altitude
/// unchanged. Within a bridge span (< 5 km) the cross-frame round-trip error
/// stays below 10 cm. The frame is established once per project and is not a
/// substitute for the geodetic CRS; planner math happens here, the wire
/// always goes through [`ProjectCrs`].
///
/// [`ProjectCrs`]: super::ProjectCrs
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LocalFrame {
    center_lat: f64,
    center_lon: f64,
    cos_center_lat: f64,
}

impl LocalFrame {
    /// Creates a frame centered on the given WGS84 coordinate in degrees.
    pub fn new(center_lat: f64, center_lon: f64) -> Result<Self> {
        if !center_lat.is_finite() || !center_lon.is_finite() {
            return Err(Error::InvalidCoordinate {
                entity: "local frame center",
                reason: format!("({center_lat}, {center_lon})"),
            });
        }

        Ok(Self {
            center_lat,
            center_lon,
            cos_center_lat: center_lat.to_radians().cos(),
        })
    }

    /// The frame center as `(lat, lon)` in degrees.
    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    /// Converts a WGS84 coordinate (degrees, meters) into the local frame.
    pub fn to_local(&self, lat: f64, lon: f64, alt: f64) -> Result<Point3> {
        if !lat.is_finite() || !lon.is_finite() || !alt.is_finite() {
            return Err(Error::InvalidCoordinate {
                entity: "local frame input",
                reason: format!("({lat}, {lon}, {alt})"),
            });
        }

        let x = EARTH_RADIUS * (lon - self.center_lon).to_radians() * self.cos_center_lat;
        let y = EARTH_RADIUS * (lat - self.center_lat).to_radians();

        let distance = x.hypot(y);
        if distance > EXTENT_LIMIT {
            return Err(Error::OutOfExtent {
                distance_m: distance,
                limit_m: EXTENT_LIMIT,
            });
        }

        Ok(Point3::new(x, y, alt))
    }

    /// Converts a local point back to WGS84 `(lat, lon, alt)`.
    pub fn to_wgs84(&self, p: &Point3) -> Result<(f64, f64, f64)> {
        if !p.x.is_finite() || !p.y.is_finite() || !p.z.is_finite() {
            return Err(Error::InvalidCoordinate {
                entity: "local frame point",
                reason: format!("({}, {}, {})", p.x, p.y, p.z),
            });
        }

        let distance = p.x.hypot(p.y);
        if distance > EXTENT_LIMIT {
            return Err(Error::OutOfExtent {
                distance_m: distance,
                limit_m: EXTENT_LIMIT,
            });
        }

        let lat = self.center_lat + (p.y / EARTH_RADIUS).to_degrees();
        let lon = self.center_lon + (p.x / (EARTH_RADIUS * self.cos_center_lat)).to_degrees();

        Ok((lat, lon, p.z))
    }
}
