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

//! Coordinate reference systems.
//!
//! Three frames are available simultaneously during a compilation: WGS84,
//! the project CRS, and a local-metric ENU frame centered on the bridge.
//! Every waypoint carries project-CRS coordinates internally; the export
//! converts to WGS84 and applies the height mode.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod datum;
mod lcc;
mod local_frame;
mod tm;

pub use datum::{Ellipsoid, Helmert};
pub use lcc::LambertConformalConic;
pub use local_frame::{LocalFrame, EARTH_RADIUS, EXTENT_LIMIT};
pub use tm::TransverseMercator;

/// CRS selection as it appears in a compile request: an EPSG code or a
/// custom projection parameter set.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsSpec {
    /// An EPSG code; see [`ProjectCrs::from_epsg`] for the supported set.
    Epsg(u32),

    /// A custom transverse-Mercator projection with an optional datum shift
    /// to WGS84.
    CustomTransverseMercator {
        projection: TransverseMercator,
        to_wgs84: Option<Helmert>,
    },

    /// A custom Lambert-conformal-conic projection with an optional datum
    /// shift to WGS84.
    CustomLambertConformalConic {
        projection: LambertConformalConic,
        to_wgs84: Option<Helmert>,
    },
}

impl Default for CrsSpec {
    fn default() -> Self {
        Self::Epsg(4326)
    }
}

#[derive(Clone, PartialEq, Debug)]
enum Kind {
    /// Identity: project x/y are longitude/latitude in degrees.
    Wgs84,
    TransverseMercator {
        projection: TransverseMercator,
        shift: Option<Helmert>,
    },
    LambertConformalConic {
        projection: LambertConformalConic,
        shift: Option<Helmert>,
    },
}

/// The project's coordinate reference system.
///
/// Established once per project and immutable thereafter. Transforms are
/// planar: the altitude passes through both directions untouched, so a
/// round trip preserves it exactly.
#[derive(Clone, PartialEq, Debug)]
pub struct ProjectCrs {
    epsg: Option<u32>,
    kind: Kind,
}

impl ProjectCrs {
    /// WGS84 identity CRS.
    pub fn wgs84() -> Self {
        Self {
            epsg: Some(4326),
            kind: Kind::Wgs84,
        }
    }

    /// Resolves a CRS from its EPSG code.
    ///
    /// Supported: 4326 (WGS84), 32601–32660 and 32701–32760 (UTM on WGS84),
    /// and 31370 (Belgian Lambert 72 on BD72).
    pub fn from_epsg(code: u32) -> Result<Self> {
        let kind = match code {
            4326 => Kind::Wgs84,
            32601..=32660 => Kind::TransverseMercator {
                projection: TransverseMercator::utm((code - 32600) as u8, true),
                shift: None,
            },
            32701..=32760 => Kind::TransverseMercator {
                projection: TransverseMercator::utm((code - 32700) as u8, false),
                shift: None,
            },
            31370 => Kind::LambertConformalConic {
                projection: LambertConformalConic::belgian_lambert_72(),
                shift: Some(Helmert::bd72_to_wgs84()),
            },
            _ => {
                return Err(Error::InputInvalid {
                    entity: "crs",
                    reason: format!("unsupported EPSG code {code}"),
                })
            }
        };

        Ok(Self {
            epsg: Some(code),
            kind,
        })
    }

    /// Resolves a CRS specification into a usable transform.
    pub fn resolve(spec: &CrsSpec) -> Result<Self> {
        match spec {
            CrsSpec::Epsg(code) => Self::from_epsg(*code),
            CrsSpec::CustomTransverseMercator {
                projection,
                to_wgs84,
            } => Ok(Self {
                epsg: None,
                kind: Kind::TransverseMercator {
                    projection: *projection,
                    shift: *to_wgs84,
                },
            }),
            CrsSpec::CustomLambertConformalConic {
                projection,
                to_wgs84,
            } => Ok(Self {
                epsg: None,
                kind: Kind::LambertConformalConic {
                    projection: *projection,
                    shift: *to_wgs84,
                },
            }),
        }
    }

    /// The EPSG code, if the CRS was resolved from one.
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Converts project coordinates to WGS84 `(lon, lat, alt)` in degrees
    /// and meters. The altitude is passed through unchanged.
    pub fn to_wgs84(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        check_finite("project coordinate", x, y, z)?;

        let (lat, lon) = match &self.kind {
            // Identity: no angle conversions, so a round trip is bit-exact.
            Kind::Wgs84 => return Ok((x, y, z)),
            Kind::TransverseMercator { projection, shift } => {
                let (lat, lon) = projection.inverse(x, y);
                shift_to_wgs84(&projection.ellipsoid, shift, lat, lon)
            }
            Kind::LambertConformalConic { projection, shift } => {
                let (lat, lon) = projection.inverse(x, y);
                shift_to_wgs84(&projection.ellipsoid, shift, lat, lon)
            }
        };

        Ok((lon.to_degrees(), lat.to_degrees(), z))
    }

    /// Converts a WGS84 coordinate into the project CRS. The altitude is
    /// passed through unchanged.
    pub fn from_wgs84(&self, lon: f64, lat: f64, alt: f64) -> Result<(f64, f64, f64)> {
        check_finite("WGS84 coordinate", lon, lat, alt)?;

        let (x, y) = match &self.kind {
            Kind::Wgs84 => return Ok((lon, lat, alt)),
            Kind::TransverseMercator { projection, shift } => {
                let (lat_p, lon_p) =
                    shift_from_wgs84(&projection.ellipsoid, shift, lat.to_radians(), lon.to_radians());
                projection.forward(lat_p, lon_p)
            }
            Kind::LambertConformalConic { projection, shift } => {
                let (lat_p, lon_p) =
                    shift_from_wgs84(&projection.ellipsoid, shift, lat.to_radians(), lon.to_radians());
                projection.forward(lat_p, lon_p)
            }
        };

        Ok((x, y, alt))
    }
}

/// Applies the optional datum shift from the projection datum to WGS84.
/// Angles in radians; the shift happens on the ellipsoid surface.
fn shift_to_wgs84(
    ellipsoid: &Ellipsoid,
    shift: &Option<Helmert>,
    lat: f64,
    lon: f64,
) -> (f64, f64) {
    match shift {
        None => (lat, lon),
        Some(helmert) => {
            let xyz = ellipsoid.geodetic_to_geocentric(lat, lon, 0.0);
            let (lat, lon, _) = Ellipsoid::WGS84.geocentric_to_geodetic(helmert.apply(xyz));
            (lat, lon)
        }
    }
}

fn shift_from_wgs84(
    ellipsoid: &Ellipsoid,
    shift: &Option<Helmert>,
    lat: f64,
    lon: f64,
) -> (f64, f64) {
    match shift {
        None => (lat, lon),
        Some(helmert) => {
            let xyz = Ellipsoid::WGS84.geodetic_to_geocentric(lat, lon, 0.0);
            let (lat, lon, _) = ellipsoid.geocentric_to_geodetic(helmert.apply_inverse(xyz));
            (lat, lon)
        }
    }
}

fn check_finite(entity: &'static str, a: f64, b: f64, c: f64) -> Result<()> {
    if a.is_finite() && b.is_finite() && c.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            entity,
            reason: format!("({a}, {b}, {c})"),
        })
    }
}
