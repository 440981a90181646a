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

//! Reference ellipsoids and datum shifts.
//!
//! Projected CRS families that are not referenced to WGS84 (e.g. the Belgian
//! BD72 datum on the International 1924 ellipsoid) go through a geocentric
//! 7-parameter Helmert transformation. The shift is applied on the ellipsoid
//! surface; altitudes are carried through the CRS kernel untouched.

use serde::{Deserialize, Serialize};

/// A reference ellipsoid given by semi-major axis and flattening.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 (EPSG:7030).
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257223563,
    };

    /// International 1924, also known as Hayford (EPSG:7022).
    pub const INTERNATIONAL_1924: Ellipsoid = Ellipsoid {
        a: 6_378_388.0,
        f: 1.0 / 297.0,
    };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Third flattening n = f / (2 − f).
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Converts geodetic latitude/longitude on this ellipsoid to geocentric
    /// coordinates. Angles in radians, height in meters.
    pub fn geodetic_to_geocentric(&self, lat: f64, lon: f64, height: f64) -> [f64; 3] {
        let e2 = self.e2();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        [
            (nu + height) * cos_lat * lon.cos(),
            (nu + height) * cos_lat * lon.sin(),
            (nu * (1.0 - e2) + height) * sin_lat,
        ]
    }

    /// Converts geocentric coordinates back to geodetic latitude/longitude
    /// and height on this ellipsoid.
    ///
    /// The latitude is found by fixed-point iteration; the loop converges to
    /// double precision within a handful of rounds everywhere off the poles.
    pub fn geocentric_to_geodetic(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let e2 = self.e2();
        let p = x.hypot(y);
        let lon = y.atan2(x);

        if p < 1e-9 {
            // On the rotation axis the longitude is arbitrary.
            let lat = if z >= 0.0 {
                std::f64::consts::FRAC_PI_2
            } else {
                -std::f64::consts::FRAC_PI_2
            };
            let b = self.a * (1.0 - self.f);
            return (lat, lon, z.abs() - b);
        }

        let mut lat = (z / (p * (1.0 - e2))).atan();
        let mut nu = self.a;

        for _ in 0..16 {
            let sin_lat = lat.sin();
            nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = ((z + e2 * nu * sin_lat) / p).atan();
            if (next - lat).abs() < 1e-15 {
                lat = next;
                break;
            }
            lat = next;
        }

        let height = p / lat.cos() - nu;
        (lat, lon, height)
    }
}

/// 7-parameter Helmert transformation in the position-vector convention.
///
/// Rotations are stored in radians and the scale as a fraction (not ppm).
/// `apply` maps source-datum geocentric coordinates to the target datum;
/// `apply_inverse` is the exact matrix inverse so a round trip reproduces
/// the input to floating-point precision.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Helmert {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub scale: f64,
}

impl Helmert {
    /// Builds a transformation from the conventional units: translations in
    /// meters, rotations in arc-seconds, scale in parts per million.
    pub fn from_parameters(
        tx: f64,
        ty: f64,
        tz: f64,
        rx_as: f64,
        ry_as: f64,
        rz_as: f64,
        scale_ppm: f64,
    ) -> Self {
        const ARCSEC: f64 = std::f64::consts::PI / (180.0 * 3600.0);
        Self {
            tx,
            ty,
            tz,
            rx: rx_as * ARCSEC,
            ry: ry_as * ARCSEC,
            rz: rz_as * ARCSEC,
            scale: scale_ppm * 1e-6,
        }
    }

    /// BD72 (Belgian Datum 1972) to WGS84.
    pub fn bd72_to_wgs84() -> Self {
        Self::from_parameters(
            -106.8686, 52.2978, -103.7239, 0.3366, -0.457, 1.8422, -1.2747,
        )
    }

    fn matrix(&self) -> [[f64; 3]; 3] {
        let s = 1.0 + self.scale;
        [
            [s, -s * self.rz, s * self.ry],
            [s * self.rz, s, -s * self.rx],
            [-s * self.ry, s * self.rx, s],
        ]
    }

    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let m = self.matrix();
        [
            self.tx + m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2],
            self.ty + m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2],
            self.tz + m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2],
        ]
    }

    pub fn apply_inverse(&self, p: [f64; 3]) -> [f64; 3] {
        let m = self.matrix();
        let d = [p[0] - self.tx, p[1] - self.ty, p[2] - self.tz];

        // Exact inverse of the 3×3 matrix via the adjugate; the linearized
        // rotation matrix is not orthogonal, so a transpose would leave a
        // sub-millimeter residual that the round-trip invariant rules out.
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

        let inv = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ];

        [
            inv[0][0] * d[0] + inv[0][1] * d[1] + inv[0][2] * d[2],
            inv[1][0] * d[0] + inv[1][1] * d[1] + inv[1][2] * d[2],
            inv[2][0] * d[0] + inv[2][1] * d[1] + inv[2][2] * d[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocentric_round_trip() {
        let ell = Ellipsoid::WGS84;
        let lat = 50.84_f64.to_radians();
        let lon = 4.37_f64.to_radians();

        let xyz = ell.geodetic_to_geocentric(lat, lon, 0.0);
        let (lat2, lon2, h2) = ell.geocentric_to_geodetic(xyz);

        assert!((lat - lat2).abs() < 1e-12);
        assert!((lon - lon2).abs() < 1e-12);
        assert!(h2.abs() < 1e-6);
    }

    #[test]
    fn helmert_round_trip_is_exact_to_micrometers() {
        let helmert = Helmert::bd72_to_wgs84();
        let p = [4_027_893.1, 307_041.2, 4_919_498.3];

        let q = helmert.apply(p);
        let r = helmert.apply_inverse(q);

        for i in 0..3 {
            assert!((p[i] - r[i]).abs() < 1e-6, "axis {i}: {} vs {}", p[i], r[i]);
        }
    }

    #[test]
    fn helmert_translation_magnitude() {
        // The BD72 shift moves geocentric points by roughly 160 m.
        let helmert = Helmert::bd72_to_wgs84();
        let p = [4_027_893.1, 307_041.2, 4_919_498.3];
        let q = helmert.apply(p);

        let d = ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2) + (q[2] - p[2]).powi(2)).sqrt();
        assert!(d > 50.0 && d < 500.0, "unexpected shift magnitude {d}");
    }
}
