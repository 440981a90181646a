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

//! Transverse Mercator projection (Krüger series).
//!
//! The series is truncated at the fourth power of the third flattening,
//! which keeps the error below a tenth of a millimeter within a UTM zone.

use serde::{Deserialize, Serialize};

use super::datum::Ellipsoid;

/// Transverse Mercator parameter set.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TransverseMercator {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in degrees.
    pub central_meridian: f64,
    /// Scale factor at the central meridian.
    pub scale: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    /// A UTM zone on WGS84: k₀ = 0.9996, 500 km false easting and 10 000 km
    /// false northing on the southern hemisphere.
    pub fn utm(zone: u8, north: bool) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            central_meridian: f64::from(zone) * 6.0 - 183.0,
            scale: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    /// Rectifying radius A and the forward (α), inverse (β) and
    /// rectifying-to-geodetic (δ) series coefficients.
    fn series(&self) -> (f64, [f64; 4], [f64; 4], [f64; 4]) {
        let n = self.ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        let radius = self.ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49561.0 * n4 / 161280.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161280.0,
        ];

        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ];

        (radius, alpha, beta, delta)
    }

    /// Projects geodetic latitude/longitude (radians) to easting/northing.
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let e = self.ellipsoid.e();
        let (radius, alpha, _, _) = self.series();
        let dlon = lon - self.central_meridian.to_radians();

        let sin_lat = lat.sin();
        let t = (sin_lat.atanh() - e * (e * sin_lat).atanh()).sinh();

        let xi = t.atan2(dlon.cos());
        let eta = (dlon.sin() / (t * t + dlon.cos() * dlon.cos()).sqrt()).asinh();

        let mut xi_sum = xi;
        let mut eta_sum = eta;
        for (j, a) in alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_sum += a * (k * xi).sin() * (k * eta).cosh();
            eta_sum += a * (k * xi).cos() * (k * eta).sinh();
        }

        (
            self.false_easting + self.scale * radius * eta_sum,
            self.false_northing + self.scale * radius * xi_sum,
        )
    }

    /// Inverse projection from easting/northing to latitude/longitude in
    /// radians.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let (radius, _, beta, delta) = self.series();

        let xi = (northing - self.false_northing) / (self.scale * radius);
        let eta = (easting - self.false_easting) / (self.scale * radius);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        // Conformal latitude, then the rectifying series back to geodetic.
        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut lat = chi;
        for (j, d) in delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            lat += d * (k * chi).sin();
        }

        let lon = self.central_meridian.to_radians() + eta_p.sinh().atan2(xi_p.cos());
        (lat, lon)
    }
}
