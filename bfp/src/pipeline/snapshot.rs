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
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::crs::CrsSpec;
use crate::error::{Error, Result};
use crate::safety::SafetyZone;

/// The full typed input surface of a compilation.
///
/// A request is snapshotted at the start of a compilation: the pipeline
/// never reads mutable external state, so identical requests compile to
/// byte-identical routes.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CompileRequest {
    pub crs: CrsSpec,

    /// Trajectory along the bridge centerline at deck altitude, in the
    /// project CRS.
    pub trajectory_points: Vec<[f64; 3]>,

    /// Optional height profile overriding the trajectory altitudes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_heights: Option<Vec<f64>>,

    /// Ground-plane point pairs marking pillar bases.
    #[serde(default)]
    pub pillar_pairs: Vec<[[f64; 2]; 2]>,

    /// Ground-plane point pairs marking span ends; never traversed under.
    #[serde(default)]
    pub abutments: Vec<[[f64; 2]; 2]>,

    /// Deck cross-section in (across, up) coordinates.
    pub cross_section_2d: Vec<[f64; 2]>,

    #[serde(default)]
    pub safety_zones: Vec<SafetyZone>,

    /// Ground reference altitude for support bases and the takeoff point.
    #[serde(default)]
    pub ground_altitude: f64,

    #[serde(default)]
    pub config: Config,
}

impl CompileRequest {
    /// Structural input checks, raised before any derivation.
    pub fn validate(&self) -> Result<()> {
        if self.trajectory_points.len() < 2 {
            return Err(Error::InputInvalid {
                entity: "trajectory",
                reason: format!(
                    "{} points, need at least 2",
                    self.trajectory_points.len()
                ),
            });
        }

        if self.cross_section_2d.len() < 3 {
            return Err(Error::InputInvalid {
                entity: "cross-section",
                reason: format!(
                    "{} vertices, need at least 3",
                    self.cross_section_2d.len()
                ),
            });
        }

        for (i, p) in self.trajectory_points.iter().enumerate() {
            if p.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidCoordinate {
                    entity: "trajectory",
                    reason: format!("point {i}: ({}, {}, {})", p[0], p[1], p[2]),
                });
            }
        }

        for pair in self.pillar_pairs.iter().chain(&self.abutments) {
            for p in pair {
                if p.iter().any(|v| !v.is_finite()) {
                    return Err(Error::InvalidCoordinate {
                        entity: "support pair",
                        reason: format!("({}, {})", p[0], p[1]),
                    });
                }
            }
        }

        if !self.ground_altitude.is_finite() {
            return Err(Error::InvalidCoordinate {
                entity: "ground altitude",
                reason: format!("{}", self.ground_altitude),
            });
        }

        self.config.validate()
    }

    /// Stable SHA-256 over the canonical JSON form of inputs and config.
    ///
    /// Field order is fixed by the struct declarations, so the hash
    /// identifies a compilation deterministically.
    pub fn snapshot_hash(&self) -> String {
        let canonical =
            serde_json::to_vec(self).expect("compile request serializes infallibly");
        let digest = Sha256::digest(&canonical);
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CompileRequest {
        CompileRequest {
            crs: CrsSpec::Epsg(4326),
            trajectory_points: vec![[0.0, 0.0, 10.0], [100.0, 0.0, 10.0]],
            trajectory_heights: None,
            pillar_pairs: vec![[[25.0, -2.0], [25.0, 2.0]]],
            abutments: vec![],
            cross_section_2d: vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]],
            safety_zones: vec![],
            ground_altitude: 0.0,
            config: Config::default(),
        }
    }

    #[test]
    fn hash_is_stable_across_calls() {
        let request = sample_request();
        assert_eq!(request.snapshot_hash(), request.snapshot_hash());
    }

    #[test]
    fn hash_changes_with_the_input() {
        let a = sample_request();
        let mut b = sample_request();
        b.trajectory_points[1][0] = 101.0;

        assert_ne!(a.snapshot_hash(), b.snapshot_hash());
    }

    #[test]
    fn hash_changes_with_the_config() {
        let a = sample_request();
        let mut b = sample_request();
        b.config.overview.lateral_standoff += 1.0;

        assert_ne!(a.snapshot_hash(), b.snapshot_hash());
    }

    #[test]
    fn undersized_trajectory_is_rejected() {
        let mut request = sample_request();
        request.trajectory_points.truncate(1);

        assert!(matches!(
            request.validate(),
            Err(Error::InputInvalid { entity: "trajectory", .. })
        ));
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let mut request = sample_request();
        request.trajectory_points[0][2] = f64::NAN;

        assert!(matches!(
            request.validate(),
            Err(Error::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn request_round_trips_through_json() {
        let request = sample_request();
        let json = serde_json::to_string(&request).unwrap();
        let parsed: CompileRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, request);
        assert_eq!(parsed.snapshot_hash(), request.snapshot_hash());
    }
}
