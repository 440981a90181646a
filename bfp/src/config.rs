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

//! Compiler configuration.
//!
//! Every option carries a serde default so partial configuration files stay
//! valid; [`Config::validate`] enforces the documented ranges before any
//! derivation starts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::route::{TurnMode, WaypointTag};

/// How the two overview bands are connected.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Climb by the vertical offset, traverse, descend.
    VThenH,
    /// Traverse around the end with the horizontal offset, then settle.
    HThenV,
    /// Straight connection.
    Diagonal,
}

impl Default for TransitionMode {
    fn default() -> Self {
        Self::Diagonal
    }
}

/// Altitude reference written at export.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightMode {
    Ellipsoid,
    Egm96,
    RelativeToStart,
}

impl Default for HeightMode {
    fn default() -> Self {
        Self::Egm96
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    /// Lateral standoff of the viewpoint bands from the centerline, meters.
    pub lateral_standoff: f64,
    /// Vertical standoff above the deck top, meters.
    pub top_standoff: f64,
    /// Camera forward overlap as a fraction in (0, 1).
    pub forward_overlap: f64,
    /// Camera side overlap as a fraction in (0, 1).
    pub side_overlap: f64,
    /// Minimum turn angle kept by the simplification, degrees (5–30).
    pub angle_threshold_deg: f64,
    pub turn_mode: TurnMode,
    /// Version of the viewpoint spacing formula; bumped when the formula
    /// changes so exports remain reproducible.
    pub spacing_version: u32,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            lateral_standoff: 10.0,
            top_standoff: 5.0,
            forward_overlap: 0.8,
            side_overlap: 0.7,
            angle_threshold_deg: 15.0,
            turn_mode: TurnMode::Coordinated,
            spacing_version: crate::planner::SPACING_FORMULA_VERSION,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub mode: TransitionMode,
    /// Vertical clearance used when lifting over the deck or a pillar, meters.
    pub vertical_offset: f64,
    /// Horizontal clearance used when rounding a bridge end, meters.
    pub horizontal_offset: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            mode: TransitionMode::default(),
            vertical_offset: 5.0,
            horizontal_offset: 5.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderdeckConfig {
    /// Vertical clearance below the deck underside, meters.
    pub vertical_clearance: f64,
    /// Horizontal clearance from pillar faces, meters.
    pub horizontal_clearance: f64,
    /// Sensor overlap between adjacent sweeps as a fraction in (0, 1).
    pub sweep_overlap: f64,
    /// Along-track viewpoint spacing of the axial pass, meters.
    pub axial_spacing: f64,
}

impl Default for UnderdeckConfig {
    fn default() -> Self {
        Self {
            vertical_clearance: 3.0,
            horizontal_clearance: 3.0,
            sweep_overlap: 0.5,
            axial_spacing: 5.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Grazing threshold δ: samples closer than this to a zone boundary are
    /// not flagged, meters.
    pub boundary_threshold: f64,
    /// Default prism floor for zones without z bounds, meters.
    pub default_z_min: f64,
    /// Default prism ceiling for zones without z bounds, meters.
    pub default_z_max: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            boundary_threshold: 0.2,
            default_z_min: 0.0,
            default_z_max: 120.0,
        }
    }
}

/// Map from waypoint tag to flight speed in m/s.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightSpeedMap {
    speeds: BTreeMap<WaypointTag, f64>,
}

impl FlightSpeedMap {
    /// Fallback cruise speed when the map carries no cruise entry.
    pub const DEFAULT_CRUISE: f64 = 2.0;

    pub fn new(speeds: BTreeMap<WaypointTag, f64>) -> Self {
        Self { speeds }
    }

    /// The speed for a tag; missing tags fall back to the cruise speed.
    pub fn speed_for(&self, tag: WaypointTag) -> f64 {
        self.speeds
            .get(&tag)
            .copied()
            .unwrap_or_else(|| self.cruise())
    }

    /// The cruise speed.
    pub fn cruise(&self) -> f64 {
        self.speeds
            .get(&WaypointTag::Cruise)
            .copied()
            .unwrap_or(Self::DEFAULT_CRUISE)
    }

    /// Whether the map carries an explicit entry for the tag.
    pub fn contains(&self, tag: WaypointTag) -> bool {
        self.speeds.contains_key(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WaypointTag, &f64)> {
        self.speeds.iter()
    }
}

impl Default for FlightSpeedMap {
    fn default() -> Self {
        let mut speeds = BTreeMap::new();
        speeds.insert(WaypointTag::Takeoff, 2.0);
        speeds.insert(WaypointTag::Cruise, 2.0);
        speeds.insert(WaypointTag::Inspect, 1.0);
        speeds.insert(WaypointTag::Transition, 1.5);
        speeds.insert(WaypointTag::Corner, 1.0);
        speeds.insert(WaypointTag::OverPillar, 1.0);
        speeds.insert(WaypointTag::Landing, 1.0);
        Self { speeds }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Maximum segment length before densification inserts waypoints, meters.
    pub max_segment_length: f64,
    /// Minimum waypoint altitude, meters.
    pub altitude_floor: f64,
    /// Interior turn angle above which a waypoint becomes a corner, degrees.
    pub corner_angle_deg: f64,
    pub flight_speed_map: FlightSpeedMap,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            max_segment_length: 20.0,
            altitude_floor: 2.0,
            corner_angle_deg: 60.0,
            flight_speed_map: FlightSpeedMap::default(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub height_mode: HeightMode,
    /// Global transitional speed written to the mission config, m/s.
    pub global_speed: f64,
    /// Takeoff security height, meters.
    pub takeoff_security_height: f64,
    /// Locale geoid offset applied in EGM96 mode, meters. The default is
    /// the Belgian constant; replace per locale.
    pub egm96_offset: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            height_mode: HeightMode::default(),
            global_speed: 2.0,
            takeoff_security_height: 30.0,
            egm96_offset: 44.8,
        }
    }
}

/// The full compiler configuration.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overview: OverviewConfig,
    pub transition: TransitionConfig,
    pub underdeck: UnderdeckConfig,
    pub safety: SafetyConfig,
    pub post: PostConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Checks every option against its documented range.
    pub fn validate(&self) -> Result<()> {
        fn fraction(name: &'static str, value: f64) -> Result<()> {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(Error::InputInvalid {
                    entity: "config",
                    reason: format!("{name} must be a fraction in (0, 1), got {value}"),
                })
            }
        }

        fn positive(name: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InputInvalid {
                    entity: "config",
                    reason: format!("{name} must be positive, got {value}"),
                })
            }
        }

        fraction("overview.forward_overlap", self.overview.forward_overlap)?;
        fraction("overview.side_overlap", self.overview.side_overlap)?;
        fraction("underdeck.sweep_overlap", self.underdeck.sweep_overlap)?;

        positive("overview.lateral_standoff", self.overview.lateral_standoff)?;
        positive("underdeck.vertical_clearance", self.underdeck.vertical_clearance)?;
        positive("underdeck.horizontal_clearance", self.underdeck.horizontal_clearance)?;
        positive("underdeck.axial_spacing", self.underdeck.axial_spacing)?;
        positive("post.max_segment_length", self.post.max_segment_length)?;

        if !(5.0..=30.0).contains(&self.overview.angle_threshold_deg) {
            return Err(Error::InputInvalid {
                entity: "config",
                reason: format!(
                    "overview.angle_threshold_deg must be within 5..30, got {}",
                    self.overview.angle_threshold_deg
                ),
            });
        }

        if self.safety.boundary_threshold < 0.0 {
            return Err(Error::InputInvalid {
                entity: "config",
                reason: "safety.boundary_threshold must not be negative".to_string(),
            });
        }

        if self.safety.default_z_min > self.safety.default_z_max {
            return Err(Error::InputInvalid {
                entity: "config",
                reason: "safety.default_z_min exceeds safety.default_z_max".to_string(),
            });
        }

        for (tag, speed) in self.post.flight_speed_map.iter() {
            if !speed.is_finite() || *speed < 0.0 {
                return Err(Error::InputInvalid {
                    entity: "config",
                    reason: format!("flight speed for {tag} must not be negative"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn angle_threshold_range_is_enforced() {
        let mut config = Config::default();
        config.overview.angle_threshold_deg = 45.0;
        assert!(config.validate().is_err());

        config.overview.angle_threshold_deg = 5.0;
        config.validate().unwrap();
    }

    #[test]
    fn overlap_must_be_a_fraction() {
        let mut config = Config::default();
        config.overview.forward_overlap = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"overview": {"lateral_standoff": 12.5}}"#).unwrap();

        assert_eq!(config.overview.lateral_standoff, 12.5);
        assert_eq!(config.overview.angle_threshold_deg, 15.0);
        assert_eq!(config.safety.boundary_threshold, 0.2);
    }

    #[test]
    fn missing_tag_falls_back_to_cruise() {
        let map = FlightSpeedMap::new(BTreeMap::from([(WaypointTag::Cruise, 3.0)]));

        assert_eq!(map.speed_for(WaypointTag::Inspect), 3.0);
        assert_eq!(map.speed_for(WaypointTag::Cruise), 3.0);
    }

    #[test]
    fn speed_map_round_trips_as_json_object() {
        let map = FlightSpeedMap::default();
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"over_pillar\""));

        let parsed: FlightSpeedMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}
