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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::Point3;

/// Role of a waypoint within its route; selects the flight speed.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointTag {
    Takeoff,
    Cruise,
    Inspect,
    Transition,
    Corner,
    OverPillar,
    Landing,
}

impl WaypointTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Takeoff => "takeoff",
            Self::Cruise => "cruise",
            Self::Inspect => "inspect",
            Self::Transition => "transition",
            Self::Corner => "corner",
            Self::OverPillar => "over_pillar",
            Self::Landing => "landing",
        }
    }
}

impl fmt::Display for WaypointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-waypoint turn policy applied at export.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Fly a coordinated (spline-like) turn through the waypoint.
    Coordinated,
    /// Stop at the waypoint, then turn.
    StopAndTurn,
}

impl Default for TurnMode {
    fn default() -> Self {
        Self::Coordinated
    }
}

/// A single waypoint in the planner's metric frame.
///
/// The speed stays unset until the post-processor assigns it from the
/// flight speed map.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Waypoint {
    pub position: Point3,
    pub tag: WaypointTag,
    pub turn_mode: TurnMode,
    pub speed: Option<f64>,
}

impl Waypoint {
    pub fn new(position: Point3, tag: WaypointTag, turn_mode: TurnMode) -> Self {
        Self {
            position,
            tag,
            turn_mode,
            speed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_serialize_snake_case() {
        let json = serde_json::to_string(&WaypointTag::OverPillar).unwrap();
        assert_eq!(json, "\"over_pillar\"");

        let parsed: WaypointTag = serde_json::from_str("\"takeoff\"").unwrap();
        assert_eq!(parsed, WaypointTag::Takeoff);
    }
}
