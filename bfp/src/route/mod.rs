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

//! Routes and waypoints.

use serde::{Deserialize, Serialize};

mod waypoint;

pub use waypoint::{TurnMode, Waypoint, WaypointTag};

use crate::geom::polyline_length;
use crate::geom::Point3;

/// Mission class of a route; also its sort rank in the compiled output.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    Overview,
    UnderdeckCrossing,
    UnderdeckAxial,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::UnderdeckCrossing => "underdeck_crossing",
            Self::UnderdeckAxial => "underdeck_axial",
        }
    }
}

/// An ordered waypoint sequence with its metadata.
///
/// Waypoints are immutable once emitted: post-processing steps replace the
/// whole sequence rather than patching it in place.
#[derive(Clone, PartialEq, Debug)]
pub struct Route {
    pub id: String,
    pub class: RouteClass,
    /// Span index for under-deck routes.
    pub span_index: Option<usize>,
    pub waypoints: Vec<Waypoint>,
}

/// Summary statistics attached to an exported route.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RouteStats {
    pub waypoint_count: usize,
    pub length_m: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Route {
    pub fn new(id: impl Into<String>, class: RouteClass, span_index: Option<usize>) -> Self {
        Self {
            id: id.into(),
            class,
            span_index,
            waypoints: Vec::new(),
        }
    }

    pub fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Total polyline length in the planning frame.
    pub fn length(&self) -> f64 {
        let points: Vec<Point3> = self.waypoints.iter().map(|w| w.position).collect();
        polyline_length(&points)
    }

    pub fn stats(&self) -> RouteStats {
        let (min_z, max_z) = self.waypoints.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), w| (min.min(w.position.z), max.max(w.position.z)),
        );

        RouteStats {
            waypoint_count: self.waypoints.len(),
            length_m: self.length(),
            min_z,
            max_z,
        }
    }

    /// Deterministic ordering: class rank first, then span index, then id.
    pub fn sort_key(&self) -> (RouteClass, usize, &str) {
        (self.class, self.span_index.unwrap_or(0), self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point3;

    #[test]
    fn class_rank_orders_overview_first() {
        assert!(RouteClass::Overview < RouteClass::UnderdeckCrossing);
        assert!(RouteClass::UnderdeckCrossing < RouteClass::UnderdeckAxial);
    }

    #[test]
    fn route_length_sums_segments() {
        let mut route = Route::new("r", RouteClass::Overview, None);
        route.push(Waypoint::new(point3!(0.0, 0.0, 0.0), WaypointTag::Takeoff, TurnMode::Coordinated));
        route.push(Waypoint::new(point3!(3.0, 0.0, 0.0), WaypointTag::Cruise, TurnMode::Coordinated));
        route.push(Waypoint::new(point3!(3.0, 4.0, 0.0), WaypointTag::Landing, TurnMode::Coordinated));

        assert_eq!(route.length(), 7.0);

        let stats = route.stats();
        assert_eq!(stats.waypoint_count, 3);
        assert_eq!(stats.length_m, 7.0);
    }
}
