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

//! Waypoint post-processing: densification, corner policy, speed
//! assignment and the altitude clamp.
//!
//! Runs in the metric planning frame, after the planners and the safety
//! stage, immediately before the export transform.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PostConfig;
use crate::geom::Point3;
use crate::route::{Route, Waypoint, WaypointTag};

/// Records one altitude lift for the diagnostics report.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ClampEvent {
    pub route_id: String,
    pub waypoint_index: usize,
    pub from_z: f64,
    pub to_z: f64,
}

/// Runs all post-processing steps on a route in order: densify, corner
/// marking, speed assignment, altitude clamp. Returns the clamp events.
pub fn process(route: &mut Route, config: &PostConfig) -> Vec<ClampEvent> {
    densify(route, config.max_segment_length);
    mark_corners(route, config.corner_angle_deg);
    assign_speeds(route, config);
    clamp_altitude(route, config.altitude_floor)
}

/// Splits segments longer than `max_length` with linearly interpolated
/// cruise waypoints.
pub fn densify(route: &mut Route, max_length: f64) {
    if route.waypoints.len() < 2 || max_length <= 0.0 {
        return;
    }

    let mut dense: Vec<Waypoint> = Vec::with_capacity(route.waypoints.len());

    for pair in route.waypoints.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        dense.push(a);

        let len = (b.position - a.position).norm();
        if len > max_length {
            let pieces = (len / max_length).ceil() as usize;
            for k in 1..pieces {
                let t = k as f64 / pieces as f64;
                let p = Point3::from(a.position.coords + (b.position.coords - a.position.coords) * t);
                dense.push(Waypoint::new(p, WaypointTag::Cruise, a.turn_mode));
            }
        }
    }
    if let Some(last) = route.waypoints.last() {
        dense.push(*last);
    }

    if dense.len() != route.waypoints.len() {
        debug!(
            "route {} densified from {} to {} waypoints",
            route.id,
            route.waypoints.len(),
            dense.len()
        );
        route.waypoints = dense;
    }
}

/// Retags interior cruise/inspect waypoints whose turn exceeds the corner
/// angle.
pub fn mark_corners(route: &mut Route, corner_angle_deg: f64) {
    if route.waypoints.len() < 3 {
        return;
    }

    let positions: Vec<Point3> = route.waypoints.iter().map(|w| w.position).collect();

    for i in 1..positions.len() - 1 {
        let tag = route.waypoints[i].tag;
        if tag != WaypointTag::Cruise && tag != WaypointTag::Inspect {
            continue;
        }

        if turn_angle_deg(&positions[i - 1], &positions[i], &positions[i + 1]) > corner_angle_deg {
            route.waypoints[i].tag = WaypointTag::Corner;
        }
    }
}

/// Assigns the configured speed to every waypoint by tag.
///
/// Corners without an explicit map entry use the corner default of
/// min(cruise, 1 m/s).
pub fn assign_speeds(route: &mut Route, config: &PostConfig) {
    let map = &config.flight_speed_map;
    let corner_default = map.cruise().min(1.0);

    for wp in &mut route.waypoints {
        let speed = match wp.tag {
            WaypointTag::Corner if !map.contains(WaypointTag::Corner) => corner_default,
            tag => map.speed_for(tag),
        };
        wp.speed = Some(speed);
    }
}

/// Lifts waypoints below the altitude floor and records each lift.
pub fn clamp_altitude(route: &mut Route, floor: f64) -> Vec<ClampEvent> {
    let mut events = Vec::new();

    for (i, wp) in route.waypoints.iter_mut().enumerate() {
        if wp.position.z < floor {
            events.push(ClampEvent {
                route_id: route.id.clone(),
                waypoint_index: i,
                from_z: wp.position.z,
                to_z: floor,
            });
            wp.position.z = floor;
        }
    }

    if !events.is_empty() {
        debug!(
            "route {}: {} waypoints lifted to the {floor} m floor",
            route.id,
            events.len()
        );
    }

    events
}

fn turn_angle_deg(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let v1 = nalgebra::Vector2::new(b.x - a.x, b.y - a.y);
    let v2 = nalgebra::Vector2::new(c.x - b.x, c.y - b.y);

    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < 1e-9 || n2 < 1e-9 {
        return 0.0;
    }

    (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point3;
    use crate::route::{RouteClass, TurnMode};

    fn route_of(points: &[(f64, f64, f64)], tag: WaypointTag) -> Route {
        let mut route = Route::new("test", RouteClass::Overview, None);
        for &(x, y, z) in points {
            route.push(Waypoint::new(point3!(x, y, z), tag, TurnMode::Coordinated));
        }
        route
    }

    #[test]
    fn long_segments_are_densified() {
        let mut route = route_of(&[(0.0, 0.0, 10.0), (100.0, 0.0, 10.0)], WaypointTag::Cruise);
        densify(&mut route, 20.0);

        // 100 m at 20 m per segment: four inserted points.
        assert_eq!(route.len(), 6);
        for pair in route.waypoints.windows(2) {
            assert!((pair[1].position - pair[0].position).norm() <= 20.0 + 1e-9);
        }

        // Interpolation is linear; the inserted points sit on the segment.
        for wp in &route.waypoints {
            assert_eq!(wp.position.y, 0.0);
            assert_eq!(wp.position.z, 10.0);
        }
    }

    #[test]
    fn short_segments_stay_untouched() {
        let mut route = route_of(&[(0.0, 0.0, 0.0), (5.0, 0.0, 0.0)], WaypointTag::Cruise);
        densify(&mut route, 20.0);
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn sharp_turns_become_corners() {
        let mut route = route_of(
            &[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 10.0, 0.0)],
            WaypointTag::Cruise,
        );
        mark_corners(&mut route, 60.0);

        assert_eq!(route.waypoints[1].tag, WaypointTag::Corner);
        assert_eq!(route.waypoints[0].tag, WaypointTag::Cruise);
    }

    #[test]
    fn gentle_turns_are_not_corners() {
        let mut route = route_of(
            &[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (20.0, 2.0, 0.0)],
            WaypointTag::Cruise,
        );
        mark_corners(&mut route, 60.0);
        assert!(route.waypoints.iter().all(|w| w.tag == WaypointTag::Cruise));
    }

    #[test]
    fn speeds_follow_the_tag_map() {
        let config = PostConfig::default();
        let mut route = route_of(&[(0.0, 0.0, 5.0), (10.0, 0.0, 5.0)], WaypointTag::Inspect);
        assign_speeds(&mut route, &config);

        for wp in &route.waypoints {
            assert_eq!(wp.speed, Some(config.flight_speed_map.speed_for(WaypointTag::Inspect)));
        }
    }

    #[test]
    fn corner_speed_defaults_to_min_of_cruise_and_one() {
        use crate::config::FlightSpeedMap;
        use std::collections::BTreeMap;

        let mut config = PostConfig::default();
        // A map without corner entry and a 3 m/s cruise.
        config.flight_speed_map =
            FlightSpeedMap::new(BTreeMap::from([(WaypointTag::Cruise, 3.0)]));

        let mut route = route_of(&[(0.0, 0.0, 5.0)], WaypointTag::Corner);
        assign_speeds(&mut route, &config);

        assert_eq!(route.waypoints[0].speed, Some(1.0));
    }

    #[test]
    fn altitude_clamp_lifts_and_reports() {
        let mut route = route_of(
            &[(0.0, 0.0, 1.0), (10.0, 0.0, 5.0), (20.0, 0.0, 0.5)],
            WaypointTag::Cruise,
        );
        let events = clamp_altitude(&mut route, 2.0);

        assert_eq!(events.len(), 2);
        assert!(route.waypoints.iter().all(|w| w.position.z >= 2.0));
        assert_eq!(events[0].from_z, 1.0);
        assert_eq!(events[0].to_z, 2.0);
        // The untouched waypoint keeps its altitude.
        assert_eq!(route.waypoints[1].position.z, 5.0);
    }

    #[test]
    fn process_runs_the_full_chain() {
        let mut route = route_of(
            &[(0.0, 0.0, 1.0), (50.0, 0.0, 10.0), (50.0, 50.0, 10.0)],
            WaypointTag::Cruise,
        );
        let events = process(&mut route, &PostConfig::default());

        assert!(!events.is_empty());
        assert!(route.waypoints.iter().all(|w| w.speed.is_some()));
        assert!(route.waypoints.iter().all(|w| w.position.z >= 2.0));
        assert!(route.waypoints.iter().any(|w| w.tag == WaypointTag::Corner));
    }
}
