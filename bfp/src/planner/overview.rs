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

//! Overview planner.
//!
//! Produces one closed photogrammetric tour around the bridge: a band of
//! viewpoints on each side of the centerline at the lateral standoff, flown
//! out along one side and back along the other, connected at both ends by
//! transition waypoints and simplified by the angle threshold.

use log::{debug, info, warn};

use super::spacing::{stations, viewpoint_spacing};
use super::transition::connect;
use crate::bridge::BridgeModel;
use crate::config::Config;
use crate::error::Result;
use crate::geom::{Point3, Vector3};
use crate::route::{Route, RouteClass, Waypoint, WaypointTag};
#[cfg(test)]
use crate::route::TurnMode;

/// Plans the overview tour.
pub fn plan_overview(model: &BridgeModel, config: &Config) -> Result<Route> {
    let overview = &config.overview;
    let d_side = overview.lateral_standoff;
    let d_top = overview.top_standoff;

    if d_side <= model.cross_section.half_width() {
        warn!(
            "lateral standoff {d_side} m is inside the deck footprint \
             (half width {} m)",
            model.cross_section.half_width()
        );
    }

    let overlap = overview.forward_overlap.max(overview.side_overlap);
    let spacing = viewpoint_spacing(d_side, overlap);
    let total = model.centerline.total_length();
    let band_stations = stations(0.0, total, spacing);

    debug!(
        "overview band: {} stations at {:.2} m spacing over {:.1} m",
        band_stations.len(),
        spacing,
        total
    );

    // One viewpoint per station and side, at the deck top plus the vertical
    // standoff.
    let mut left: Vec<Point3> = Vec::with_capacity(band_stations.len());
    let mut right: Vec<Point3> = Vec::with_capacity(band_stations.len());
    for &s in &band_stations {
        let (p, _, n) = model.centerline.at(s);
        let z = p.z + model.cross_section.max_up() + d_top;
        left.push(Point3::new(p.x + n.x * d_side, p.y + n.y * d_side, z));
        right.push(Point3::new(p.x - n.x * d_side, p.y - n.y * d_side, z));
    }

    let turn_mode = overview.turn_mode;
    let mut route = Route::new("overview", RouteClass::Overview, None);
    let push = |route: &mut Route, p: Point3, tag: WaypointTag| {
        route.push(Waypoint::new(p, tag, turn_mode));
    };

    // Out along the left band.
    for (i, p) in left.iter().enumerate() {
        let tag = match i {
            0 => WaypointTag::Takeoff,
            1 => WaypointTag::Cruise,
            _ => WaypointTag::Inspect,
        };
        push(&mut route, *p, tag);
    }

    // Around the far end onto the right band.
    let last = band_stations.len() - 1;
    let (_, far_tangent, _) = model.centerline.at(total);
    for p in connect(left[last], right[last], far_tangent, &config.transition) {
        push(&mut route, p, WaypointTag::Transition);
    }

    // Back along the right band.
    for p in right.iter().rev() {
        push(&mut route, *p, WaypointTag::Inspect);
    }

    // Around the near end and close the tour.
    let (_, near_tangent, _) = model.centerline.at(0.0);
    for p in connect(right[0], left[0], -near_tangent, &config.transition) {
        push(&mut route, p, WaypointTag::Transition);
    }
    push(&mut route, left[0], WaypointTag::Landing);

    let before = route.len();
    route.waypoints = simplify(route.waypoints, overview.angle_threshold_deg);

    info!(
        "overview tour planned: {} waypoints ({} before simplification), {:.1} m",
        route.len(),
        before,
        route.length()
    );

    Ok(route)
}

/// Removes inspection waypoints whose turn angle stays below the threshold.
///
/// Endpoints, transitions and every non-inspect waypoint survive. The pass
/// repeats until nothing changes, so applying it twice equals applying it
/// once.
pub fn simplify(waypoints: Vec<Waypoint>, min_angle_deg: f64) -> Vec<Waypoint> {
    let mut current = waypoints;

    loop {
        if current.len() < 3 {
            return current;
        }

        let mut kept: Vec<Waypoint> = Vec::with_capacity(current.len());
        let mut removed = false;

        for (i, wp) in current.iter().enumerate() {
            if i == 0 || i == current.len() - 1 || wp.tag != WaypointTag::Inspect {
                kept.push(*wp);
                continue;
            }

            let Some(prev) = kept.last() else {
                kept.push(*wp);
                continue;
            };
            let next = &current[i + 1];
            if turn_angle_deg(&prev.position, &wp.position, &next.position) < min_angle_deg {
                removed = true;
            } else {
                kept.push(*wp);
            }
        }

        current = kept;
        if !removed {
            return current;
        }
    }
}

/// Horizontal heading change at `b` on the path a → b → c, in degrees.
fn turn_angle_deg(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let v1 = Vector3::new(b.x - a.x, b.y - a.y, 0.0);
    let v2 = Vector3::new(c.x - b.x, c.y - b.y, 0.0);

    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < 1e-9 || n2 < 1e-9 {
        // A zero-length leg gives no heading; keep the waypoint.
        return 180.0;
    }

    (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CrossSection2d, DEFAULT_LATERAL_INFLATION};
    use crate::point3;

    fn straight_model() -> BridgeModel {
        BridgeModel::assemble(
            &[point3!(0.0, 0.0, 10.0), point3!(100.0, 0.0, 10.0)],
            None,
            CrossSection2d::new(vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]]).unwrap(),
            &[[[25.0, -2.0], [25.0, 2.0]], [[75.0, -2.0], [75.0, 2.0]]],
            &[],
            0.0,
            DEFAULT_LATERAL_INFLATION,
        )
        .unwrap()
    }

    #[test]
    fn tour_length_matches_the_inflated_perimeter() {
        let model = straight_model();
        let config = Config::default();

        let route = plan_overview(&model, &config).unwrap();

        // 2·(L + 2·d_side) for the straight 100 m bridge.
        let expected = 2.0 * (100.0 + 2.0 * config.overview.lateral_standoff);
        let length = route.length();
        assert!(
            (length - expected).abs() / expected < 0.02,
            "tour length {length:.1} m, expected ≈{expected:.1} m"
        );
    }

    #[test]
    fn tag_sequence_starts_and_ends_correctly() {
        let model = straight_model();
        let route = plan_overview(&model, &Config::default()).unwrap();

        assert_eq!(route.waypoints.first().unwrap().tag, WaypointTag::Takeoff);
        assert_eq!(route.waypoints[1].tag, WaypointTag::Cruise);
        assert_eq!(route.waypoints.last().unwrap().tag, WaypointTag::Landing);
    }

    #[test]
    fn lower_threshold_keeps_at_least_as_many_waypoints() {
        let model = straight_model();

        let mut narrow = Config::default();
        narrow.overview.angle_threshold_deg = 5.0;
        let mut wide = Config::default();
        wide.overview.angle_threshold_deg = 30.0;

        let count_narrow = plan_overview(&model, &narrow).unwrap().len();
        let count_wide = plan_overview(&model, &wide).unwrap().len();

        assert!(count_narrow >= count_wide);
    }

    #[test]
    fn simplification_is_idempotent() {
        let model = straight_model();
        let route = plan_overview(&model, &Config::default()).unwrap();

        let once = simplify(route.waypoints.clone(), 15.0);
        let twice = simplify(once.clone(), 15.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn planning_is_deterministic() {
        let model = straight_model();
        let config = Config::default();

        let a = plan_overview(&model, &config).unwrap();
        let b = plan_overview(&model, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn transitions_survive_simplification() {
        let model = straight_model();
        let mut config = Config::default();
        config.transition.mode = crate::config::TransitionMode::VThenH;

        let route = plan_overview(&model, &config).unwrap();
        let transitions = route
            .waypoints
            .iter()
            .filter(|w| w.tag == WaypointTag::Transition)
            .count();

        // Two band connections with two intermediate points each.
        assert_eq!(transitions, 4);
    }

    #[test]
    fn turn_mode_is_applied_to_every_waypoint() {
        let model = straight_model();
        let mut config = Config::default();
        config.overview.turn_mode = TurnMode::StopAndTurn;

        let route = plan_overview(&model, &config).unwrap();
        assert!(route
            .waypoints
            .iter()
            .all(|w| w.turn_mode == TurnMode::StopAndTurn));
    }
}
