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

//! End-to-end compilation scenarios.

use bfp::config::Config;
use bfp::crs::{CrsSpec, EARTH_RADIUS};
use bfp::pipeline::{CompileOptions, CompileRequest};
use bfp::route::RouteClass;
use bfp::safety::{ResolvePolicy, SafetyZone};

const CENTER_LAT: f64 = 50.85;
const CENTER_LON: f64 = 4.35;

/// Maps planning meters onto WGS84 degrees around the test site.
fn lon_at(x_m: f64) -> f64 {
    CENTER_LON + (x_m / (EARTH_RADIUS * CENTER_LAT.to_radians().cos())).to_degrees()
}

fn lat_at(y_m: f64) -> f64 {
    CENTER_LAT + (y_m / EARTH_RADIUS).to_degrees()
}

fn pair_at(x_m: f64, y_m: f64) -> [[f64; 2]; 2] {
    [
        [lon_at(x_m), lat_at(y_m - 2.0)],
        [lon_at(x_m), lat_at(y_m + 2.0)],
    ]
}

/// A straight 100 m bridge at 10 m deck altitude with two pillars and a
/// 10×2 m rectangular cross-section.
fn straight_bridge() -> CompileRequest {
    CompileRequest {
        crs: CrsSpec::Epsg(4326),
        trajectory_points: vec![
            [lon_at(0.0), lat_at(0.0), 10.0],
            [lon_at(100.0), lat_at(0.0), 10.0],
        ],
        trajectory_heights: None,
        pillar_pairs: vec![pair_at(25.0, 0.0), pair_at(75.0, 0.0)],
        abutments: vec![],
        cross_section_2d: vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]],
        safety_zones: vec![],
        ground_altitude: 0.0,
        config: Config::default(),
    }
}

/// A gently curved bridge at 30 m altitude with three pillars.
fn curved_bridge() -> CompileRequest {
    CompileRequest {
        crs: CrsSpec::Epsg(4326),
        trajectory_points: vec![
            [lon_at(0.0), lat_at(0.0), 30.0],
            [lon_at(60.0), lat_at(8.0), 30.0],
            [lon_at(120.0), lat_at(0.0), 30.0],
        ],
        trajectory_heights: None,
        pillar_pairs: vec![
            pair_at(30.0, 5.0),
            pair_at(60.0, 8.0),
            pair_at(90.0, 5.0),
        ],
        abutments: vec![],
        cross_section_2d: vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]],
        safety_zones: vec![],
        ground_altitude: 0.0,
        config: Config::default(),
    }
}

#[test]
fn straight_bridge_overview_tour_length() {
    let request = straight_bridge();
    let response = bfp::compile(&request).unwrap();

    let overview = response
        .routes
        .iter()
        .find(|r| r.class == RouteClass::Overview)
        .expect("an overview route");

    // One closed loop around the envelope: 2·(L + 2·d_side).
    let expected = 2.0 * (100.0 + 2.0 * request.config.overview.lateral_standoff);
    let length = overview.stats.length_m;
    assert!(
        (length - expected).abs() / expected < 0.02,
        "tour length {length:.1} m, expected ≈{expected:.1} m"
    );

    // Two pillars partition the trajectory into three spans.
    let crossings = response
        .routes
        .iter()
        .filter(|r| r.class == RouteClass::UnderdeckCrossing)
        .count();
    assert_eq!(crossings, 3);

    // No zones were given: validation reports nothing and removes nothing.
    assert!(!response.diagnostics.has_findings());
    assert!(response.routes.iter().all(|r| !r.waypoints.is_empty()));
}

#[test]
fn curved_bridge_zone_resolution_lifts_waypoints() {
    let mut request = curved_bridge();

    // A prism over the middle pillar, blocking everything below 30 m.
    request.safety_zones = vec![SafetyZone::new(
        vec![
            [lon_at(45.0), lat_at(-7.0)],
            [lon_at(75.0), lat_at(-7.0)],
            [lon_at(75.0), lat_at(23.0)],
            [lon_at(45.0), lat_at(23.0)],
        ],
        Some(0.0),
        Some(30.0),
    )];

    // Without resolution the under-deck routes cross the prism.
    let surfaced = bfp::compile(&request).unwrap();
    assert!(surfaced.diagnostics.has_findings());

    // With lift-to-35 the validator re-runs clean.
    let options = CompileOptions {
        resolution: Some(ResolvePolicy::LiftTo(35.0)),
        ..CompileOptions::default()
    };
    let resolved = bfp::compile_with(&request, &options).unwrap();

    assert!(!resolved.diagnostics.has_findings());
    assert!(resolved.diagnostics.resolution_adjustments.unwrap_or(0) > 0);

    // Every waypoint over the zone footprint ends at 35 m or higher.
    for route in &resolved.routes {
        for wp in &route.waypoints {
            let x = (wp.lon - CENTER_LON).to_radians() * EARTH_RADIUS * CENTER_LAT.to_radians().cos();
            let y = (wp.lat - CENTER_LAT).to_radians() * EARTH_RADIUS;
            if (45.0..=75.0).contains(&x) && (-7.0..=23.0).contains(&y) {
                assert!(
                    wp.alt >= 35.0 - 1e-6,
                    "waypoint at ({x:.1}, {y:.1}) kept altitude {}",
                    wp.alt
                );
            }
        }
    }
}

#[test]
fn angle_threshold_controls_simplification() {
    let mut narrow = curved_bridge();
    narrow.config.overview.angle_threshold_deg = 5.0;

    let mut wide = curved_bridge();
    wide.config.overview.angle_threshold_deg = 30.0;

    let count = |request: &CompileRequest| {
        bfp::compile(request)
            .unwrap()
            .routes
            .iter()
            .find(|r| r.class == RouteClass::Overview)
            .unwrap()
            .waypoints
            .len()
    };

    assert!(count(&narrow) >= count(&wide));
}

#[test]
fn two_span_bridge_produces_two_routes_per_class() {
    let mut request = straight_bridge();
    request.pillar_pairs = vec![pair_at(50.0, 0.0)];

    let response = bfp::compile(&request).unwrap();

    let crossings: Vec<_> = response
        .routes
        .iter()
        .filter(|r| r.class == RouteClass::UnderdeckCrossing)
        .collect();
    let axials: Vec<_> = response
        .routes
        .iter()
        .filter(|r| r.class == RouteClass::UnderdeckAxial)
        .collect();

    assert_eq!(crossings.len(), 2);
    assert_eq!(axials.len(), 2);
    assert_eq!(crossings[0].id, "underdeck_span_0_crossing");
    assert_eq!(axials[1].id, "axial_underdeck_span_1");
}

#[test]
fn altitude_floor_clamps_and_reports() {
    let mut request = straight_bridge();
    // The deck dips to 1 m mid-bridge; under-deck passes would go below
    // ground without the clamp.
    request.trajectory_points = vec![
        [lon_at(0.0), lat_at(0.0), 10.0],
        [lon_at(50.0), lat_at(0.0), 1.0],
        [lon_at(100.0), lat_at(0.0), 10.0],
    ];

    let response = bfp::compile(&request).unwrap();

    assert!(!response.diagnostics.clamp_events.is_empty());
    for route in &response.routes {
        for wp in &route.waypoints {
            assert!(
                wp.alt >= request.config.post.altitude_floor - 1e-9,
                "route {} has a waypoint at {} m",
                route.id,
                wp.alt
            );
        }
    }
}

#[test]
fn identical_requests_compile_identically() {
    let request = straight_bridge();

    let a = bfp::compile(&request).unwrap();
    let b = bfp::compile(&request).unwrap();

    assert_eq!(a.snapshot_hash, b.snapshot_hash);

    // Byte-identical routes, not just approximately equal ones.
    let bytes_a = serde_json::to_vec(&a.routes).unwrap();
    let bytes_b = serde_json::to_vec(&b.routes).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn cruise_segments_have_positive_speed() {
    let response = bfp::compile(&straight_bridge()).unwrap();

    for route in &response.routes {
        for wp in &route.waypoints {
            assert!(wp.speed >= 0.0);
            if wp.tag == bfp::route::WaypointTag::Cruise {
                assert!(wp.speed > 0.0, "cruise waypoint with zero speed in {}", route.id);
            }
        }
    }
}

#[test]
fn speeds_follow_the_flight_speed_map() {
    let request = straight_bridge();
    let response = bfp::compile(&request).unwrap();
    let map = &request.config.post.flight_speed_map;

    for route in &response.routes {
        for wp in &route.waypoints {
            if map.contains(wp.tag) {
                assert_eq!(wp.speed, map.speed_for(wp.tag));
            }
        }
    }
}

#[test]
fn degenerate_trajectory_is_rejected() {
    let mut request = straight_bridge();
    let point = request.trajectory_points[0];
    request.trajectory_points = vec![point, point];

    assert!(matches!(
        bfp::compile(&request),
        Err(bfp::Error::GeometryDegenerate { .. })
    ));
}

#[test]
fn inverted_zone_bounds_are_rejected() {
    let mut request = straight_bridge();
    request.safety_zones = vec![SafetyZone::new(
        vec![
            [lon_at(40.0), lat_at(-5.0)],
            [lon_at(60.0), lat_at(-5.0)],
            [lon_at(60.0), lat_at(5.0)],
        ],
        Some(50.0),
        Some(10.0),
    )];

    assert!(matches!(
        bfp::compile(&request),
        Err(bfp::Error::InputInvalid { .. })
    ));
}

#[test]
fn belgian_lambert_requests_compile() {
    // The same bridge described in the Belgian national CRS.
    let request = CompileRequest {
        crs: CrsSpec::Epsg(31370),
        trajectory_points: vec![[150_000.0, 170_000.0, 30.0], [150_100.0, 170_000.0, 30.0]],
        trajectory_heights: None,
        pillar_pairs: vec![[[150_050.0, 169_998.0], [150_050.0, 170_002.0]]],
        abutments: vec![],
        cross_section_2d: vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]],
        safety_zones: vec![],
        ground_altitude: 0.0,
        config: Config::default(),
    };

    let response = bfp::compile(&request).unwrap();

    // Everything lands in Belgium.
    for route in &response.routes {
        for wp in &route.waypoints {
            assert!((wp.lat - 50.8).abs() < 0.5, "lat {}", wp.lat);
            assert!((wp.lon - 4.4).abs() < 0.5, "lon {}", wp.lon);
        }
    }
}
