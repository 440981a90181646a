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

//! Round trips between compiled routes and the vendor wire format.

use bfp::config::Config;
use bfp::crs::{CrsSpec, EARTH_RADIUS};
use bfp::export::mission_document;
use bfp::pipeline::CompileRequest;
use bfp::route::RouteClass;

fn bridge_request() -> CompileRequest {
    let center_lat: f64 = 50.85;
    let lon_at =
        |x: f64| 4.35 + (x / (EARTH_RADIUS * center_lat.to_radians().cos())).to_degrees();
    let lat_at = |y: f64| center_lat + (y / EARTH_RADIUS).to_degrees();

    CompileRequest {
        crs: CrsSpec::Epsg(4326),
        trajectory_points: vec![
            [lon_at(0.0), lat_at(0.0), 25.0],
            [lon_at(80.0), lat_at(0.0), 25.0],
        ],
        trajectory_heights: None,
        pillar_pairs: vec![[
            [lon_at(40.0), lat_at(-2.0)],
            [lon_at(40.0), lat_at(2.0)],
        ]],
        abutments: vec![],
        cross_section_2d: vec![[-4.0, 0.0], [4.0, 0.0], [4.0, 1.5], [-4.0, 1.5]],
        safety_zones: vec![],
        ground_altitude: 0.0,
        config: Config::default(),
    }
}

#[test]
fn mission_survives_the_wire_format() {
    let request = bridge_request();
    let response = bfp::compile(&request).unwrap();

    for route in &response.routes {
        let document =
            mission_document(route, &request.config.export, request.ground_altitude).unwrap();

        let xml = wpml::to_xml(&document).unwrap();
        let parsed = wpml::from_xml(&xml).unwrap();

        // The document re-reads into the same value.
        assert_eq!(parsed, document);

        // Positions within 1e-6°, altitudes exact.
        assert_eq!(parsed.placemarks().len(), route.waypoints.len());
        for (placemark, wp) in parsed.placemarks().iter().zip(&route.waypoints) {
            let (lon, lat, height) = placemark.coordinate().unwrap();
            assert!((lon - wp.lon).abs() <= 1e-6);
            assert!((lat - wp.lat).abs() <= 1e-6);
            assert_eq!(height, wp.alt);
            assert_eq!(placemark.waypoint_speed, wp.speed);
        }
    }
}

#[test]
fn kmz_container_round_trip() {
    let request = bridge_request();
    let response = bfp::compile(&request).unwrap();

    let overview = response
        .routes
        .iter()
        .find(|r| r.class == RouteClass::Overview)
        .unwrap();
    let document =
        mission_document(overview, &request.config.export, request.ground_altitude).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overview.kmz");

    wpml::write_kmz(&document, &path).unwrap();
    let parsed = wpml::read_kmz(&path).unwrap();

    assert_eq!(parsed, document);
}

#[test]
fn turn_modes_map_to_vendor_strings() {
    let request = bridge_request();
    let response = bfp::compile(&request).unwrap();

    for route in &response.routes {
        let document =
            mission_document(route, &request.config.export, request.ground_altitude).unwrap();
        let mode = &document.document.folder.global_waypoint_turn_mode;

        match route.class {
            RouteClass::Overview => assert_eq!(mode, "coordinateTurn"),
            _ => assert_eq!(mode, "toPointAndStopWithDiscontinuityCurvature"),
        }
    }
}

#[test]
fn every_placemark_sources_its_fields_from_the_route() {
    let request = bridge_request();
    let response = bfp::compile(&request).unwrap();
    let route = &response.routes[0];

    let document =
        mission_document(route, &request.config.export, request.ground_altitude).unwrap();

    let config = &request.config.export;
    let mission = &document.document.mission_config;
    assert_eq!(mission.take_off_security_height, config.takeoff_security_height);
    assert_eq!(mission.global_transitional_speed, config.global_speed);
    assert_eq!(mission.take_off_ref_point_agl_height, request.ground_altitude);

    for (i, placemark) in document.placemarks().iter().enumerate() {
        assert_eq!(placemark.index, i as u32);
        // EGM96 default mode: ellipsoid height carries the locale offset.
        assert!(
            (placemark.ellipsoid_height - placemark.height - config.egm96_offset).abs() < 1e-9
        );
    }
}
