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

//! Export transform: planning frame → WGS84, height mode application, and
//! the mapping onto the vendor waypoint container.

use serde::{Deserialize, Serialize};

use crate::config::{ExportConfig, HeightMode};
use crate::crs::LocalFrame;
use crate::error::{Error, Result};
use crate::route::{Route, RouteClass, RouteStats, TurnMode, WaypointTag};

/// A waypoint ready for the wire: WGS84 position, resolved speed and tag.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExportedWaypoint {
    pub lat: f64,
    pub lon: f64,
    /// Altitude under the configured height mode: absolute for ellipsoid
    /// and EGM96 modes, relative to the takeoff reference otherwise.
    pub alt: f64,
    pub speed: f64,
    pub tag: WaypointTag,
    pub turn_mode: TurnMode,
}

/// An exported route with its statistics.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExportedRoute {
    pub id: String,
    pub class: RouteClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_index: Option<usize>,
    pub waypoints: Vec<ExportedWaypoint>,
    pub stats: RouteStats,
}

/// Converts a post-processed route from the planning frame to WGS84 and
/// applies the height mode.
pub fn export_route(
    route: &Route,
    frame: &LocalFrame,
    config: &ExportConfig,
    takeoff_ref_alt: f64,
) -> Result<ExportedRoute> {
    let stats = route.stats();

    let waypoints = route
        .waypoints
        .iter()
        .map(|wp| {
            let (lat, lon, alt) = frame.to_wgs84(&wp.position)?;
            let alt = match config.height_mode {
                HeightMode::Ellipsoid | HeightMode::Egm96 => alt,
                HeightMode::RelativeToStart => alt - takeoff_ref_alt,
            };

            let speed = wp.speed.ok_or_else(|| Error::InternalInconsistency {
                stage: "export",
                reason: format!("waypoint without speed in route {}", route.id),
            })?;

            Ok(ExportedWaypoint {
                lat,
                lon,
                alt,
                speed,
                tag: wp.tag,
                turn_mode: wp.turn_mode,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportedRoute {
        id: route.id.clone(),
        class: route.class,
        span_index: route.span_index,
        waypoints,
        stats,
    })
}

/// The DJI height mode string for the coordinate system parameters.
fn height_mode_str(mode: HeightMode) -> &'static str {
    match mode {
        HeightMode::Ellipsoid => "WGS84",
        HeightMode::Egm96 => "EGM96",
        HeightMode::RelativeToStart => "relativeToStartPoint",
    }
}

/// Maps an exported route onto a vendor mission document.
///
/// Every field of the container has a source here: placemark positions,
/// heights and speeds come from the route, the global parameters from the
/// export configuration.
pub fn mission_document(
    route: &ExportedRoute,
    config: &ExportConfig,
    takeoff_ref_alt: f64,
) -> Result<wpml::MissionDocument> {
    let first = route
        .waypoints
        .first()
        .ok_or_else(|| Error::InternalInconsistency {
            stage: "export",
            reason: format!("route {} has no waypoints", route.id),
        })?;

    let turn_mode = match first.turn_mode {
        TurnMode::Coordinated => wpml::TurnMode::CoordinateTurn,
        TurnMode::StopAndTurn => wpml::TurnMode::ToPointAndStopWithDiscontinuityCurvature,
    };

    let mut folder = wpml::Folder {
        coordinate_sys_param: wpml::CoordinateSysParam {
            height_mode: height_mode_str(config.height_mode).to_string(),
            ..wpml::CoordinateSysParam::default()
        },
        auto_flight_speed: config.global_speed,
        global_waypoint_turn_mode: turn_mode.as_str().to_string(),
        ..wpml::Folder::default()
    };

    for (i, wp) in route.waypoints.iter().enumerate() {
        let mut placemark = wpml::Placemark::new(i as u32, wp.lon, wp.lat, wp.alt, wp.speed);
        if config.height_mode == HeightMode::Egm96 {
            placemark.ellipsoid_height = wp.alt + config.egm96_offset;
        }
        folder.placemarks.push(placemark);
    }

    let mission_config = wpml::MissionConfig {
        take_off_ref_point: format!("{},{}", first.lat, first.lon),
        take_off_ref_point_agl_height: takeoff_ref_alt,
        take_off_security_height: config.takeoff_security_height,
        global_transitional_speed: config.global_speed,
        ..wpml::MissionConfig::default()
    };

    Ok(wpml::MissionDocument::new(wpml::Document {
        create_time: None,
        update_time: None,
        mission_config,
        folder,
    }))
}
