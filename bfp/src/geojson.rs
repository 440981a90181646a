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

use geo::BoundingRect;
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};

use crate::export::ExportedRoute;

impl ExportedRoute {
    /// Returns the route as GeoJSON with a line string geometry and the id,
    /// class and statistics as properties.
    #[cfg_attr(docsrs, doc(cfg(feature = "geojson")))]
    pub fn to_geojson(&self) -> GeoJson {
        let coords: Vec<geo::Coord<f64>> = self
            .waypoints
            .iter()
            .map(|wp| geo::Coord {
                x: wp.lon,
                y: wp.lat,
            })
            .collect();
        let line = geo::LineString::from(coords);

        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), self.id.clone().into());
        properties.insert("class".to_string(), self.class.as_str().into());
        properties.insert("length_m".to_string(), self.stats.length_m.into());
        properties.insert(
            "waypoint_count".to_string(),
            (self.stats.waypoint_count as u64).into(),
        );

        GeoJson::Feature(Feature {
            bbox: line
                .bounding_rect()
                .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y]),
            geometry: Some(Geometry::new(Value::from(&line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportedWaypoint;
    use crate::route::{RouteClass, RouteStats, TurnMode, WaypointTag};

    #[test]
    fn route_renders_as_line_string_feature() {
        let route = ExportedRoute {
            id: "overview".to_string(),
            class: RouteClass::Overview,
            span_index: None,
            waypoints: vec![
                ExportedWaypoint {
                    lat: 50.85,
                    lon: 4.35,
                    alt: 30.0,
                    speed: 2.0,
                    tag: WaypointTag::Takeoff,
                    turn_mode: TurnMode::Coordinated,
                },
                ExportedWaypoint {
                    lat: 50.851,
                    lon: 4.351,
                    alt: 30.0,
                    speed: 1.0,
                    tag: WaypointTag::Landing,
                    turn_mode: TurnMode::Coordinated,
                },
            ],
            stats: RouteStats {
                waypoint_count: 2,
                length_m: 130.0,
                min_z: 30.0,
                max_z: 30.0,
            },
        };

        let GeoJson::Feature(feature) = route.to_geojson() else {
            panic!("expected a feature");
        };

        assert!(feature.geometry.is_some());
        let properties = feature.properties.unwrap();
        assert_eq!(properties["class"], "overview");
        assert_eq!(properties["waypoint_count"], 2);
    }
}
