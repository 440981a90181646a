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

use geo::Coord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::SafetyZone;
use crate::config::SafetyConfig;
use crate::error::{Error, Result};
use crate::geom::{
    nearest_boundary_point, point_in_polygon, segment_intersects_polygon, Point3, Prism,
};
use crate::route::Route;

/// Fixed arc-length sampling interval for segment tests, meters.
///
/// Far below typical prism dimensions, so explicit sampling cannot step
/// over a prism and no segment-polytope intersection is needed.
pub const SAMPLE_INTERVAL: f64 = 0.1;

/// Unsafe samples of one route grouped by zone.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct UnsafeSegment {
    pub zone_id: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub count: usize,
    pub samples: Vec<[f64; 3]>,
}

/// Validation outcome for one route.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub unsafe_segments: Vec<UnsafeSegment>,
    pub total_samples: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.unsafe_segments.is_empty()
    }

    pub fn unsafe_sample_count(&self) -> usize {
        self.unsafe_segments.iter().map(|s| s.count).sum()
    }
}

/// Resolution policy for validation findings.
///
/// The core never prompts; an interactive collaborator picks the policy and
/// hands it back.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePolicy {
    /// Fail the compilation with `SafetyUnresolved`.
    Abort,
    /// Lift every waypoint above a zone footprint to at least this altitude.
    LiftTo(f64),
    /// Push waypoints inside a prism out to its boundary.
    ClipToBoundary,
    /// Keep the routes untouched.
    Accept,
}

/// Prismatic no-fly validation over whole routes.
#[derive(Clone, Debug)]
pub struct SafetyEngine {
    prisms: Vec<Prism>,
    boundary_threshold: f64,
}

impl SafetyEngine {
    /// Normalizes the zones against the configured defaults.
    pub fn new(zones: &[SafetyZone], config: &SafetyConfig) -> Result<Self> {
        let prisms = zones
            .iter()
            .map(|zone| zone.to_prism(config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            prisms,
            boundary_threshold: config.boundary_threshold,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.prisms.is_empty()
    }

    pub fn prisms(&self) -> &[Prism] {
        &self.prisms
    }

    /// Samples every segment of the route at the fixed interval and reports
    /// the samples falling into any prism, grouped by zone.
    pub fn validate_route(&self, route: &Route) -> ValidationReport {
        let mut per_zone: Vec<Vec<[f64; 3]>> = vec![Vec::new(); self.prisms.len()];
        let mut total_samples = 0usize;

        for pair in route.waypoints.windows(2) {
            let a = pair[0].position;
            let b = pair[1].position;
            let len = (b - a).norm();
            let steps = (len / SAMPLE_INTERVAL).ceil().max(1.0) as usize;

            for step in 0..=steps {
                let t = step as f64 / steps as f64;
                let sample = Point3::from(a.coords + (b.coords - a.coords) * t);
                total_samples += 1;

                for (zone_id, prism) in self.prisms.iter().enumerate() {
                    if prism.contains(&sample, self.boundary_threshold) {
                        per_zone[zone_id].push([sample.x, sample.y, sample.z]);
                    }
                }
            }
        }

        let unsafe_segments: Vec<UnsafeSegment> = per_zone
            .into_iter()
            .enumerate()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(zone_id, samples)| UnsafeSegment {
                zone_id,
                z_min: self.prisms[zone_id].z_min,
                z_max: self.prisms[zone_id].z_max,
                count: samples.len(),
                samples,
            })
            .collect();

        if unsafe_segments.is_empty() {
            debug!("route {} validated clean ({total_samples} samples)", route.id);
        } else {
            warn!(
                "route {} has {} unsafe samples in {} zone(s)",
                route.id,
                unsafe_segments.iter().map(|s| s.count).sum::<usize>(),
                unsafe_segments.len()
            );
        }

        ValidationReport {
            unsafe_segments,
            total_samples,
        }
    }

    /// Applies a resolution policy to the routes.
    ///
    /// Returns the number of adjusted waypoints. `Abort` turns the findings
    /// into an error; `Accept` leaves everything in place.
    pub fn resolve(
        &self,
        routes: &mut [Route],
        reports: &[ValidationReport],
        policy: ResolvePolicy,
    ) -> Result<usize> {
        let unsafe_samples: usize = reports.iter().map(|r| r.unsafe_sample_count()).sum();
        if unsafe_samples == 0 {
            return Ok(0);
        }

        match policy {
            ResolvePolicy::Abort => Err(Error::SafetyUnresolved { unsafe_samples }),
            ResolvePolicy::Accept => Ok(0),
            ResolvePolicy::LiftTo(altitude) => {
                let mut adjusted = 0;
                for route in routes.iter_mut() {
                    // Lift waypoints over a zone footprint, and both ends of
                    // any segment touching one: a segment climbing out of a
                    // lifted waypoint must not re-enter the prism.
                    let mut lift = vec![false; route.waypoints.len()];
                    for (i, wp) in route.waypoints.iter().enumerate() {
                        let p = Coord {
                            x: wp.position.x,
                            y: wp.position.y,
                        };
                        if self
                            .prisms
                            .iter()
                            .any(|prism| point_in_polygon(&prism.footprint, p, 0.0))
                        {
                            lift[i] = true;
                        }
                    }
                    for i in 0..route.waypoints.len().saturating_sub(1) {
                        let a = route.waypoints[i].position;
                        let b = route.waypoints[i + 1].position;
                        let touches = self.prisms.iter().any(|prism| {
                            segment_intersects_polygon(
                                &prism.footprint,
                                Coord { x: a.x, y: a.y },
                                Coord { x: b.x, y: b.y },
                            )
                        });
                        if touches {
                            lift[i] = true;
                            lift[i + 1] = true;
                        }
                    }

                    for (wp, lift) in route.waypoints.iter_mut().zip(lift) {
                        if lift && wp.position.z < altitude {
                            wp.position.z = altitude;
                            adjusted += 1;
                        }
                    }
                }
                debug!("lift_to resolution adjusted {adjusted} waypoints");
                Ok(adjusted)
            }
            ResolvePolicy::ClipToBoundary => {
                let mut adjusted = 0;
                for route in routes.iter_mut() {
                    for wp in &mut route.waypoints {
                        for prism in &self.prisms {
                            if prism.contains(&wp.position, self.boundary_threshold) {
                                let inside = Coord {
                                    x: wp.position.x,
                                    y: wp.position.y,
                                };
                                let edge = nearest_boundary_point(&prism.footprint, inside);

                                // Push past the edge so the re-validation
                                // stays outside the grazing threshold.
                                let dx = edge.x - inside.x;
                                let dy = edge.y - inside.y;
                                let len = dx.hypot(dy).max(1e-9);
                                let push = self.boundary_threshold + SAMPLE_INTERVAL;

                                wp.position.x = edge.x + dx / len * push;
                                wp.position.y = edge.y + dy / len * push;
                                adjusted += 1;
                            }
                        }
                    }
                }
                debug!("clip_to_boundary resolution adjusted {adjusted} waypoints");
                Ok(adjusted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point3;
    use crate::route::{RouteClass, TurnMode, Waypoint, WaypointTag};

    fn route_through(points: &[Point3]) -> Route {
        let mut route = Route::new("test", RouteClass::Overview, None);
        for (i, p) in points.iter().enumerate() {
            let tag = if i == 0 {
                WaypointTag::Takeoff
            } else if i == points.len() - 1 {
                WaypointTag::Landing
            } else {
                WaypointTag::Cruise
            };
            route.push(Waypoint::new(*p, tag, TurnMode::Coordinated));
        }
        route
    }

    fn engine_with_square(z_min: f64, z_max: f64) -> SafetyEngine {
        let zone = SafetyZone::new(
            vec![[40.0, -10.0], [60.0, -10.0], [60.0, 10.0], [40.0, 10.0]],
            Some(z_min),
            Some(z_max),
        );
        SafetyEngine::new(&[zone], &SafetyConfig::default()).unwrap()
    }

    #[test]
    fn empty_zone_list_reports_clean() {
        let engine = SafetyEngine::new(&[], &SafetyConfig::default()).unwrap();
        let route = route_through(&[point3!(0.0, 0.0, 10.0), point3!(100.0, 0.0, 10.0)]);

        let report = engine.validate_route(&route);
        assert!(report.is_clean());
        assert!(report.total_samples > 0);
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn crossing_segment_is_flagged() {
        let engine = engine_with_square(0.0, 30.0);
        let route = route_through(&[point3!(0.0, 0.0, 10.0), point3!(100.0, 0.0, 10.0)]);

        let report = engine.validate_route(&route);
        assert_eq!(report.unsafe_segments.len(), 1);
        assert_eq!(report.unsafe_segments[0].zone_id, 0);
        // Roughly 20 m of the segment cross the zone at 0.1 m sampling.
        assert!(report.unsafe_segments[0].count > 150);
    }

    #[test]
    fn overflight_above_the_prism_is_safe() {
        let engine = engine_with_square(0.0, 30.0);
        let route = route_through(&[point3!(0.0, 0.0, 40.0), point3!(100.0, 0.0, 40.0)]);

        assert!(engine.validate_route(&route).is_clean());
    }

    #[test]
    fn enlarging_a_zone_never_reduces_findings() {
        let route = route_through(&[point3!(0.0, 0.0, 10.0), point3!(100.0, 0.0, 10.0)]);

        let small = engine_with_square(0.0, 30.0).validate_route(&route);

        let large_zone = SafetyZone::new(
            vec![[30.0, -20.0], [70.0, -20.0], [70.0, 20.0], [30.0, 20.0]],
            Some(0.0),
            Some(30.0),
        );
        let large = SafetyEngine::new(&[large_zone], &SafetyConfig::default())
            .unwrap()
            .validate_route(&route);

        assert!(large.unsafe_sample_count() >= small.unsafe_sample_count());
    }

    #[test]
    fn lift_to_clears_the_findings() {
        let engine = engine_with_square(0.0, 30.0);
        let mut routes = vec![route_through(&[
            point3!(0.0, 0.0, 10.0),
            point3!(50.0, 0.0, 10.0),
            point3!(100.0, 0.0, 10.0),
        ])];

        let reports = vec![engine.validate_route(&routes[0])];
        assert!(!reports[0].is_clean());

        let adjusted = engine
            .resolve(&mut routes, &reports, ResolvePolicy::LiftTo(35.0))
            .unwrap();
        assert!(adjusted > 0);

        // Every waypoint over the zone footprint is now at 35 m or higher.
        for wp in &routes[0].waypoints {
            if (40.0..=60.0).contains(&wp.position.x) {
                assert!(wp.position.z >= 35.0);
            }
        }

        assert!(engine.validate_route(&routes[0]).is_clean());
    }

    #[test]
    fn abort_surfaces_safety_unresolved() {
        let engine = engine_with_square(0.0, 30.0);
        let mut routes = vec![route_through(&[
            point3!(0.0, 0.0, 10.0),
            point3!(100.0, 0.0, 10.0),
        ])];
        let reports = vec![engine.validate_route(&routes[0])];

        assert!(matches!(
            engine.resolve(&mut routes, &reports, ResolvePolicy::Abort),
            Err(Error::SafetyUnresolved { .. })
        ));
    }

    #[test]
    fn clip_moves_waypoints_outside() {
        let engine = engine_with_square(0.0, 30.0);
        let mut routes = vec![route_through(&[
            point3!(0.0, 0.0, 10.0),
            point3!(50.0, 0.0, 10.0),
            point3!(100.0, 0.0, 10.0),
        ])];
        let reports = vec![engine.validate_route(&routes[0])];

        engine
            .resolve(&mut routes, &reports, ResolvePolicy::ClipToBoundary)
            .unwrap();

        // The middle waypoint was inside and is now at the boundary.
        let wp = routes[0].waypoints[1].position;
        for prism in engine.prisms() {
            assert!(!prism.contains(&wp, 0.0));
        }
    }

    #[test]
    fn grazing_waypoints_are_not_flagged() {
        // A route hugging the zone edge within the 0.2 m threshold.
        let engine = engine_with_square(0.0, 30.0);
        let route = route_through(&[point3!(40.1, -20.0, 10.0), point3!(40.1, 20.0, 10.0)]);

        // 0.1 m inside the western edge, within the grazing threshold.
        assert!(engine.validate_route(&route).is_clean());
    }
}
