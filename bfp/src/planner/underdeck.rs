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

//! Under-deck planner.
//!
//! Every span between two consecutive supports produces two independent
//! routes inside the clearance envelope below the deck: a boustrophedon
//! crossing sweep and a single axial pass. Spans ending at a pillar get a
//! transition tail that lifts above the deck, traverses the pillar and
//! descends on the far side. Safety zones are validated downstream before
//! the routes are emitted to the caller.

use log::{debug, info, warn};
use rayon::prelude::*;

use super::spacing::{stations, viewpoint_spacing};
use crate::bridge::{BridgeModel, PillarPrism, Span, StationSource, SupportKind};
use crate::config::Config;
use crate::error::Result;
use crate::geom::Point3;
use crate::pipeline::CancelToken;
use crate::route::{Route, RouteClass, TurnMode, Waypoint, WaypointTag};

/// Spans shorter than this after margins are skipped.
const MIN_USABLE_LENGTH: f64 = 1.0;

/// Plans the under-deck routes for every span.
///
/// Spans are independent tasks on disjoint snapshots and run on the rayon
/// pool; the cancel token is consulted once per span task. The returned
/// routes keep span order.
pub fn plan_underdeck(
    model: &BridgeModel,
    config: &Config,
    cancel: &CancelToken,
) -> Result<Vec<Route>> {
    let per_span: Vec<Vec<Route>> = model
        .spans
        .spans
        .par_iter()
        .map(|span| -> Result<Vec<Route>> {
            cancel.check()?;
            Ok(plan_span(model, span, config))
        })
        .collect::<Result<Vec<_>>>()?;

    let routes: Vec<Route> = per_span.into_iter().flatten().collect();

    info!(
        "under-deck planning produced {} routes over {} spans",
        routes.len(),
        model.spans.spans.len()
    );

    Ok(routes)
}

/// Plans the crossing and axial route of one span.
fn plan_span(model: &BridgeModel, span: &Span, config: &Config) -> Vec<Route> {
    let clearance = &config.underdeck;

    let margin_start = boundary_margin(model, span.start.source, clearance.horizontal_clearance);
    let margin_end = boundary_margin(model, span.end.source, clearance.horizontal_clearance);

    let s0 = span.start.s + margin_start;
    let s1 = span.end.s - margin_end;
    if s1 - s0 < MIN_USABLE_LENGTH {
        warn!(
            "span {} is too short after clearance margins ({:.2} m); skipped",
            span.index,
            s1 - s0
        );
        return Vec::new();
    }

    let mut routes = Vec::with_capacity(2);
    routes.push(plan_crossing(model, span, config, s0, s1));
    routes.push(plan_axial(model, span, config, s0, s1));
    routes
}

/// Margin between a span boundary and the usable interval.
fn boundary_margin(model: &BridgeModel, source: StationSource, clearance: f64) -> f64 {
    match source {
        StationSource::TrajectoryEnd => 0.0,
        StationSource::Support(i) => {
            let support = &model.supports[i];
            clearance + support_half_thickness(model, support)
        }
    }
}

/// Half-extent of the support footprint along the trajectory tangent.
fn support_half_thickness(model: &BridgeModel, support: &PillarPrism) -> f64 {
    let s = nearest_station(model, support.center);
    let (_, tangent, _) = model.centerline.at(s);

    support
        .prism
        .footprint
        .exterior()
        .0
        .iter()
        .map(|c| {
            ((c.x - support.center[0]) * tangent.x + (c.y - support.center[1]) * tangent.y).abs()
        })
        .fold(0.0, f64::max)
}

fn nearest_station(model: &BridgeModel, point: [f64; 2]) -> f64 {
    let mut best = 0.0;
    let mut best_d = f64::INFINITY;
    for (p, s) in model
        .centerline
        .points()
        .iter()
        .zip(model.centerline.cum_s())
    {
        let d = (p.x - point[0]).hypot(p.y - point[1]);
        if d < best_d {
            best_d = d;
            best = *s;
        }
    }
    best
}

/// Transverse boustrophedon sweeps below the deck.
fn plan_crossing(model: &BridgeModel, span: &Span, config: &Config, s0: f64, s1: f64) -> Route {
    let clearance = &config.underdeck;
    let reach = model.cross_section.half_width() + clearance.horizontal_clearance;
    let spacing = viewpoint_spacing(clearance.vertical_clearance, clearance.sweep_overlap);
    let sweep_stations = stations(s0, s1, spacing);

    debug!(
        "span {} crossing: {} sweeps at {:.2} m spacing",
        span.index,
        sweep_stations.len(),
        spacing
    );

    let mut route = Route::new(
        format!("underdeck_span_{}_crossing", span.index),
        RouteClass::UnderdeckCrossing,
        Some(span.index),
    );

    for (i, &s) in sweep_stations.iter().enumerate() {
        let (p, _, n) = model.centerline.at(s);
        let z = p.z + model.cross_section.min_up() - clearance.vertical_clearance;

        let near = Point3::new(p.x + n.x * reach, p.y + n.y * reach, z);
        let far = Point3::new(p.x - n.x * reach, p.y - n.y * reach, z);

        // Alternate sweep direction so consecutive sweeps chain at the same
        // side.
        let (first, second) = if i % 2 == 0 { (near, far) } else { (far, near) };
        route.push(Waypoint::new(first, WaypointTag::Inspect, TurnMode::StopAndTurn));
        route.push(Waypoint::new(second, WaypointTag::Inspect, TurnMode::StopAndTurn));
    }

    // Entry and exit sit outside the pillar prisms; retag them.
    if let Some(first) = route.waypoints.first_mut() {
        first.tag = WaypointTag::Transition;
    }
    if let Some(last) = route.waypoints.last_mut() {
        last.tag = WaypointTag::Transition;
    }

    append_pillar_transition(model, span, config, &mut route);
    route
}

/// Single pass along the centerline.
fn plan_axial(model: &BridgeModel, span: &Span, config: &Config, s0: f64, s1: f64) -> Route {
    let clearance = &config.underdeck;
    let pass_stations = stations(s0, s1, clearance.axial_spacing);

    let mut route = Route::new(
        format!("axial_underdeck_span_{}", span.index),
        RouteClass::UnderdeckAxial,
        Some(span.index),
    );

    let last = pass_stations.len() - 1;
    for (i, &s) in pass_stations.iter().enumerate() {
        let (p, _, _) = model.centerline.at(s);
        let z = p.z + model.cross_section.min_up() - clearance.vertical_clearance;
        let tag = if i == 0 || i == last {
            WaypointTag::Transition
        } else {
            WaypointTag::Inspect
        };
        route.push(Waypoint::new(
            Point3::new(p.x, p.y, z),
            tag,
            TurnMode::StopAndTurn,
        ));
    }

    append_pillar_transition(model, span, config, &mut route);
    route
}

/// Lifts over the pillar closing the span and descends on the far side.
///
/// Only spans that end at a pillar (never an abutment or trajectory end)
/// and have a successor get the tail.
fn append_pillar_transition(model: &BridgeModel, span: &Span, config: &Config, route: &mut Route) {
    let StationSource::Support(i) = span.end.source else {
        return;
    };
    let support = &model.supports[i];
    if support.kind != SupportKind::Pillar {
        return;
    }
    if span.index + 1 >= model.spans.spans.len() {
        return;
    }

    let Some(last) = route.waypoints.last().copied() else {
        return;
    };

    let lift_z = model.deck_top_at(span.end.s) + config.transition.vertical_offset;

    let margin = boundary_margin(model, span.end.source, config.underdeck.horizontal_clearance);
    let far_s = (span.end.s + margin).min(model.centerline.total_length());
    let (far, _, _) = model.centerline.at(far_s);
    let far_z = far.z + model.cross_section.min_up() - config.underdeck.vertical_clearance;

    route.push(Waypoint::new(
        Point3::new(last.position.x, last.position.y, lift_z),
        WaypointTag::Transition,
        TurnMode::StopAndTurn,
    ));
    route.push(Waypoint::new(
        Point3::new(support.center[0], support.center[1], lift_z),
        WaypointTag::OverPillar,
        TurnMode::StopAndTurn,
    ));
    route.push(Waypoint::new(
        Point3::new(far.x, far.y, lift_z),
        WaypointTag::Transition,
        TurnMode::StopAndTurn,
    ));
    route.push(Waypoint::new(
        Point3::new(far.x, far.y, far_z),
        WaypointTag::Transition,
        TurnMode::StopAndTurn,
    ));
}
