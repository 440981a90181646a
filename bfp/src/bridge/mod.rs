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

//! Bridge model: deck surface, support prisms and the span partition,
//! derived from the trajectory, cross-section and ground pairs.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::geom::{cumulative_arc_length, CubicSpline, MovingFrame, Point3, Vector3};

mod cross_section;
mod deck;
mod pillar;
mod span;

pub use cross_section::CrossSection2d;
pub use deck::DeckSurface;
pub use pillar::{PillarPrism, SupportKind, DEFAULT_LATERAL_INFLATION, MIN_HEIGHT};
pub use span::{Span, SpanPartition, Station, StationSource};

/// Minimum number of centerline samples for the deck surface.
pub const MIN_DECK_SAMPLES: usize = 50;

/// The resampled centerline with its moving frame and arc-length table.
#[derive(Clone, PartialEq, Debug)]
pub struct Centerline {
    points: Vec<Point3>,
    frame: MovingFrame,
    cum_s: Vec<f64>,
}

impl Centerline {
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn frame(&self) -> &MovingFrame {
        &self.frame
    }

    pub fn cum_s(&self) -> &[f64] {
        &self.cum_s
    }

    pub fn total_length(&self) -> f64 {
        *self.cum_s.last().unwrap_or(&0.0)
    }

    /// Position, tangent and normal at arc length `s`, linearly interpolated
    /// between samples. `s` is clamped to [0, L].
    pub fn at(&self, s: f64) -> (Point3, Vector3, Vector3) {
        let s = s.clamp(0.0, self.total_length());
        let i = match self.cum_s.binary_search_by(|v| v.total_cmp(&s)) {
            Ok(i) => i.min(self.points.len() - 2),
            Err(i) => i.saturating_sub(1).min(self.points.len() - 2),
        };

        let seg = self.cum_s[i + 1] - self.cum_s[i];
        let t = if seg > 0.0 { (s - self.cum_s[i]) / seg } else { 0.0 };

        let point = self.points[i] + (self.points[i + 1] - self.points[i]) * t;
        // Frame vectors change slowly between samples; take the nearer one.
        let j = if t < 0.5 { i } else { i + 1 };

        (point, self.frame.tangents()[j], self.frame.normals()[j])
    }
}

/// The derived aggregate the planners work on.
#[derive(Clone, Debug)]
pub struct BridgeModel {
    pub centerline: Centerline,
    pub deck: DeckSurface,
    pub cross_section: CrossSection2d,
    pub supports: Vec<PillarPrism>,
    pub spans: SpanPartition,
    /// Ground reference altitude for support bases.
    pub ground_z: f64,
}

impl BridgeModel {
    /// Assembles the model from local-metric inputs.
    ///
    /// The trajectory is resampled to max(50, 3·n) samples, the
    /// cross-section extruded along the moving frame, support pairs turned
    /// into prisms, and their stations partition the arc length into spans.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        trajectory: &[Point3],
        heights: Option<&[f64]>,
        cross_section: CrossSection2d,
        pillar_pairs: &[[[f64; 2]; 2]],
        abutments: &[[[f64; 2]; 2]],
        ground_z: f64,
        lateral_inflation: f64,
    ) -> Result<Self> {
        if trajectory.len() < 2 {
            return Err(Error::InputInvalid {
                entity: "trajectory",
                reason: format!("{} points, need at least 2", trajectory.len()),
            });
        }

        let trajectory = apply_heights(trajectory, heights)?;

        let spline = CubicSpline::natural(&trajectory)?;
        let samples = MIN_DECK_SAMPLES.max(3 * spline.control_points().len());
        let resampled = spline.resample(samples)?;
        let frame = MovingFrame::from_tangents(&resampled.tangents)?;

        let deck = DeckSurface::extrude(&resampled.points, &frame, &cross_section)?;

        let mut supports = Vec::with_capacity(pillar_pairs.len() + abutments.len());
        for (i, pair) in pillar_pairs.iter().enumerate() {
            supports.push(PillarPrism::from_pair(
                SupportKind::Pillar,
                i,
                pair[0],
                pair[1],
                ground_z,
                lateral_inflation,
                &deck,
            )?);
        }
        for (i, pair) in abutments.iter().enumerate() {
            supports.push(PillarPrism::from_pair(
                SupportKind::Abutment,
                i,
                pair[0],
                pair[1],
                ground_z,
                lateral_inflation,
                &deck,
            )?);
        }

        let cum_s = cumulative_arc_length(&resampled.points);
        let spans = SpanPartition::build(&supports, &resampled.points, &cum_s)?;

        info!(
            "bridge model assembled: {:.1} m centerline, {} supports, {} spans",
            cum_s.last().unwrap_or(&0.0),
            supports.len(),
            spans.spans.len()
        );

        Ok(Self {
            centerline: Centerline {
                points: resampled.points,
                frame,
                cum_s,
            },
            deck,
            cross_section,
            supports,
            spans,
            ground_z,
        })
    }

    /// The support prism whose station is nearest to `s`, if any is a
    /// pillar or abutment at that boundary.
    pub fn support_at_station(&self, station: &Station) -> Option<&PillarPrism> {
        match station.source {
            StationSource::Support(i) => self.supports.get(i),
            StationSource::TrajectoryEnd => None,
        }
    }

    /// Altitude of the deck top at arc length `s`.
    pub fn deck_top_at(&self, s: f64) -> f64 {
        let (point, _, _) = self.centerline.at(s);
        point.z + self.cross_section.max_up()
    }

    /// Altitude of the deck underside at arc length `s`.
    pub fn deck_underside_at(&self, s: f64) -> f64 {
        let (point, _, _) = self.centerline.at(s);
        point.z + self.cross_section.min_up()
    }
}

/// Replaces trajectory altitudes with the interpolated height profile.
///
/// A single value is replicated; a profile of any other length is linearly
/// resampled to the trajectory length.
fn apply_heights(trajectory: &[Point3], heights: Option<&[f64]>) -> Result<Vec<Point3>> {
    let Some(heights) = heights else {
        return Ok(trajectory.to_vec());
    };

    if heights.is_empty() {
        return Ok(trajectory.to_vec());
    }

    for h in heights {
        if !h.is_finite() {
            return Err(Error::InvalidCoordinate {
                entity: "trajectory heights",
                reason: format!("{h}"),
            });
        }
    }

    let n = trajectory.len();
    debug!("applying height profile of {} values to {n} trajectory points", heights.len());

    let resampled: Vec<f64> = if heights.len() == 1 {
        vec![heights[0]; n]
    } else {
        (0..n)
            .map(|i| {
                let pos = i as f64 / (n as f64 - 1.0) * (heights.len() as f64 - 1.0);
                let j = (pos as usize).min(heights.len() - 2);
                let t = pos - j as f64;
                heights[j] * (1.0 - t) + heights[j + 1] * t
            })
            .collect()
    };

    Ok(trajectory
        .iter()
        .zip(resampled)
        .map(|(p, z)| Point3::new(p.x, p.y, z))
        .collect())
}
