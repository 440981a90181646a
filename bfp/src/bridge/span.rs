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

use log::debug;

use super::PillarPrism;
use crate::error::{Error, Result};

/// Where a span boundary comes from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StationSource {
    /// Index into the support prisms.
    Support(usize),
    /// A trajectory end without a support on it.
    TrajectoryEnd,
}

/// A support (or trajectory end) projected onto the trajectory arc length.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Station {
    pub s: f64,
    pub source: StationSource,
}

/// One span between two consecutive stations.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Span {
    pub index: usize,
    pub start: Station,
    pub end: Station,
}

impl Span {
    pub fn length(&self) -> f64 {
        self.end.s - self.start.s
    }
}

/// The ordered span partition of [0, L].
#[derive(Clone, PartialEq, Debug)]
pub struct SpanPartition {
    pub total_length: f64,
    pub stations: Vec<Station>,
    pub spans: Vec<Span>,
}

/// Tolerance for a support to count as sitting on a trajectory end.
const END_TOLERANCE: f64 = 1e-6;

impl SpanPartition {
    /// Projects the support midpoints onto the trajectory arc length and
    /// partitions [0, L] into spans.
    ///
    /// Trajectory ends without a support get a virtual end station so the
    /// spans always cover the full length with disjoint interiors.
    pub fn build(
        supports: &[PillarPrism],
        centerline: &[crate::geom::Point3],
        cum_s: &[f64],
    ) -> Result<Self> {
        let total_length = *cum_s.last().unwrap_or(&0.0);
        if total_length <= 0.0 {
            return Err(Error::GeometryDegenerate {
                entity: "span partition",
                reason: "trajectory has zero length".to_string(),
            });
        }

        let mut stations: Vec<Station> = supports
            .iter()
            .enumerate()
            .map(|(i, support)| Station {
                s: project_station(support.center, centerline, cum_s),
                source: StationSource::Support(i),
            })
            .collect();

        stations.sort_by(|a, b| a.s.total_cmp(&b.s));

        // Virtual stations close the partition where no support sits on an
        // end of the trajectory.
        if stations.first().is_none_or(|st| st.s > END_TOLERANCE) {
            stations.insert(
                0,
                Station {
                    s: 0.0,
                    source: StationSource::TrajectoryEnd,
                },
            );
        }
        if stations
            .last()
            .is_none_or(|st| st.s < total_length - END_TOLERANCE)
        {
            stations.push(Station {
                s: total_length,
                source: StationSource::TrajectoryEnd,
            });
        }

        let spans: Vec<Span> = stations
            .windows(2)
            .filter(|pair| pair[1].s - pair[0].s > END_TOLERANCE)
            .enumerate()
            .map(|(index, pair)| Span {
                index,
                start: pair[0],
                end: pair[1],
            })
            .collect();

        if spans.is_empty() {
            return Err(Error::GeometryDegenerate {
                entity: "span partition",
                reason: "no span with positive length".to_string(),
            });
        }

        debug!(
            "span partition: {} stations, {} spans over {total_length:.1} m",
            stations.len(),
            spans.len()
        );

        Ok(Self {
            total_length,
            stations,
            spans,
        })
    }
}

/// Arc length of the centerline sample nearest in xy to the point.
fn project_station(point: [f64; 2], centerline: &[crate::geom::Point3], cum_s: &[f64]) -> f64 {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, p) in centerline.iter().enumerate() {
        let d = (p.x - point[0]).hypot(p.y - point[1]);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    cum_s[best]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CrossSection2d, DeckSurface, PillarPrism, SupportKind};
    use crate::geom::{cumulative_arc_length, CubicSpline, MovingFrame};
    use crate::point3;

    fn straight_centerline() -> (Vec<crate::geom::Point3>, Vec<f64>, DeckSurface) {
        let spline = CubicSpline::natural(&[point3!(0.0, 0.0, 30.0), point3!(100.0, 0.0, 30.0)])
            .unwrap();
        let resampled = spline.resample(101).unwrap();
        let frame = MovingFrame::from_tangents(&resampled.tangents).unwrap();
        let section =
            CrossSection2d::new(vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]]).unwrap();
        let deck = DeckSurface::extrude(&resampled.points, &frame, &section).unwrap();
        let cum = cumulative_arc_length(&resampled.points);
        (resampled.points, cum, deck)
    }

    fn pillar_at(x: f64, index: usize, deck: &DeckSurface) -> PillarPrism {
        PillarPrism::from_pair(
            SupportKind::Pillar,
            index,
            [x, -2.0],
            [x, 2.0],
            0.0,
            0.5,
            deck,
        )
        .unwrap()
    }

    #[test]
    fn two_pillars_give_three_spans() {
        let (centerline, cum, deck) = straight_centerline();
        let supports = vec![pillar_at(25.0, 0, &deck), pillar_at(75.0, 1, &deck)];

        let partition = SpanPartition::build(&supports, &centerline, &cum).unwrap();

        assert_eq!(partition.spans.len(), 3);
        assert!((partition.spans[0].start.s - 0.0).abs() < 0.6);
        assert!((partition.spans[1].start.s - 25.0).abs() < 0.6);
        assert!((partition.spans[2].start.s - 75.0).abs() < 0.6);
    }

    #[test]
    fn spans_cover_the_whole_length() {
        let (centerline, cum, deck) = straight_centerline();
        let supports = vec![pillar_at(50.0, 0, &deck)];

        let partition = SpanPartition::build(&supports, &centerline, &cum).unwrap();

        assert!((partition.spans.first().unwrap().start.s).abs() < 1e-9);
        assert!(
            (partition.spans.last().unwrap().end.s - partition.total_length).abs() < 1e-9
        );

        // Interiors are disjoint and contiguous.
        for pair in partition.spans.windows(2) {
            assert_eq!(pair[0].end.s, pair[1].start.s);
        }
    }

    #[test]
    fn unsorted_supports_are_ordered_by_station() {
        let (centerline, cum, deck) = straight_centerline();
        let supports = vec![pillar_at(75.0, 0, &deck), pillar_at(25.0, 1, &deck)];

        let partition = SpanPartition::build(&supports, &centerline, &cum).unwrap();

        let stations: Vec<f64> = partition.stations.iter().map(|st| st.s).collect();
        for pair in stations.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }
}
