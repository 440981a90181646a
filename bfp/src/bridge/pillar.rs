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
use log::warn;

use super::DeckSurface;
use crate::error::{Error, Result};
use crate::geom::Prism;

/// Default lateral inflation of the pillar footprint, in meters.
pub const DEFAULT_LATERAL_INFLATION: f64 = 0.5;

/// Minimum pillar height above ground.
pub const MIN_HEIGHT: f64 = 5.0;

/// Search radius for the deck vertex that sets the pillar top.
pub const HEIGHT_SEARCH_RADIUS: f64 = 20.0;

/// What a ground support is: a pillar stands in a span gap, an abutment
/// closes a span end and is never traversed under.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SupportKind {
    Pillar,
    Abutment,
}

/// A vertical support prism between ground and deck.
#[derive(Clone, Debug)]
pub struct PillarPrism {
    pub kind: SupportKind,
    /// Index within the supports of the same kind.
    pub index: usize,
    /// Ground-plane midpoint of the pair; z is the ground reference.
    pub center: [f64; 2],
    pub prism: Prism,
}

impl PillarPrism {
    /// Builds the prism for a ground pair.
    ///
    /// The footprint is the segment P1–P2 inflated laterally by `inflation`
    /// perpendicular to P2−P1. The top sits at the altitude of the deck
    /// vertex nearest to the pair midpoint; without a deck vertex in range
    /// the pillar falls back to the minimum height above ground.
    pub fn from_pair(
        kind: SupportKind,
        index: usize,
        p1: [f64; 2],
        p2: [f64; 2],
        ground_z: f64,
        inflation: f64,
        deck: &DeckSurface,
    ) -> Result<Self> {
        let dx = p2[0] - p1[0];
        let dy = p2[1] - p1[1];
        let len = dx.hypot(dy);
        if len < 1e-9 {
            return Err(Error::GeometryDegenerate {
                entity: "pillar pair",
                reason: format!("pair {index} has identical base points"),
            });
        }

        let perp = [-dy / len * inflation, dx / len * inflation];
        let center = [(p1[0] + p2[0]) / 2.0, (p1[1] + p2[1]) / 2.0];

        let top_z = match deck.altitude_near(center[0], center[1], HEIGHT_SEARCH_RADIUS) {
            Some(z) => z.max(ground_z + MIN_HEIGHT),
            None => {
                warn!(
                    "no deck vertex within {HEIGHT_SEARCH_RADIUS} m of support {index}; \
                     using minimum height"
                );
                ground_z + MIN_HEIGHT
            }
        };

        let footprint = geo::Polygon::new(
            geo::LineString::from(vec![
                Coord {
                    x: p1[0] + perp[0],
                    y: p1[1] + perp[1],
                },
                Coord {
                    x: p1[0] - perp[0],
                    y: p1[1] - perp[1],
                },
                Coord {
                    x: p2[0] - perp[0],
                    y: p2[1] - perp[1],
                },
                Coord {
                    x: p2[0] + perp[0],
                    y: p2[1] + perp[1],
                },
            ]),
            vec![],
        );

        Ok(Self {
            kind,
            index,
            center,
            prism: Prism::new(footprint, ground_z, top_z),
        })
    }

    /// Height of the support above ground.
    pub fn height(&self) -> f64 {
        self.prism.z_max - self.prism.z_min
    }

    /// Altitude of the support top.
    pub fn top_z(&self) -> f64 {
        self.prism.z_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::CrossSection2d;
    use crate::geom::{CubicSpline, MovingFrame, Point3};
    use crate::point3;

    fn straight_deck() -> DeckSurface {
        let spline = CubicSpline::natural(&[point3!(0.0, 0.0, 30.0), point3!(100.0, 0.0, 30.0)])
            .unwrap();
        let resampled = spline.resample(60).unwrap();
        let frame = MovingFrame::from_tangents(&resampled.tangents).unwrap();
        let section =
            CrossSection2d::new(vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]]).unwrap();
        DeckSurface::extrude(&resampled.points, &frame, &section).unwrap()
    }

    #[test]
    fn top_is_set_by_the_deck() {
        let deck = straight_deck();
        let pillar = PillarPrism::from_pair(
            SupportKind::Pillar,
            0,
            [25.0, -2.0],
            [25.0, 2.0],
            0.0,
            DEFAULT_LATERAL_INFLATION,
            &deck,
        )
        .unwrap();

        // Deck altitudes run 30..32; the pillar top must be in that band.
        assert!((30.0..=32.0).contains(&pillar.top_z()));
        assert!(pillar.height() >= MIN_HEIGHT);
    }

    #[test]
    fn faraway_pair_falls_back_to_minimum_height() {
        let deck = straight_deck();
        let pillar = PillarPrism::from_pair(
            SupportKind::Pillar,
            0,
            [25.0, 500.0],
            [25.0, 504.0],
            0.0,
            DEFAULT_LATERAL_INFLATION,
            &deck,
        )
        .unwrap();

        assert_eq!(pillar.top_z(), MIN_HEIGHT);
    }

    #[test]
    fn footprint_contains_the_pair_midpoint() {
        let deck = straight_deck();
        let pillar = PillarPrism::from_pair(
            SupportKind::Pillar,
            0,
            [25.0, -2.0],
            [25.0, 2.0],
            0.0,
            DEFAULT_LATERAL_INFLATION,
            &deck,
        )
        .unwrap();

        assert!(pillar.prism.contains(&Point3::new(25.0, 0.0, 10.0), 0.0));
        assert!(!pillar.prism.contains(&Point3::new(27.0, 0.0, 10.0), 0.0));
    }

    #[test]
    fn identical_base_points_are_degenerate() {
        let deck = straight_deck();
        assert!(matches!(
            PillarPrism::from_pair(
                SupportKind::Pillar,
                0,
                [25.0, 0.0],
                [25.0, 0.0],
                0.0,
                DEFAULT_LATERAL_INFLATION,
                &deck,
            ),
            Err(Error::GeometryDegenerate { .. })
        ));
    }
}
