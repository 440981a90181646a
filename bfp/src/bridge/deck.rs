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
use rstar::primitives::GeomWithData;
use rstar::RTree;

use super::CrossSection2d;
use crate::error::{Error, Result};
use crate::geom::{MovingFrame, Point3, Vector3};

/// The deck surface: the cross-section swept along the trajectory's moving
/// frame.
///
/// Vertices are grouped in rings, one ring per centerline sample. Faces are
/// quads between consecutive rings; the cross-section wraps within a ring
/// but the tube stays open along the trajectory.
#[derive(Clone, Debug)]
pub struct DeckSurface {
    vertices: Vec<Point3>,
    faces: Vec<[usize; 4]>,
    ring_count: usize,
    ring_size: usize,
    index: RTree<GeomWithData<[f64; 2], usize>>,
}

impl DeckSurface {
    /// Extrudes the cross-section along the centerline.
    ///
    /// Each ring vertex is P + across·N + up·ẑ, so the section stays level
    /// even where the trajectory climbs.
    pub fn extrude(
        centerline: &[Point3],
        frame: &MovingFrame,
        section: &CrossSection2d,
    ) -> Result<Self> {
        let ring_count = centerline.len();
        let ring_size = section.len();

        let mut vertices = Vec::with_capacity(ring_count * ring_size);
        for (point, normal) in centerline.iter().zip(frame.normals()) {
            for vertex in section.points() {
                let [across, up] = *vertex;
                vertices.push(point + normal * across + Vector3::z() * up);
            }
        }

        let mut faces = Vec::with_capacity(ring_count.saturating_sub(1) * ring_size);
        for i in 0..ring_count.saturating_sub(1) {
            for j in 0..ring_size {
                let next_j = (j + 1) % ring_size;
                faces.push([
                    i * ring_size + j,
                    i * ring_size + next_j,
                    (i + 1) * ring_size + next_j,
                    (i + 1) * ring_size + j,
                ]);
            }
        }

        if faces.len() != ring_count.saturating_sub(1) * ring_size {
            return Err(Error::InternalInconsistency {
                stage: "deck extrusion",
                reason: format!(
                    "face count {} does not match rings {ring_count} × section {ring_size}",
                    faces.len()
                ),
            });
        }

        let index = RTree::bulk_load(
            vertices
                .iter()
                .enumerate()
                .map(|(i, v)| GeomWithData::new([v.x, v.y], i))
                .collect(),
        );

        debug!(
            "deck surface extruded: {} vertices, {} faces ({} rings × {} section vertices)",
            vertices.len(),
            faces.len(),
            ring_count,
            ring_size
        );

        Ok(Self {
            vertices,
            faces,
            ring_count,
            ring_size,
            index,
        })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 4]] {
        &self.faces
    }

    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    /// Altitude of the deck vertex nearest in xy to the query point, if one
    /// lies within `search_radius`.
    pub fn altitude_near(&self, x: f64, y: f64, search_radius: f64) -> Option<f64> {
        let nearest = self.index.nearest_neighbor(&[x, y])?;
        let [vx, vy] = *nearest.geom();
        if (vx - x).hypot(vy - y) <= search_radius {
            Some(self.vertices[nearest.data].z)
        } else {
            None
        }
    }

    /// The horizontal extent of the surface as `(min_x, min_y, max_x, max_y)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for v in &self.vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }

        (min_x, min_y, max_x, max_y)
    }
}
