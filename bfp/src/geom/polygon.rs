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

//! 2-D polygon tests on `geo` primitives.
//!
//! Containment is an even-odd ray cast with an optional boundary threshold:
//! a point within δ of any edge is treated as *outside*, so that waypoints
//! grazing a zone boundary are not flagged.

use geo::algorithm::orient::{Direction, Orient};
use geo::{Coord, Polygon};

/// Normalizes the winding so the exterior ring runs counter-clockwise.
pub fn normalize_ccw(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon.orient(Direction::Default)
}

/// Even-odd containment test with a boundary threshold.
///
/// With `boundary_threshold > 0`, points whose distance to the boundary is
/// within the threshold count as outside.
pub fn point_in_polygon(polygon: &Polygon<f64>, point: Coord<f64>, boundary_threshold: f64) -> bool {
    if boundary_threshold > 0.0 && distance_to_boundary(polygon, point) <= boundary_threshold {
        return false;
    }

    let ring = polygon.exterior();
    let coords = ring.0.as_slice();
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = effective_len(coords);

    for i in 0..n {
        let a = coords[i];
        let b = coords[(i + 1) % n];

        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }

    inside
}

/// Minimum distance from a point to the polygon's exterior boundary.
pub fn distance_to_boundary(polygon: &Polygon<f64>, point: Coord<f64>) -> f64 {
    let coords = polygon.exterior().0.as_slice();
    let n = effective_len(coords);

    let mut min = f64::INFINITY;
    for i in 0..n {
        let d = point_segment_distance(point, coords[i], coords[(i + 1) % n]);
        if d < min {
            min = d;
        }
    }
    min
}

/// The closest point on the polygon's exterior boundary.
pub fn nearest_boundary_point(polygon: &Polygon<f64>, point: Coord<f64>) -> Coord<f64> {
    let coords = polygon.exterior().0.as_slice();
    let n = effective_len(coords);

    let mut best = coords[0];
    let mut min = f64::INFINITY;
    for i in 0..n {
        let candidate = project_on_segment(point, coords[i], coords[(i + 1) % n]);
        let d = ((candidate.x - point.x).powi(2) + (candidate.y - point.y).powi(2)).sqrt();
        if d < min {
            min = d;
            best = candidate;
        }
    }
    best
}

/// Whether the segment a–b touches the polygon: an endpoint inside or a
/// proper crossing with any boundary edge.
pub fn segment_intersects_polygon(
    polygon: &Polygon<f64>,
    a: Coord<f64>,
    b: Coord<f64>,
) -> bool {
    if point_in_polygon(polygon, a, 0.0) || point_in_polygon(polygon, b, 0.0) {
        return true;
    }

    let coords = polygon.exterior().0.as_slice();
    let n = effective_len(coords);
    for i in 0..n {
        if segments_intersect(a, b, coords[i], coords[(i + 1) % n]) {
            return true;
        }
    }
    false
}

/// Whether the exterior ring is simple (no two non-adjacent edges intersect).
pub fn is_simple(polygon: &Polygon<f64>) -> bool {
    let coords = polygon.exterior().0.as_slice();
    let n = effective_len(coords);
    if n < 3 {
        return false;
    }

    for i in 0..n {
        for j in i + 1..n {
            // Adjacent edges share an endpoint by construction.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            if segments_intersect(
                coords[i],
                coords[(i + 1) % n],
                coords[j],
                coords[(j + 1) % n],
            ) {
                return false;
            }
        }
    }

    true
}

/// Ring length ignoring the closing duplicate that `geo` stores.
fn effective_len(coords: &[Coord<f64>]) -> usize {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => coords.len() - 1,
        _ => coords.len(),
    }
}

fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let q = project_on_segment(p, a, b);
    ((q.x - p.x).powi(2) + (q.y - p.y).powi(2)).sqrt()
}

fn project_on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    let ab = Coord {
        x: b.x - a.x,
        y: b.y - a.y,
    };
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 == 0.0 {
        return a;
    }

    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
    Coord {
        x: a.x + t * ab.x,
        y: a.y + t * ab.y,
    }
}

fn segments_intersect(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>) -> bool {
    let orient = |p: Coord<f64>, q: Coord<f64>, r: Coord<f64>| {
        (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
    };

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    (o1 * o2 < 0.0) && (o3 * o4 < 0.0)
}
