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

//! Geometry primitives: polyline resampling, moving frames, polygon and
//! prism tests.

mod frame;
mod polygon;
mod prism;
mod spline;

pub use frame::MovingFrame;
pub use polygon::{
    distance_to_boundary, is_simple, nearest_boundary_point, normalize_ccw, point_in_polygon,
    segment_intersects_polygon,
};
pub use prism::Prism;
pub use spline::{CubicSpline, ResampledPolyline};

/// 3-D point in a metric frame.
pub type Point3 = nalgebra::Point3<f64>;

/// 3-D vector in a metric frame.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Tolerance below which a vector is treated as degenerate.
pub const EPS: f64 = 1e-9;

/// Removes consecutive points closer than `eps`.
pub fn dedup_consecutive(points: &[Point3], eps: f64) -> Vec<Point3> {
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        match out.last() {
            Some(last) if (p - last).norm() < eps => continue,
            _ => out.push(*p),
        }
    }
    out
}

/// Cumulative arc length along a polyline; starts at 0 and has one entry per
/// point.
pub fn cumulative_arc_length(points: &[Point3]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len());
    let mut s = 0.0;
    cum.push(0.0);
    for pair in points.windows(2) {
        s += (pair[1] - pair[0]).norm();
        cum.push(s);
    }
    cum
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|pair| (pair[1] - pair[0]).norm()).sum()
}
