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

/// Creates a [`geo::Polygon<f64>`] from `(x, y)` vertices in a metric frame.
///
/// ```
/// use bfp::polygon;
///
/// let footprint = polygon![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)];
/// ```
#[macro_export]
macro_rules! polygon {
    ( $( ($x:expr, $y:expr) ),* $(,)? ) => {{
        geo::Polygon::new(
            geo::LineString::from(vec![ $( geo::Coord { x: $x, y: $y }, )* ]),
            vec![]
        )
    }};
}

/// Creates a [`Point3`] from x, y and z.
///
/// ```
/// use bfp::point3;
///
/// let p = point3!(0.0, 0.0, 10.0);
/// ```
///
/// [`Point3`]: crate::geom::Point3
#[macro_export]
macro_rules! point3 {
    ($x:expr, $y:expr, $z:expr) => {
        $crate::geom::Point3::new($x, $y, $z)
    };
}
