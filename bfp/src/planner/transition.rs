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

use crate::config::{TransitionConfig, TransitionMode};
use crate::geom::{Point3, Vector3, EPS};

/// Intermediate waypoints connecting `a` to `b` per the transition mode.
///
/// `outward` points horizontally past the obstacle between the two points
/// (the bridge end or a pillar); only its horizontal component is used.
/// The returned list excludes both endpoints and is empty for the diagonal
/// mode.
pub fn connect(a: Point3, b: Point3, outward: Vector3, config: &TransitionConfig) -> Vec<Point3> {
    match config.mode {
        TransitionMode::Diagonal => Vec::new(),

        TransitionMode::VThenH => {
            let lift = a.z.max(b.z) + config.vertical_offset;
            vec![
                Point3::new(a.x, a.y, lift),
                Point3::new(b.x, b.y, lift),
            ]
        }

        TransitionMode::HThenV => {
            let out = horizontal_unit(outward);
            let h = config.horizontal_offset;
            vec![
                Point3::new(a.x + out.x * h, a.y + out.y * h, a.z),
                Point3::new(b.x + out.x * h, b.y + out.y * h, b.z),
            ]
        }
    }
}

fn horizontal_unit(v: Vector3) -> Vector3 {
    let horizontal = Vector3::new(v.x, v.y, 0.0);
    if horizontal.norm() > EPS {
        horizontal.normalize()
    } else {
        Vector3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point3;

    fn config(mode: TransitionMode) -> TransitionConfig {
        TransitionConfig {
            mode,
            vertical_offset: 5.0,
            horizontal_offset: 4.0,
        }
    }

    #[test]
    fn diagonal_connects_directly() {
        let intermediates = connect(
            point3!(0.0, 0.0, 10.0),
            point3!(0.0, 20.0, 10.0),
            Vector3::x(),
            &config(TransitionMode::Diagonal),
        );
        assert!(intermediates.is_empty());
    }

    #[test]
    fn vertical_then_horizontal_lifts_first() {
        let intermediates = connect(
            point3!(0.0, 0.0, 10.0),
            point3!(0.0, 20.0, 12.0),
            Vector3::x(),
            &config(TransitionMode::VThenH),
        );

        assert_eq!(intermediates.len(), 2);
        // Lift above the higher endpoint.
        assert_eq!(intermediates[0], point3!(0.0, 0.0, 17.0));
        assert_eq!(intermediates[1], point3!(0.0, 20.0, 17.0));
    }

    #[test]
    fn horizontal_then_vertical_rounds_the_end() {
        let intermediates = connect(
            point3!(100.0, -10.0, 15.0),
            point3!(100.0, 10.0, 15.0),
            Vector3::x(),
            &config(TransitionMode::HThenV),
        );

        assert_eq!(intermediates.len(), 2);
        assert_eq!(intermediates[0], point3!(104.0, -10.0, 15.0));
        assert_eq!(intermediates[1], point3!(104.0, 10.0, 15.0));
    }
}
