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

use log::warn;

use super::{Vector3, EPS};
use crate::error::{Error, Result};

/// Frenet-like moving frame along a resampled trajectory.
///
/// For each sample the normal is N = normalize(T × ẑ), which keeps N in the
/// horizontal plane, and B = T × N closes the right-handed frame. Where the
/// tangent is (near) vertical the previous normal is inherited and
/// re-orthonormalized against the tangent; leading degenerate samples
/// inherit the first valid normal. This keeps the frame stable for the
/// near-horizontal trajectories of bridge decks.
#[derive(Clone, PartialEq, Debug)]
pub struct MovingFrame {
    tangents: Vec<Vector3>,
    normals: Vec<Vector3>,
    binormals: Vec<Vector3>,
}

impl MovingFrame {
    /// Builds the frame from unit tangents.
    pub fn from_tangents(tangents: &[Vector3]) -> Result<Self> {
        let mut normals = Vec::with_capacity(tangents.len());
        let mut last_valid: Option<Vector3> = None;
        let mut pending = 0usize;

        for t in tangents {
            let cross = t.cross(&Vector3::z());
            if cross.norm() > EPS {
                let n = cross.normalize();
                if pending > 0 {
                    warn!("inheriting normal for {pending} vertical leading samples");
                    for (slot, tangent) in normals.iter_mut().zip(tangents).take(pending) {
                        *slot = reorthonormalize(&n, tangent);
                    }
                    pending = 0;
                }
                normals.push(n);
                last_valid = Some(n);
            } else if let Some(prev) = last_valid {
                normals.push(reorthonormalize(&prev, t));
            } else {
                normals.push(Vector3::zeros());
                pending += 1;
            }
        }

        if last_valid.is_none() {
            return Err(Error::GeometryDegenerate {
                entity: "moving frame",
                reason: "tangent is vertical along the entire trajectory".to_string(),
            });
        }

        let binormals = tangents
            .iter()
            .zip(&normals)
            .map(|(t, n)| t.cross(n))
            .collect();

        Ok(Self {
            tangents: tangents.to_vec(),
            normals,
            binormals,
        })
    }

    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }

    pub fn tangents(&self) -> &[Vector3] {
        &self.tangents
    }

    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    pub fn binormals(&self) -> &[Vector3] {
        &self.binormals
    }
}

/// Projects an inherited normal into the plane orthogonal to the tangent.
fn reorthonormalize(normal: &Vector3, tangent: &Vector3) -> Vector3 {
    let projected = normal - tangent * normal.dot(tangent);
    if projected.norm() > EPS {
        projected.normalize()
    } else {
        *normal
    }
}
