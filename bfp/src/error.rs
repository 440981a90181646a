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

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation error.
///
/// Input errors are raised before any derivation; geometry and coordinate
/// degeneracies are recovered locally where a safe fallback exists and
/// surfaced otherwise. Safety findings only become an error when the caller
/// resolves a validation report with the abort policy.
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// Missing or undersized input (trajectory < 2 points, cross-section < 3
    /// vertices, odd pillar point count, zone polygon < 3 vertices, ...).
    InputInvalid {
        entity: &'static str,
        reason: String,
    },

    /// A coordinate component is not finite.
    InvalidCoordinate {
        entity: &'static str,
        reason: String,
    },

    /// A point deviates too far from the local frame center.
    OutOfExtent { distance_m: f64, limit_m: f64 },

    /// Derived geometry degenerated (zero-length trajectory after dedup,
    /// collinear cross-section, ...).
    GeometryDegenerate {
        entity: &'static str,
        reason: String,
    },

    /// Validation found unsafe samples and the caller chose to abort.
    SafetyUnresolved { unsafe_samples: usize },

    /// The compilation was cancelled cooperatively.
    Cancelled,

    /// An invariant violation in derived data; indicates a bug.
    InternalInconsistency { stage: &'static str, reason: String },

    /// An I/O failure while persisting or loading project state.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputInvalid { entity, reason } => {
                write!(f, "invalid input for {entity}: {reason}")
            }
            Self::InvalidCoordinate { entity, reason } => {
                write!(f, "invalid coordinate in {entity}: {reason}")
            }
            Self::OutOfExtent {
                distance_m,
                limit_m,
            } => write!(
                f,
                "point is {distance_m:.0} m from the local frame center (limit {limit_m:.0} m)"
            ),
            Self::GeometryDegenerate { entity, reason } => {
                write!(f, "degenerate geometry in {entity}: {reason}")
            }
            Self::SafetyUnresolved { unsafe_samples } => {
                write!(f, "route has {unsafe_samples} unsafe samples left unresolved")
            }
            Self::Cancelled => write!(f, "compilation cancelled"),
            Self::InternalInconsistency { stage, reason } => {
                write!(f, "internal inconsistency in stage {stage}: {reason}")
            }
            Self::Io(reason) => write!(f, "I/O error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
