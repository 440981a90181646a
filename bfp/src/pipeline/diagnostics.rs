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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::post::ClampEvent;
use crate::safety::ValidationReport;

/// One structured record per pipeline stage.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub duration_ms: u64,
    /// Set when the stage finished after its soft deadline.
    pub deadline_exceeded: bool,
    /// Stage-specific counters, keyed deterministically.
    pub counts: BTreeMap<String, u64>,
}

/// Validation outcome of a single route.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RouteValidation {
    pub route_id: String,
    pub report: ValidationReport,
}

/// The concatenated diagnostics of a compilation.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub stages: Vec<StageRecord>,
    pub validation: Vec<RouteValidation>,
    /// Waypoints adjusted by a resolution policy, if one was applied.
    pub resolution_adjustments: Option<usize>,
    pub clamp_events: Vec<ClampEvent>,
    pub resolved_config: Config,
    pub snapshot_hash: String,
}

impl Diagnostics {
    /// Total unsafe samples across all routes.
    pub fn unsafe_sample_count(&self) -> usize {
        self.validation
            .iter()
            .map(|v| v.report.unsafe_sample_count())
            .sum()
    }

    /// Whether validation surfaced any findings.
    pub fn has_findings(&self) -> bool {
        self.unsafe_sample_count() > 0
    }
}
