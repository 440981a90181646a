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

//! Project state persistence.
//!
//! A single JSON document holds the inputs, configuration and CRS choice of
//! a project together with the snapshot hash of the captured request; the
//! core needs no other persistence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::CompileRequest;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProjectState {
    pub request: CompileRequest,
    pub snapshot_hash: String,
}

impl ProjectState {
    /// Captures a request together with its snapshot hash.
    pub fn capture(request: CompileRequest) -> Self {
        let snapshot_hash = request.snapshot_hash();
        Self {
            request,
            snapshot_hash,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Io(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let state: ProjectState =
            serde_json::from_str(&json).map_err(|e| Error::InputInvalid {
                entity: "project_state",
                reason: e.to_string(),
            })?;

        // A stale hash means the persisted inputs were edited by hand.
        if state.request.snapshot_hash() != state.snapshot_hash {
            return Err(Error::InputInvalid {
                entity: "project_state",
                reason: "snapshot hash does not match the persisted inputs".to_string(),
            });
        }

        Ok(state)
    }
}
