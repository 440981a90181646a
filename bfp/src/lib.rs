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

//! Bridge flight-plan compiler.
//!
//! An offline compiler from a parametric bridge description — centerline
//! trajectory, pillar pairs, abutments and a 2-D cross-section — plus
//! flight-planning parameters to ordered, georeferenced waypoint routes:
//! one closed photogrammetric overview tour around the structure and
//! per-span inspection routes threading the spaces below the deck.
//!
//! The compiler is a pure function from a [`CompileRequest`] snapshot to a
//! [`CompileResponse`]: no global state, no randomness, no wall clock in
//! anything that is hashed. Identical requests produce an identical
//! snapshot hash and byte-identical routes.
//!
//! ```no_run
//! use bfp::prelude::*;
//!
//! # fn run(request: CompileRequest) -> Result<()> {
//! let response = bfp::compile(&request)?;
//! for route in &response.routes {
//!     println!("{}: {} waypoints", route.id, route.waypoints.len());
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bridge;
pub mod config;
pub mod crs;
pub mod error;
pub mod export;
pub mod geom;
#[cfg(feature = "geojson")]
mod geojson;
mod macros;
pub mod pipeline;
pub mod planner;
pub mod post;
pub mod route;
pub mod safety;
pub mod state;

pub use error::{Error, Result};
pub use pipeline::{compile, compile_with, CompileOptions, CompileRequest, CompileResponse};

/// The commonly used types in one import.
pub mod prelude {
    pub use crate::config::{Config, HeightMode, TransitionMode};
    pub use crate::crs::{CrsSpec, LocalFrame, ProjectCrs};
    pub use crate::error::{Error, Result};
    pub use crate::export::{ExportedRoute, ExportedWaypoint};
    pub use crate::pipeline::{
        CancelToken, CompileOptions, CompileRequest, CompileResponse, ProgressCounter,
    };
    pub use crate::route::{Route, RouteClass, TurnMode, Waypoint, WaypointTag};
    pub use crate::safety::{ResolvePolicy, SafetyZone, ValidationReport};
}
