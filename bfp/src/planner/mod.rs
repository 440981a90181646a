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

//! Route planners.
//!
//! Both planners are pure functions of the bridge model and the
//! configuration: identical inputs produce identical waypoint lists.

mod overview;
mod spacing;
mod transition;
mod underdeck;

pub use overview::{plan_overview, simplify};
pub use spacing::{
    sensor_footprint, stations, viewpoint_spacing, CAMERA_FOV_DEG, MIN_SPACING,
    SPACING_FORMULA_VERSION,
};
pub use transition::connect;
pub use underdeck::plan_underdeck;
