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

//! Reader and writer for the DJI WPML waypoint mission container.
//!
//! A WPML mission is a KMZ (zip) container holding a single
//! `wpmz/template.kml` XML document: a mission configuration followed by one
//! folder of waypoint placemarks. This crate models the document with serde
//! types that mirror the XML nesting and serializes them with `quick-xml`, so
//! a mission written here re-reads byte-for-byte into the same value.
//!
//! The crate is deliberately free of any planning logic: it maps between
//! [`MissionDocument`] values and the wire format, nothing more.

mod document;
mod error;
mod reader;
mod writer;

pub use document::{
    CoordinateSysParam, Document, DroneInfo, Folder, GlobalWaypointHeadingParam, MissionConfig,
    MissionDocument, PayloadInfo, PayloadParam, Placemark, Point, TurnMode, KML_NS, WPML_NS,
};
pub use error::Error;
pub use reader::{from_xml, read_kmz};
pub use writer::{to_xml, write_kmz, TEMPLATE_PATH};
