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

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::document::MissionDocument;
use crate::error::Error;
use crate::writer::TEMPLATE_PATH;

/// Parses a template document from its XML representation.
pub fn from_xml(xml: &str) -> Result<MissionDocument, Error> {
    Ok(quick_xml::de::from_str(xml)?)
}

/// Reads a KMZ container from `path` and parses its template document.
///
/// Looks for `wpmz/template.kml` first and falls back to the first `.kml`
/// entry, since some ground-station exports place the template at the
/// container root.
pub fn read_kmz<P: AsRef<Path>>(path: P) -> Result<MissionDocument, Error> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let name = if archive.by_name(TEMPLATE_PATH).is_ok() {
        TEMPLATE_PATH.to_string()
    } else {
        archive
            .file_names()
            .find(|name| name.ends_with(".kml"))
            .map(str::to_string)
            .ok_or_else(|| Error::Container("no template document in container".to_string()))?
    };

    let mut xml = String::new();
    archive.by_name(&name)?.read_to_string(&mut xml)?;

    from_xml(&xml)
}
