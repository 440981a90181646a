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
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::document::MissionDocument;
use crate::error::Error;

/// Path of the template document within the KMZ container.
pub const TEMPLATE_PATH: &str = "wpmz/template.kml";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serializes the document to the template XML, including the declaration.
pub fn to_xml(doc: &MissionDocument) -> Result<String, Error> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some("kml"))?;
    serializer.indent(' ', 2);
    doc.serialize(serializer)?;

    let mut xml = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    xml.push_str(XML_DECLARATION);
    xml.push_str(&body);
    xml.push('\n');
    Ok(xml)
}

/// Writes the document as a KMZ container to `path`.
///
/// The container holds a single deflated entry `wpmz/template.kml`. An
/// existing file at `path` is replaced.
pub fn write_kmz<P: AsRef<Path>>(doc: &MissionDocument, path: P) -> Result<(), Error> {
    let xml = to_xml(doc)?;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(TEMPLATE_PATH, options)?;
    zip.write_all(xml.as_bytes())?;
    zip.finish()?;

    Ok(())
}
