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

//! Command-line front end of the flight-plan compiler.
//!
//! Run with: `bfp compile <config.json> <inputs.json> --out <dir>`
//!
//! Exit codes: 0 success, 2 validation findings surfaced, 3 input error,
//! 4 cancelled, 1 unexpected failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use bfp::config::Config;
use bfp::crs::CrsSpec;
use bfp::export::mission_document;
use bfp::pipeline::{CompileOptions, CompileRequest};
use bfp::safety::{ResolvePolicy, SafetyZone};
use bfp::state::ProjectState;
use bfp::Error;

const EXIT_UNEXPECTED: u8 = 1;
const EXIT_VALIDATION: u8 = 2;
const EXIT_INPUT: u8 = 3;
const EXIT_CANCELLED: u8 = 4;

#[derive(Parser)]
#[command(name = "bfp", about = "Bridge flight-plan compiler", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compiles a flight plan and writes routes, diagnostics and missions.
    Compile {
        /// Compiler configuration (JSON).
        config: PathBuf,

        /// Geometry inputs: CRS, trajectory, supports, cross-section, zones.
        inputs: PathBuf,

        /// Output directory.
        #[arg(long)]
        out: PathBuf,

        /// Resolution for validation findings:
        /// abort | accept | clip | lift:<altitude>.
        #[arg(long)]
        resolve: Option<String>,
    },
}

/// The geometry half of a compile request, as stored in `inputs.json`.
#[derive(Deserialize)]
struct Inputs {
    crs: CrsSpec,
    trajectory_points: Vec<[f64; 3]>,
    #[serde(default)]
    trajectory_heights: Option<Vec<f64>>,
    #[serde(default)]
    pillar_pairs: Vec<[[f64; 2]; 2]>,
    #[serde(default)]
    abutments: Vec<[[f64; 2]; 2]>,
    cross_section_2d: Vec<[f64; 2]>,
    #[serde(default)]
    safety_zones: Vec<SafetyZone>,
    #[serde(default)]
    ground_altitude: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            config,
            inputs,
            out,
            resolve,
        } => ExitCode::from(run_compile(&config, &inputs, &out, resolve.as_deref())),
    }
}

fn run_compile(
    config_path: &Path,
    inputs_path: &Path,
    out_dir: &Path,
    resolve: Option<&str>,
) -> u8 {
    let config: Config = match read_json(config_path) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            return EXIT_INPUT;
        }
    };

    let inputs: Inputs = match read_json(inputs_path) {
        Ok(inputs) => inputs,
        Err(message) => {
            eprintln!("error: {message}");
            return EXIT_INPUT;
        }
    };

    let resolution = match resolve.map(parse_policy).transpose() {
        Ok(policy) => policy,
        Err(message) => {
            eprintln!("error: {message}");
            return EXIT_INPUT;
        }
    };

    let request = CompileRequest {
        crs: inputs.crs,
        trajectory_points: inputs.trajectory_points,
        trajectory_heights: inputs.trajectory_heights,
        pillar_pairs: inputs.pillar_pairs,
        abutments: inputs.abutments,
        cross_section_2d: inputs.cross_section_2d,
        safety_zones: inputs.safety_zones,
        ground_altitude: inputs.ground_altitude,
        config,
    };

    let options = CompileOptions {
        resolution,
        ..CompileOptions::default()
    };

    let response = match bfp::compile_with(&request, &options) {
        Ok(response) => response,
        Err(error) => {
            eprintln!("error: {error}");
            return exit_code_for(&error);
        }
    };

    if let Err(message) = write_outputs(&request, &response, out_dir) {
        eprintln!("error: {message}");
        return EXIT_UNEXPECTED;
    }

    eprintln!(
        "compiled {} routes (snapshot {})",
        response.routes.len(),
        response.snapshot_hash
    );

    if response.diagnostics.has_findings() {
        eprintln!(
            "validation surfaced {} unsafe samples; see diagnostics.json",
            response.diagnostics.unsafe_sample_count()
        );
        return EXIT_VALIDATION;
    }

    0
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn parse_policy(value: &str) -> Result<ResolvePolicy, String> {
    match value {
        "abort" => Ok(ResolvePolicy::Abort),
        "accept" => Ok(ResolvePolicy::Accept),
        "clip" => Ok(ResolvePolicy::ClipToBoundary),
        _ => match value.strip_prefix("lift:") {
            Some(altitude) => altitude
                .parse::<f64>()
                .map(ResolvePolicy::LiftTo)
                .map_err(|_| format!("invalid lift altitude in --resolve {value}")),
            None => Err(format!(
                "unknown --resolve policy {value}; use abort, accept, clip or lift:<altitude>"
            )),
        },
    }
}

fn write_outputs(
    request: &CompileRequest,
    response: &bfp::CompileResponse,
    out_dir: &Path,
) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let routes_path = out_dir.join("routes.json");
    let routes_json = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
    fs::write(&routes_path, routes_json).map_err(|e| format!("{}: {e}", routes_path.display()))?;

    let diagnostics_path = out_dir.join("diagnostics.json");
    let diagnostics_json =
        serde_json::to_string_pretty(&response.diagnostics).map_err(|e| e.to_string())?;
    fs::write(&diagnostics_path, diagnostics_json)
        .map_err(|e| format!("{}: {e}", diagnostics_path.display()))?;

    for route in &response.routes {
        let document = mission_document(route, &request.config.export, request.ground_altitude)
            .map_err(|e| e.to_string())?;
        let kmz_path = out_dir.join(format!("{}.kmz", route.id));
        wpml::write_kmz(&document, &kmz_path)
            .map_err(|e| format!("{}: {e}", kmz_path.display()))?;
    }

    let state_path = out_dir.join("project_state.json");
    ProjectState::capture(request.clone())
        .save(&state_path)
        .map_err(|e| e.to_string())?;

    Ok(())
}

fn exit_code_for(error: &Error) -> u8 {
    match error {
        Error::Cancelled => EXIT_CANCELLED,
        Error::SafetyUnresolved { .. } => EXIT_VALIDATION,
        Error::InputInvalid { .. }
        | Error::InvalidCoordinate { .. }
        | Error::OutOfExtent { .. }
        | Error::GeometryDegenerate { .. } => EXIT_INPUT,
        Error::InternalInconsistency { .. } | Error::Io(_) => EXIT_UNEXPECTED,
    }
}
