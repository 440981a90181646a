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

//! Pipeline orchestrator.
//!
//! The compilation runs in a fixed stage order where every stage reads only
//! the outputs of earlier stages. Stage five runs the overview and
//! under-deck planners as independent parallel tasks on disjoint data. Each
//! stage appends a structured record to the diagnostics; a planner failure
//! aborts the compilation while validation findings are surfaced for
//! resolution.

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeModel, CrossSection2d, DEFAULT_LATERAL_INFLATION};
use crate::crs::{LocalFrame, ProjectCrs};
use crate::error::{Error, Result};
use crate::export::{export_route, ExportedRoute};
use crate::geom::Point3;
use crate::planner::{plan_overview, plan_underdeck};
use crate::post;
use crate::route::Route;
use crate::safety::{ResolvePolicy, SafetyEngine, SafetyZone};

mod cancel;
mod diagnostics;
mod snapshot;

pub use cancel::{CancelToken, ProgressCounter};
pub use diagnostics::{Diagnostics, RouteValidation, StageRecord};
pub use snapshot::CompileRequest;

/// Knobs of a single compilation run.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    pub cancel: CancelToken,
    pub progress: ProgressCounter,

    /// Resolution applied when validation surfaces findings. Without a
    /// policy the findings stay in the diagnostics for the caller.
    pub resolution: Option<ResolvePolicy>,

    /// Soft per-stage deadline; stages finishing later are flagged in
    /// their diagnostics record but still complete.
    pub stage_soft_deadline_ms: Option<u64>,
}

/// The typed output surface of a compilation.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CompileResponse {
    pub routes: Vec<ExportedRoute>,
    pub diagnostics: Diagnostics,
    pub snapshot_hash: String,
}

/// Compiles a request with default options.
pub fn compile(request: &CompileRequest) -> Result<CompileResponse> {
    compile_with(request, &CompileOptions::default())
}

/// Compiles a request.
pub fn compile_with(
    request: &CompileRequest,
    options: &CompileOptions,
) -> Result<CompileResponse> {
    let mut compilation = Compilation::new(request, options);

    for stage in STAGES {
        options.cancel.check()?;

        let started = Instant::now();
        let counts = stage.eval(&mut compilation)?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let deadline_exceeded = options
            .stage_soft_deadline_ms
            .is_some_and(|deadline| duration_ms > deadline);
        if deadline_exceeded {
            debug!("stage {} exceeded its soft deadline ({duration_ms} ms)", stage.name());
        }

        compilation.diagnostics.stages.push(StageRecord {
            stage: stage.name().to_string(),
            duration_ms,
            deadline_exceeded,
            counts,
        });
        options.progress.increment();
    }

    compilation.into_response()
}

const STAGES: [Stage; 7] = [
    Stage::Snapshot,
    Stage::Frames,
    Stage::Model,
    Stage::Planners,
    Stage::Validation,
    Stage::Post,
    Stage::Export,
];

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Stage {
    Snapshot,
    Frames,
    Model,
    Planners,
    Validation,
    Post,
    Export,
}

type StageCounts = BTreeMap<String, u64>;

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Frames => "frames",
            Self::Model => "model",
            Self::Planners => "planners",
            Self::Validation => "validation",
            Self::Post => "post",
            Self::Export => "export",
        }
    }

    fn eval(&self, c: &mut Compilation) -> Result<StageCounts> {
        match self {
            Self::Snapshot => c.snapshot(),
            Self::Frames => c.build_frames(),
            Self::Model => c.build_model(),
            Self::Planners => c.run_planners(),
            Self::Validation => c.validate(),
            Self::Post => c.post_process(),
            Self::Export => c.export(),
        }
    }
}

/// State threaded through the stages; exclusively owned by one compilation.
struct Compilation<'a> {
    request: &'a CompileRequest,
    options: &'a CompileOptions,

    frame: Option<LocalFrame>,
    local_trajectory: Vec<Point3>,
    local_pillars: Vec<[[f64; 2]; 2]>,
    local_abutments: Vec<[[f64; 2]; 2]>,
    local_zones: Vec<SafetyZone>,

    model: Option<BridgeModel>,
    routes: Vec<Route>,
    exported: Vec<ExportedRoute>,

    diagnostics: Diagnostics,
}

impl<'a> Compilation<'a> {
    fn new(request: &'a CompileRequest, options: &'a CompileOptions) -> Self {
        Self {
            request,
            options,
            frame: None,
            local_trajectory: Vec::new(),
            local_pillars: Vec::new(),
            local_abutments: Vec::new(),
            local_zones: Vec::new(),
            model: None,
            routes: Vec::new(),
            exported: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    fn snapshot(&mut self) -> Result<StageCounts> {
        self.request.validate()?;

        let hash = self.request.snapshot_hash();
        info!("compiling snapshot {hash}");
        self.diagnostics.snapshot_hash = hash;
        self.diagnostics.resolved_config = self.request.config.clone();

        Ok(StageCounts::from([
            (
                "trajectory_points".to_string(),
                self.request.trajectory_points.len() as u64,
            ),
            (
                "pillar_pairs".to_string(),
                self.request.pillar_pairs.len() as u64,
            ),
            ("abutments".to_string(), self.request.abutments.len() as u64),
            (
                "safety_zones".to_string(),
                self.request.safety_zones.len() as u64,
            ),
        ]))
    }

    /// Resolves the CRS, centers the local frame on the trajectory centroid
    /// and converts every input into local-metric coordinates.
    fn build_frames(&mut self) -> Result<StageCounts> {
        let crs = ProjectCrs::resolve(&self.request.crs)?;

        let mut wgs84_points = Vec::with_capacity(self.request.trajectory_points.len());
        let (mut lat_sum, mut lon_sum) = (0.0, 0.0);
        for p in &self.request.trajectory_points {
            let (lon, lat, alt) = crs.to_wgs84(p[0], p[1], p[2])?;
            lat_sum += lat;
            lon_sum += lon;
            wgs84_points.push((lat, lon, alt));
        }

        let n = wgs84_points.len() as f64;
        let frame = LocalFrame::new(lat_sum / n, lon_sum / n)?;
        debug!("local frame centered on {:?}", frame.center());

        self.local_trajectory = wgs84_points
            .iter()
            .map(|&(lat, lon, alt)| frame.to_local(lat, lon, alt))
            .collect::<Result<Vec<_>>>()?;

        let ground = self.request.ground_altitude;
        let to_local_pair = |pair: &[[f64; 2]; 2]| -> Result<[[f64; 2]; 2]> {
            let mut out = [[0.0; 2]; 2];
            for (slot, p) in out.iter_mut().zip(pair) {
                let (lon, lat, _) = crs.to_wgs84(p[0], p[1], ground)?;
                let local = frame.to_local(lat, lon, ground)?;
                *slot = [local.x, local.y];
            }
            Ok(out)
        };

        self.local_pillars = self
            .request
            .pillar_pairs
            .iter()
            .map(to_local_pair)
            .collect::<Result<Vec<_>>>()?;
        self.local_abutments = self
            .request
            .abutments
            .iter()
            .map(to_local_pair)
            .collect::<Result<Vec<_>>>()?;

        self.local_zones = self
            .request
            .safety_zones
            .iter()
            .map(|zone| -> Result<SafetyZone> {
                let polygon = zone
                    .polygon
                    .iter()
                    .map(|p| -> Result<[f64; 2]> {
                        let (lon, lat, _) = crs.to_wgs84(p[0], p[1], ground)?;
                        let local = frame.to_local(lat, lon, ground)?;
                        Ok([local.x, local.y])
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SafetyZone::new(polygon, zone.z_min, zone.z_max))
            })
            .collect::<Result<Vec<_>>>()?;

        self.frame = Some(frame);

        Ok(StageCounts::from([(
            "local_points".to_string(),
            self.local_trajectory.len() as u64,
        )]))
    }

    fn build_model(&mut self) -> Result<StageCounts> {
        let cross_section = CrossSection2d::new(self.request.cross_section_2d.clone())?;

        let model = BridgeModel::assemble(
            &self.local_trajectory,
            self.request.trajectory_heights.as_deref(),
            cross_section,
            &self.local_pillars,
            &self.local_abutments,
            self.request.ground_altitude,
            DEFAULT_LATERAL_INFLATION,
        )?;

        let counts = StageCounts::from([
            ("deck_vertices".to_string(), model.deck.vertices().len() as u64),
            ("deck_faces".to_string(), model.deck.faces().len() as u64),
            ("supports".to_string(), model.supports.len() as u64),
            ("spans".to_string(), model.spans.spans.len() as u64),
        ]);

        self.model = Some(model);
        Ok(counts)
    }

    /// Stage five: the overview and under-deck planners run as independent
    /// parallel tasks; per-span routes fan out on the worker pool below.
    fn run_planners(&mut self) -> Result<StageCounts> {
        let model = self.model()?;
        let config = &self.request.config;
        let cancel = &self.options.cancel;

        let (overview, underdeck) = rayon::join(
            || plan_overview(model, config),
            || plan_underdeck(model, config, cancel),
        );

        let mut routes = vec![overview?];
        routes.extend(underdeck?);
        routes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let waypoints: usize = routes.iter().map(Route::len).sum();
        self.routes = routes;

        Ok(StageCounts::from([
            ("routes".to_string(), self.routes.len() as u64),
            ("waypoints".to_string(), waypoints as u64),
        ]))
    }

    fn validate(&mut self) -> Result<StageCounts> {
        let engine = SafetyEngine::new(&self.local_zones, &self.request.config.safety)?;

        let mut reports: Vec<_> = self
            .routes
            .iter()
            .map(|route| engine.validate_route(route))
            .collect();

        if let Some(policy) = self.options.resolution {
            let adjusted = engine.resolve(&mut self.routes, &reports, policy)?;
            if adjusted > 0 {
                // The adjusted routes get a fresh validation pass.
                reports = self
                    .routes
                    .iter()
                    .map(|route| engine.validate_route(route))
                    .collect();
            }
            self.diagnostics.resolution_adjustments = Some(adjusted);
        }

        self.diagnostics.validation = self
            .routes
            .iter()
            .zip(&reports)
            .map(|(route, report)| RouteValidation {
                route_id: route.id.clone(),
                report: report.clone(),
            })
            .collect();

        let unsafe_samples = self.diagnostics.unsafe_sample_count();

        Ok(StageCounts::from([
            ("zones".to_string(), self.local_zones.len() as u64),
            ("unsafe_samples".to_string(), unsafe_samples as u64),
        ]))
    }

    fn post_process(&mut self) -> Result<StageCounts> {
        let config = &self.request.config.post;

        let mut clamp_events = Vec::new();
        for route in &mut self.routes {
            clamp_events.extend(post::process(route, config));
        }

        let waypoints: usize = self.routes.iter().map(Route::len).sum();
        let clamped = clamp_events.len();
        self.diagnostics.clamp_events = clamp_events;

        Ok(StageCounts::from([
            ("waypoints".to_string(), waypoints as u64),
            ("altitude_lifts".to_string(), clamped as u64),
        ]))
    }

    fn export(&mut self) -> Result<StageCounts> {
        let frame = self.frame.as_ref().ok_or(Error::InternalInconsistency {
            stage: "export",
            reason: "local frame missing".to_string(),
        })?;

        self.exported = self
            .routes
            .iter()
            .map(|route| {
                export_route(
                    route,
                    frame,
                    &self.request.config.export,
                    self.request.ground_altitude,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StageCounts::from([(
            "routes".to_string(),
            self.exported.len() as u64,
        )]))
    }

    fn model(&self) -> Result<&BridgeModel> {
        self.model.as_ref().ok_or(Error::InternalInconsistency {
            stage: "planners",
            reason: "bridge model missing".to_string(),
        })
    }

    fn into_response(self) -> Result<CompileResponse> {
        let snapshot_hash = self.diagnostics.snapshot_hash.clone();
        Ok(CompileResponse {
            routes: self.exported,
            diagnostics: self.diagnostics,
            snapshot_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CrsSpec;
    use crate::config::Config;

    fn straight_request() -> CompileRequest {
        CompileRequest {
            crs: CrsSpec::Epsg(4326),
            // Roughly 100 m of bridge near Brussels; x is longitude here.
            trajectory_points: vec![[4.35, 50.85, 30.0], [4.35142, 50.85, 30.0]],
            trajectory_heights: None,
            pillar_pairs: vec![],
            abutments: vec![],
            cross_section_2d: vec![[-5.0, 0.0], [5.0, 0.0], [5.0, 2.0], [-5.0, 2.0]],
            safety_zones: vec![],
            ground_altitude: 0.0,
            config: Config::default(),
        }
    }

    #[test]
    fn compile_produces_sorted_routes() {
        let response = compile(&straight_request()).unwrap();

        assert!(!response.routes.is_empty());
        let keys: Vec<_> = response
            .routes
            .iter()
            .map(|r| (r.class, r.span_index.unwrap_or(0)))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn every_stage_reports() {
        let response = compile(&straight_request()).unwrap();

        let names: Vec<&str> = response
            .diagnostics
            .stages
            .iter()
            .map(|s| s.stage.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["snapshot", "frames", "model", "planners", "validation", "post", "export"]
        );
    }

    #[test]
    fn cancelled_before_start_yields_cancelled() {
        let options = CompileOptions::default();
        options.cancel.cancel();

        assert!(matches!(
            compile_with(&straight_request(), &options),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn compilation_is_deterministic() {
        let request = straight_request();

        let a = compile(&request).unwrap();
        let b = compile(&request).unwrap();

        assert_eq!(a.snapshot_hash, b.snapshot_hash);
        assert_eq!(a.routes, b.routes);
    }

    #[test]
    fn progress_counter_advances_per_stage() {
        let options = CompileOptions::default();
        compile_with(&straight_request(), &options).unwrap();

        assert_eq!(options.progress.get(), STAGES.len() as u64);
    }
}
