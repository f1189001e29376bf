use crate::cli::BoundaryRefresh;
use crate::domain::models::{
    ArtifactKind, Outcome, PipelineConfig, PipelineReport, Stage, Step, StepReport,
};
use crate::error::{PipelineError, PipelineResult};
use crate::services::clipper::Clipper;
use crate::services::fetcher::Fetcher;
use crate::services::geofilter::{clip_region, ClipPaths};
use crate::services::storage::{load_manifest, rehash_artifact, save_manifest};
use crate::services::transport::{polygon_url, Transport};
use crate::services::workspace;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Full,
    FetchOnly,
    ClipOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub scope: Scope,
    pub force: bool,
    pub boundary_refresh: BoundaryRefresh,
}

pub struct Pipeline<'a> {
    cfg: &'a PipelineConfig,
    transport: &'a dyn Transport,
    clipper: &'a dyn Clipper,
}

/// Tracks the stage reached and the steps taken so far.
struct Run {
    stage: Stage,
    steps: Vec<StepReport>,
}

impl Run {
    fn advance(&mut self, next: Stage) {
        tracing::debug!(from = %self.stage, to = %next, "pipeline transition");
        self.stage = next;
    }

    fn record(&mut self, step: StepReport) {
        tracing::info!(step = %step.step, outcome = %step.outcome, path = %step.path, "step finished");
        self.steps.push(step);
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        tracing::error!(stage = %self.stage, kind = err.kind(), error = %err, "pipeline failed");
        self.stage = Stage::Failed;
        err
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        cfg: &'a PipelineConfig,
        transport: &'a dyn Transport,
        clipper: &'a dyn Clipper,
    ) -> Self {
        Self {
            cfg,
            transport,
            clipper,
        }
    }

    /// Runs the steps selected by `opts.scope` in order, stopping at the first failure.
    pub fn run(&self, opts: RunOptions) -> PipelineResult<PipelineReport> {
        let mut run = Run {
            stage: Stage::Start,
            steps: Vec::new(),
        };
        match self.run_steps(&mut run, opts) {
            Ok(osm_dir) => Ok(PipelineReport {
                region: self.cfg.region.name.clone(),
                osm_dir: osm_dir.to_string_lossy().to_string(),
                stage: run.stage,
                steps: run.steps,
            }),
            Err(e) => Err(run.fail(e)),
        }
    }

    fn run_steps(&self, run: &mut Run, opts: RunOptions) -> PipelineResult<PathBuf> {
        let (osm_dir, created) = workspace::prepare(&self.cfg.data_dir, &self.cfg.osm_subdir)?;
        run.record(StepReport {
            step: Step::PrepareWorkspace,
            outcome: created,
            path: osm_dir.to_string_lossy().to_string(),
            bytes: None,
        });
        run.advance(Stage::DirectoryReady);

        let extract = osm_dir.join(&self.cfg.extract.filename);
        let boundary = osm_dir.join(self.cfg.boundary_file());
        let output = osm_dir.join(self.cfg.output_file());
        let mut manifest = load_manifest(&self.cfg.data_dir)?;

        if opts.scope == Scope::ClipOnly {
            require(&extract)?;
            run.advance(Stage::NationalExtractPresent);
            require(&boundary)?;
            run.advance(Stage::BoundaryPolygonPresent);
        } else {
            let fetcher = Fetcher::new(self.transport, &self.cfg.timeouts);

            let step = fetcher.fetch_extract(&self.cfg.extract.url, &extract, opts.force)?;
            if step.outcome == Outcome::Downloaded {
                rehash_artifact(
                    &mut manifest,
                    ArtifactKind::NationalExtract,
                    &extract,
                    Some(self.cfg.extract.url.as_str()),
                )?;
                save_manifest(&self.cfg.data_dir, &manifest)?;
            }
            run.record(step);
            run.advance(Stage::NationalExtractPresent);

            let url = polygon_url(
                &self.cfg.polygon_service,
                self.cfg.region.polygon_id,
                &self.cfg.region.polygon_params,
            )?;
            let step = fetcher.fetch_boundary(&url, &boundary, opts.boundary_refresh)?;
            if step.outcome != Outcome::Skipped {
                rehash_artifact(
                    &mut manifest,
                    ArtifactKind::BoundaryPolygon,
                    &boundary,
                    Some(url.as_str()),
                )?;
                save_manifest(&self.cfg.data_dir, &manifest)?;
            }
            run.record(step);
            run.advance(Stage::BoundaryPolygonPresent);
        }

        if opts.scope == Scope::FetchOnly {
            return Ok(osm_dir);
        }

        let paths = ClipPaths {
            extract: &extract,
            boundary: &boundary,
            output: &output,
        };
        let result = clip_region(self.clipper, &mut manifest, &paths, opts.force);
        // Hashes recorded before a clip failure are still worth keeping.
        save_manifest(&self.cfg.data_dir, &manifest)?;
        let (step, _) = result?;
        run.record(step);
        run.advance(Stage::RegionalExtractProduced);
        Ok(osm_dir)
    }
}

fn require(path: &Path) -> PipelineResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::fs(path, "required input is missing; run `fetch` first"))
    }
}
