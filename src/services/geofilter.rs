use crate::domain::models::{
    ArtifactKind, BoundarySummary, ClipRecord, Manifest, Outcome, Step, StepReport,
};
use crate::error::{PipelineError, PipelineResult};
use crate::services::boundary::Boundary;
use crate::services::clipper::Clipper;
use crate::services::files::part_path;
use crate::services::storage::record_artifact;
use std::path::Path;

pub struct ClipPaths<'a> {
    pub extract: &'a Path,
    pub boundary: &'a Path,
    pub output: &'a Path,
}

/// Clips the national extract to the boundary polygon.
///
/// The polygon is parsed before the clipper runs, so an empty or malformed
/// service response can never yield a pass-through copy of the extract. The
/// clip is skipped when the manifest shows the output was built from inputs
/// with the same content.
pub fn clip_region(
    clipper: &dyn Clipper,
    manifest: &mut Manifest,
    paths: &ClipPaths<'_>,
    force: bool,
) -> PipelineResult<(StepReport, BoundarySummary)> {
    for input in [paths.extract, paths.boundary] {
        if !input.is_file() {
            return Err(PipelineError::fs(input, "clip input is missing"));
        }
    }
    let boundary = Boundary::load(paths.boundary)?;
    let summary = boundary.summary();
    tracing::debug!(
        rings = summary.rings,
        holes = summary.holes,
        vertices = summary.vertices,
        "boundary polygon parsed"
    );

    let extract_sha256 = record_artifact(manifest, ArtifactKind::NationalExtract, paths.extract, None)?;
    let boundary_sha256 =
        record_artifact(manifest, ArtifactKind::BoundaryPolygon, paths.boundary, None)?;

    if !force && paths.output.is_file() {
        if let Some(rec) = manifest.clip.clone() {
            let output_sha256 =
                record_artifact(manifest, ArtifactKind::RegionalExtract, paths.output, None)?;
            if rec.extract_sha256 == extract_sha256
                && rec.boundary_sha256 == boundary_sha256
                && rec.output_sha256 == output_sha256
            {
                tracing::info!(file = %paths.output.display(), "regional extract up to date");
                let bytes = std::fs::metadata(paths.output).map(|m| m.len()).ok();
                return Ok((report(Outcome::UpToDate, paths.output, bytes), summary));
            }
        }
    }

    let part = part_path(paths.output);
    let _ = std::fs::remove_file(&part);
    tracing::info!(
        clipper = %clipper.describe(),
        input = %paths.extract.display(),
        boundary = %paths.boundary.display(),
        "clipping regional extract"
    );
    if let Err(e) = clipper.clip(paths.extract, paths.boundary, &part) {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }
    let bytes = match std::fs::metadata(&part) {
        Ok(m) if m.len() > 0 => m.len(),
        _ => {
            let _ = std::fs::remove_file(&part);
            return Err(PipelineError::Conversion(format!(
                "{} produced no output",
                clipper.describe()
            )));
        }
    };
    std::fs::rename(&part, paths.output).map_err(|e| {
        let _ = std::fs::remove_file(&part);
        PipelineError::fs(paths.output, e)
    })?;

    let output_sha256 = record_artifact(manifest, ArtifactKind::RegionalExtract, paths.output, None)?;
    manifest.clip = Some(ClipRecord {
        extract_sha256,
        boundary_sha256,
        output_sha256,
    });
    tracing::info!(bytes, file = %paths.output.display(), "regional extract written");
    Ok((report(Outcome::Clipped, paths.output, Some(bytes)), summary))
}

/// True when the manifest's clip record matches the current files.
pub fn is_up_to_date(manifest: &Manifest) -> bool {
    let Some(rec) = &manifest.clip else {
        return false;
    };
    let sha = |k: ArtifactKind| manifest.artifacts.get(&k).map(|r| r.sha256.as_str());
    sha(ArtifactKind::NationalExtract) == Some(rec.extract_sha256.as_str())
        && sha(ArtifactKind::BoundaryPolygon) == Some(rec.boundary_sha256.as_str())
        && sha(ArtifactKind::RegionalExtract) == Some(rec.output_sha256.as_str())
}

fn report(outcome: Outcome, path: &Path, bytes: Option<u64>) -> StepReport {
    StepReport {
        step: Step::Clip,
        outcome,
        path: path.to_string_lossy().to_string(),
        bytes,
    }
}
