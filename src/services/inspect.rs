use crate::domain::constants::EXTRACT_SUFFIX;
use crate::domain::models::{
    ArtifactKind, ArtifactStatus, CheckItem, DoctorReport, LocateReport, Manifest,
    PipelineConfig, StatusReport,
};
use crate::error::{PipelineError, PipelineResult};
use crate::services::boundary::Boundary;
use crate::services::clipper::Osmconvert;
use crate::services::files::modified_secs;
use crate::services::geofilter::is_up_to_date;
use crate::services::storage::{load_manifest, record_artifact};

pub fn artifact_files(cfg: &PipelineConfig) -> [(ArtifactKind, String); 3] {
    [
        (ArtifactKind::NationalExtract, cfg.extract.filename.clone()),
        (ArtifactKind::BoundaryPolygon, cfg.boundary_file()),
        (ArtifactKind::RegionalExtract, cfg.output_file()),
    ]
}

/// Describes the three artifacts. Hashes are refreshed in memory only; the
/// manifest on disk is written by pipeline runs alone.
pub fn status(cfg: &PipelineConfig) -> PipelineResult<StatusReport> {
    let osm_dir = cfg.osm_dir();
    let mut manifest = if cfg.data_dir.is_dir() {
        load_manifest(&cfg.data_dir)?
    } else {
        Manifest::default()
    };

    let mut artifacts = Vec::new();
    for (kind, file) in artifact_files(cfg) {
        let path = osm_dir.join(&file);
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let sha256 = record_artifact(&mut manifest, kind, &path, None)?;
                artifacts.push(ArtifactStatus {
                    kind,
                    file,
                    present: true,
                    size: Some(meta.len()),
                    modified: Some(modified_secs(&meta)),
                    sha256: Some(sha256),
                    source: manifest.artifacts.get(&kind).and_then(|r| r.source.clone()),
                });
            }
            Err(_) => {
                manifest.artifacts.remove(&kind);
                artifacts.push(ArtifactStatus {
                    kind,
                    file,
                    present: false,
                    size: None,
                    modified: None,
                    sha256: None,
                    source: None,
                });
            }
        }
    }

    let boundary_path = osm_dir.join(cfg.boundary_file());
    let boundary = if boundary_path.is_file() {
        match Boundary::load(&boundary_path) {
            Ok(b) => Some(b.summary()),
            Err(e) => {
                tracing::warn!(error = %e, "boundary polygon is not usable");
                None
            }
        }
    } else {
        None
    };

    Ok(StatusReport {
        osm_dir: osm_dir.to_string_lossy().to_string(),
        artifacts,
        boundary,
        clip_up_to_date: is_up_to_date(&manifest),
    })
}

/// Resolves `<osm dir>/<name>.osm.pbf`, the file the simulator loads for `--pbf <name>`.
pub fn locate(cfg: &PipelineConfig, name: Option<&str>) -> PipelineResult<LocateReport> {
    let name = name.map_or_else(|| cfg.region.name.clone(), str::to_string);
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(PipelineError::Config(format!("invalid extract name {name:?}")));
    }
    let path = cfg.osm_dir().join(format!("{name}{EXTRACT_SUFFIX}"));
    if !path.is_file() {
        return Err(PipelineError::fs(&path, "extract not found"));
    }
    Ok(LocateReport {
        name,
        path: path.to_string_lossy().to_string(),
    })
}

pub fn doctor(cfg: &PipelineConfig) -> DoctorReport {
    let osm_dir = cfg.osm_dir();
    let present = |ok: bool| (if ok { "ok" } else { "missing" }).to_string();

    let mut checks = vec![
        CheckItem {
            name: "data_dir".to_string(),
            status: present(cfg.data_dir.is_dir()),
        },
        CheckItem {
            name: "osm_dir".to_string(),
            status: present(osm_dir.is_dir()),
        },
        CheckItem {
            name: format!("clipper:{}", cfg.clipper.program),
            status: present(Osmconvert::new(&cfg.clipper).available()),
        },
    ];
    for (kind, file) in artifact_files(cfg) {
        checks.push(CheckItem {
            name: kind.to_string(),
            status: present(osm_dir.join(file).is_file()),
        });
    }
    let boundary_path = osm_dir.join(cfg.boundary_file());
    if boundary_path.is_file() {
        checks.push(CheckItem {
            name: "boundary_polygon_valid".to_string(),
            status: match Boundary::load(&boundary_path) {
                Ok(_) => "ok".to_string(),
                Err(_) => "invalid".to_string(),
            },
        });
    }

    let overall = if checks.iter().all(|c| c.status == "ok") {
        "ok"
    } else {
        "needs_attention"
    }
    .to_string();

    DoctorReport { overall, checks }
}
