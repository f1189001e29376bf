use crate::domain::constants::{DEFAULT_CONFIG_FILE, REGION_PLACEHOLDER};
use crate::domain::models::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};

/// Loads the configuration from `explicit`, or from `./zorzim-data.json` when
/// present, falling back to defaults. An explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&Path>) -> PipelineResult<PipelineConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !path.exists() {
        if required {
            return Err(PipelineError::fs(&path, "config file not found"));
        }
        tracing::debug!("no config file, using defaults");
        return Ok(PipelineConfig::default());
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| PipelineError::fs(&path, e))?;
    let cfg: PipelineConfig = serde_json::from_str(&raw)
        .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded config");
    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &PipelineConfig) -> PipelineResult<()> {
    if cfg.region.name.trim().is_empty() {
        return Err(PipelineError::Config("region.name must not be empty".into()));
    }
    if cfg.osm_subdir.trim().is_empty() {
        return Err(PipelineError::Config("osm_subdir must not be empty".into()));
    }
    for (field, value) in [
        ("region.name", cfg.region.name.clone()),
        ("extract.filename", cfg.extract.filename.clone()),
        ("boundary_filename", cfg.boundary_file()),
        ("output_filename", cfg.output_file()),
    ] {
        check_file_name(field, &value)?;
    }
    let names = [
        cfg.extract.filename.clone(),
        cfg.boundary_file(),
        cfg.output_file(),
    ];
    if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
        return Err(PipelineError::Config(
            "extract, boundary and output file names must be distinct".into(),
        ));
    }
    if cfg.extract.url.trim().is_empty() || cfg.polygon_service.trim().is_empty() {
        return Err(PipelineError::Config(
            "extract.url and polygon_service must be set".into(),
        ));
    }
    let t = &cfg.timeouts;
    if t.connect_secs == 0 || t.extract_secs == 0 || t.boundary_secs == 0 {
        return Err(PipelineError::Config("timeouts must be non-zero".into()));
    }
    if cfg.clipper.program.trim().is_empty() {
        return Err(PipelineError::Config("clipper.program must be set".into()));
    }
    Ok(())
}

fn check_file_name(field: &str, value: &str) -> PipelineResult<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::Config(format!("{field} must not be empty")));
    }
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(PipelineError::Config(format!(
            "{field} must be a plain file name, got {value:?}"
        )));
    }
    if value.contains(REGION_PLACEHOLDER) {
        return Err(PipelineError::Config(format!(
            "{field} still contains {REGION_PLACEHOLDER}"
        )));
    }
    Ok(())
}

/// Writes the default configuration; never overwrites.
pub fn write_default(path: &Path) -> PipelineResult<()> {
    if path.exists() {
        return Err(PipelineError::fs(path, "refusing to overwrite existing file"));
    }
    let body = serde_json::to_string_pretty(&PipelineConfig::default())
        .map_err(|e| PipelineError::Config(e.to_string()))?;
    std::fs::write(path, format!("{body}\n")).map_err(|e| PipelineError::fs(path, e))
}
