use crate::domain::models::Outcome;
use crate::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};

/// Ensures `<base>/<subdir>` exists. `base` itself is never created.
///
/// Every later step resolves its files against the returned directory instead
/// of changing the process working directory.
pub fn prepare(base: &Path, subdir: &str) -> PipelineResult<(PathBuf, Outcome)> {
    let meta = std::fs::metadata(base).map_err(|e| PipelineError::fs(base, e))?;
    if !meta.is_dir() {
        return Err(PipelineError::fs(base, "base data path is not a directory"));
    }
    let dir = base.join(subdir);
    match std::fs::metadata(&dir) {
        Ok(m) if m.is_dir() => {
            tracing::debug!(dir = %dir.display(), "osm directory present");
            Ok((dir, Outcome::Present))
        }
        Ok(_) => Err(PipelineError::fs(&dir, "exists and is not a directory")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir(&dir).map_err(|e| PipelineError::fs(&dir, e))?;
            tracing::info!(dir = %dir.display(), "created osm directory");
            Ok((dir, Outcome::Created))
        }
        Err(e) => Err(PipelineError::fs(&dir, e)),
    }
}
