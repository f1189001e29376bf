use crate::domain::constants::{MANIFEST_FILE, MANIFEST_VERSION};
use crate::domain::models::{ArtifactKind, ArtifactRecord, Manifest};
use crate::error::{PipelineError, PipelineResult};
use crate::services::files::{modified_nanos, now_secs, sha256_file, write_atomically};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The manifest sits in the base data directory so the OSM directory only
/// holds the artifacts themselves.
pub fn manifest_path(data_dir: &Path) -> PathBuf {
    data_dir.join(MANIFEST_FILE)
}

pub fn load_manifest(data_dir: &Path) -> PipelineResult<Manifest> {
    let p = manifest_path(data_dir);
    if !p.exists() {
        return Ok(Manifest {
            version: MANIFEST_VERSION,
            ..Manifest::default()
        });
    }
    let raw = std::fs::read_to_string(&p).map_err(|e| PipelineError::fs(&p, e))?;
    match serde_json::from_str::<Manifest>(&raw) {
        Ok(m) => Ok(m),
        Err(e) => {
            // Only cached hashes live here; a corrupt manifest is rebuilt.
            tracing::warn!(path = %p.display(), error = %e, "ignoring unreadable manifest");
            Ok(Manifest {
                version: MANIFEST_VERSION,
                ..Manifest::default()
            })
        }
    }
}

pub fn save_manifest(data_dir: &Path, m: &Manifest) -> PipelineResult<()> {
    let p = manifest_path(data_dir);
    let body = serde_json::to_vec_pretty(m).map_err(|e| PipelineError::fs(&p, e))?;
    write_atomically(&p, |w| {
        w.write_all(&body).map_err(PipelineError::Sink)?;
        Ok(body.len() as u64)
    })?;
    Ok(())
}

/// Returns the sha256 of `path`, reusing the recorded hash while size and
/// mtime are unchanged, and refreshes the record for `kind`.
pub fn record_artifact(
    m: &mut Manifest,
    kind: ArtifactKind,
    path: &Path,
    source: Option<&str>,
) -> PipelineResult<String> {
    let meta = std::fs::metadata(path).map_err(|e| PipelineError::fs(path, e))?;
    let size = meta.len();
    let modified_ns = modified_nanos(&meta);
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if let Some(existing) = m.artifacts.get_mut(&kind) {
        if existing.file == file && existing.size == size && existing.modified_ns == modified_ns {
            if source.is_some() {
                existing.source = source.map(str::to_string);
            }
            return Ok(existing.sha256.clone());
        }
    }

    let sha256 = sha256_file(path)?;
    let previous_source = m.artifacts.get(&kind).and_then(|r| r.source.clone());
    m.artifacts.insert(
        kind,
        ArtifactRecord {
            file,
            source: source.map(str::to_string).or(previous_source),
            size,
            modified_ns,
            sha256: sha256.clone(),
            recorded_at: now_secs(),
        },
    );
    Ok(sha256)
}

/// Like [`record_artifact`] but always hashes the file. Used right after the
/// pipeline has rewritten it.
pub fn rehash_artifact(
    m: &mut Manifest,
    kind: ArtifactKind,
    path: &Path,
    source: Option<&str>,
) -> PipelineResult<String> {
    let previous = m.artifacts.remove(&kind).and_then(|r| r.source);
    let source = source.map(str::to_string).or(previous);
    record_artifact(m, kind, path, source.as_deref())
}
