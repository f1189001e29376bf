use crate::error::{PipelineError, PipelineResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hidden sibling a file is staged in before being renamed into place.
pub fn part_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.part"))
}

/// Runs `fill` against a staging file and renames it to `target` on success.
/// The staging file is removed on any failure.
pub fn write_atomically<F>(target: &Path, fill: F) -> PipelineResult<u64>
where
    F: FnOnce(&mut dyn Write) -> PipelineResult<u64>,
{
    let part = part_path(target);
    let result = stage(&part, fill);
    match result {
        Ok(n) => {
            std::fs::rename(&part, target).map_err(|e| {
                let _ = std::fs::remove_file(&part);
                PipelineError::fs(target, e)
            })?;
            Ok(n)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            Err(match e {
                PipelineError::Sink(io) => PipelineError::fs(target, io),
                other => other,
            })
        }
    }
}

fn stage<F>(part: &Path, fill: F) -> PipelineResult<u64>
where
    F: FnOnce(&mut dyn Write) -> PipelineResult<u64>,
{
    let file = File::create(part).map_err(|e| PipelineError::fs(part, e))?;
    let mut writer = BufWriter::new(file);
    let n = fill(&mut writer)?;
    let file = writer
        .into_inner()
        .map_err(|e| PipelineError::fs(part, e.error()))?;
    file.sync_all().map_err(|e| PipelineError::fs(part, e))?;
    Ok(n)
}

pub fn sha256_file(path: &Path) -> PipelineResult<String> {
    let mut file = File::open(path).map_err(|e| PipelineError::fs(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| PipelineError::fs(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

pub fn modified_secs(meta: &std::fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Nanosecond mtime, so rewrites within the same second still differ.
pub fn modified_nanos(meta: &std::fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn failed_fill_leaves_no_files() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("chile-latest.osm.pbf");
        let err = write_atomically(&target, |w| {
            w.write_all(b"partial").unwrap();
            Err(PipelineError::network("http://mirror", "connection reset"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), "network");
        assert!(!target.exists());
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn successful_fill_is_renamed_into_place() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("santiago.poly");
        let n = write_atomically(&target, |w| {
            w.write_all(b"polygon\nEND\n")
                .map_err(PipelineError::Sink)?;
            Ok(12)
        })
        .unwrap();
        assert_eq!(n, 12);
        assert_eq!(std::fs::read(&target).unwrap(), b"polygon\nEND\n");
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn part_path_is_hidden_sibling() {
        let p = part_path(Path::new("/data/OSM/santiago.osm.pbf"));
        assert_eq!(p, Path::new("/data/OSM/.santiago.osm.pbf.part"));
    }

    #[test]
    fn sha256_matches_known_digest() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("abc");
        std::fs::write(&p, b"abc").unwrap();
        assert_eq!(
            sha256_file(&p).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
