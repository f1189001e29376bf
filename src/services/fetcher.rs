use crate::cli::BoundaryRefresh;
use crate::domain::models::{Outcome, Step, StepReport, Timeouts};
use crate::error::PipelineResult;
use crate::services::files::write_atomically;
use crate::services::transport::Transport;
use std::path::Path;
use std::time::Duration;

pub struct Fetcher<'a> {
    transport: &'a dyn Transport,
    timeouts: &'a Timeouts,
}

impl<'a> Fetcher<'a> {
    pub fn new(transport: &'a dyn Transport, timeouts: &'a Timeouts) -> Self {
        Self {
            transport,
            timeouts,
        }
    }

    /// Downloads the national extract unless a file already sits at `dest`.
    ///
    /// Presence is the only check: no hash or freshness comparison.
    pub fn fetch_extract(&self, url: &str, dest: &Path, force: bool) -> PipelineResult<StepReport> {
        if !force {
            if let Ok(meta) = std::fs::metadata(dest) {
                tracing::info!(file = %dest.display(), "national extract present, skipping download");
                return Ok(report(Step::FetchExtract, Outcome::Skipped, dest, Some(meta.len())));
            }
        }
        let timeout = Duration::from_secs(self.timeouts.extract_secs);
        tracing::info!(url, file = %dest.display(), "downloading national extract");
        let bytes = write_atomically(dest, |w| self.transport.get(url, timeout, w))?;
        tracing::info!(bytes, "national extract downloaded");
        Ok(report(Step::FetchExtract, Outcome::Downloaded, dest, Some(bytes)))
    }

    /// Saves the polygon service response verbatim. With `Always` any prior
    /// copy is replaced; the body is not validated here.
    pub fn fetch_boundary(
        &self,
        url: &str,
        dest: &Path,
        refresh: BoundaryRefresh,
    ) -> PipelineResult<StepReport> {
        let existed = dest.exists();
        if existed && refresh == BoundaryRefresh::IfMissing {
            let size = std::fs::metadata(dest).map(|m| m.len()).ok();
            tracing::info!(file = %dest.display(), "boundary polygon present, skipping download");
            return Ok(report(Step::FetchBoundary, Outcome::Skipped, dest, size));
        }
        let timeout = Duration::from_secs(self.timeouts.boundary_secs);
        tracing::info!(url, file = %dest.display(), "fetching boundary polygon");
        let bytes = write_atomically(dest, |w| self.transport.get(url, timeout, w))?;
        if bytes == 0 {
            tracing::warn!(url, "polygon service returned an empty body");
        }
        let outcome = if existed {
            Outcome::Refreshed
        } else {
            Outcome::Downloaded
        };
        Ok(report(Step::FetchBoundary, outcome, dest, Some(bytes)))
    }
}

fn report(step: Step, outcome: Outcome, path: &Path, bytes: Option<u64>) -> StepReport {
    StepReport {
        step,
        outcome,
        path: path.to_string_lossy().to_string(),
        bytes,
    }
}
