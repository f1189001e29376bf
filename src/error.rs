use std::path::{Path, PathBuf};

/// Failure of one pipeline step. Every variant is fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("filesystem error at {}: {reason}", .path.display())]
    Filesystem { path: PathBuf, reason: String },
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Write failure while streaming a download; the caller attaches the path.
    #[error("write failed: {0}")]
    Sink(std::io::Error),
}

impl PipelineError {
    pub fn fs(path: &Path, err: impl std::fmt::Display) -> Self {
        PipelineError::Filesystem {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    pub fn network(url: &str, err: impl std::fmt::Display) -> Self {
        PipelineError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Filesystem { .. } => "filesystem",
            PipelineError::Network { .. } => "network",
            PipelineError::Conversion(_) => "conversion",
            PipelineError::Config(_) => "config",
            PipelineError::Sink(_) => "filesystem",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Filesystem { .. } => 2,
            PipelineError::Network { .. } => 3,
            PipelineError::Conversion(_) => 4,
            PipelineError::Sink(_) => 2,
            PipelineError::Config(_) => 1,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
