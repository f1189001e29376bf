use crate::domain::models::ClipperConfig;
use crate::error::{PipelineError, PipelineResult};
use std::path::Path;
use std::process::Command;

/// Geometry filter producing `output` from the elements of `input` inside `boundary`.
///
/// Implementations write `output` directly; the caller owns staging and renaming.
pub trait Clipper {
    fn clip(&self, input: &Path, boundary: &Path, output: &Path) -> PipelineResult<()>;
    fn describe(&self) -> String;
}

/// Runs `osmconvert <input> -B=<poly> [--complete-ways] --out-pbf -o=<output>`.
pub struct Osmconvert {
    program: String,
    complete_ways: bool,
}

impl Osmconvert {
    pub fn new(cfg: &ClipperConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            complete_ways: cfg.complete_ways,
        }
    }

    fn command(&self, input: &Path, boundary: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(input).arg(format!("-B={}", boundary.display()));
        if self.complete_ways {
            cmd.arg("--complete-ways");
        }
        cmd.arg("--out-pbf").arg(format!("-o={}", output.display()));
        cmd
    }

    /// True when the program can be spawned at all.
    pub fn available(&self) -> bool {
        Command::new(&self.program).arg("-h").output().is_ok()
    }
}

impl Clipper for Osmconvert {
    fn clip(&self, input: &Path, boundary: &Path, output: &Path) -> PipelineResult<()> {
        let mut cmd = self.command(input, boundary, output);
        tracing::debug!(?cmd, "running clipper");
        let out = cmd.output().map_err(|e| {
            PipelineError::Conversion(format!("failed to run {}: {}", self.program, e))
        })?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PipelineError::Conversion(format!(
                "{} exited with {}: {}",
                self.program,
                out.status,
                tail(&stderr, 5)
            )));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.program.clone()
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join(" | ")
}
