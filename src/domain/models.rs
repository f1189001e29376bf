use crate::cli::BoundaryRefresh;
use crate::domain::constants::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Effective pipeline configuration.
///
/// Every field has a default, so a partial `zorzim-data.json` is valid and an
/// absent one means "Santiago/RM from the Chile extract".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub osm_subdir: String,
    pub region: RegionConfig,
    pub extract: ExtractConfig,
    pub polygon_service: String,
    pub boundary_filename: String,
    pub output_filename: String,
    pub boundary_refresh: BoundaryRefresh,
    pub clipper: ClipperConfig,
    pub timeouts: Timeouts,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            osm_subdir: DEFAULT_OSM_SUBDIR.to_string(),
            region: RegionConfig::default(),
            extract: ExtractConfig::default(),
            polygon_service: DEFAULT_POLYGON_SERVICE.to_string(),
            boundary_filename: DEFAULT_BOUNDARY_FILENAME.to_string(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            boundary_refresh: BoundaryRefresh::Always,
            clipper: ClipperConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl PipelineConfig {
    pub fn osm_dir(&self) -> PathBuf {
        self.data_dir.join(&self.osm_subdir)
    }

    pub fn boundary_file(&self) -> String {
        self.render(&self.boundary_filename)
    }

    pub fn output_file(&self) -> String {
        self.render(&self.output_filename)
    }

    fn render(&self, template: &str) -> String {
        template.replace(REGION_PLACEHOLDER, &self.region.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub name: String,
    pub polygon_id: u64,
    pub polygon_params: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_REGION_NAME.to_string(),
            polygon_id: DEFAULT_POLYGON_ID,
            polygon_params: DEFAULT_POLYGON_PARAMS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub url: String,
    pub filename: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EXTRACT_URL.to_string(),
            filename: DEFAULT_EXTRACT_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperConfig {
    pub program: String,
    pub complete_ways: bool,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_CLIPPER.to_string(),
            complete_ways: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub connect_secs: u64,
    pub extract_secs: u64,
    pub boundary_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            extract_secs: DEFAULT_EXTRACT_TIMEOUT_SECS,
            boundary_secs: DEFAULT_BOUNDARY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    NationalExtract,
    BoundaryPolygon,
    RegionalExtract,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::NationalExtract => "national_extract",
            ArtifactKind::BoundaryPolygon => "boundary_polygon",
            ArtifactKind::RegionalExtract => "regional_extract",
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub version: u32,
    #[serde(default)]
    pub artifacts: BTreeMap<ArtifactKind, ArtifactRecord>,
    #[serde(default)]
    pub clip: Option<ClipRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub file: String,
    #[serde(default)]
    pub source: Option<String>,
    pub size: u64,
    /// Modification time in nanoseconds since the epoch, used to reuse `sha256`.
    #[serde(default)]
    pub modified_ns: u64,
    pub sha256: String,
    pub recorded_at: u64,
}

/// Input hashes the current regional extract was produced from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClipRecord {
    pub extract_sha256: String,
    pub boundary_sha256: String,
    pub output_sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    DirectoryReady,
    NationalExtractPresent,
    BoundaryPolygonPresent,
    RegionalExtractProduced,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Start => "start",
            Stage::DirectoryReady => "directory_ready",
            Stage::NationalExtractPresent => "national_extract_present",
            Stage::BoundaryPolygonPresent => "boundary_polygon_present",
            Stage::RegionalExtractProduced => "regional_extract_produced",
            Stage::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PrepareWorkspace,
    FetchExtract,
    FetchBoundary,
    Clip,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::PrepareWorkspace => "prepare_workspace",
            Step::FetchExtract => "fetch_extract",
            Step::FetchBoundary => "fetch_boundary",
            Step::Clip => "clip",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Present,
    Downloaded,
    Skipped,
    Refreshed,
    Clipped,
    UpToDate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Created => "created",
            Outcome::Present => "present",
            Outcome::Downloaded => "downloaded",
            Outcome::Skipped => "skipped",
            Outcome::Refreshed => "refreshed",
            Outcome::Clipped => "clipped",
            Outcome::UpToDate => "up_to_date",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub outcome: Outcome,
    pub path: String,
    pub bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub region: String,
    pub osm_dir: String,
    pub stage: Stage,
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundarySummary {
    pub name: String,
    pub rings: usize,
    pub holes: usize,
    pub vertices: usize,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bbox: [f64; 4],
}

#[derive(Debug, Serialize)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    pub file: String,
    pub present: bool,
    pub size: Option<u64>,
    pub modified: Option<u64>,
    pub sha256: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub osm_dir: String,
    pub artifacts: Vec<ArtifactStatus>,
    pub boundary: Option<BoundarySummary>,
    pub clip_up_to_date: bool,
}

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall: String,
    pub checks: Vec<CheckItem>,
}
