pub const DEFAULT_CONFIG_FILE: &str = "zorzim-data.json";
pub const DEFAULT_DATA_DIR: &str = "data/external";
pub const DEFAULT_OSM_SUBDIR: &str = "OSM";
pub const MANIFEST_FILE: &str = "osm-manifest.json";
pub const MANIFEST_VERSION: u32 = 2;

pub const DEFAULT_REGION_NAME: &str = "santiago";
/// OSM relation id of Región Metropolitana de Santiago.
pub const DEFAULT_POLYGON_ID: u64 = 198848;
pub const DEFAULT_POLYGON_PARAMS: &str = "0.020000-0.005000-0.005000";
pub const DEFAULT_POLYGON_SERVICE: &str = "https://polygons.openstreetmap.fr/get_poly.py";

pub const DEFAULT_EXTRACT_URL: &str =
    "https://download.geofabrik.de/south-america/chile-latest.osm.pbf";
pub const DEFAULT_EXTRACT_FILENAME: &str = "chile-latest.osm.pbf";

pub const REGION_PLACEHOLDER: &str = "{region}";
pub const DEFAULT_BOUNDARY_FILENAME: &str = "{region}.poly";
pub const DEFAULT_OUTPUT_FILENAME: &str = "{region}.osm.pbf";

/// Suffix the external simulator appends to the name it is given (`--pbf <name>`).
pub const EXTRACT_SUFFIX: &str = ".osm.pbf";

pub const DEFAULT_CLIPPER: &str = "osmconvert";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_BOUNDARY_TIMEOUT_SECS: u64 = 120;

pub const USER_AGENT: &str = concat!("zorzim-data/", env!("CARGO_PKG_VERSION"));
