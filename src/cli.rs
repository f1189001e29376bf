use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::constants::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "zorzim-data",
    version,
    about = "Fetch and clip the OpenStreetMap extract used by the ZOrZiM simulator"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Configuration file (defaults to ./zorzim-data.json when present)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Base data directory; must already exist (overrides config data_dir)"
    )]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare the OSM directory, fetch both inputs and clip the regional extract.
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Prepare the OSM directory and fetch the national extract and boundary polygon.
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Clip the national extract to the boundary polygon.
    Clip {
        #[arg(long, default_value_t = false, help = "Re-clip even if the output is current")]
        force: bool,
    },
    /// Show presence, size and hashes of the pipeline artifacts.
    Status,
    /// Resolve the regional extract path handed to the simulator.
    Locate { name: Option<String> },
    /// Check the environment the pipeline depends on.
    Doctor,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(
        long,
        default_value_t = false,
        help = "Re-download the national extract and re-clip even if present"
    )]
    pub force: bool,
    #[arg(long, value_enum, help = "Boundary polygon refresh policy (overrides config)")]
    pub refresh_boundary: Option<BoundaryRefresh>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Write the default configuration file.
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryRefresh {
    /// Re-download the polygon on every run.
    #[default]
    Always,
    /// Only download the polygon when no local copy exists.
    IfMissing,
}
