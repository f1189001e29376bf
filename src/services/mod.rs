//! Service layer containing pipeline logic and side-effect helpers.
//!
//! ## Service map
//! - `workspace.rs` — OSM directory preparation under the base data dir.
//! - `transport.rs` — blocking HTTP transport + polygon service URL.
//! - `fetcher.rs` — national extract (presence-guarded) and boundary polygon downloads.
//! - `boundary.rs` — Osmosis `.poly` parsing, validation, point-in-polygon.
//! - `clipper.rs` — external clipper invocation (`osmconvert`).
//! - `geofilter.rs` — clip step: validation, staging, content-based idempotency.
//! - `pipeline.rs` — step ordering and stage transitions.
//! - `storage.rs` — artifact manifest persistence + hash caching.
//! - `files.rs` — atomic writes, hashing, timestamps.
//! - `config.rs` — configuration file loading and validation.
//! - `inspect.rs` — status/locate/doctor reports.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Network and process access go through `Transport` / `Clipper` so tests can substitute them.
//! - Nothing is written at a final artifact path until it is complete.
//! - Keep command handlers thin; delegate to services.

pub mod boundary;
pub mod clipper;
pub mod config;
pub mod fetcher;
pub mod files;
pub mod geofilter;
pub mod inspect;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod transport;
pub mod workspace;
