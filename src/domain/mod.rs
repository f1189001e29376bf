//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep config, manifest and report structs in one place.
//! - Avoid cyclic imports between `services/*` and `commands/*`.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — configuration, manifest, pipeline and doctor report structs.
//! - `constants.rs` — stable defaults for the Santiago/RM extract.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Changes in these structs affect `--json` outputs and the on-disk manifest.

pub mod constants;
pub mod models;
