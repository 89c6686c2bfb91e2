//! Report renderers for scan results.
//!
//! - [`terminal`]: colored tables with a summary box; respects `--verbose` / `--quiet`.
//! - JSON output is a plain `serde_json` dump of [`crate::models::ScanReport`].

pub mod terminal;
