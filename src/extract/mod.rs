//! Locating license blocks in file text.
//!
//! - [`lines`]: lazy forward/backward line walkers.
//! - [`blocks`]: widens a pattern match to its whole comment block.
//! - [`split`]: separates leading copyright lines from license conditions.
//! - [`markers`]: fixed copyright and license markers.

pub mod blocks;
pub mod lines;
pub mod markers;
pub mod split;

pub use blocks::{find_blocks, PartialLicenseMatch};
pub use split::{split_license, SplitLicense};
