//! `license_scan`: decide which licenses govern a source file and attribute
//! its copyright notices to canonical, deduplicated license objects.
//!
//! # Layers
//! 1. [`normalize`]: strips comment decoration so equal texts compare equal.
//! 2. [`license`]: the [`License`] model, its classifier, and the
//!    content-addressed [`LicenseRegistry`].
//! 3. [`extract`]: widens pattern matches to whole comment blocks and splits
//!    copyrights from conditions.
//! 4. [`catalogue`]: the patterns and URL table strategies match with.
//! 5. [`strategy`]: the detection strategies.
//! 6. [`detector`]: runs the strategies and validates the combined result.

pub mod catalogue;
pub mod config;
pub mod detector;
pub mod error;
pub mod extract;
pub mod license;
pub mod models;
pub mod normalize;
pub mod report;
pub mod source;
pub mod strategy;

pub use catalogue::PatternCatalogue;
pub use config::DetectionConfig;
pub use detector::Detector;
pub use error::{DetectionError, ErrorCategory, LicenseError};
pub use license::{License, LicenseRegistry, LicenseType, LicenseVariant, VariantKind};
pub use normalize::normalize;
pub use source::{LicenseSource, StaticLicenseSource};
pub use strategy::LicenseMatch;
