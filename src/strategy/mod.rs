//! Detection strategies. Each one reads the file text through a different
//! family of catalogue patterns and reports the ranges it can explain.
//!
//! - [`none`]: files that inherit their directory's license, plus the fallback
//! - [`attribution`]: "thanks to" lines
//! - [`reference`]: references by license file name, family, or URL
//! - [`inline`]: full license texts and notices
//! - [`forward`]: later blocks pointing back at the file's one license

pub mod attribution;
pub mod forward;
pub mod inline;
pub mod none;
pub mod reference;

use std::sync::Arc;

use crate::catalogue::PatternCatalogue;
use crate::error::{excerpt, LicenseError, MatchSummary};
use crate::license::{License, LicenseRegistry};
use crate::source::LicenseSource;

pub use attribution::AttributionStrategy;
pub use forward::ForwardReferenceStrategy;
pub use inline::{InlineLicenseStrategy, InlineNoticeStrategy};
pub use none::NoDefaultStrategy;
pub use reference::{FileReferenceStrategy, TypeReferenceStrategy, UrlReferenceStrategy};

/// Licenses resolved for the half-open range `[start, end)` of the scanned
/// text.
#[derive(Debug, Clone)]
pub struct LicenseMatch {
    pub licenses: Vec<Arc<License>>,
    pub start: usize,
    pub end: usize,
    /// Which strategy produced the match.
    pub debug: &'static str,
    /// Intentionally overlaps another match (multi-licensing).
    pub is_duplicate: bool,
}

impl LicenseMatch {
    pub fn new(licenses: Vec<Arc<License>>, start: usize, end: usize, debug: &'static str) -> Self {
        Self {
            licenses,
            start,
            end,
            debug,
            is_duplicate: false,
        }
    }

    pub fn duplicate(mut self) -> Self {
        self.is_duplicate = true;
        self
    }

    pub fn summary(&self, text: &str) -> MatchSummary {
        MatchSummary {
            start: self.start,
            end: self.end,
            debug: self.debug.to_string(),
            duplicate: self.is_duplicate,
            excerpt: excerpt(text.get(self.start..self.end).unwrap_or_default()),
        }
    }
}

/// Everything a strategy may consult while scanning one file.
pub struct MatchContext<'a> {
    /// Tab- and newline-normalized file text.
    pub text: &'a str,
    pub filename: &'a str,
    pub source: &'a dyn LicenseSource,
    pub registry: &'a LicenseRegistry,
    pub catalogue: &'a PatternCatalogue,
}

pub trait Strategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError>;
}

/// Strategies that always run, in their fixed order.
pub fn pipeline() -> Vec<Box<dyn Strategy + Send + Sync>> {
    vec![
        Box::new(NoDefaultStrategy::new()),
        Box::new(AttributionStrategy),
        Box::new(FileReferenceStrategy),
        Box::new(TypeReferenceStrategy),
        Box::new(UrlReferenceStrategy),
        Box::new(InlineLicenseStrategy),
        Box::new(InlineNoticeStrategy),
    ]
}

/// Expand `license` against `copyright` when one was found, otherwise use it
/// as is.
pub(crate) fn resolve_with_copyright(
    license: &Arc<License>,
    copyright: Option<&str>,
    ctx: &MatchContext<'_>,
) -> Result<Vec<Arc<License>>, LicenseError> {
    match copyright {
        Some(copyright) => license.expand(ctx.registry, copyright, ctx.filename),
        None => Ok(vec![Arc::clone(license)]),
    }
}
