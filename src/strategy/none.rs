use tracing::debug;

use super::{LicenseMatch, MatchContext, Strategy};
use crate::error::{excerpt, LicenseError};

/// A file without a license of its own takes its directory's default.
pub struct NoDefaultStrategy {
    broad: bool,
}

impl NoDefaultStrategy {
    pub fn new() -> Self {
        Self { broad: false }
    }

    /// The same delegation driven by the catalogue's broader fallback
    /// patterns.
    pub fn fallback() -> Self {
        Self { broad: true }
    }

    fn tag(&self) -> &'static str {
        if self.broad {
            "fallback"
        } else {
            "no-default"
        }
    }
}

impl Default for NoDefaultStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for NoDefaultStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        let patterns = if self.broad {
            &ctx.catalogue.fallback
        } else {
            &ctx.catalogue.no_default
        };
        let first = patterns
            .iter()
            .filter_map(|pattern| pattern.find(ctx.text))
            .min_by_key(|hit| (hit.start(), hit.end()));
        let Some(hit) = first else {
            return Ok(Vec::new());
        };

        let licenses = ctx.source.nearest_licenses_for(ctx.filename);
        if licenses.is_empty() {
            return Err(LicenseError::NoDefaultLicense {
                excerpt: excerpt(hit.as_str()),
            });
        }
        debug!(
            strategy = self.tag(),
            start = hit.start(),
            end = hit.end(),
            count = licenses.len(),
            "using default licenses"
        );
        Ok(vec![LicenseMatch::new(
            licenses,
            hit.start(),
            hit.end(),
            self.tag(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalogue::PatternCatalogue;
    use crate::license::LicenseRegistry;
    use crate::source::StaticLicenseSource;

    #[test]
    fn test_generated_file_uses_default() {
        let registry = LicenseRegistry::new();
        let default = registry.from_body("Thanks to everyone.", "LICENSE").unwrap();
        let source = StaticLicenseSource::new().with_default(Arc::clone(&default));
        let catalogue = PatternCatalogue::builtin();
        let text = "// GENERATED CODE - DO NOT EDIT\nint x;\n";
        let ctx = MatchContext {
            text,
            filename: "gen.c",
            source: &source,
            registry: &registry,
            catalogue: &catalogue,
        };
        let matches = NoDefaultStrategy::new().find(&ctx).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start, matches[0].end), (0, 32));
        assert!(Arc::ptr_eq(&matches[0].licenses[0], &default));
    }

    #[test]
    fn test_missing_default() {
        let registry = LicenseRegistry::new();
        let source = StaticLicenseSource::new();
        let catalogue = PatternCatalogue::builtin();
        let ctx = MatchContext {
            text: "// This code is licensed to you.\n",
            filename: "a.c",
            source: &source,
            registry: &registry,
            catalogue: &catalogue,
        };
        assert!(NoDefaultStrategy::new().find(&ctx).unwrap().is_empty());
        let err = NoDefaultStrategy::fallback().find(&ctx).unwrap_err();
        assert!(matches!(err, LicenseError::NoDefaultLicense { .. }));
    }
}
