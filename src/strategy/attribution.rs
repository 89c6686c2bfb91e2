use tracing::debug;

use super::{LicenseMatch, MatchContext, Strategy};
use crate::error::LicenseError;
use crate::license::LicenseType;

/// "Thanks to ..." lines become standalone unique licenses.
pub struct AttributionStrategy;

impl Strategy for AttributionStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        let mut matches = Vec::new();
        for pattern in &ctx.catalogue.attributions {
            for captures in pattern.captures_iter(ctx.text) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                let body = captures.name("body").unwrap_or(whole).as_str();
                let license = ctx.registry.unique(body, LicenseType::Unknown, ctx.filename)?;
                debug!(
                    strategy = "attribution",
                    start = whole.start(),
                    end = whole.end(),
                    "found attribution"
                );
                matches.push(LicenseMatch::new(
                    vec![license],
                    whole.start(),
                    whole.end(),
                    "attribution",
                ));
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::PatternCatalogue;
    use crate::license::{LicenseRegistry, VariantKind};
    use crate::source::StaticLicenseSource;

    #[test]
    fn test_thanks_line() {
        let registry = LicenseRegistry::new();
        let source = StaticLicenseSource::new();
        let catalogue = PatternCatalogue::builtin();
        let text = "int x;\n// Thanks to Jane Doe for the parser.\nint y;\n";
        let ctx = MatchContext {
            text,
            filename: "a.c",
            source: &source,
            registry: &registry,
            catalogue: &catalogue,
        };
        let matches = AttributionStrategy.find(&ctx).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "// Thanks to Jane Doe for the parser.\n");
        let license = &matches[0].licenses[0];
        assert_eq!(license.body(), "Thanks to Jane Doe for the parser.");
        assert_eq!(license.variant().kind(), VariantKind::Unique);
    }
}
