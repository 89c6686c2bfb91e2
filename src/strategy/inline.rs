use regex::Regex;
use tracing::debug;

use super::{LicenseMatch, MatchContext, Strategy};
use crate::error::LicenseError;
use crate::extract::find_blocks;

/// Full license texts quoted in the file. The block, copyright included,
/// becomes a license of its own, classified from its text.
pub struct InlineLicenseStrategy;

/// Notices that may appear without a copyright above them.
pub struct InlineNoticeStrategy;

impl Strategy for InlineLicenseStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        find_inline(ctx, &ctx.catalogue.inline_licenses, true, "inline-license")
    }
}

impl Strategy for InlineNoticeStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        find_inline(ctx, &ctx.catalogue.inline_notices, false, "inline-notice")
    }
}

fn find_inline(
    ctx: &MatchContext<'_>,
    patterns: &[Regex],
    needs_copyright: bool,
    tag: &'static str,
) -> Result<Vec<LicenseMatch>, LicenseError> {
    let mut matches = Vec::new();
    for pattern in patterns {
        for block in find_blocks(ctx.text, pattern, needs_copyright)? {
            let license = ctx.registry.from_body(block.entire_license(), ctx.filename)?;
            debug!(
                strategy = tag,
                license_type = %license.license_type(),
                start = block.start,
                end = block.end,
                "found inline license"
            );
            matches.push(LicenseMatch::new(vec![license], block.start, block.end, tag));
        }
    }
    Ok(matches)
}
