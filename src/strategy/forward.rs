use std::sync::Arc;

use tracing::debug;

use super::{resolve_with_copyright, LicenseMatch, MatchContext};
use crate::error::LicenseError;
use crate::extract::find_blocks;
use crate::license::{license_type_from_name, License};

/// "This file is licensed under the same license as above."
///
/// Only meaningful once the rest of the pipeline has settled on exactly one
/// match, whose last license is the one being referred to.
pub struct ForwardReferenceStrategy;

impl ForwardReferenceStrategy {
    pub fn find(
        &self,
        ctx: &MatchContext<'_>,
        existing: &LicenseMatch,
    ) -> Result<Vec<LicenseMatch>, LicenseError> {
        let Some(target) = existing.licenses.last() else {
            return Ok(Vec::new());
        };
        let mut matches = Vec::new();
        for pattern in &ctx.catalogue.forward_references {
            for block in find_blocks(ctx.text, pattern, false)? {
                if let Some(name) = block.group("name") {
                    check_name(name, target)?;
                }
                let copyright = block.has_copyrights.then(|| block.copyrights());
                let licenses = resolve_with_copyright(target, copyright, ctx)?;
                debug!(
                    strategy = "forward-reference",
                    start = block.start,
                    end = block.end,
                    "resolved forward reference"
                );
                matches.push(LicenseMatch::new(
                    licenses,
                    block.start,
                    block.end,
                    "forward-reference",
                ));
            }
        }
        Ok(matches)
    }
}

fn check_name(name: &str, target: &Arc<License>) -> Result<(), LicenseError> {
    let named = license_type_from_name(name)?;
    if named != target.license_type() {
        return Err(LicenseError::UnexpectedForwardReference {
            named,
            found: target.license_type(),
        });
    }
    Ok(())
}
