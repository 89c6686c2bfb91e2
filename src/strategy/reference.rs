//! Blocks that name their license instead of quoting it.

use std::sync::Arc;

use tracing::debug;

use super::{resolve_with_copyright, LicenseMatch, MatchContext, Strategy};
use crate::error::LicenseError;
use crate::extract::find_blocks;
use crate::license::{license_type_from_name, License};

/// "See the LICENSE file", optionally with its own copyright line.
///
/// The match covers exactly what the pattern matched; copyright lines are
/// only taken from the pattern's `copyright` group.
pub struct FileReferenceStrategy;

impl Strategy for FileReferenceStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        let mut matches = Vec::new();
        for pattern in &ctx.catalogue.file_references {
            for caps in pattern.captures_iter(ctx.text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let name = caps.name("name").map_or("LICENSE", |m| m.as_str());
                let authors = caps.name("authors").map(|m| m.as_str());
                let license = ctx
                    .source
                    .nearest_license_with_name(name, authors)
                    .ok_or_else(|| LicenseError::UnresolvedName {
                        name: name.to_string(),
                        authors: authors.map(str::to_string),
                    })?;
                let copyright = caps.name("copyright").map(|m| m.as_str());
                let licenses = resolve_with_copyright(&license, copyright, ctx)?;
                debug!(strategy = "file-reference", name, start = whole.start(), end = whole.end(), "resolved reference");
                matches.push(LicenseMatch::new(licenses, whole.start(), whole.end(), "file-reference"));
            }
        }
        Ok(matches)
    }
}

/// "Use of this source code is governed by a BSD-style license."
pub struct TypeReferenceStrategy;

impl Strategy for TypeReferenceStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        let mut matches = Vec::new();
        for pattern in &ctx.catalogue.type_references {
            for block in find_blocks(ctx.text, pattern, true)? {
                let name = block.group("name").unwrap_or_default();
                let license_type = license_type_from_name(name)?;
                let license = ctx
                    .source
                    .nearest_license_of_type(license_type)
                    .ok_or(LicenseError::UnresolvedType { license_type })?;
                let licenses =
                    resolve_with_copyright(&license, Some(block.copyrights()), ctx)?;
                debug!(strategy = "type-reference", %license_type, start = block.start, end = block.end, "resolved reference");
                matches.push(LicenseMatch::new(licenses, block.start, block.end, "type-reference"));
            }
        }
        Ok(matches)
    }
}

/// "Released under the MIT license: https://opensource.org/licenses/MIT".
///
/// A block citing several URLs yields one match per URL over the same range;
/// all but the first are duplicates.
pub struct UrlReferenceStrategy;

impl UrlReferenceStrategy {
    fn resolve(
        ctx: &MatchContext<'_>,
        url: &str,
        version: Option<&str>,
    ) -> Result<Arc<License>, LicenseError> {
        if let Some(local) = ctx.source.nearest_license_with_name(url, None) {
            return Ok(local);
        }
        let known = ctx.catalogue.urls.lookup(url, version).ok_or_else(|| {
            LicenseError::UnresolvedUrl {
                url: url.to_string(),
                version: version.map(str::to_string),
            }
        })?;
        ctx.registry
            .from_body_and_type(&known.body, known.license_type, ctx.filename)
    }
}

impl Strategy for UrlReferenceStrategy {
    fn find(&self, ctx: &MatchContext<'_>) -> Result<Vec<LicenseMatch>, LicenseError> {
        let mut matches = Vec::new();
        for pattern in &ctx.catalogue.url_references {
            for caps in pattern.captures_iter(ctx.text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let copyright = caps.name("copyright").map(|m| m.as_str());
                for index in 1.. {
                    let Some(url) = caps.name(&format!("url{index}")).map(|m| m.as_str()) else {
                        break;
                    };
                    let version = caps.name(&format!("version{index}")).map(|m| m.as_str());
                    let license = Self::resolve(ctx, url, version)?;
                    let licenses = resolve_with_copyright(&license, copyright, ctx)?;
                    debug!(strategy = "url-reference", url, start = whole.start(), end = whole.end(), "resolved reference");
                    let found = LicenseMatch::new(licenses, whole.start(), whole.end(), "url-reference");
                    matches.push(if index == 1 { found } else { found.duplicate() });
                }
            }
        }
        Ok(matches)
    }
}
