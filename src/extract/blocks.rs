use regex::{Captures, Regex};
use tracing::trace;

use crate::error::{excerpt, LicenseError};
use crate::extract::lines::{walk_lines_backward, walk_lines_forward};
use crate::extract::markers::{COPYRIGHT_START, COPYRIGHT_WORD, OTHER_LICENSE};
use crate::extract::split::split_license;
use crate::normalize::{normalize, strip_decoration};

/// A pattern match widened to its whole comment block.
///
/// `[start, split)` holds the copyright lines found above the match and
/// `[split, end)` the matched text itself.
#[derive(Debug)]
pub struct PartialLicenseMatch<'t> {
    text: &'t str,
    pub start: usize,
    pub split: usize,
    pub end: usize,
    pub has_copyrights: bool,
    captures: Captures<'t>,
}

impl<'t> PartialLicenseMatch<'t> {
    pub fn entire_license(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    pub fn copyrights(&self) -> &'t str {
        &self.text[self.start..self.split]
    }

    pub fn conditions(&self) -> &'t str {
        &self.text[self.split..self.end]
    }

    /// A named capture of the originating pattern, if it participated.
    pub fn group(&self, name: &str) -> Option<&'t str> {
        self.captures.name(name).map(|m| m.as_str())
    }
}

/// Find every match of `pattern` in `text` and extend each one upwards over
/// the rest of its comment block, down to the first copyright line.
///
/// `pattern` must match from the start of a line. Its `prefix` and `indent`
/// named groups (both optional) give the decoration every line of the block
/// shares. With `needs_copyright`, a block without copyright lines is an
/// error; otherwise such a block starts at the match itself.
pub fn find_blocks<'t>(
    text: &'t str,
    pattern: &Regex,
    needs_copyright: bool,
) -> Result<Vec<PartialLicenseMatch<'t>>, LicenseError> {
    let mut blocks = Vec::new();
    for captures in pattern.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > 0 && text.as_bytes()[whole.start() - 1] != b'\n' {
            return Err(LicenseError::MisalignedMatch {
                offset: whole.start(),
                excerpt: excerpt(whole.as_str()),
            });
        }
        let full_prefix = format!(
            "{}{}",
            captures.name("prefix").map_or("", |m| m.as_str()),
            captures.name("indent").map_or("", |m| m.as_str())
        );

        let (scan_start, special_first_line) =
            scan_backward(text, whole.start(), &full_prefix, needs_copyright);
        let copyright_start =
            scan_forward(text, scan_start, whole.start(), &full_prefix, special_first_line);

        let start = match copyright_start {
            Some(start) => {
                check_copyrights(&text[start..whole.start()])?;
                start
            }
            None if needs_copyright => {
                return Err(LicenseError::MissingCopyright {
                    excerpt: excerpt(&text[scan_start..whole.end()]),
                });
            }
            None => whole.start(),
        };
        trace!(
            start,
            split = whole.start(),
            end = whole.end(),
            "found license block"
        );
        blocks.push(PartialLicenseMatch {
            text,
            start,
            split: whole.start(),
            end: whole.end(),
            has_copyrights: copyright_start.is_some(),
            captures,
        });
    }
    Ok(blocks)
}

/// Walk up from `from` over lines sharing `full_prefix`.
///
/// Returns the first line of the block and whether that line opens a comment
/// (and so needs its decoration stripped rather than the prefix removed).
fn scan_backward(
    text: &str,
    from: usize,
    full_prefix: &str,
    needs_copyright: bool,
) -> (usize, bool) {
    let marker = full_prefix.trim();
    let mut start = from;
    let mut last_was_blank = false;
    let mut found_non_blank = false;
    for range in walk_lines_backward(text, from) {
        let (line, closes_comment) = trim_comment_closer(range.value());
        if OTHER_LICENSE.is_match(line) {
            trace!(line, "stopped at another license");
            break;
        }
        let opener = line.trim_start();
        if line.trim().is_empty() || full_prefix.starts_with(line) {
            if last_was_blank && (found_non_blank || !needs_copyright) {
                break;
            }
            last_was_blank = true;
        } else if (!closes_comment && opener.starts_with("/*")) || opener.starts_with("<!--") {
            return (range.start, true);
        } else if line.starts_with(full_prefix) {
            last_was_blank = false;
            found_non_blank = true;
        } else if range.start == 0 && !marker.is_empty() && opener.starts_with(marker) {
            return (0, true);
        } else {
            break;
        }
        start = range.start;
    }
    (start, false)
}

/// Find the first line in `[from, to)` whose content opens a copyright
/// statement.
fn scan_forward(
    text: &str,
    from: usize,
    to: usize,
    full_prefix: &str,
    mut special_first_line: bool,
) -> Option<usize> {
    for range in walk_lines_forward(text, from, to) {
        let line = range.value();
        let content = if special_first_line {
            Some(strip_decoration(line).1)
        } else {
            line.strip_prefix(full_prefix)
        };
        special_first_line = false;
        if content.is_some_and(|content| COPYRIGHT_START.is_match(content.trim())) {
            return Some(range.start);
        }
    }
    None
}

/// The text between the first copyright line and the match must be nothing
/// but copyright statements.
fn check_copyrights(raw: &str) -> Result<(), LicenseError> {
    let copyrights = normalize(raw)?;
    let split = split_license(&copyrights, false)?;
    if !split.conditions().is_empty() {
        return Err(LicenseError::ConditionsInCopyright {
            excerpt: excerpt(&copyrights),
        });
    }
    if !COPYRIGHT_WORD.is_match(&copyrights) {
        return Err(LicenseError::MissingCopyright {
            excerpt: excerpt(&copyrights),
        });
    }
    Ok(())
}

/// Drop a trailing `*/` or `-->` from a line that has other content.
fn trim_comment_closer(line: &str) -> (&str, bool) {
    let trimmed = line.trim_end();
    let before = trimmed
        .strip_suffix("*/")
        .or_else(|| trimmed.strip_suffix("-->"));
    match before {
        Some(before) if !before.trim().trim_matches('*').trim().is_empty() => {
            (before.trim_end(), true)
        }
        _ => (line, false),
    }
}
