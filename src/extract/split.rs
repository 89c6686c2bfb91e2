use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{excerpt, LicenseError};
use crate::extract::lines::{walk_lines_forward, LineRange};
use crate::extract::markers::COPYRIGHT_MENTION;

/// A marker line followed by exactly one author line.
static AUTHOR_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:author|written by|(?:this code is )?derived from software contributed to berkeley by|the initial developer of the original code is)\s*:?$",
    )
    .unwrap()
});

/// A marker line followed by an indented list of authors.
static AUTHORS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:authors|(?:other )?contributors)\s*:$").unwrap());

/// "Copyright (c) 1999, 2000," with the holders on the following lines.
static HALF_COPYRIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^copyright(?:\s*(?:\(c\)|©))?(?:[\s,-]*\d{4})*[\s,]*(?:by)?[\s,:]*$").unwrap()
});

/// Lines that can appear in a run of copyright statements.
static COPYRIGHT_STATEMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^$",
        r"(?i)^copyright\b",
        r"(?i)^(?:\(c\)|©)",
        r"(?i)^all rights reserved\.?$",
        r"(?i)^portions\b.*\b(?:copyright|created by|contributed by)\b",
        r"(?i)^(?:(?:originally |initially )?(?:written|contributed|modified|developed|created|maintained)|ported) by\b",
        r"(?i)^authors?:\s*\S",
        r"^<?[\w.+-]+@[\w-]+(?:\.[\w-]+)+>?[,.]?$",
        r"(?i)^<?(?:https?://|www\.)\S+$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// A license body divided into its leading copyright lines and its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLicense<'b> {
    body: &'b str,
    split: usize,
}

impl<'b> SplitLicense<'b> {
    pub fn copyright(&self) -> &'b str {
        self.body[..self.split].trim_end()
    }

    pub fn conditions(&self) -> &'b str {
        &self.body[self.split..]
    }

    /// Byte offset of the first conditions line.
    pub fn split(&self) -> usize {
        self.split
    }
}

/// Split a normalized `body` at the first line that is not part of its
/// leading copyright statements.
///
/// With `verify_results`, conditions that still contain a copyright
/// statement are rejected.
pub fn split_license(body: &str, verify_results: bool) -> Result<SplitLicense<'_>, LicenseError> {
    let lines: Vec<LineRange<'_>> = walk_lines_forward(body, 0, body.len()).collect();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index].value().trim();

        if AUTHOR_MARKER.is_match(line) {
            let author = lines.get(index + 1).ok_or_else(|| LicenseError::UnexpectedEnd {
                excerpt: excerpt(line),
            })?;
            if author.value().trim().is_empty() {
                return Err(LicenseError::MissingAuthor {
                    excerpt: excerpt(line),
                });
            }
            index += 2;
            continue;
        }

        if AUTHORS_MARKER.is_match(line) {
            index = skip_author_list(&lines, index + 1, line)?;
            continue;
        }

        if HALF_COPYRIGHT.is_match(line) {
            index += 1;
            loop {
                let holder = lines.get(index).ok_or_else(|| LicenseError::UnexpectedEnd {
                    excerpt: excerpt(line),
                })?;
                let holder = holder.value().trim();
                if holder.is_empty() {
                    return Err(LicenseError::UnexpectedBlankLine {
                        excerpt: excerpt(line),
                    });
                }
                index += 1;
                if !holder.ends_with(',') {
                    break;
                }
            }
            continue;
        }

        if COPYRIGHT_STATEMENTS.iter().any(|pattern| pattern.is_match(line)) {
            index += 1;
            continue;
        }
        break;
    }

    let split = lines.get(index).map_or(body.len(), |line| line.start);
    let result = SplitLicense { body, split };
    if verify_results && COPYRIGHT_MENTION.is_match(result.conditions()) {
        return Err(LicenseError::CopyrightInConditions {
            excerpt: excerpt(result.conditions()),
        });
    }
    Ok(result)
}

/// Skip an author list whose entries share the first entry's indentation.
/// Returns the index of the first line after the list.
fn skip_author_list(
    lines: &[LineRange<'_>],
    first: usize,
    marker: &str,
) -> Result<usize, LicenseError> {
    let head = lines.get(first).ok_or_else(|| LicenseError::UnexpectedEnd {
        excerpt: excerpt(marker),
    })?;
    let head = head.value();
    if head.trim().is_empty() {
        return Err(LicenseError::MissingAuthor {
            excerpt: excerpt(marker),
        });
    }
    let indent = leading_whitespace(head);
    let mut index = first + 1;
    while let Some(line) = lines.get(index) {
        let value = line.value();
        if value.trim().is_empty() {
            break;
        }
        let line_indent = leading_whitespace(value);
        if line_indent == indent {
            index += 1;
        } else if line_indent.len() > indent.len() {
            return Err(LicenseError::RaggedAuthorList {
                excerpt: excerpt(value),
            });
        } else {
            break;
        }
    }
    Ok(index)
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
