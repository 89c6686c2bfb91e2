//! Canonicalization of raw comment text into license bodies.
//!
//! [`normalize`] strips comment decoration, unifies indentation, and trims
//! blank runs. The result is a fixed point: normalizing it again yields the
//! same text, which is what lets license bodies serve as identity keys.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{excerpt, LicenseError};

/// Splits a line into its comment decoration and its content.
static STRIP_DECORATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:[ \t]*(?:/\*+/?|\*+/|\*+|//+!?|#+!?|--+|;+|%+|<!--|-->|REM\b|dnl\b))*[ \t]*)(.*?)[ \t]*(?:\*+/|-->)?[ \t]*$",
    )
    .unwrap()
});

static BEGIN_LICENSE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\W*BEGIN LICENSE BLOCK\W*$").unwrap());

static END_LICENSE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\W*END LICENSE BLOCK\W*$").unwrap());

/// Split `line` into `(decoration prefix, content)`.
///
/// Trailing block-comment closers and whitespace are dropped from the content.
pub fn strip_decoration(line: &str) -> (&str, &str) {
    match STRIP_DECORATIONS.captures(line) {
        Some(caps) => {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let content = caps.get(2).map_or("", |m| m.as_str());
            (prefix, content)
        }
        None => ("", line.trim()),
    }
}

/// Canonicalize `text` into a license body.
///
/// Blank input normalizes to the empty string; any other input that
/// reformats to nothing is an error.
pub fn normalize(text: &str) -> Result<String, LicenseError> {
    let mut current = reformat_once(text);
    loop {
        if current.is_empty() {
            if text.trim().is_empty() {
                return Ok(current);
            }
            return Err(LicenseError::EmptyAfterNormalize {
                excerpt: excerpt(text),
            });
        }
        // Each pass only ever removes text, so this settles.
        let next = reformat_once(&current);
        if next == current {
            return Ok(current);
        }
        current = next;
    }
}

/// True when `text` is already in normalized form.
pub fn is_normalized(text: &str) -> bool {
    matches!(normalize(text), Ok(normalized) if normalized == text)
}

fn reformat_once(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() >= 3
        && BEGIN_LICENSE_BLOCK.is_match(lines[0])
        && END_LICENSE_BLOCK.is_match(lines[lines.len() - 1])
    {
        lines.remove(0);
        lines.pop();
    }

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut narrowest: Option<&str> = None;
    let mut last_was_blank = true;
    let mut last_good = 0;
    for line in lines {
        let (prefix, content) = strip_decoration(line);
        if content.is_empty() {
            if !last_was_blank {
                output.push(String::new());
            }
            last_was_blank = true;
            continue;
        }
        let content = match narrowest {
            None => {
                narrowest = Some(prefix);
                content.to_string()
            }
            // extra indentation past the block's prefix is part of the text
            Some(known) if prefix.len() > known.len() => {
                format!("{}{}", &prefix[known.len()..], content)
            }
            Some(known) if prefix.len() < known.len() => {
                narrowest = Some(prefix);
                content.to_string()
            }
            Some(_) => content.to_string(),
        };
        output.push(content);
        last_was_blank = false;
        last_good = output.len();
    }
    output.truncate(last_good);
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(input: &str) {
        let once = normalize(input).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice, "not idempotent for {input:?}");
    }

    #[test]
    fn test_strips_line_comments() {
        let input = "// Copyright 2020 Foo Corp.\n//\n// Permission is granted.\n";
        assert_eq!(
            normalize(input).unwrap(),
            "Copyright 2020 Foo Corp.\n\nPermission is granted."
        );
    }

    #[test]
    fn test_strips_block_comments() {
        let input = "/*\n * Copyright 2020 Foo Corp.\n *\n * All rights reserved.\n */\n";
        assert_eq!(
            normalize(input).unwrap(),
            "Copyright 2020 Foo Corp.\n\nAll rights reserved."
        );
    }

    #[test]
    fn test_single_line_block_comment() {
        assert_eq!(
            normalize("/* Copyright 2020 Foo Corp. */").unwrap(),
            "Copyright 2020 Foo Corp."
        );
    }

    #[test]
    fn test_keeps_extra_indentation() {
        let input = "# Authors:\n#   Jane Doe\n#   John Roe\n";
        assert_eq!(normalize(input).unwrap(), "Authors:\n  Jane Doe\n  John Roe");
    }

    #[test]
    fn test_collapses_blank_runs() {
        let input = "\n\n// a\n//\n//\n//\n// b\n//\n\n";
        assert_eq!(normalize(input).unwrap(), "a\n\nb");
    }

    #[test]
    fn test_drops_license_block_delimiters() {
        let input = "***** BEGIN LICENSE BLOCK *****\nVersion: MPL 1.1\n***** END LICENSE BLOCK *****";
        assert_eq!(normalize(input).unwrap(), "Version: MPL 1.1");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize("").unwrap(), "");
        assert_eq!(normalize("  \n\n ").unwrap(), "");
    }

    #[test]
    fn test_decoration_only_fails() {
        let err = normalize("////\n/**/\n").unwrap_err();
        assert!(matches!(err, LicenseError::EmptyAfterNormalize { .. }));
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "// Copyright 2020 Foo Corp.\n//\n// Permission is granted.\n",
            "/*\n * * bullet one\n * * bullet two\n */",
            "  # a\n#     b\n   #  c",
            "* leading star\n  indented\n-- dashes\nplain",
            "///! doc\n//// deeper\n// shallower",
            "REM Copyright 1999\nREM   Foo",
        ] {
            assert_idempotent(input);
        }
    }

    #[test]
    fn test_is_normalized() {
        assert!(is_normalized("Copyright 2020 Foo Corp."));
        assert!(!is_normalized("// Copyright 2020 Foo Corp."));
        assert!(!is_normalized("a\n\n\nb"));
    }

    #[test]
    fn test_strip_decoration() {
        assert_eq!(strip_decoration(" * hello */"), (" * ", "hello"));
        assert_eq!(strip_decoration("# hi"), ("# ", "hi"));
        assert_eq!(strip_decoration("plain"), ("", "plain"));
    }
}
