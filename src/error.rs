//! Structured failures for license detection.
//!
//! Every failure is fatal to the detection of one file. [`LicenseError`] carries
//! the typed details (offsets, excerpts, names, match lists) and
//! [`LicenseError::category`] lets callers branch on the broad kind of problem.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::license::LicenseType;

/// Maximum number of characters kept in an error excerpt.
const EXCERPT_LEN: usize = 240;

/// Broad classes of detection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// Text reformatted to nothing or a block could not be delimited.
    Structural,
    /// Declared and derived license facts disagree.
    Classification,
    /// A referenced license could not be found.
    Resolution,
    /// Copyright or author lines were not shaped as expected.
    Shape,
    /// The combined match set does not explain the file.
    Orchestration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Structural => write!(f, "structural"),
            ErrorCategory::Classification => write!(f, "classification"),
            ErrorCategory::Resolution => write!(f, "resolution"),
            ErrorCategory::Shape => write!(f, "shape"),
            ErrorCategory::Orchestration => write!(f, "orchestration"),
        }
    }
}

/// One match as reported inside an overlap failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub start: usize,
    pub end: usize,
    pub debug: String,
    pub duplicate: bool,
    pub excerpt: String,
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}) {}{}: {:?}",
            self.start,
            self.end,
            self.debug,
            if self.duplicate { " (duplicate)" } else { "" },
            self.excerpt
        )
    }
}

fn list_matches(matches: &[MatchSummary]) -> String {
    matches
        .iter()
        .map(|m| format!("\n  {m}"))
        .collect::<String>()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LicenseError {
    // structural
    #[error("text reformatted to nothing: {excerpt:?}")]
    EmptyAfterNormalize { excerpt: String },

    #[error("license pattern matched at offset {offset}, which is not the start of a line: {excerpt:?}")]
    MisalignedMatch { offset: usize, excerpt: String },

    // classification
    #[error("license body is not in normalized form: {excerpt:?}")]
    NotNormalized { excerpt: String },

    #[error("license declared as {declared} but its text reads as {derived}: {excerpt:?}")]
    TypeMismatch {
        declared: LicenseType,
        derived: LicenseType,
        excerpt: String,
    },

    #[error("{license_type} licenses must be {expected} licenses, not {requested}")]
    VariantMismatch {
        license_type: LicenseType,
        expected: &'static str,
        requested: &'static str,
    },

    #[error("license body already registered as {existing}, cannot register it as {declared}: {excerpt:?}")]
    ConflictingRegistration {
        existing: LicenseType,
        declared: LicenseType,
        excerpt: String,
    },

    #[error("ambiguous author attribution, found {candidates:?}")]
    AmbiguousAuthors { candidates: Vec<String> },

    #[error("license text looks mis-encoded: {excerpt:?}")]
    MisencodedBody { excerpt: String },

    #[error("file is not valid UTF-8 at byte {offset}: {excerpt:?}")]
    UndecodableText { offset: usize, excerpt: String },

    // resolution
    #[error("no default license found for this file: {excerpt:?}")]
    NoDefaultLicense { excerpt: String },

    #[error("could not find a license named {name:?} (authors {authors:?})")]
    UnresolvedName {
        name: String,
        authors: Option<String>,
    },

    #[error("unrecognized license family name {name:?}")]
    UnknownTypeName { name: String },

    #[error("could not find a nearby {license_type} license")]
    UnresolvedType { license_type: LicenseType },

    #[error("unknown license URL {url:?} (version {version:?})")]
    UnresolvedUrl {
        url: String,
        version: Option<String>,
    },

    #[error("forward reference names {named} but the file's license is {found}")]
    UnexpectedForwardReference {
        named: LicenseType,
        found: LicenseType,
    },

    // shape
    #[error("missing author after author marker: {excerpt:?}")]
    MissingAuthor { excerpt: String },

    #[error("author list is not consistently indented: {excerpt:?}")]
    RaggedAuthorList { excerpt: String },

    #[error("unexpected blank line inside a copyright statement: {excerpt:?}")]
    UnexpectedBlankLine { excerpt: String },

    #[error("text ended inside a copyright statement: {excerpt:?}")]
    UnexpectedEnd { excerpt: String },

    #[error("license seems to contain a copyright: {excerpt:?}")]
    CopyrightInConditions { excerpt: String },

    #[error("potential license text caught in copyright block: {excerpt:?}")]
    ConditionsInCopyright { excerpt: String },

    #[error("could not find copyright before license block: {excerpt:?}")]
    MissingCopyright { excerpt: String },

    #[error("copyright text is empty after reformatting")]
    EmptyCopyright,

    // orchestration
    #[error("overlapping license matches:{}", list_matches(.matches))]
    OverlappingMatches { matches: Vec<MatchSummary> },

    #[error("unexplained copyright or license text at offset {offset}: {excerpt:?}")]
    UnexplainedText { offset: usize, excerpt: String },

    #[error("found copyright with no license: {excerpt:?}")]
    UnlicensedCopyright { excerpt: String },

    #[error("{license_type} license cannot be combined with another copyright: {excerpt:?}")]
    UniqueExpansion {
        license_type: LicenseType,
        excerpt: String,
    },
}

impl LicenseError {
    pub fn category(&self) -> ErrorCategory {
        use LicenseError::*;
        match self {
            EmptyAfterNormalize { .. } | MisalignedMatch { .. } => ErrorCategory::Structural,
            NotNormalized { .. }
            | TypeMismatch { .. }
            | VariantMismatch { .. }
            | ConflictingRegistration { .. }
            | AmbiguousAuthors { .. }
            | MisencodedBody { .. }
            | UndecodableText { .. } => ErrorCategory::Classification,
            NoDefaultLicense { .. }
            | UnresolvedName { .. }
            | UnknownTypeName { .. }
            | UnresolvedType { .. }
            | UnresolvedUrl { .. }
            | UnexpectedForwardReference { .. } => ErrorCategory::Resolution,
            MissingAuthor { .. }
            | RaggedAuthorList { .. }
            | UnexpectedBlankLine { .. }
            | UnexpectedEnd { .. }
            | CopyrightInConditions { .. }
            | ConditionsInCopyright { .. }
            | MissingCopyright { .. }
            | EmptyCopyright => ErrorCategory::Shape,
            OverlappingMatches { .. }
            | UnexplainedText { .. }
            | UnlicensedCopyright { .. }
            | UniqueExpansion { .. } => ErrorCategory::Orchestration,
        }
    }
}

/// A failed detection for one file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{filename}: {error}")]
pub struct DetectionError {
    pub filename: String,
    #[source]
    pub error: LicenseError,
}

impl DetectionError {
    pub fn category(&self) -> ErrorCategory {
        self.error.category()
    }
}

/// Shorten `text` for inclusion in an error message.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_long_text() {
        let long = "x".repeat(1000);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), EXCERPT_LEN + 1);
        assert!(short.ends_with('…'));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            LicenseError::EmptyCopyright.category(),
            ErrorCategory::Shape
        );
        assert_eq!(
            LicenseError::OverlappingMatches { matches: vec![] }.category(),
            ErrorCategory::Orchestration
        );
        assert_eq!(
            LicenseError::UnknownTypeName { name: "x".into() }.category(),
            ErrorCategory::Resolution
        );
    }

    #[test]
    fn test_overlap_message_lists_every_match() {
        let err = LicenseError::OverlappingMatches {
            matches: vec![
                MatchSummary {
                    start: 0,
                    end: 10,
                    debug: "inline".into(),
                    duplicate: false,
                    excerpt: "a".into(),
                },
                MatchSummary {
                    start: 5,
                    end: 20,
                    debug: "reference".into(),
                    duplicate: false,
                    excerpt: "b".into(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("[0..10) inline"));
        assert!(message.contains("[5..20) reference"));
    }
}
