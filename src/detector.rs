use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalogue::PatternCatalogue;
use crate::config::DetectionConfig;
use crate::error::{excerpt, DetectionError, LicenseError};
use crate::extract::markers::{COPYRIGHT_MENTION, LICENSE_FRAGMENT};
use crate::license::{License, LicenseRegistry};
use crate::source::LicenseSource;
use crate::strategy::{
    pipeline, ForwardReferenceStrategy, LicenseMatch, MatchContext, NoDefaultStrategy, Strategy,
};

/// Runs every strategy over a file and checks that together they explain it.
pub struct Detector {
    registry: Arc<LicenseRegistry>,
    catalogue: PatternCatalogue,
    config: DetectionConfig,
    strategies: Vec<Box<dyn Strategy + Send + Sync>>,
}

impl Detector {
    pub fn new(registry: Arc<LicenseRegistry>) -> Self {
        Self::with_config(registry, DetectionConfig::default())
    }

    pub fn with_config(registry: Arc<LicenseRegistry>, config: DetectionConfig) -> Self {
        let catalogue = PatternCatalogue::builtin().with_url_licenses(&config.url_licenses);
        Self {
            registry,
            catalogue,
            config,
            strategies: pipeline(),
        }
    }

    /// Replace the pattern catalogue.
    pub fn with_catalogue(mut self, catalogue: PatternCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    pub fn registry(&self) -> &Arc<LicenseRegistry> {
        &self.registry
    }

    pub fn catalogue(&self) -> &PatternCatalogue {
        &self.catalogue
    }

    /// The licenses governing `contents`, in file order. Licenses of
    /// duplicate matches are included.
    pub fn determine_licenses_for(
        &self,
        contents: &str,
        filename: &str,
        source: &dyn LicenseSource,
    ) -> Result<Vec<Arc<License>>, DetectionError> {
        let matches = self.determine_matches_for(contents, filename, source)?;
        Ok(matches.into_iter().flat_map(|m| m.licenses).collect())
    }

    /// Like [`Detector::determine_licenses_for`], keeping the range each
    /// strategy explained. Offsets refer to the prepared text (see
    /// [`prepare_text`]).
    pub fn determine_matches_for(
        &self,
        contents: &str,
        filename: &str,
        source: &dyn LicenseSource,
    ) -> Result<Vec<LicenseMatch>, DetectionError> {
        let truncated = contents.len() > self.config.max_prefix_bytes;
        self.detect(contents, truncated, filename, source)
    }

    /// Detection over raw file bytes. Only the scanned prefix has to be
    /// UTF-8; anything else in it fails as a classification error instead
    /// of being decoded lossily.
    pub fn determine_matches_for_bytes(
        &self,
        bytes: &[u8],
        filename: &str,
        source: &dyn LicenseSource,
    ) -> Result<Vec<LicenseMatch>, DetectionError> {
        let prefix = &bytes[..bytes.len().min(self.config.max_prefix_bytes)];
        let contents = match std::str::from_utf8(prefix) {
            Ok(contents) => contents,
            // a character cut in half by the prefix limit
            Err(err) if err.error_len().is_none() => {
                std::str::from_utf8(&prefix[..err.valid_up_to()]).unwrap_or_default()
            }
            Err(err) => {
                let offset = err.valid_up_to();
                let error = LicenseError::UndecodableText {
                    offset,
                    excerpt: excerpt(&String::from_utf8_lossy(byte_line_at(prefix, offset))),
                };
                return Err(failure(filename, error));
            }
        };
        self.detect(contents, bytes.len() > prefix.len(), filename, source)
    }

    fn detect(
        &self,
        contents: &str,
        truncated: bool,
        filename: &str,
        source: &dyn LicenseSource,
    ) -> Result<Vec<LicenseMatch>, DetectionError> {
        let text = prepare_text(contents, self.config.max_prefix_bytes, self.config.tab_width);
        let matches = self
            .find_matches(&text, truncated, filename, source)
            .map_err(|error| failure(filename, error))?;
        for license in matches.iter().flat_map(|m| &m.licenses) {
            license.mark_used(filename);
        }
        debug!(filename, matches = matches.len(), "detected licenses");
        Ok(matches)
    }

    fn find_matches(
        &self,
        text: &str,
        truncated: bool,
        filename: &str,
        source: &dyn LicenseSource,
    ) -> Result<Vec<LicenseMatch>, LicenseError> {
        let ctx = MatchContext {
            text,
            filename,
            source,
            registry: &self.registry,
            catalogue: &self.catalogue,
        };

        let mut matches = Vec::new();
        for strategy in &self.strategies {
            matches.extend(strategy.find(&ctx)?);
        }

        if matches.is_empty() {
            matches = NoDefaultStrategy::fallback().find(&ctx)?;
            if matches.is_empty() {
                if let Some(found) = COPYRIGHT_MENTION.find(text) {
                    return Err(LicenseError::UnlicensedCopyright {
                        excerpt: excerpt(line_at(text, found.start())),
                    });
                }
            }
        }

        if let [only] = matches.as_slice() {
            let forward = ForwardReferenceStrategy.find(&ctx, only)?;
            matches.extend(forward);
        }

        matches.sort_by_key(|m| (m.start, m.end));
        check_overlaps(text, &matches)?;
        check_gaps(text, &matches, truncated)?;
        Ok(matches)
    }
}

/// Cut `contents` to its first `max_bytes` (on a char boundary), unify line
/// endings, and expand tabs.
pub fn prepare_text(contents: &str, max_bytes: usize, tab_width: usize) -> String {
    let mut cut = max_bytes.min(contents.len());
    while !contents.is_char_boundary(cut) {
        cut -= 1;
    }
    contents[..cut]
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(tab_width))
}

/// Non-duplicate matches must not share any text.
fn check_overlaps(text: &str, matches: &[LicenseMatch]) -> Result<(), LicenseError> {
    let mut covered = 0;
    for m in matches.iter().filter(|m| !m.is_duplicate) {
        if m.start < covered {
            return Err(LicenseError::OverlappingMatches {
                matches: matches.iter().map(|m| m.summary(text)).collect(),
            });
        }
        covered = m.end;
    }
    Ok(())
}

/// Text outside the non-duplicate matches must not look like a copyright or
/// license nobody claimed. When the text was cut short, its final partial
/// line is left out.
fn check_gaps(text: &str, matches: &[LicenseMatch], truncated: bool) -> Result<(), LicenseError> {
    let mut cursor = 0;
    let mut gaps = Vec::new();
    for m in matches.iter().filter(|m| !m.is_duplicate) {
        if m.start > cursor {
            gaps.push(cursor..m.start);
        }
        cursor = cursor.max(m.end);
    }
    let tail_end = if truncated {
        text[cursor..].rfind('\n').map_or(cursor, |i| cursor + i + 1)
    } else {
        text.len()
    };
    if tail_end > cursor {
        gaps.push(cursor..tail_end);
    }

    for gap in gaps {
        let unexplained = &text[gap.clone()];
        if let Some(found) = COPYRIGHT_MENTION
            .find(unexplained)
            .or_else(|| LICENSE_FRAGMENT.find(unexplained))
        {
            let offset = gap.start + found.start();
            return Err(LicenseError::UnexplainedText {
                offset,
                excerpt: excerpt(line_at(text, offset)),
            });
        }
    }
    Ok(())
}

fn failure(filename: &str, error: LicenseError) -> DetectionError {
    warn!(filename, category = %error.category(), "license detection failed");
    DetectionError {
        filename: filename.to_string(),
        error,
    }
}

/// The whole line containing `offset`.
fn line_at(text: &str, offset: usize) -> &str {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    &text[start..end]
}

fn byte_line_at(bytes: &[u8], offset: usize) -> &[u8] {
    let start = bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let end = bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| offset + i);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::license::LicenseType;
    use crate::source::StaticLicenseSource;

    fn unique(registry: &LicenseRegistry, body: &str) -> Arc<License> {
        registry.unique(body, LicenseType::Unknown, "test").unwrap()
    }

    #[test]
    fn test_prepare_text() {
        assert_eq!(prepare_text("a\r\nb\rc\td", 100, 2), "a\nb\nc  d");
        assert_eq!(prepare_text("abcdef", 3, 1), "abc");
        // never split a character
        assert_eq!(prepare_text("a©b", 2, 1), "a");
    }

    #[test]
    fn test_line_at() {
        let text = "one\ntwo\nthree";
        assert_eq!(line_at(text, 5), "two");
        assert_eq!(line_at(text, 0), "one");
        assert_eq!(line_at(text, 10), "three");
    }

    #[test]
    fn test_overlap_reports_every_match() {
        let registry = LicenseRegistry::new();
        let license = unique(&registry, "Thanks to Jane.");
        let text = "0123456789";
        let matches = vec![
            LicenseMatch::new(vec![Arc::clone(&license)], 0, 5, "first"),
            LicenseMatch::new(vec![Arc::clone(&license)], 3, 8, "second"),
        ];
        match check_overlaps(text, &matches).unwrap_err() {
            LicenseError::OverlappingMatches { matches } => {
                assert_eq!(matches.len(), 2);
                assert_eq!((matches[0].start, matches[0].end), (0, 5));
                assert_eq!(matches[1].debug, "second");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicates_may_overlap() {
        let registry = LicenseRegistry::new();
        let license = unique(&registry, "Thanks to Jane.");
        let matches = vec![
            LicenseMatch::new(vec![Arc::clone(&license)], 0, 5, "first"),
            LicenseMatch::new(vec![license], 0, 5, "first").duplicate(),
        ];
        assert!(check_overlaps("0123456789", &matches).is_ok());
    }

    #[test]
    fn test_gap_with_copyright() {
        let registry = LicenseRegistry::new();
        let license = unique(&registry, "Thanks to Jane.");
        let text = "// Copyright 2020 Foo.\nint x;\n// Thanks to Jane.\n";
        let matches = vec![LicenseMatch::new(vec![license], 30, text.len(), "attribution")];
        let err = check_gaps(text, &matches, false).unwrap_err();
        assert_eq!(
            err,
            LicenseError::UnexplainedText {
                offset: 3,
                excerpt: "// Copyright 2020 Foo.".to_string()
            }
        );
    }

    #[test]
    fn test_gap_with_license_fragment() {
        let registry = LicenseRegistry::new();
        let license = unique(&registry, "Thanks to Jane.");
        let text = "// Permission is hereby granted to Jane.\n// Thanks to Jane.\n";
        let matches = vec![LicenseMatch::new(vec![license], 41, text.len(), "attribution")];
        match check_gaps(text, &matches, false).unwrap_err() {
            LicenseError::UnexplainedText { offset, excerpt } => {
                assert_eq!(offset, 3);
                assert_eq!(excerpt, "// Permission is hereby granted to Jane.");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_text_after_last_match_is_checked() {
        let registry = LicenseRegistry::new();
        let license = unique(&registry, "Thanks to Jane.");
        let text = "// Thanks to Jane.\n// Copyright 2020 Fo";
        let matches = vec![LicenseMatch::new(vec![license], 0, 19, "attribution")];
        assert!(matches!(
            check_gaps(text, &matches, false),
            Err(LicenseError::UnexplainedText { offset: 22, .. })
        ));
        // the line the prefix limit cut is not judged
        assert!(check_gaps(text, &matches, true).is_ok());
    }

    #[test]
    fn test_trailing_copyright_fails_detection() {
        let detector = Detector::new(Arc::new(LicenseRegistry::new()));
        let source = StaticLicenseSource::new();
        let text = "// Thanks to Jane Doe.\n\n// Copyright 2020 Foo Corp.\n// All rights reserved.\n";
        let err = detector
            .determine_licenses_for(text, "a.c", &source)
            .unwrap_err();
        assert_eq!(
            err.error,
            LicenseError::UnexplainedText {
                offset: 27,
                excerpt: "// Copyright 2020 Foo Corp.".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_uses_default_license() {
        let registry = Arc::new(LicenseRegistry::new());
        let default = registry.from_body("Thanks to everyone.", "LICENSE").unwrap();
        let source = StaticLicenseSource::new().with_default(Arc::clone(&default));
        let detector = Detector::new(Arc::clone(&registry));
        let text = "// This code is licensed to you.\nint x;\n";

        let matches = detector.determine_matches_for(text, "a.c", &source).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].debug, "fallback");
        assert_eq!((matches[0].start, matches[0].end), (0, 33));
        assert!(Arc::ptr_eq(&matches[0].licenses[0], &default));
        assert_eq!(default.licensees(), vec!["a.c"]);
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let detector = Detector::new(Arc::new(LicenseRegistry::new()));
        let source = StaticLicenseSource::new();
        let bytes = b"// Copyright \xa9 2020 Foo Corp.\n//\n// Permission is hereby granted, free of charge.\n";
        let err = detector
            .determine_matches_for_bytes(bytes, "latin1.c", &source)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Classification);
        assert_eq!(
            err.error,
            LicenseError::UndecodableText {
                offset: 13,
                excerpt: "// Copyright \u{fffd} 2020 Foo Corp.".to_string()
            }
        );
        assert!(detector.registry().is_empty());
    }

    #[test]
    fn test_bytes_cut_inside_a_character() {
        let registry = Arc::new(LicenseRegistry::new());
        let config = DetectionConfig {
            max_prefix_bytes: 14,
            ..DetectionConfig::default()
        };
        let detector = Detector::with_config(registry, config);
        let source = StaticLicenseSource::new();
        // the limit falls between the two bytes of "©"
        let bytes = "fn main() {}\n\u{a9}\n".as_bytes();
        assert!(detector
            .determine_matches_for_bytes(bytes, "main.rs", &source)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_file_has_no_licenses() {
        let detector = Detector::new(Arc::new(LicenseRegistry::new()));
        let source = StaticLicenseSource::new();
        let licenses = detector
            .determine_licenses_for("fn main() {}\n", "main.rs", &source)
            .unwrap();
        assert!(licenses.is_empty());
    }

    #[test]
    fn test_only_prefix_is_scanned() {
        let registry = Arc::new(LicenseRegistry::new());
        let config = DetectionConfig {
            max_prefix_bytes: 16,
            ..DetectionConfig::default()
        };
        let detector = Detector::with_config(registry, config);
        let source = StaticLicenseSource::new();
        let contents = "fn main() {}\n\n\n// Copyright 2020 Foo Corp.\n";
        assert!(detector
            .determine_licenses_for(contents, "main.rs", &source)
            .unwrap()
            .is_empty());
    }
}
