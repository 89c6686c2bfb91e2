use std::sync::Arc;

use serde::Serialize;

use crate::error::{excerpt, DetectionError, ErrorCategory};
use crate::license::{License, LicenseType, VariantKind};
use crate::strategy::LicenseMatch;

/// Everything one run found, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
    /// Every canonical license the run registered.
    pub licenses: Vec<RegisteredLicense>,
}

impl ScanReport {
    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Failed)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub status: FileStatus,
    pub matches: Vec<MatchRecord>,
    pub error: Option<ErrorRecord>,
}

impl FileReport {
    pub fn from_result(filename: &str, result: Result<Vec<LicenseMatch>, DetectionError>) -> Self {
        match result {
            Ok(matches) => FileReport {
                filename: filename.to_string(),
                status: if matches.is_empty() {
                    FileStatus::Unlicensed
                } else {
                    FileStatus::Licensed
                },
                matches: matches.iter().map(MatchRecord::from).collect(),
                error: None,
            },
            Err(err) => FileReport {
                filename: filename.to_string(),
                status: FileStatus::Failed,
                matches: Vec::new(),
                error: Some(ErrorRecord {
                    category: err.category(),
                    message: err.error.to_string(),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Licensed,
    /// Nothing license-like was found.
    Unlicensed,
    Failed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Licensed => write!(f, "licensed"),
            FileStatus::Unlicensed => write!(f, "no license"),
            FileStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub start: usize,
    pub end: usize,
    pub strategy: String,
    pub duplicate: bool,
    pub licenses: Vec<LicenseRecord>,
}

impl From<&LicenseMatch> for MatchRecord {
    fn from(m: &LicenseMatch) -> Self {
        MatchRecord {
            start: m.start,
            end: m.end,
            strategy: m.debug.to_string(),
            duplicate: m.is_duplicate,
            licenses: m.licenses.iter().map(|l| LicenseRecord::from(l.as_ref())).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseRecord {
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    pub variant: VariantKind,
    pub authors: Option<String>,
    /// First line of the body.
    pub headline: String,
}

impl From<&License> for LicenseRecord {
    fn from(license: &License) -> Self {
        LicenseRecord {
            license_type: license.license_type(),
            variant: license.variant().kind(),
            authors: license.authors().map(str::to_string),
            headline: headline(license.body()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredLicense {
    #[serde(flatten)]
    pub license: LicenseRecord,
    pub origin: String,
    pub used: bool,
    pub licensees: Vec<String>,
}

impl From<&Arc<License>> for RegisteredLicense {
    fn from(license: &Arc<License>) -> Self {
        RegisteredLicense {
            license: LicenseRecord::from(license.as_ref()),
            origin: license.origin().to_string(),
            used: license.is_used(),
            licensees: license.licensees(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub message: String,
}

fn headline(body: &str) -> String {
    excerpt(body.lines().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseError;
    use crate::license::LicenseRegistry;

    #[test]
    fn test_failed_file_report() {
        let err = DetectionError {
            filename: "a.c".to_string(),
            error: LicenseError::UnlicensedCopyright {
                excerpt: "Copyright 2020 Foo".to_string(),
            },
        };
        let report = FileReport::from_result("a.c", Err(err));
        assert_eq!(report.status, FileStatus::Failed);
        let error = report.error.unwrap();
        assert_eq!(error.category, ErrorCategory::Orchestration);
        assert!(error.message.contains("found copyright with no license"));
    }

    #[test]
    fn test_match_record_json() {
        let registry = LicenseRegistry::new();
        let license = registry
            .unique("Thanks to Jane Doe.\nAnd friends.", LicenseType::Unknown, "a.c")
            .unwrap();
        let m = LicenseMatch::new(vec![license], 0, 20, "attribution");
        let report = FileReport::from_result("a.c", Ok(vec![m]));
        assert_eq!(report.status, FileStatus::Licensed);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "licensed");
        assert_eq!(json["matches"][0]["strategy"], "attribution");
        assert_eq!(json["matches"][0]["licenses"][0]["type"], "unknown");
        assert_eq!(json["matches"][0]["licenses"][0]["variant"], "unique");
        assert_eq!(json["matches"][0]["licenses"][0]["headline"], "Thanks to Jane Doe.");
    }

    #[test]
    fn test_registered_license_tracks_licensees() {
        let registry = LicenseRegistry::new();
        let license = registry.from_body("Thanks to Jane Doe.", "LICENSE").unwrap();
        license.mark_used("a.c");
        license.mark_used("b.c");
        let record = RegisteredLicense::from(&license);
        assert!(record.used);
        assert_eq!(record.licensees, vec!["a.c", "b.c"]);
        assert_eq!(record.origin, "LICENSE");
    }
}
