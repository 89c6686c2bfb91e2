use once_cell::sync::Lazy;
use regex::Regex;

use crate::license::LicenseType;

/// Fingerprints checked in priority order; the first hit wins.
///
/// Order matters: MPL tri-license blocks mention the GPL and LGPL, the LGPL
/// mentions the GPL, and the BSD advertising clause reads like an Apache
/// NOTICE line.
static FINGERPRINTS: Lazy<Vec<(LicenseType, Regex)>> = Lazy::new(|| {
    [
        (LicenseType::Mpl, r"(?i)Mozilla\s+Public\s+License"),
        (
            LicenseType::Lgpl,
            r"(?i)GNU\s+(?:Lesser|Library)\s+General\s+Public\s+License",
        ),
        (LicenseType::Gpl, r"(?i)GNU\s+(?:Affero\s+)?General\s+Public\s+License"),
        (LicenseType::Apache, r"(?i)Apache\s+License,?\s+Version\s+2\.0"),
        (LicenseType::Eclipse, r"(?i)Eclipse\s+Public\s+License"),
        (LicenseType::Afl, r"(?i)Academic\s+Free\s+License"),
        (LicenseType::Freetype, r"(?i)FreeType\s+(?:Project\s+)?License|\bFTL\.TXT\b"),
        (LicenseType::Ijg, r"(?i)Independent\s+JPEG\s+Group"),
        (
            LicenseType::Zlib,
            r"(?i)Altered\s+source\s+versions\s+must\s+be\s+plainly\s+marked",
        ),
        (
            LicenseType::Mit,
            r"(?i)Permission\s+is\s+hereby\s+granted,\s+free\s+of\s+charge",
        ),
        (
            LicenseType::Bsd,
            r"(?i)Redistribution\s+and\s+use\s+in\s+source\s+and\s+binary\s+forms",
        ),
        (
            LicenseType::ApacheNotice,
            r"(?i)This\s+product\s+includes\s+software\s+developed\s+(?:at|by)\s+The\s+Apache\s+Software\s+Foundation",
        ),
    ]
    .into_iter()
    .map(|(license_type, pattern)| (license_type, Regex::new(pattern).unwrap()))
    .collect()
});

/// Classify a license body by its text.
///
/// Returns `None` when the text carries no recognizable license fingerprint,
/// e.g. a bare copyright line.
pub fn classify_body(body: &str) -> Option<LicenseType> {
    FINGERPRINTS
        .iter()
        .find(|(_, pattern)| pattern.is_match(body))
        .map(|(license_type, _)| *license_type)
}
