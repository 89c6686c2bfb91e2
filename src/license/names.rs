use crate::error::LicenseError;
use crate::license::LicenseType;

/// Resolve a license family name, as it appears in a reference such as
/// "governed by a BSD-style license", to a [`LicenseType`].
///
/// Matching ignores case, a leading "the"/"GNU", and trailing "-style" or
/// "license" words.
pub fn license_type_from_name(name: &str) -> Result<LicenseType, LicenseError> {
    let lowered = name.trim().to_lowercase();
    let mut key = lowered.as_str();
    for prefix in ["the ", "gnu "] {
        key = key.strip_prefix(prefix).unwrap_or(key);
    }
    for suffix in [" license", "-style", " style"] {
        key = key.strip_suffix(suffix).unwrap_or(key).trim();
    }

    let license_type = match key {
        "bsd" | "new bsd" | "modified bsd" | "3-clause bsd" | "2-clause bsd" => LicenseType::Bsd,
        "mit" | "expat" | "x11" => LicenseType::Mit,
        "apache" | "apache 2.0" | "apache-2.0" | "apache2" => LicenseType::Apache,
        "gpl" | "general public" | "gplv2" | "gplv3" => LicenseType::Gpl,
        "lgpl" | "lesser general public" | "library general public" => LicenseType::Lgpl,
        "mpl" | "mozilla" | "mozilla public" => LicenseType::Mpl,
        "afl" | "academic free" => LicenseType::Afl,
        "freetype" | "ftl" => LicenseType::Freetype,
        "eclipse" | "epl" | "eclipse public" => LicenseType::Eclipse,
        "ijg" | "independent jpeg group" => LicenseType::Ijg,
        "zlib" | "zlib/libpng" => LicenseType::Zlib,
        _ => {
            return Err(LicenseError::UnknownTypeName {
                name: name.to_string(),
            })
        }
    };
    Ok(license_type)
}
