//! The license data model.
//!
//! - [`License`]: an immutable, interned license body with its
//!   classification and expansion behavior ([`LicenseVariant`]).
//! - [`registry`]: the content-addressed store every license is created
//!   through.
//! - [`classifier`]: derives a [`LicenseType`] from license text.
//! - [`names`]: resolves family names used in references ("BSD-style").

pub mod classifier;
pub mod names;
pub mod registry;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{excerpt, LicenseError};
use crate::extract::split::split_license;
use crate::normalize::{is_normalized, normalize};

pub use classifier::classify_body;
pub use names::license_type_from_name;
pub use registry::LicenseRegistry;

static AUTHORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Copyright\b[^\n]*?\b(The [^\n]+? Authors)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseType {
    Unknown,
    Bsd,
    Gpl,
    Lgpl,
    Mpl,
    Afl,
    Mit,
    Freetype,
    Apache,
    ApacheNotice,
    Eclipse,
    Ijg,
    Zlib,
}

impl LicenseType {
    /// The expansion behavior every license of this type must have.
    pub fn variant_kind(self) -> VariantKind {
        match self {
            LicenseType::Bsd | LicenseType::Mit | LicenseType::Zlib => VariantKind::Template,
            LicenseType::Unknown | LicenseType::ApacheNotice => VariantKind::Unique,
            _ => VariantKind::Message,
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LicenseType::Unknown => "unknown",
            LicenseType::Bsd => "bsd",
            LicenseType::Gpl => "gpl",
            LicenseType::Lgpl => "lgpl",
            LicenseType::Mpl => "mpl",
            LicenseType::Afl => "afl",
            LicenseType::Mit => "mit",
            LicenseType::Freetype => "freetype",
            LicenseType::Apache => "apache",
            LicenseType::ApacheNotice => "apache-notice",
            LicenseType::Eclipse => "eclipse",
            LicenseType::Ijg => "ijg",
            LicenseType::Zlib => "zlib",
        };
        write!(f, "{name}")
    }
}

/// The tag of a [`LicenseVariant`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Message,
    Template,
    Unique,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Message => "message",
            VariantKind::Template => "template",
            VariantKind::Unique => "unique",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a license combines with a copyright found elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseVariant {
    /// Shown verbatim; the copyright becomes its own license.
    Message,
    /// Boilerplate whose conditions are re-attached to any copyright.
    Template { conditions: String },
    /// Cannot be combined with another copyright.
    Unique,
}

impl LicenseVariant {
    pub fn kind(&self) -> VariantKind {
        match self {
            LicenseVariant::Message => VariantKind::Message,
            LicenseVariant::Template { .. } => VariantKind::Template,
            LicenseVariant::Unique => VariantKind::Unique,
        }
    }
}

/// A canonical license body. Only [`LicenseRegistry`] creates these.
#[derive(Debug)]
pub struct License {
    body: String,
    license_type: LicenseType,
    authors: Option<String>,
    origin: String,
    variant: LicenseVariant,
    licensees: Mutex<Vec<String>>,
    used_as_template: AtomicBool,
}

impl License {
    /// Validate and build a license. `body` must already be normalized.
    fn new(
        body: String,
        license_type: LicenseType,
        kind: VariantKind,
        origin: &str,
    ) -> Result<Self, LicenseError> {
        if !is_normalized(&body) {
            return Err(LicenseError::NotNormalized {
                excerpt: excerpt(&body),
            });
        }
        let expected = license_type.variant_kind();
        if kind != expected {
            return Err(LicenseError::VariantMismatch {
                license_type,
                expected: expected.as_str(),
                requested: kind.as_str(),
            });
        }
        if let Some(derived) = classify_body(&body) {
            if derived != license_type {
                return Err(LicenseError::TypeMismatch {
                    declared: license_type,
                    derived,
                    excerpt: excerpt(&body),
                });
            }
        }
        if looks_misencoded(&body) {
            return Err(LicenseError::MisencodedBody {
                excerpt: excerpt(&body),
            });
        }
        let authors = extract_authors(&body)?;
        let variant = match kind {
            VariantKind::Message => LicenseVariant::Message,
            VariantKind::Unique => LicenseVariant::Unique,
            VariantKind::Template => LicenseVariant::Template {
                conditions: split_license(&body, true)?.conditions().to_string(),
            },
        };
        Ok(Self {
            body,
            license_type,
            authors,
            origin: origin.to_string(),
            variant,
            licensees: Mutex::new(Vec::new()),
            used_as_template: AtomicBool::new(false),
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn license_type(&self) -> LicenseType {
        self.license_type
    }

    pub fn authors(&self) -> Option<&str> {
        self.authors.as_deref()
    }

    /// The file whose scan first produced this body.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn variant(&self) -> &LicenseVariant {
        &self.variant
    }

    /// Record that `filename` is governed by this license. Repeat marks
    /// accumulate.
    pub fn mark_used(&self, filename: &str) {
        self.licensees.lock().push(filename.to_string());
    }

    pub fn licensees(&self) -> Vec<String> {
        self.licensees.lock().clone()
    }

    pub fn is_used(&self) -> bool {
        self.used_as_template.load(Ordering::Relaxed) || !self.licensees.lock().is_empty()
    }

    /// Combine this license with a copyright discovered elsewhere.
    ///
    /// Message licenses yield a copyright-only license followed by
    /// themselves; templates yield one license joining `copyright` to their
    /// conditions; unique licenses refuse.
    pub fn expand(
        self: &Arc<Self>,
        registry: &LicenseRegistry,
        copyright: &str,
        origin: &str,
    ) -> Result<Vec<Arc<License>>, LicenseError> {
        if let LicenseVariant::Unique = self.variant {
            return Err(LicenseError::UniqueExpansion {
                license_type: self.license_type,
                excerpt: excerpt(&self.body),
            });
        }
        match normalize(copyright) {
            Ok(normalized) if !normalized.is_empty() => {}
            Ok(_) | Err(LicenseError::EmptyAfterNormalize { .. }) => {
                return Err(LicenseError::EmptyCopyright)
            }
            Err(err) => return Err(err),
        }
        match &self.variant {
            LicenseVariant::Template { conditions } => {
                let expanded = registry.from_copyright_and_conditions(
                    copyright,
                    conditions,
                    self.license_type,
                    origin,
                )?;
                self.used_as_template.store(true, Ordering::Relaxed);
                Ok(vec![expanded])
            }
            _ => {
                let copyright = registry.unique(copyright, LicenseType::Unknown, origin)?;
                Ok(vec![copyright, Arc::clone(self)])
            }
        }
    }
}

fn extract_authors(body: &str) -> Result<Option<String>, LicenseError> {
    let candidates: Vec<String> = AUTHORS
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.into_iter().next()),
        _ => Err(LicenseError::AmbiguousAuthors { candidates }),
    }
}

/// Text that went through a lossy decode (`\u{FFFD}`), or whose characters
/// all fit in one byte while those bytes also read as UTF-8 (`Â©`), was
/// decoded with the wrong charset somewhere upstream.
fn looks_misencoded(body: &str) -> bool {
    if body.contains(char::REPLACEMENT_CHARACTER) {
        return true;
    }
    if body.is_ascii() || body.chars().any(|c| u32::from(c) > 0xFF) {
        return false;
    }
    let bytes: Vec<u8> = body.chars().map(|c| u32::from(c) as u8).collect();
    std::str::from_utf8(&bytes).is_ok()
}
