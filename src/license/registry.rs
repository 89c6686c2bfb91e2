use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{excerpt, LicenseError};
use crate::license::{classify_body, License, LicenseType, VariantKind};
use crate::normalize::normalize;

/// Content-addressed store of every [`License`] seen during a run.
///
/// Identical normalized bodies always resolve to the same instance. Lookups
/// and insertions are serialized by one lock so concurrent detections of the
/// same body converge on a single canonical license.
#[derive(Debug, Default)]
pub struct LicenseRegistry {
    licenses: Mutex<HashMap<String, Arc<License>>>,
}

impl LicenseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the license for `body`, declared as `license_type` with
    /// the expansion behavior `kind`.
    pub fn intern(
        &self,
        body: &str,
        license_type: LicenseType,
        kind: VariantKind,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        let body = normalize(body)?;
        if body.is_empty() {
            return Err(LicenseError::EmptyAfterNormalize {
                excerpt: String::new(),
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

        let mut licenses = self.licenses.lock();
        if let Some(existing) = licenses.get(&body) {
            if existing.license_type() != license_type {
                return Err(LicenseError::ConflictingRegistration {
                    existing: existing.license_type(),
                    declared: license_type,
                    excerpt: excerpt(&body),
                });
            }
            return Ok(Arc::clone(existing));
        }

        let license = Arc::new(License::new(body.clone(), license_type, kind, origin)?);
        debug!(%license_type, %kind, origin, "registered new license");
        licenses.insert(body, Arc::clone(&license));
        Ok(license)
    }

    /// Get or create a license whose expansion behavior follows from its type.
    pub fn from_body_and_type(
        &self,
        body: &str,
        license_type: LicenseType,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        self.intern(body, license_type, license_type.variant_kind(), origin)
    }

    /// Get or create a license, classifying it from its own text.
    pub fn from_body(&self, body: &str, origin: &str) -> Result<Arc<License>, LicenseError> {
        let license_type = classify_body(&normalize(body)?).unwrap_or(LicenseType::Unknown);
        self.from_body_and_type(body, license_type, origin)
    }

    /// Get or create the license made of `copyright` followed by `conditions`.
    pub fn from_copyright_and_conditions(
        &self,
        copyright: &str,
        conditions: &str,
        license_type: LicenseType,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        self.from_body_and_type(&format!("{copyright}\n\n{conditions}"), license_type, origin)
    }

    pub fn message(
        &self,
        body: &str,
        license_type: LicenseType,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        self.intern(body, license_type, VariantKind::Message, origin)
    }

    pub fn template(
        &self,
        body: &str,
        license_type: LicenseType,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        self.intern(body, license_type, VariantKind::Template, origin)
    }

    pub fn unique(
        &self,
        body: &str,
        license_type: LicenseType,
        origin: &str,
    ) -> Result<Arc<License>, LicenseError> {
        self.intern(body, license_type, VariantKind::Unique, origin)
    }

    /// Look up an already registered license by (unnormalized) body.
    pub fn get(&self, body: &str) -> Option<Arc<License>> {
        let body = normalize(body).ok()?;
        self.licenses.lock().get(&body).cloned()
    }

    pub fn len(&self) -> usize {
        self.licenses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.lock().is_empty()
    }

    /// Snapshot of every registered license, ordered by body.
    pub fn licenses(&self) -> Vec<Arc<License>> {
        let mut all: Vec<Arc<License>> = self.licenses.lock().values().cloned().collect();
        all.sort_by(|a, b| a.body().cmp(b.body()));
        all
    }

    /// Forget every registered license.
    pub fn reset(&self) {
        self.licenses.lock().clear();
    }
}
