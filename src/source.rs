use std::collections::HashMap;
use std::sync::Arc;

use crate::license::{License, LicenseType};

/// Resolves the licenses a file inherits from its surroundings, typically the
/// license files of its directory and ancestors.
pub trait LicenseSource {
    /// The default licenses for `filename`; empty when there is none.
    fn nearest_licenses_for(&self, filename: &str) -> Vec<Arc<License>>;

    fn nearest_license_of_type(&self, license_type: LicenseType) -> Option<Arc<License>>;

    /// A license file referenced by name ("LICENSE"), optionally narrowed to
    /// the one attributed to `authors`.
    fn nearest_license_with_name(&self, name: &str, authors: Option<&str>)
        -> Option<Arc<License>>;
}

/// A fixed, in-memory [`LicenseSource`].
#[derive(Debug, Default, Clone)]
pub struct StaticLicenseSource {
    defaults: Vec<Arc<License>>,
    by_type: HashMap<LicenseType, Arc<License>>,
    by_name: HashMap<String, Vec<Arc<License>>>,
}

impl StaticLicenseSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a license every file inherits.
    pub fn with_default(mut self, license: Arc<License>) -> Self {
        self.defaults.push(license);
        self
    }

    /// Make `license` the nearest license of its own type.
    pub fn with_type(mut self, license: Arc<License>) -> Self {
        self.by_type.insert(license.license_type(), license);
        self
    }

    /// Register `license` under a file name such as "LICENSE".
    pub fn with_name(mut self, name: &str, license: Arc<License>) -> Self {
        self.by_name
            .entry(name.to_lowercase())
            .or_default()
            .push(license);
        self
    }
}

impl LicenseSource for StaticLicenseSource {
    fn nearest_licenses_for(&self, _filename: &str) -> Vec<Arc<License>> {
        self.defaults.clone()
    }

    fn nearest_license_of_type(&self, license_type: LicenseType) -> Option<Arc<License>> {
        self.by_type.get(&license_type).cloned()
    }

    fn nearest_license_with_name(
        &self,
        name: &str,
        authors: Option<&str>,
    ) -> Option<Arc<License>> {
        let candidates = self.by_name.get(&name.to_lowercase())?;
        authors
            .and_then(|authors| {
                candidates
                    .iter()
                    .find(|license| license.authors() == Some(authors))
            })
            .or_else(|| candidates.first())
            .cloned()
    }
}
