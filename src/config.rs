use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::license::LicenseType;

/// Root configuration structure, deserialized from `.license-scan/config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Only this many leading bytes of a file are scanned. Licenses live at
    /// the top.
    pub max_prefix_bytes: usize,
    /// Spaces each tab expands to before matching.
    pub tab_width: usize,
    /// Extra well-known licenses that references may cite by URL.
    pub url_licenses: Vec<UrlLicenseEntry>,
}

/// One `[[url_licenses]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlLicenseEntry {
    pub url: String,
    /// Matches every cited version when absent.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    pub body: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            max_prefix_bytes: 6 * 1024,
            tab_width: 1,
            url_licenses: Vec::new(),
        }
    }
}

/// Load the detection configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.license-scan/config.toml`
/// 3. `~/.config/license-scan/config.toml`
/// 4. Built-in [`DetectionConfig::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<DetectionConfig> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-scan").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("license-scan").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(DetectionConfig::default())
}

fn read_config(path: &Path) -> Result<DetectionConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.max_prefix_bytes, 6144);
        assert_eq!(config.tab_width, 1);
    }

    #[test]
    fn test_project_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".license-scan");
        std::fs::create_dir(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
max_prefix_bytes = 100

[[url_licenses]]
url = "https://example.org/license"
version = "2"
type = "bsd"
body = "Redistribution and use in source and binary forms are permitted."
"#,
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.max_prefix_bytes, 100);
        assert_eq!(config.tab_width, 1);
        assert_eq!(config.url_licenses.len(), 1);
        assert_eq!(config.url_licenses[0].license_type, LicenseType::Bsd);
        assert_eq!(config.url_licenses[0].version.as_deref(), Some("2"));
    }

    #[test]
    fn test_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "tab_width = 4\n").unwrap();
        let config = load_config(dir.path(), Some(&path)).unwrap();
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.max_prefix_bytes, 6144);
    }

    #[test]
    fn test_bad_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[[url_licenses]]\nurl = \"x\"\ntype = \"proprietary\"\nbody = \"y\"\n",
        )
        .unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
    }
}
