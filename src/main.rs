//! `license-scan`: find the licenses governing source files.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load detection config ([`config::load_config`]).
//! 3. Register the `--default-license` file, if any, as every file's nearest license.
//! 4. Run detection on each file ([`Detector`]).
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0` (all files attributed) or `1` (at least one detection failed).

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use license_scan::config::load_config;
use license_scan::models::{FileReport, RegisteredLicense, ScanReport};
use license_scan::report;
use license_scan::{Detector, LicenseRegistry, StaticLicenseSource};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    let registry = Arc::new(LicenseRegistry::new());
    let detector = Detector::with_config(Arc::clone(&registry), config);

    let source = match &cli.default_license {
        Some(path) => default_source(&registry, path)?,
        None => StaticLicenseSource::new(),
    };

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let filename = path.display().to_string();
        let result = detector.determine_matches_for_bytes(&bytes, &filename, &source);
        files.push(FileReport::from_result(&filename, result));
    }

    let report = ScanReport {
        files,
        licenses: registry
            .licenses()
            .iter()
            .map(RegisteredLicense::from)
            .collect(),
    };

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&report, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// A source whose default, by-type and by-name answers are all the given
/// license file.
fn default_source(registry: &LicenseRegistry, path: &Path) -> Result<StaticLicenseSource> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading license {}", path.display()))?;
    let origin = path.display().to_string();
    let license = registry
        .from_body(&body, &origin)
        .with_context(|| format!("registering license {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "LICENSE".to_string());

    Ok(StaticLicenseSource::new()
        .with_default(Arc::clone(&license))
        .with_type(Arc::clone(&license))
        .with_name(&name, license))
}
