use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-scan",
    about = "Detect the licenses governing source files and attribute their copyrights",
    version
)]
pub struct Cli {
    /// Files to scan
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// License file the scanned files inherit, as their directory's LICENSE
    #[arg(long, value_name = "FILE")]
    pub default_license: Option<PathBuf>,

    /// Detection config file [default: ./.license-scan/config.toml, fallback ~/.config/license-scan/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Show every match and license, plus debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "license-scan",
            "a.c",
            "b.c",
            "--default-license",
            "LICENSE",
            "--report",
            "json",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.default_license, Some(PathBuf::from("LICENSE")));
        assert!(matches!(cli.report, ReportFormat::Json));
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["license-scan"]).is_err());
    }
}
