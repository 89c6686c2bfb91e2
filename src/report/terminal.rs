use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::license::VariantKind;
use crate::models::{FileStatus, ScanReport};

/// Render a colored terminal report.
pub fn render(report: &ScanReport, verbose: bool, quiet: bool) -> Result<()> {
    let total = report.files.len();
    let licensed = count(report, FileStatus::Licensed);
    let unlicensed = count(report, FileStatus::Unlicensed);
    let failed = count(report, FileStatus::Failed);

    if quiet {
        println!(
            "Files: {}  Licensed: {}  No license: {}  Failed: {}",
            total,
            licensed.to_string().green(),
            unlicensed.to_string().yellow(),
            failed.to_string().red(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}\n",
        "license-scan".bold(),
        env!("CARGO_PKG_VERSION")
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Files scanned      : {total}"));
    println!(
        " │  {:<48} │",
        format!("{}  Licensed        : {:>4}", "✓".green(), licensed)
    );
    println!(
        " │  {:<48} │",
        format!("{}  No license      : {:>4}", "⚠".yellow(), unlicensed)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Failed          : {:>4}", "✗".red(), failed)
    );
    println!(
        " │  {:<48} │",
        format!("Distinct licenses  : {}", report.licenses.len())
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if failed > 0 {
        println!(" {} Files that could not be attributed:\n", "[ERROR]".red().bold());
        render_failures(report);
        println!();
    }

    if unlicensed > 0 {
        println!(" {} Files without any license text:\n", "[WARN]".yellow().bold());
        for file in report.files.iter().filter(|f| f.status == FileStatus::Unlicensed) {
            println!("   {}", file.filename);
        }
        println!();
    }

    if verbose && licensed > 0 {
        println!(" {} Matches:\n", "[PASS]".green().bold());
        render_matches(report);
        println!();
    }

    if !report.licenses.is_empty() {
        println!(" {} Licenses:\n", "[INFO]".cyan().bold());
        render_licenses(report, verbose);
        println!();
    }

    Ok(())
}

fn count(report: &ScanReport, status: FileStatus) -> usize {
    report.files.iter().filter(|f| f.status == status).count()
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn render_failures(report: &ScanReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["File", "Category", "Problem"]));

    for file in report.files.iter().filter(|f| f.status == FileStatus::Failed) {
        let Some(error) = &file.error else {
            continue;
        };
        table.add_row(vec![
            Cell::new(&file.filename),
            Cell::new(error.category.to_string()).fg(Color::Red),
            Cell::new(&error.message),
        ]);
    }

    println!("{}", table);
}

fn render_matches(report: &ScanReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["File", "Range", "Strategy", "License", "Variant"]));

    for file in report.files.iter().filter(|f| f.status == FileStatus::Licensed) {
        for m in &file.matches {
            for license in &m.licenses {
                let strategy = if m.duplicate {
                    format!("{} (dup)", m.strategy)
                } else {
                    m.strategy.clone()
                };
                table.add_row(vec![
                    Cell::new(&file.filename),
                    Cell::new(format!("{}..{}", m.start, m.end)).set_alignment(CellAlignment::Right),
                    Cell::new(strategy),
                    Cell::new(license.license_type.to_string()),
                    Cell::new(license.variant.to_string()).fg(variant_color(license.variant)),
                ]);
            }
        }
    }

    println!("{}", table);
}

fn render_licenses(report: &ScanReport, verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Type", "Variant", "Authors", "First line", "Files"]));

    for registered in report.licenses.iter().filter(|l| verbose || l.used) {
        let license = &registered.license;
        table.add_row(vec![
            Cell::new(license.license_type.to_string()),
            Cell::new(license.variant.to_string()).fg(variant_color(license.variant)),
            Cell::new(license.authors.as_deref().unwrap_or("-")),
            Cell::new(&license.headline),
            Cell::new(registered.licensees.len()).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}

fn variant_color(variant: VariantKind) -> Color {
    match variant {
        VariantKind::Template => Color::Green,
        VariantKind::Message => Color::Cyan,
        VariantKind::Unique => Color::Magenta,
    }
}
