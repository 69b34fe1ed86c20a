use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use gacha_core::BannerCatalog;

pub fn run(dir: &Path) -> Result<(), String> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| format!("cannot read directory {}: {e}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(format!("no banner files found in {}", dir.display()));
    }

    // Report every file before failing so one bad banner does not hide others.
    let mut failures = 0;
    for path in &files {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        match BannerCatalog::load_file(path) {
            Ok(catalog) => println!("  {} {name} ({} banners)", "ok".green().bold(), catalog.len()),
            Err(e) => {
                failures += 1;
                println!("  {} {name}: {e}", "FAIL".red().bold());
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} banner file{} failed validation",
            files.len(),
            if files.len() == 1 { "" } else { "s" }
        ));
    }

    // Duplicate IDs only show up across files.
    let catalog = super::load_catalog(dir)?;

    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Kind", "SSR / SR / R", "Soft / Hard", "Cost"]);
    for banner in catalog.iter() {
        let cfg = banner.config();
        table.add_row(vec![
            banner.id().to_string(),
            banner.name().to_string(),
            super::kind_label(banner).to_string(),
            format!("{}% / {}% / {}%", cfg.ssr_rate, cfg.sr_rate, cfg.r_rate),
            format!("{} / {}", cfg.soft_pity_threshold, cfg.hard_pity_threshold),
            format!(
                "{} / {} for {}",
                cfg.single_pull_cost, cfg.multi_pull_cost, cfg.multi_pull_size
            ),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "  All checks passed: {} banners in {} files.",
        catalog.len(),
        files.len()
    );

    Ok(())
}
