use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use gacha_core::analyze;

pub fn run(dir: &Path, banner_id: &str) -> Result<(), String> {
    let (_, banner) = super::load_banner(dir, banner_id)?;
    let cfg = banner.config();
    let odds = analyze(&banner);

    println!(
        "  {} '{}' {}",
        "Banner".bold(),
        banner.name(),
        format!("({}, {})", banner.id(), super::kind_label(&banner)).dimmed()
    );
    println!(
        "  Rates: SSR {}%, SR {}%, R {}%",
        cfg.ssr_rate, cfg.sr_rate, cfg.r_rate
    );
    println!(
        "  Soft pity from pull {}, hard pity on pull {} ({} ramp)",
        cfg.soft_pity_threshold, cfg.hard_pity_threshold, cfg.ramp
    );
    if let Some(limited) = banner.limited() {
        let featured: Vec<_> = banner.featured().iter().map(|id| id.to_string()).collect();
        println!(
            "  Featured: {} at {}%, guaranteed by pull {}",
            featured.join(", "),
            limited.featured_rate,
            cfg.featured_guarantee_threshold
        );
        println!(
            "  Open {} until {}",
            limited.valid_from.format("%Y-%m-%d %H:%M UTC"),
            limited.valid_until.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!();

    println!("  {}", "Odds".bold().underline());
    println!(
        "  Expected pulls per SSR:  {:.2}",
        odds.expected_pulls_per_ssr
    );
    println!("  Consolidated SSR rate:   {:.3}%", odds.consolidated_ssr_rate);
    println!("  Most likely SSR pull:    {}", odds.most_likely_ssr_pull());
    if let Some(expected) = odds.expected_pulls_per_featured {
        println!("  Expected pulls/featured: {expected:.2}");
    }
    if let Some(worst) = odds.worst_case_featured {
        println!("  Worst case for featured: {worst} pulls");
    }
    println!();

    // The ramp is where the distribution changes; earlier pulls share the base rate.
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Pull", "SSR rate", "First SSR here", "SSR by now"]);
    let first = cfg.soft_pity_threshold.saturating_sub(1).max(1);
    for pull in first..=cfg.hard_pity_threshold {
        let i = (pull - 1) as usize;
        let (Some(rate), Some(here)) = (odds.effective_rates.get(i), odds.first_ssr.get(i)) else {
            break;
        };
        table.add_row(vec![
            pull.to_string(),
            format!("{rate:.2}%"),
            format!("{:.3}%", here * 100.0),
            format!("{:.2}%", odds.ssr_within(pull) * 100.0),
        ]);
    }
    println!("{table}");

    Ok(())
}
