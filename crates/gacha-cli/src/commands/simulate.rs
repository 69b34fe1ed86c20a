use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use gacha_core::{DrawRoll, PityState, PullStats, Tier, analyze, resolve_draw};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn run(dir: &Path, banner_id: &str, pulls: u64, seed: u64) -> Result<(), String> {
    if pulls == 0 {
        return Err("nothing to simulate: --pulls must be at least 1".into());
    }
    let (_, banner) = super::load_banner(dir, banner_id)?;
    let cfg = banner.config();

    // One player pulling with unlimited currency: pity carries across draws.
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = PityState::new();
    let mut stats = PullStats::new();
    let mut hard_pity_hits = 0u64;
    for _ in 0..pulls {
        let res = resolve_draw(&banner, &state, DrawRoll::sample(&mut rng))
            .map_err(|e| format!("simulation aborted: {e}"))?;
        if res.hard_pity {
            hard_pity_hits += 1;
        }
        stats.record(&res.outcome);
        state = res.state;
    }

    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        banner.name(),
        format!("({pulls} pulls, seed={seed})").dimmed()
    );
    println!();

    let odds = analyze(&banner);
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tier", "Base rate", "Observed", "Count"]);
    for tier in Tier::all() {
        let base = match tier {
            Tier::Ssr => cfg.ssr_rate,
            Tier::Sr => cfg.sr_rate,
            Tier::R => cfg.r_rate,
        };
        table.add_row(vec![
            super::tier_label(*tier).to_string(),
            format!("{base:.2}%"),
            format!("{:.3}%", stats.frequency(*tier)),
            stats.count(*tier).to_string(),
        ]);
    }
    println!("{table}");
    println!();

    println!("  {}", "Pity".bold().underline());
    println!(
        "  SSR rate with pity: {:.3}% observed, {:.3}% expected",
        stats.frequency(Tier::Ssr),
        odds.consolidated_ssr_rate
    );
    match stats.mean_gap() {
        Some(mean) => println!(
            "  Pulls per SSR: {mean:.2} observed, {:.2} expected, longest {}",
            odds.expected_pulls_per_ssr,
            stats.longest_gap()
        ),
        None => println!("  {}", "(no SSR drawn)".dimmed()),
    }
    println!("  Hard pity reached {hard_pity_hits} times");
    if banner.limited().is_some() {
        println!(
            "  Featured: {} of {} SSR ({:.1}%)",
            stats.featured(),
            stats.count(Tier::Ssr),
            stats.featured_share()
        );
    }

    Ok(())
}
