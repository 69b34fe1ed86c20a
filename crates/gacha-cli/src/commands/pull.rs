use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use gacha_core::{BannerId, LedgerSnapshot, MemoryLedger, PlayerId, PullSession, Wallet};

pub struct PullArgs<'a> {
    pub banner: &'a str,
    pub count: u32,
    pub player: &'a str,
    pub state: &'a Path,
    pub balance: u64,
    pub top_up: u64,
    pub seed: Option<u64>,
    pub json: bool,
}

pub fn run(dir: &Path, args: &PullArgs<'_>) -> Result<(), String> {
    let (catalog, banner) = super::load_banner(dir, args.banner)?;
    let player = PlayerId::new(args.player);

    let mut snapshot = read_state(args.state)?;
    snapshot
        .balances
        .entry(player.clone())
        .or_insert(args.balance);
    let ledger = Arc::new(MemoryLedger::from_snapshot(snapshot));
    if args.top_up > 0 {
        let balance = ledger.credit(&player, args.top_up);
        log::info!("topped up {player} by {}, balance {balance}", args.top_up);
    }

    let catalog = Arc::new(catalog);
    let mut session = match args.seed {
        Some(seed) => PullSession::seeded(catalog, ledger.clone(), seed),
        None => PullSession::new(catalog, ledger.clone()),
    };
    let result = session
        .execute(&player, &BannerId::new(args.banner), args.count)
        .map_err(|e| e.to_string())?;

    write_state(args.state, &ledger.snapshot())?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| format!("cannot serialize result: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "  {} {} x{} on '{}' {}",
        "Pull".bold(),
        result.pull_id,
        result.outcomes.len(),
        banner.name(),
        format!("(cost {})", result.cost).dimmed()
    );
    println!();
    for (i, outcome) in result.outcomes.iter().enumerate() {
        let featured = if outcome.is_featured {
            " featured".cyan().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:>3}. {:<3} {}{featured}",
            i + 1,
            super::tier_label(outcome.tier),
            outcome.reward_id
        );
    }
    println!();

    let pity = &result.pity_snapshot;
    println!("  {}", "Pity".bold().underline());
    println!(
        "  {} pulls since SSR, {} until hard pity",
        pity.pulls_since_last_ssr(),
        pity.pulls_until_hard_pity(&banner)
    );
    if banner.limited().is_some() {
        let guarantee = if pity.guaranteed_featured_next() {
            "next SSR is featured".green().to_string()
        } else {
            "50/50 on next SSR".to_string()
        };
        println!(
            "  {} pulls since featured, {guarantee}",
            pity.pulls_since_last_featured()
        );
    }
    println!(
        "  Lifetime: {} pulls, {} SSR, {} featured",
        pity.total_pulls(),
        pity.total_ssr(),
        pity.total_featured()
    );
    println!("  Balance: {}", ledger.balance(&player));

    Ok(())
}

fn read_state(path: &Path) -> Result<LedgerSnapshot, String> {
    if !path.exists() {
        return Ok(LedgerSnapshot::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid state file {}: {e}", path.display()))
}

fn write_state(path: &Path, snapshot: &LedgerSnapshot) -> Result<(), String> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("cannot serialize state: {e}"))?;
    std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}
