//! CLI frontend for the gacha engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gacha",
    about = "Validate gacha banners, inspect their odds, and run pulls",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log every draw (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every banner file in a directory
    Check {
        /// Directory containing banner .json files
        #[arg(short, long, default_value = "banners")]
        dir: PathBuf,
    },

    /// Show rates, pity thresholds, and exact odds of a banner
    Odds {
        /// Banner ID
        banner: String,

        /// Directory containing banner .json files
        #[arg(short, long, default_value = "banners")]
        dir: PathBuf,
    },

    /// Pull on a banner, keeping balance and pity in a state file
    Pull {
        /// Banner ID
        banner: String,

        /// Number of draws in the batch
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Player ID
        #[arg(long, default_value = "traveler")]
        player: String,

        /// State file (created on first use)
        #[arg(long, default_value = "gacha-state.json")]
        state: PathBuf,

        /// Starting balance for a player the state file does not know yet
        #[arg(long, default_value = "16000")]
        balance: u64,

        /// Currency to add to the player's balance before pulling
        #[arg(long, default_value = "0")]
        top_up: u64,

        /// RNG seed for a reproducible batch
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Directory containing banner .json files
        #[arg(short, long, default_value = "banners")]
        dir: PathBuf,
    },

    /// Simulate many pulls and compare observed with configured rates
    Simulate {
        /// Banner ID
        banner: String,

        /// Number of draws to simulate
        #[arg(short, long, default_value = "100000")]
        pulls: u64,

        /// RNG seed for a deterministic run
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Directory containing banner .json files
        #[arg(short, long, default_value = "banners")]
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Check { dir } => commands::check::run(&dir),
        Commands::Odds { banner, dir } => commands::odds::run(&dir, &banner),
        Commands::Pull {
            banner,
            count,
            player,
            state,
            balance,
            top_up,
            seed,
            json,
            dir,
        } => commands::pull::run(
            &dir,
            &commands::pull::PullArgs {
                banner: &banner,
                count,
                player: &player,
                state: &state,
                balance,
                top_up,
                seed,
                json,
            },
        ),
        Commands::Simulate {
            banner,
            pulls,
            seed,
            dir,
        } => commands::simulate::run(&dir, &banner, pulls, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
