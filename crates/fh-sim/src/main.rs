//! FortuneHall simulator
//!
//! Usage:
//!   fh-sim --game dice --rounds 100000      - RTP report for one game
//!   fh-sim --game slot --seed 7 --json      - Reproducible run as JSON
//!   fh-sim compare --rounds 50000           - Every game side by side
//!   fh-sim config --format yaml             - Print the default rules

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};

use fh_games::CasinoConfig;
use fh_sim::{Comparison, SimConfig, compare, simulate};
use fh_stage::GameKind;

#[derive(Parser)]
#[command(name = "fh-sim", about = "FortuneHall round simulator")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args)]
struct RunArgs {
    /// Game to simulate (coin, dice, roulette, slot, scratch)
    #[arg(short, long, default_value = "slot")]
    game: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Stake per round (game minimum if omitted)
    #[arg(short, long)]
    bet: Option<u64>,
}

#[derive(Args)]
struct CommonArgs {
    /// Rounds to play
    #[arg(short, long, default_value_t = 100_000)]
    rounds: u64,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rules file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (all cores if omitted)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate every game with the same seed
    Compare {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print the default casino rules
    Config {
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Compare { common }) => run_compare(&common),
        Some(Commands::Config { format }) => print_config(format),
        None => run_single(&cli.run),
    }
}

fn load_casino(path: Option<&PathBuf>) -> Result<CasinoConfig> {
    match path {
        Some(path) => CasinoConfig::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => Ok(CasinoConfig::default()),
    }
}

fn run_single(args: &RunArgs) -> Result<()> {
    let Some(game) = GameKind::from_code(&args.game) else {
        bail!(
            "Unknown game '{}' (expected one of: coin, dice, roulette, slot, scratch)",
            args.game
        );
    };
    let common = &args.common;

    let casino = load_casino(common.config.as_ref())?;
    let mut config = SimConfig::new(game, common.rounds).with_casino(casino);
    config.seed = common.seed;
    config.bet = args.bet;
    if let Some(threads) = common.threads {
        config = config.with_threads(threads);
    }

    let report = simulate(&config).context("Simulation failed")?;
    if common.json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn run_compare(common: &CommonArgs) -> Result<()> {
    let casino = load_casino(common.config.as_ref())?;
    let threads = common.threads.unwrap_or_else(num_cpus::get);

    let reports =
        compare(common.rounds, common.seed, &casino, threads).context("Comparison failed")?;
    let comparison = Comparison::new(reports);
    if common.json {
        println!("{}", comparison.to_json());
    } else {
        print!("{}", comparison);
    }
    Ok(())
}

fn print_config(format: Format) -> Result<()> {
    let casino = CasinoConfig::default();
    let text = match format {
        Format::Json => casino.to_json()?,
        Format::Yaml => casino.to_yaml()?,
    };
    println!("{}", text);
    Ok(())
}
