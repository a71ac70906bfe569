use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leadlag::config::{AppConfig, ConfigManager};
use leadlag::data::{self, CsvConnector, RunReport};
use leadlag::engines::evaluation::FitnessEvaluator;
use leadlag::engines::generation::{
    ConsoleProgressCallback, EvolutionEngine, ValidationMethod, WalkForwardMethod,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Lead-lag pair trading simulator and genetic optimizer", long_about = None)]
struct Cli {
    /// TOML configuration file; LEADLAG__<SECTION>__<KEY> variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct PairArgs {
    /// CSV with the leader's close prices
    #[arg(long)]
    leader: PathBuf,

    /// CSV with the follower's close prices
    #[arg(long)]
    follower: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a single genome over a price pair
    Simulate {
        #[command(flatten)]
        pair: PairArgs,

        /// Genome JSON file
        #[arg(short, long)]
        genome: PathBuf,

        /// Write the trade log as CSV
        #[arg(long)]
        trades: Option<PathBuf>,

        /// Write the equity curve as CSV
        #[arg(long)]
        equity: Option<PathBuf>,

        /// Write a JSON run report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Search for the best genome with the genetic algorithm
    Optimize {
        #[command(flatten)]
        pair: PairArgs,

        /// Write the best genome as JSON
        #[arg(long)]
        best_genome: Option<PathBuf>,

        /// Write the best genome's trade log as CSV
        #[arg(long)]
        trades: Option<PathBuf>,

        /// Write a JSON run report
        #[arg(short, long, default_value = "optimization_results.json")]
        output: PathBuf,
    },
    /// Optimize on rolling train windows and replay on the following test windows
    WalkForward {
        #[command(flatten)]
        pair: PairArgs,

        /// Write a JSON run report
        #[arg(short, long, default_value = "walk_forward_results.json")]
        output: PathBuf,
    },
    /// Write the effective configuration as TOML
    InitConfig {
        #[arg(default_value = "leadlag.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let manager = ConfigManager::new();
    match &cli.config {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => manager.load_from_env().context("reading LEADLAG__* overrides")?,
    }
    let config = manager.get();

    match cli.command {
        Commands::Simulate {
            pair,
            genome,
            trades,
            equity,
            output,
        } => run_simulate(&config, pair, genome, trades, equity, output),
        Commands::Optimize {
            pair,
            best_genome,
            trades,
            output,
        } => run_optimize(&config, pair, best_genome, trades, output),
        Commands::WalkForward { pair, output } => run_walk_forward(&config, pair, output),
        Commands::InitConfig { path } => {
            manager.save_to_file(&path)?;
            log::info!("Configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn load_pair(pair: &PairArgs) -> Result<data::LoadedPair> {
    CsvConnector::load_pair(&pair.leader, &pair.follower).with_context(|| {
        format!(
            "loading price pair {} / {}",
            pair.leader.display(),
            pair.follower.display()
        )
    })
}

fn run_simulate(
    config: &AppConfig,
    pair: PairArgs,
    genome_path: PathBuf,
    trades: Option<PathBuf>,
    equity: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let loaded = load_pair(&pair)?;
    let genome = data::read_genome(&genome_path)
        .with_context(|| format!("reading genome {}", genome_path.display()))?;
    if let Err(e) = config.search_space.check(&genome) {
        log::warn!("Genome lies outside the configured search space: {}", e);
    }

    let evaluator = FitnessEvaluator::new(&config.backtesting);
    let individual = evaluator.evaluate(&genome, &loaded.prices)?;
    let dates = loaded.dates.as_deref();

    log::info!(
        "Return {:.2}% | max drawdown {:.2}% | calmar {:.2} | sortino {:.2} | {} trades | win rate {:.1}%",
        individual.metrics.total_return_pct,
        individual.metrics.max_drawdown_pct,
        individual.metrics.calmar,
        individual.metrics.sortino,
        individual.metrics.n_trades,
        individual.metrics.win_rate_pct
    );

    if let Some(path) = trades {
        data::write_trades_csv(&individual.result, dates, path)?;
    }
    if let Some(path) = equity {
        data::write_equity_csv(&individual.result, dates, path)?;
    }
    if let Some(path) = output {
        let report = RunReport::new("simulate", Some(loaded.metadata), &individual);
        data::write_json(&report, path)?;
    }
    Ok(())
}

fn run_optimize(
    config: &AppConfig,
    pair: PairArgs,
    best_genome: Option<PathBuf>,
    trades: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let loaded = load_pair(&pair)?;
    let mut engine = EvolutionEngine::new(config.optimizer_config())?;
    let outcome = engine.run(&loaded.prices, ConsoleProgressCallback)?;

    log::info!("Best genome: {:?}", outcome.best.genome);

    if let Some(path) = best_genome {
        data::write_json(&outcome.best.genome, path)?;
    }
    if let Some(path) = trades {
        data::write_trades_csv(&outcome.best.result, loaded.dates.as_deref(), path)?;
    }
    let report = RunReport::new("optimize", Some(loaded.metadata), &outcome);
    data::write_json(&report, output)?;
    Ok(())
}

fn run_walk_forward(config: &AppConfig, pair: PairArgs, output: PathBuf) -> Result<()> {
    let loaded = load_pair(&pair)?;
    let method = WalkForwardMethod::new(
        &config.walk_forward,
        config.optimizer_config(),
        |_fold| ConsoleProgressCallback,
    );
    let result = method.validate(&loaded.prices)?;
    let summary = &result.aggregate_metrics;

    log::info!(
        "{}: {} folds | mean OOS return {:.2}% (std {:.2}) | {} profitable",
        method.name(),
        summary.folds,
        summary.mean_out_of_sample_return_pct,
        summary.std_out_of_sample_return_pct,
        summary.profitable_folds
    );

    let report = RunReport::new("walk-forward", Some(loaded.metadata), &result);
    data::write_json(&report, output)?;
    Ok(())
}
