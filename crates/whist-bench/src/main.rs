use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use whist_bench::config::SurveyConfig;
use whist_bench::logging;
use whist_bench::survey::{RunSummary, SurveyRunner};

/// Replays seeded Contract Whist deals through each configured bidder and
/// tabulates how their bids compare.
#[derive(Debug, Parser)]
#[command(name = "whist-bench", version)]
struct Cli {
    /// Survey definition (YAML).
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Replace `run_id`, and with it every `{run_id}` in the output paths.
    #[arg(long)]
    run_id: Option<String>,

    /// Passes over the round schedule.
    #[arg(long)]
    games: Option<usize>,

    /// Deal RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Table size; the deal size is recomputed for it.
    #[arg(long)]
    players: Option<usize>,

    /// Emit per-card debug events (needs `tracing_level: debug` or RUST_LOG).
    #[arg(long)]
    bid_details: bool,

    /// Stop once the configuration has been checked.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn apply(&self, config: &mut SurveyConfig) {
        if let Some(run_id) = &self.run_id {
            config.run_id.clone_from(run_id);
        }
        if let Some(games) = self.games {
            config.deals.games = games;
        }
        if self.seed.is_some() {
            config.deals.seed = self.seed;
        }
        if let Some(players) = self.players {
            config.deals.players = players;
            config.deals.max_cards = None;
        }
        config.logging.bid_details |= self.bid_details;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SurveyConfig::load(&cli.config)?;
    cli.apply(&mut config);
    config
        .validate()
        .with_context(|| format!("checking {}", cli.config.display()))?;

    let outputs = config.output_paths();
    println!(
        "{}: {} agents, {} games at {} players",
        config.run_id,
        config.agents.len(),
        config.deals.games,
        config.deals.players
    );
    if cli.check {
        println!("configuration ok");
        return Ok(());
    }

    let _sink = logging::install(&config.logging, &outputs)?;
    let summary = SurveyRunner::new(config, outputs)?.run()?;
    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    println!(
        "{} deals ({} games of {} rounds), {} bids -> {}",
        summary.deals_played,
        summary.games,
        summary.rounds_per_game,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("summary: {}", summary.summary_path.display());
    if let Some(path) = &summary.telemetry_path {
        println!("telemetry: {}", path.display());
    }
    if let Some(files) = &summary.telemetry {
        println!(
            "telemetry report: {} and {} ({} bid events)",
            files.json_path.display(),
            files.markdown_path.display(),
            files.report.bids.events
        );
    }
}
