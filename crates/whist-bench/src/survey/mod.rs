mod timing;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use whist_bot::{Bidder, BotFeatures, HeuristicBidder, SeatBid, bid_round};
use whist_core::bidding::{BidError, BidEstimatorConfig};
use whist_core::model::deck::Deck;
use whist_core::model::round::RoundSpec;

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, OutputPaths, SurveyConfig};
use crate::logging::TELEMETRY_FILE;
use crate::telemetry::{TelemetryError, TelemetryFiles, append_highlights, write_report};

pub use timing::TimedBidder;

/// Plays every configured agent over the same seeded deals.
pub struct SurveyRunner {
    config: SurveyConfig,
    outputs: OutputPaths,
    agents: Vec<AgentBlueprint>,
    features: BotFeatures,
}

pub struct RunSummary {
    pub games: usize,
    pub rounds_per_game: usize,
    pub deals_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry: Option<TelemetryFiles>,
}

/// One agent's bids for every seat of a deal, in bidding order.
pub struct AgentBids {
    pub agent: String,
    pub bids: Vec<SeatBid>,
    pub latencies_us: Vec<f64>,
}

struct Deal {
    id: String,
    game: usize,
    round: RoundSpec,
    seed: u64,
    dealer: usize,
}

impl SurveyRunner {
    pub fn new(config: SurveyConfig, outputs: OutputPaths) -> Result<Self, RunnerError> {
        let agents = config
            .agents
            .iter()
            .map(AgentBlueprint::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        // Per-agent estimator settings win over any environment override.
        let features = BotFeatures::default().with_bid_details(config.logging.bid_details);

        Ok(Self {
            config,
            outputs,
            agents,
            features,
        })
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        create_parent(&self.outputs.jsonl)?;
        create_parent(&self.outputs.summary_md)?;

        let mut rows = RowSink::create(&self.outputs.jsonl, &self.config.run_id)?;
        let mut analytics = AnalyticsCollector::new(&self.config.agents, &self.config.metrics);
        let mut bidders: Vec<TimedBidder<HeuristicBidder>> = self
            .agents
            .iter()
            .map(|agent| TimedBidder::new(agent.spawn(self.features)))
            .collect();

        let schedule = self.config.deals.schedule().rounds();
        let deals_played = self.play(&schedule, &mut bidders, &mut rows, &mut analytics)?;
        let rows_written = rows.finish()?;

        analytics
            .finalize()
            .write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .config
            .logging
            .enable_structured
            .then(|| self.outputs.telemetry_dir().join(TELEMETRY_FILE));
        let telemetry = match &telemetry_path {
            Some(path) => write_report(path, &self.outputs.telemetry_dir())?,
            None => None,
        };
        if let Some(files) = &telemetry {
            append_highlights(&self.outputs.summary_md, &files.report)?;
        }

        Ok(RunSummary {
            games: self.config.deals.games,
            rounds_per_game: schedule.len(),
            deals_played,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry,
        })
    }

    /// Deals `games` passes over the schedule; returns the number of deals.
    fn play(
        &self,
        schedule: &[RoundSpec],
        bidders: &mut [TimedBidder<HeuristicBidder>],
        rows: &mut RowSink,
        analytics: &mut AnalyticsCollector,
    ) -> Result<usize, RunnerError> {
        let players = self.config.deals.players;
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut played = 0usize;

        for game in 0..self.config.deals.games {
            for round in schedule {
                let deal = Deal {
                    id: format!("G{game:03}_R{:02}", round.number),
                    game,
                    round: *round,
                    seed: rng.next_u64(),
                    dealer: played % players,
                };
                let hands = Deck::shuffled_with_seed(deal.seed)
                    .deal(players, round.hand_size)
                    .ok_or(RunnerError::Deal {
                        players,
                        hand_size: round.hand_size,
                    })?;

                let outcomes = bidders
                    .iter_mut()
                    .map(|bidder| {
                        let bids = bid_round(bidder, &hands, round.trump, deal.dealer)?;
                        Ok(AgentBids {
                            agent: bidder.name().to_string(),
                            bids,
                            latencies_us: bidder.drain_micros(),
                        })
                    })
                    .collect::<Result<Vec<_>, BidError>>()?;

                analytics.record_deal(&deal.id, &outcomes)?;
                rows.write_deal(&deal, &outcomes)?;
                self.trace_deal(&deal, &outcomes);
                played += 1;
            }
        }
        Ok(played)
    }

    fn trace_deal(&self, deal: &Deal, outcomes: &[AgentBids]) {
        if !self.config.logging.enable_structured || !tracing::enabled!(Level::INFO) {
            return;
        }
        let totals: Vec<String> = outcomes
            .iter()
            .map(|outcome| {
                let total: u32 = outcome.bids.iter().map(|seat| u32::from(seat.bid())).sum();
                format!("{}={total}", outcome.agent)
            })
            .collect();

        event!(
            target: "whist_bench::deal",
            Level::INFO,
            run_id = %self.config.run_id,
            deal_id = %deal.id,
            game = deal.game as u32,
            round = deal.round.number as u32,
            hand_size = deal.round.hand_size as u32,
            trump = %deal.round.trump,
            dealer = deal.dealer as u32,
            totals = ?totals,
        );
    }
}

fn create_parent(path: &Path) -> Result<(), RunnerError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(fs::create_dir_all(dir)?),
        _ => Ok(()),
    }
}

/// JSON-lines writer with one row per agent per seat.
struct RowSink {
    writer: BufWriter<File>,
    run_id: String,
    written: usize,
}

impl RowSink {
    fn create(path: &Path, run_id: &str) -> Result<Self, RunnerError> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            run_id: run_id.to_string(),
            written: 0,
        })
    }

    fn write_deal(&mut self, deal: &Deal, outcomes: &[AgentBids]) -> Result<(), RunnerError> {
        let trump = deal.round.trump.to_string();
        for outcome in outcomes {
            for (position, seat) in outcome.bids.iter().enumerate() {
                let row = BidRow {
                    run_id: &self.run_id,
                    deal_id: &deal.id,
                    game: deal.game,
                    round: deal.round.number,
                    deal_seed: deal.seed,
                    hand_size: deal.round.hand_size,
                    trump: &trump,
                    dealer: deal.dealer,
                    seat: seat.seat,
                    bid_position: position,
                    agent: &outcome.agent,
                    bid: seat.estimate.bid,
                    naive_bid: seat.estimate.naive_bid,
                    expected_tricks: seat.estimate.expected_tricks,
                    adjusted: seat.estimate.adjustment.is_some(),
                    latency_us: outcome.latencies_us.get(position).copied().unwrap_or(0.0),
                };
                serde_json::to_writer(&mut self.writer, &row)?;
                self.writer.write_all(b"\n")?;
                self.written += 1;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<usize, RunnerError> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

#[derive(Serialize)]
struct BidRow<'a> {
    run_id: &'a str,
    deal_id: &'a str,
    game: usize,
    round: usize,
    deal_seed: u64,
    hand_size: usize,
    trump: &'a str,
    dealer: usize,
    seat: usize,
    bid_position: usize,
    agent: &'a str,
    bid: u8,
    naive_bid: u8,
    expected_tricks: f64,
    adjusted: bool,
    latency_us: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode bid row: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("bidding failed: {0}")]
    Bid(#[from] BidError),
    #[error("cannot deal {hand_size} cards to each of {players} players")]
    Deal { players: usize, hand_size: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summary failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Debug, Error)]
#[error("agent '{name}' has invalid heuristic params: {source}")]
pub struct AgentError {
    pub name: String,
    #[source]
    pub source: BidError,
}

struct AgentBlueprint {
    name: String,
    estimator: BidEstimatorConfig,
}

impl AgentBlueprint {
    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let estimator = config.estimator_config().map_err(|source| AgentError {
            name: config.name.clone(),
            source,
        })?;
        Ok(Self {
            name: config.name.clone(),
            estimator,
        })
    }

    fn spawn(&self, features: BotFeatures) -> HeuristicBidder {
        HeuristicBidder::new(self.name.clone(), self.estimator, features)
    }
}
