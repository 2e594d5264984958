//! Per-agent bid statistics and paired comparison against the baseline agent.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, MetricsConfig};
use crate::survey::AgentBids;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' bid but is not configured")]
    UnknownAgent(String),
    #[error("baseline '{baseline}' did not bid in deal {deal_id}")]
    MissingBaseline { baseline: String, deal_id: String },
    #[error("failed to write survey summary: {0}")]
    Io(#[from] std::io::Error),
}

/// Accumulates bids deal by deal, in configuration order.
pub struct AnalyticsCollector {
    baseline: String,
    latency_budget_us: u64,
    tallies: Vec<AgentTally>,
    index: HashMap<String, usize>,
}

struct AgentTally {
    name: String,
    kind: AgentKind,
    bids: Vec<f64>,
    expected_tricks: f64,
    adjusted: usize,
    latency_us: f64,
    /// Bid minus the baseline's bid for the same seat of the same deal.
    baseline_diffs: Vec<f64>,
}

impl AnalyticsCollector {
    pub fn new(agents: &[AgentConfig], metrics: &MetricsConfig) -> Self {
        let tallies: Vec<AgentTally> = agents
            .iter()
            .map(|agent| AgentTally {
                name: agent.name.clone(),
                kind: agent.kind,
                bids: Vec::new(),
                expected_tricks: 0.0,
                adjusted: 0,
                latency_us: 0.0,
                baseline_diffs: Vec::new(),
            })
            .collect();
        let index = tallies
            .iter()
            .enumerate()
            .map(|(position, tally)| (tally.name.clone(), position))
            .collect();
        Self {
            baseline: metrics.baseline.clone(),
            latency_budget_us: metrics.latency_budget_us,
            tallies,
            index,
        }
    }

    pub fn record_deal(
        &mut self,
        deal_id: &str,
        outcomes: &[AgentBids],
    ) -> Result<(), AnalyticsError> {
        let baseline_by_seat: HashMap<usize, u8> = outcomes
            .iter()
            .find(|outcome| outcome.agent == self.baseline)
            .ok_or_else(|| AnalyticsError::MissingBaseline {
                baseline: self.baseline.clone(),
                deal_id: deal_id.to_string(),
            })?
            .bids
            .iter()
            .map(|entry| (entry.seat, entry.bid()))
            .collect();

        for outcome in outcomes {
            let position = *self
                .index
                .get(&outcome.agent)
                .ok_or_else(|| AnalyticsError::UnknownAgent(outcome.agent.clone()))?;
            let is_baseline = outcome.agent == self.baseline;
            let tally = &mut self.tallies[position];

            for entry in &outcome.bids {
                tally.bids.push(f64::from(entry.bid()));
                tally.expected_tricks += entry.estimate.expected_tricks;
                tally.adjusted += usize::from(entry.estimate.adjustment.is_some());
                if !is_baseline && let Some(&base) = baseline_by_seat.get(&entry.seat) {
                    tally
                        .baseline_diffs
                        .push(f64::from(entry.bid()) - f64::from(base));
                }
            }
            tally.latency_us += outcome.latencies_us.iter().sum::<f64>();
        }
        Ok(())
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let baseline_mean = self
            .tallies
            .iter()
            .find(|tally| tally.name == self.baseline)
            .map(|tally| mean(&tally.bids))
            .unwrap_or(0.0);
        let budget = self.latency_budget_us as f64;

        let agents = self
            .tallies
            .into_iter()
            .map(|tally| {
                let count = tally.bids.len();
                let per_bid = |total: f64| if count == 0 { 0.0 } else { total / count as f64 };
                let mean_bid = mean(&tally.bids);
                let average_us_per_bid = per_bid(tally.latency_us);
                let mean_abs_diff = mean(
                    &tally
                        .baseline_diffs
                        .iter()
                        .map(|diff| diff.abs())
                        .collect::<Vec<_>>(),
                );
                let (p_value, nonzero_pairs) = wilcoxon_signed_rank(&tally.baseline_diffs);
                AgentReport {
                    ci95: confidence_interval(&tally.bids),
                    mean_expected_tricks: per_bid(tally.expected_tricks),
                    adjustment_rate: per_bid(tally.adjusted as f64),
                    delta_vs_baseline: mean_bid - baseline_mean,
                    over_budget: average_us_per_bid > budget,
                    paired_bids: tally.baseline_diffs.len(),
                    name: tally.name,
                    kind: tally.kind,
                    bids: count,
                    mean_bid,
                    average_us_per_bid,
                    mean_abs_diff,
                    p_value,
                    nonzero_pairs,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            latency_budget_us: self.latency_budget_us,
            agents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub latency_budget_us: u64,
    pub agents: Vec<AgentReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub bids: usize,
    pub mean_bid: f64,
    pub ci95: (f64, f64),
    pub mean_expected_tricks: f64,
    pub adjustment_rate: f64,
    pub average_us_per_bid: f64,
    pub over_budget: bool,
    pub delta_vs_baseline: f64,
    /// Seats compared with the baseline; zero for the baseline itself.
    pub paired_bids: usize,
    pub mean_abs_diff: f64,
    /// Two-sided Wilcoxon signed-rank p-value over the paired differences.
    pub p_value: f64,
    pub nonzero_pairs: usize,
}

impl AnalyticsSummary {
    pub fn agent(&self, name: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Bid Survey Summary\n\n");
        let _ = writeln!(
            out,
            "Baseline `{}`; agents averaging over {} µs per bid are flagged.\n",
            self.baseline, self.latency_budget_us
        );
        out.push_str(
            "| Agent | Kind | Bids | Mean bid | 95% CI | Mean expected | Adjusted | vs baseline | Mean abs diff | p-value | µs/bid |\n",
        );
        out.push_str("|---|---|---|---|---|---|---|---|---|---|---|\n");
        for agent in &self.agents {
            let latency_flag = if agent.over_budget { " (over)" } else { "" };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.3} | {:.3}..{:.3} | {:.3} | {:.1}% | {:+.3} | {:.3} | {:.3} | {:.1}{} |",
                agent.name,
                agent.kind.label(),
                agent.bids,
                agent.mean_bid,
                agent.ci95.0,
                agent.ci95.1,
                agent.mean_expected_tricks,
                agent.adjustment_rate * 100.0,
                agent.delta_vs_baseline,
                agent.mean_abs_diff,
                agent.p_value,
                agent.average_us_per_bid,
                latency_flag,
            );
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Student-t interval for the mean.
fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let centre = mean(values);
    let n = values.len();
    if n < 2 {
        return (centre, centre);
    }
    let variance = values
        .iter()
        .map(|value| (value - centre).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let critical = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map(|t| t.inverse_cdf(0.975))
        .unwrap_or(1.96);
    let margin = critical * (variance / n as f64).sqrt();
    (centre - margin, centre + margin)
}

/// Returns the two-sided p-value and the number of non-zero differences.
///
/// Normal approximation with average ranks for ties, the matching variance
/// correction and a continuity correction of one half.
fn wilcoxon_signed_rank(diffs: &[f64]) -> (f64, usize) {
    let mut nonzero: Vec<f64> = diffs
        .iter()
        .copied()
        .filter(|diff| diff.abs() > f64::EPSILON)
        .collect();
    let n = nonzero.len();
    if n == 0 {
        return (1.0, 0);
    }
    nonzero.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut positive_rank_sum = 0.0;
    let mut tie_correction = 0.0;
    let mut start = 0;
    for group in nonzero.chunk_by(|a, b| (a.abs() - b.abs()).abs() < 1e-12) {
        let size = group.len() as f64;
        let average_rank = start as f64 + (size + 1.0) / 2.0;
        let positives = group.iter().filter(|diff| **diff > 0.0).count() as f64;
        positive_rank_sum += positives * average_rank;
        tie_correction += size.powi(3) - size;
        start += group.len();
    }

    let n = n as f64;
    let expected = n * (n + 1.0) / 4.0;
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_correction / 48.0;
    if variance <= 0.0 {
        return (1.0, nonzero.len());
    }
    let z = (((positive_rank_sum - expected).abs() - 0.5) / variance.sqrt()).max(0.0);
    let p_value = Normal::new(0.0, 1.0)
        .map(|normal| 2.0 * (1.0 - normal.cdf(z)))
        .unwrap_or(1.0);
    (p_value.clamp(0.0, 1.0), nonzero.len())
}
