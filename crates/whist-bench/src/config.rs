//! YAML description of a bid survey: which deals to play, which bidders to
//! compare, and where the results go.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use whist_core::bidding::{BidError, BidEstimatorConfig, ShortSuitRule};
use whist_core::model::round::{RoundSchedule, max_cards_for};

const RUN_ID_PLACEHOLDER: &str = "{run_id}";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    pub run_id: String,
    pub deals: DealConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputTemplates,
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SurveyConfig {
    /// Reads and validates a survey file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SurveyConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate().map_err(|source| ConfigError::Rejected {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure(
            is_file_safe(&self.run_id),
            "run_id",
            format!("'{}' must be non-empty letters, digits, '.', '_' or '-'", self.run_id),
        )?;
        self.deals.validate()?;
        self.outputs.validate()?;
        self.logging.validate()?;

        ensure(!self.agents.is_empty(), "agents", "list at least one agent")?;
        let mut names = HashSet::new();
        for agent in &self.agents {
            ensure(
                is_file_safe(&agent.name),
                "agents.name",
                format!("'{}' is not a usable agent name", agent.name),
            )?;
            ensure(
                names.insert(agent.name.as_str()),
                "agents.name",
                format!("'{}' appears more than once", agent.name),
            )?;
            agent.estimator_config().map_err(|err| ValidationError {
                field: "agents.params",
                message: format!("{}: {err}", agent.name),
            })?;
        }

        self.metrics.validate(&names)
    }

    /// Output paths with `{run_id}` substituted.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            jsonl: PathBuf::from(self.outputs.jsonl.replace(RUN_ID_PLACEHOLDER, &self.run_id)),
            summary_md: PathBuf::from(
                self.outputs
                    .summary_md
                    .replace(RUN_ID_PLACEHOLDER, &self.run_id),
            ),
        }
    }
}

/// Deals are played game by game; a game walks the whole round schedule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub games: usize,
    pub players: usize,
    /// Largest hand in the schedule; the pack limit when absent.
    #[serde(default)]
    pub max_cards: Option<usize>,
    #[serde(default)]
    pub include_no_trump: bool,
    #[serde(default)]
    pub bounce: bool,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure(self.games > 0, "deals.games", "play at least one game")?;
        let limit = max_cards_for(self.players);
        ensure(
            self.players >= 2 && limit > 0,
            "deals.players",
            format!("{} players cannot share one pack", self.players),
        )?;
        if let Some(max_cards) = self.max_cards {
            ensure(
                (1..=limit).contains(&max_cards),
                "deals.max_cards",
                format!(
                    "{max_cards} cards is outside 1..={limit} for {} players",
                    self.players
                ),
            )?;
        }
        Ok(())
    }

    pub fn schedule(&self) -> RoundSchedule {
        let standard = RoundSchedule::standard(self.players);
        RoundSchedule {
            max_cards: self.max_cards.unwrap_or(standard.max_cards),
            bounce: self.bounce,
            include_no_trump: self.include_no_trump,
            ..standard
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: HeuristicParams,
}

impl AgentConfig {
    pub fn estimator_config(&self) -> Result<BidEstimatorConfig, BidError> {
        match self.kind {
            AgentKind::Heuristic => self.params.estimator_config(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
}

impl AgentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AgentKind::Heuristic => "heuristic",
        }
    }
}

/// Estimator overrides; anything left out keeps the library default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeuristicParams {
    #[serde(default)]
    pub short_suit_rule: Option<ShortSuitRule>,
    #[serde(default)]
    pub damping_weight: Option<f64>,
}

impl HeuristicParams {
    pub fn estimator_config(&self) -> Result<BidEstimatorConfig, BidError> {
        let base = BidEstimatorConfig::default();
        let config = BidEstimatorConfig {
            short_suit_rule: self.short_suit_rule.unwrap_or(base.short_suit_rule),
            damping_weight: self.damping_weight.unwrap_or(base.damping_weight),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Output locations; `{run_id}` may appear anywhere in either path.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputTemplates {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputTemplates {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure(
            !self.jsonl.trim().is_empty(),
            "outputs.jsonl",
            "path must not be empty",
        )?;
        ensure(
            !self.summary_md.trim().is_empty(),
            "outputs.summary_md",
            "path must not be empty",
        )?;
        ensure(
            self.jsonl != self.summary_md,
            "outputs",
            "bid log and summary must be different files",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl OutputPaths {
    /// Directory holding the summary; telemetry files are written beside it.
    pub fn telemetry_dir(&self) -> PathBuf {
        match self.summary_md.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Agent the others are compared against.
    pub baseline: String,
    /// Mean time per bid above which an agent is flagged in the summary.
    #[serde(default = "MetricsConfig::default_latency_budget_us")]
    pub latency_budget_us: u64,
}

impl MetricsConfig {
    const fn default_latency_budget_us() -> u64 {
        5_000
    }

    fn validate(&self, agents: &HashSet<&str>) -> Result<(), ValidationError> {
        ensure(
            agents.contains(self.baseline.as_str()),
            "metrics.baseline",
            format!("'{}' is not one of the agents", self.baseline),
        )?;
        ensure(
            self.latency_budget_us > 0,
            "metrics.latency_budget_us",
            "budget must be positive",
        )
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Write JSON tracing events to `telemetry.jsonl` beside the summary.
    pub enable_structured: bool,
    pub tracing_level: String,
    /// Per-card estimator events; they are only seen at `debug` or finer.
    pub bid_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: "info".to_string(),
            bid_details: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ensure(
            self.tracing_level.parse::<Level>().is_ok(),
            "logging.tracing_level",
            format!("unknown level '{}'", self.tracing_level),
        )
    }

    pub fn level(&self) -> Level {
        self.tracing_level.parse().unwrap_or(Level::INFO)
    }
}

fn is_file_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn ensure(
    condition: bool,
    field: &'static str,
    message: impl Into<String>,
) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            message: message.into(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read survey config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("survey config {} is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("survey config {} rejected: {source}", path.display())]
    Rejected {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// A config value the survey cannot run with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}
