//! Digest of the bidder's structured events in `telemetry.jsonl`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write as _};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BID_TARGET: &str = "whist_bot::bid";
const DETAIL_TARGET: &str = "whist_bot::bid_detail";
const NO_LABEL: &str = "none";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry line {line} is not a JSON event: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode telemetry report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TelemetryError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| TelemetryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One line of the JSON log; everything but the target and the fields the
/// report reads is ignored.
#[derive(Deserialize)]
struct LogLine {
    #[serde(default)]
    target: String,
    #[serde(default)]
    fields: EventFields,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct EventFields {
    expected_tricks: Option<f64>,
    bid: Option<f64>,
    adjustment: Option<String>,
    trump: Option<String>,
    probability: Option<f64>,
    is_trump: Option<bool>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    total: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub bids: BidStats,
    pub details: DetailStats,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BidStats {
    pub events: usize,
    pub mean_expected_tricks: Option<f64>,
    pub mean_bid: Option<f64>,
    /// Mean of `bid - expected_tricks`; positive when bids run high.
    pub mean_rounding_bias: Option<f64>,
    pub adjustments: BTreeMap<String, usize>,
    pub trumps: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DetailStats {
    pub cards: usize,
    pub trump_cards: usize,
    pub mean_probability: Option<f64>,
    pub mean_trump_probability: Option<f64>,
}

impl TelemetryReport {
    /// Reads a JSON-lines log. A missing log yields an empty report.
    pub fn from_log(path: &Path) -> Result<Self, TelemetryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = fs::File::open(path).map_err(TelemetryError::io(path))?;

        let mut report = Self::default();
        let mut expected = RunningMean::default();
        let mut bid = RunningMean::default();
        let mut bias = RunningMean::default();
        let mut probability = RunningMean::default();
        let mut trump_probability = RunningMean::default();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(TelemetryError::io(path))?;
            if line.trim().is_empty() {
                continue;
            }
            let event: LogLine = serde_json::from_str(&line).map_err(|source| {
                TelemetryError::Decode {
                    line: index + 1,
                    source,
                }
            })?;
            let fields = event.fields;

            match event.target.as_str() {
                BID_TARGET => {
                    report.bids.events += 1;
                    if let Some(value) = fields.expected_tricks {
                        expected.push(value);
                    }
                    if let Some(value) = fields.bid {
                        bid.push(value);
                    }
                    if let (Some(expected), Some(bid)) = (fields.expected_tricks, fields.bid) {
                        bias.push(bid - expected);
                    }
                    *report
                        .bids
                        .adjustments
                        .entry(label(fields.adjustment))
                        .or_default() += 1;
                    *report.bids.trumps.entry(label(fields.trump)).or_default() += 1;
                }
                DETAIL_TARGET => {
                    report.details.cards += 1;
                    let is_trump = fields.is_trump.unwrap_or(false);
                    report.details.trump_cards += usize::from(is_trump);
                    if let Some(value) = fields.probability {
                        probability.push(value);
                        if is_trump {
                            trump_probability.push(value);
                        }
                    }
                }
                _ => {}
            }
        }

        report.bids.mean_expected_tricks = expected.value();
        report.bids.mean_bid = bid.value();
        report.bids.mean_rounding_bias = bias.value();
        report.details.mean_probability = probability.value();
        report.details.mean_trump_probability = trump_probability.value();
        Ok(report)
    }

    pub fn to_markdown(&self, source: &Path) -> String {
        let mut out = String::from("# Telemetry Summary\n\n");
        let _ = writeln!(out, "Source: `{}`\n", source.display());
        out.push_str("## Bids\n");
        let _ = writeln!(out, "- Events: {}", self.bids.events);
        write_mean(&mut out, "Mean expected tricks", self.bids.mean_expected_tricks);
        write_mean(&mut out, "Mean bid", self.bids.mean_bid);
        if let Some(bias) = self.bids.mean_rounding_bias {
            let _ = writeln!(out, "- Bid minus expectation: {bias:+.3}");
        }
        for (trump, count) in &self.bids.trumps {
            let _ = writeln!(out, "- Trump {trump}: {count}");
        }

        out.push_str("\n## Card Details\n");
        if self.details.cards == 0 {
            out.push_str("- none recorded\n");
        } else {
            let _ = writeln!(
                out,
                "- Cards: {} ({} trumps)",
                self.details.cards, self.details.trump_cards
            );
            write_mean(&mut out, "Mean winner probability", self.details.mean_probability);
            write_mean(
                &mut out,
                "Mean trump winner probability",
                self.details.mean_trump_probability,
            );
        }
        out
    }

    /// Short section appended to the survey summary.
    pub fn highlights(&self) -> String {
        let mut out = String::from("\n## Telemetry Highlights\n");
        let _ = writeln!(out, "- Bid events: {}", self.bids.events);
        write_mean(&mut out, "Mean expected tricks", self.bids.mean_expected_tricks);
        if let Some(bias) = self.bids.mean_rounding_bias {
            let _ = writeln!(out, "- Bid minus expectation: {bias:+.3}");
        }
        for (direction, count) in &self.bids.adjustments {
            let _ = writeln!(out, "- Adjustment {direction}: {count}");
        }
        if self.details.cards > 0 {
            let _ = writeln!(out, "- Card details: {}", self.details.cards);
        }
        out
    }
}

fn label(value: Option<String>) -> String {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_LABEL.to_string())
}

fn write_mean(out: &mut String, name: &str, value: Option<f64>) {
    if let Some(value) = value {
        let _ = writeln!(out, "- {name}: {value:.3}");
    }
}

#[derive(Debug)]
pub struct TelemetryFiles {
    pub report: TelemetryReport,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Summarises `log_path` into `telemetry_summary.{json,md}` under `dir`.
/// Returns `None` when no log was written.
pub fn write_report(log_path: &Path, dir: &Path) -> Result<Option<TelemetryFiles>, TelemetryError> {
    if !log_path.exists() {
        return Ok(None);
    }
    let report = TelemetryReport::from_log(log_path)?;

    let json_path = dir.join("telemetry_summary.json");
    fs::write(&json_path, serde_json::to_vec_pretty(&report)?)
        .map_err(TelemetryError::io(&json_path))?;
    let markdown_path = dir.join("telemetry_summary.md");
    fs::write(&markdown_path, report.to_markdown(log_path))
        .map_err(TelemetryError::io(&markdown_path))?;

    Ok(Some(TelemetryFiles {
        report,
        json_path,
        markdown_path,
    }))
}

pub fn append_highlights(summary_md: &Path, report: &TelemetryReport) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(summary_md)
        .map_err(TelemetryError::io(summary_md))?;
    file.write_all(report.highlights().as_bytes())
        .map_err(TelemetryError::io(summary_md))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn log_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp log");
        for line in lines {
            writeln!(file, "{line}").expect("write log line");
        }
        file
    }

    #[test]
    fn folds_bid_and_detail_events() {
        let log = log_file(&[
            r#"{"timestamp":"t","level":"INFO","target":"whist_bot::bid","fields":{"expected_tricks":2.0217,"bid":2,"adjustment":"","trump":"S"}}"#,
            r#"{"target":"whist_bot::bid","fields":{"expected_tricks":2.0217,"bid":3,"adjustment":"Raised","trump":"S"}}"#,
            "",
            r#"{"target":"whist_bot::bid_detail","fields":{"probability":1.0,"is_trump":true}}"#,
            r#"{"target":"whist_bot::bid_detail","fields":{"probability":0.0217,"is_trump":false}}"#,
            r#"{"target":"whist_bench::deal","fields":{"deal_id":"G000_R01"}}"#,
        ]);
        let report = TelemetryReport::from_log(log.path()).expect("report");

        assert_eq!(report.bids.events, 2);
        assert_eq!(report.bids.mean_bid, Some(2.5));
        let bias = report.bids.mean_rounding_bias.expect("bias");
        assert!((bias - 0.4783).abs() < 1e-9, "bias = {bias}");
        assert_eq!(report.bids.adjustments.get("none"), Some(&1));
        assert_eq!(report.bids.adjustments.get("Raised"), Some(&1));
        assert_eq!(report.bids.trumps.get("S"), Some(&2));
        assert_eq!(report.details.cards, 2);
        assert_eq!(report.details.trump_cards, 1);
        assert_eq!(report.details.mean_trump_probability, Some(1.0));
    }

    #[test]
    fn missing_log_is_an_empty_report() {
        let report = TelemetryReport::from_log(Path::new("no/such/telemetry.jsonl"))
            .expect("missing log");
        assert_eq!(report, TelemetryReport::default());
        let dir = tempfile::tempdir().expect("temp dir");
        let written = write_report(Path::new("no/such/telemetry.jsonl"), dir.path())
            .expect("nothing to write");
        assert!(written.is_none());
    }

    #[test]
    fn malformed_lines_report_their_position() {
        let log = log_file(&[r#"{"target":"whist_bot::bid","fields":{}}"#, "not json"]);
        let err = TelemetryReport::from_log(log.path()).expect_err("bad line");
        assert!(matches!(err, TelemetryError::Decode { line: 2, .. }));
    }

    #[test]
    fn report_files_and_highlights_are_written() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log_path = dir.path().join("telemetry.jsonl");
        fs::write(
            &log_path,
            "{\"target\":\"whist_bot::bid\",\"fields\":{\"expected_tricks\":1.875,\"bid\":2,\"adjustment\":\"Lowered\",\"trump\":\"NT\"}}\n",
        )
        .expect("write log");
        let summary_md = dir.path().join("summary.md");
        fs::write(&summary_md, "# Bid Survey Summary\n").expect("seed summary");

        let files = write_report(&log_path, dir.path())
            .expect("write report")
            .expect("log present");
        append_highlights(&summary_md, &files.report).expect("append");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.json_path).expect("json"))
                .expect("valid json");
        assert_eq!(json["bids"]["events"], 1);
        let markdown = fs::read_to_string(&files.markdown_path).expect("markdown");
        assert!(markdown.contains("- Trump NT: 1"));
        assert!(markdown.contains("- none recorded"));

        let summary = fs::read_to_string(&summary_md).expect("summary");
        assert!(summary.starts_with("# Bid Survey Summary\n"));
        assert!(summary.contains("## Telemetry Highlights"));
        assert!(summary.contains("- Mean expected tricks: 1.875"));
        assert!(summary.contains("- Bid minus expectation: +0.125"));
        assert!(summary.contains("- Adjustment Lowered: 1"));
    }
}
