use std::collections::HashMap;
use std::fs;

use tempfile::tempdir;
use whist_bench::config::SurveyConfig;
use whist_bench::survey::SurveyRunner;

fn load_config(output_dir: &std::path::Path) -> SurveyConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
deals:
  seed: 4242
  games: 2
  players: 4
  max_cards: 5
  include_no_trump: true
agents:
  - name: "baseline"
    kind: "heuristic"
  - name: "include"
    kind: "heuristic"
    params:
      short_suit_rule: "include_trumps"
  - name: "undamped"
    kind: "heuristic"
    params:
      damping_weight: 1.0
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "baseline"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("bids.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let cfg: SurveyConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn normalized_rows(path: &std::path::Path) -> Vec<serde_json::Value> {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    jsonl
        .lines()
        .map(|line| {
            let mut value: serde_json::Value =
                serde_json::from_str(line).expect("row decodes to JSON");
            if let Some(obj) = value.as_object_mut() {
                obj.insert("latency_us".to_string(), serde_json::Value::from(0.0));
            }
            value
        })
        .collect()
}

#[test]
fn survey_smoke_test_writes_every_bid() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let outputs = config.output_paths();

    let runner = SurveyRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("survey completes");

    assert_eq!(summary.games, 2);
    assert_eq!(summary.rounds_per_game, 5);
    assert_eq!(summary.deals_played, 10);
    // 10 deals, 3 agents, 4 seats each.
    assert_eq!(summary.rows_written, 120);
    assert!(summary.summary_path.exists(), "summary markdown missing");
    assert!(summary.telemetry_path.is_none());

    let rows = normalized_rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 120);

    let mut totals: HashMap<(String, String), (u64, u64)> = HashMap::new();
    for row in &rows {
        let bid = row["bid"].as_u64().expect("bid");
        let hand_size = row["hand_size"].as_u64().expect("hand size");
        assert!(bid <= hand_size);
        let key = (
            row["deal_id"].as_str().expect("deal id").to_string(),
            row["agent"].as_str().expect("agent").to_string(),
        );
        let entry = totals.entry(key).or_insert((0, hand_size));
        entry.0 += bid;
    }
    assert_eq!(totals.len(), 30);
    for ((deal_id, agent), (total, hand_size)) in totals {
        assert_ne!(total, hand_size, "{agent} made the {deal_id} bids add up");
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| baseline | heuristic | 40 |"));
    assert!(markdown.contains("| include |"));
    assert!(markdown.contains("| undamped |"));
}

#[test]
fn survey_output_is_reproducible() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let first = {
        let config = load_config(first_dir.path());
        let outputs = config.output_paths();
        let summary = SurveyRunner::new(config, outputs)
            .expect("runner created")
            .run()
            .expect("survey completes");
        normalized_rows(&summary.jsonl_path)
    };
    let second = {
        let config = load_config(second_dir.path());
        let outputs = config.output_paths();
        let summary = SurveyRunner::new(config, outputs)
            .expect("runner created")
            .run()
            .expect("survey completes");
        normalized_rows(&summary.jsonl_path)
    };

    assert_eq!(first, second);
}

#[test]
fn last_bidder_is_the_dealer() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let outputs = config.output_paths();
    let summary = SurveyRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("survey completes");

    for row in normalized_rows(&summary.jsonl_path) {
        if row["bid_position"].as_u64() == Some(3) {
            assert_eq!(row["seat"], row["dealer"]);
        } else {
            assert_eq!(row["adjusted"], serde_json::Value::Bool(false));
        }
    }
}
