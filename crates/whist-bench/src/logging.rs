use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LoggingConfig, OutputPaths};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Keeps the background writer alive; dropping it flushes the log.
pub struct TelemetrySink {
    _flush: WorkerGuard,
    pub path: PathBuf,
}

/// Routes events into `telemetry.jsonl` beside the survey summary.
/// `RUST_LOG` takes precedence over the configured level.
pub fn install(logging: &LoggingConfig, outputs: &OutputPaths) -> Result<Option<TelemetrySink>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let dir = outputs.telemetry_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(TELEMETRY_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let (writer, flush) = NonBlockingBuilder::default().lossy(false).finish(file);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(logging.level()).into())
        .from_env_lossy();
    let json = fmt::layer()
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
        .with_filter(filter);

    // Fails only when a subscriber is already installed; events then go there.
    if tracing_subscriber::registry().with(json).try_init().is_err() {
        tracing::warn!(path = %path.display(), "telemetry subscriber already installed");
    }

    Ok(Some(TelemetrySink {
        _flush: flush,
        path,
    }))
}
