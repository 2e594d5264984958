pub mod analytics;
pub mod config;
pub mod logging;
pub mod survey;
pub mod telemetry;
