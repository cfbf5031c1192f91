// src/metrics/mod.rs
mod collector;
mod exposition;

pub use collector::{method_label, ClientOutcome, MetricsCollector, MetricsRegistry, Timer};
pub use exposition::{metrics_response, start_metrics_server};
