// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Encode everything registered so far in the Prometheus text format.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

/// Result label for a client call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOutcome {
    Ok,
    RequestError,
    ParseError,
}

impl ClientOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientOutcome::Ok => "ok",
            ClientOutcome::RequestError => "request_error",
            ClientOutcome::ParseError => "parse_error",
        }
    }
}

pub struct MetricsCollector {
    // Served requests
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Outgoing client calls
    pub client_requests_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new("api_http_requests_total", "Total number of served requests"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "api_http_request_duration_seconds",
                "Served request duration in seconds",
            ),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let client_requests_total = IntCounterVec::new(
            Opts::new("api_client_requests_total", "Total number of client calls"),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(client_requests_total.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration_seconds,
            client_requests_total,
        })
    }

    pub fn record_request(
        &self,
        method: &str,
        path: &str,
        status_code: u16,
        duration: std::time::Duration,
    ) {
        let method = method_label(method);
        let status = status_code.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration.as_secs_f64());
    }

    pub fn record_client_call(&self, endpoint: &str, outcome: ClientOutcome) {
        self.client_requests_total
            .with_label_values(&[endpoint, outcome.as_str()])
            .inc();
    }
}

/// Bounded `method` label; extension methods collapse into `other`.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        _ => "other",
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_exposes_recorded_series() {
        let registry = MetricsRegistry::new().unwrap();
        let collector = registry.collector();

        collector.record_request("GET", "/health", 200, std::time::Duration::from_millis(3));
        collector.record_client_call("health", ClientOutcome::RequestError);

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains(r#"api_http_requests_total{method="GET",path="/health",status="200"} 1"#));
        assert!(text.contains(r#"api_client_requests_total{endpoint="health",outcome="request_error"} 1"#));
        assert!(text.contains("api_http_request_duration_seconds_count"));
    }

    #[test]
    fn test_extension_methods_share_one_series() {
        let registry = MetricsRegistry::new().unwrap();
        let collector = registry.collector();

        for i in 0..50 {
            let method = format!("X{i}");
            collector.record_request(&method, "/", 405, std::time::Duration::ZERO);
        }
        collector.record_request("PATCH", "/", 405, std::time::Duration::ZERO);

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        let series = text
            .lines()
            .filter(|l| l.starts_with("api_http_requests_total{"))
            .count();
        assert_eq!(series, 2);
        assert!(text.contains(r#"api_http_requests_total{method="other",path="/",status="405"} 50"#));
        assert!(text.contains(r#"api_http_requests_total{method="PATCH",path="/",status="405"} 1"#));
    }

    #[test]
    fn test_registries_are_independent() {
        let first = MetricsRegistry::new().unwrap();
        let second = MetricsRegistry::new().unwrap();

        first.collector().record_client_call("root", ClientOutcome::Ok);

        let text = String::from_utf8(second.gather().unwrap()).unwrap();
        assert!(!text.contains(r#"endpoint="root""#));
    }
}
