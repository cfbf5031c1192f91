// src/client/api.rs
use super::error::{ApiError, RequestError};
use crate::metrics::{ClientOutcome, MetricsCollector};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Path prefix every client request is issued under.
pub const API_BASE: &str = "/api";

const HEALTH_FAILED: &str = "Health check failed";
const REQUEST_FAILED: &str = "Request failed";

/// Thin client for the backend's `/api` endpoints.
///
/// Each call issues exactly one GET and hands the decoded JSON to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    origin: Url,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ApiClient {
    pub fn new(origin: Url) -> Self {
        Self::with_client(Client::new(), origin)
    }

    pub fn with_client(http: Client, origin: Url) -> Self {
        Self {
            http,
            origin,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// GET `{API_BASE}/health`.
    pub async fn fetch_health(&self) -> Result<Value, ApiError> {
        let path = format!("{API_BASE}/health");
        self.get_json("health", &path, HEALTH_FAILED).await
    }

    /// GET `{API_BASE}`.
    pub async fn fetch_root(&self) -> Result<Value, ApiError> {
        self.get_json("root", API_BASE, REQUEST_FAILED).await
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        path: &str,
        failure: &'static str,
    ) -> Result<Value, ApiError> {
        let result = self.fetch(path, failure).await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => ClientOutcome::Ok,
                Err(ApiError::Parse(_)) => ClientOutcome::ParseError,
                Err(_) => ClientOutcome::RequestError,
            };
            metrics.record_client_call(endpoint, outcome);
        }

        result
    }

    async fn fetch(&self, path: &str, failure: &'static str) -> Result<Value, ApiError> {
        let url = self.origin.join(path)?;
        debug!("GET {}", url);

        let response = self.http.get(url.as_str()).send().await.map_err(|e| {
            warn!(%url, error = %e, "request did not complete");
            RequestError::transport(failure, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "{}", failure);
            return Err(RequestError::status(failure, status).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::transport(failure, e))?;

        Ok(serde_json::from_slice(&body)?)
    }
}
