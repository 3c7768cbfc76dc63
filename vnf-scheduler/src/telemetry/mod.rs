/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Point-in-time metric queries against a Prometheus backend.
//!
//! [`MetricSource`] is the seam the scoring engine talks to; the production
//! implementation is [`PrometheusClient`], which issues an instant query over
//! the HTTP API and reduces the vector result to one [`MetricSample`].
//!
//! Every failure is reported as a [`TelemetryError`] and means the same thing
//! to the caller: *this metric is unavailable for this round*.  The client
//! never retries; the engine decides which default to substitute.

pub mod query;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::node::MetricSample;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a metric query produced no usable sample.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Connection setup, transport or timeout failure.
    #[error("request to metrics backend failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status and no parsable
    /// error body.
    #[error("metrics backend returned HTTP {0}")]
    Status(u16),

    /// The response body was not a Prometheus API envelope.
    #[error("malformed response from metrics backend: {0}")]
    Decode(String),

    /// The backend rejected the query (bad PromQL, execution error, …).
    #[error("query failed ({kind}): {message}")]
    Query { kind: String, message: String },

    /// The result was a matrix, scalar or string instead of an instant vector.
    #[error("unexpected result type '{0}' (expected vector)")]
    UnexpectedResultType(String),

    /// The vector was empty — no series matched.
    #[error("no data returned for query")]
    EmptyResult,

    /// The first sample was not a finite number (e.g. `NaN` from `0/0`).
    #[error("sample value '{0}' is not a finite number")]
    InvalidValue(String),
}

// ── MetricSource ──────────────────────────────────────────────────────────────

/// Anything that can evaluate a scalar metric expression "now".
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Evaluate `expr` against the backend at `backend` and return the first
    /// sample, rounded to two decimals.
    async fn query(&self, backend: &str, expr: &str) -> Result<MetricSample, TelemetryError>;
}

// ── Prometheus HTTP API wire types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(rename = "resultType")]
    result_type: String,
    /// Shape depends on `result_type`; only vectors are decoded further.
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VectorSample {
    /// `[unix_timestamp, "value"]`
    value: (f64, String),
}

impl ApiResponse {
    /// Reduce the envelope to the first sample of an instant vector.
    fn into_sample(self) -> Result<MetricSample, TelemetryError> {
        if self.status != "success" {
            return Err(TelemetryError::Query {
                kind: self.error_type.unwrap_or_else(|| "unknown".to_string()),
                message: self.error.unwrap_or_default(),
            });
        }

        let data = self
            .data
            .ok_or_else(|| TelemetryError::Decode("success response without data".to_string()))?;

        if data.result_type != "vector" {
            return Err(TelemetryError::UnexpectedResultType(data.result_type));
        }

        let samples: Vec<VectorSample> = serde_json::from_value(data.result)
            .map_err(|e| TelemetryError::Decode(e.to_string()))?;

        let first = samples.into_iter().next().ok_or(TelemetryError::EmptyResult)?;
        let raw = first.value.1;

        // Prometheus encodes NaN/±Inf as strings which `f64::from_str` accepts.
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(MetricSample::rounded(v)),
            _ => Err(TelemetryError::InvalidValue(raw)),
        }
    }
}

// ── PrometheusClient ──────────────────────────────────────────────────────────

/// Instant-query client for the Prometheus HTTP API.
///
/// One `reqwest::Client` is shared by every query; the configured timeout
/// bounds each request end to end.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    port: u16,
}

impl PrometheusClient {
    /// Build a client that talks to `http://<backend>:<port>`.
    pub fn new(port: u16, timeout: Duration) -> Result<Self, TelemetryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, port })
    }

    fn url(&self, backend: &str) -> String {
        format!("http://{}:{}/api/v1/query", backend, self.port)
    }
}

/// Evaluation instant for "now", as Prometheus expects it.
fn now_unix_seconds() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:.3}", now.as_secs_f64())
}

#[async_trait]
impl MetricSource for PrometheusClient {
    async fn query(&self, backend: &str, expr: &str) -> Result<MetricSample, TelemetryError> {
        let url = self.url(backend);
        debug!(url = %url, query = expr, "Querying Prometheus");

        let response = self
            .http
            .get(&url)
            .query(&[("query", expr), ("time", now_unix_seconds().as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let envelope: ApiResponse = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            // Error bodies from proxies in front of Prometheus are rarely JSON.
            Err(_) if !status.is_success() => return Err(TelemetryError::Status(status.as_u16())),
            Err(e) => return Err(TelemetryError::Decode(e.to_string())),
        };

        if !envelope.warnings.is_empty() {
            warn!(query = expr, warnings = ?envelope.warnings, "Prometheus returned warnings");
        }

        envelope.into_sample()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
