/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! prom-sim — a stand-in for the Prometheus instant-query API.
//!
//! Point the scheduler's `--prometheus-host` at this process to drive the
//! scoring engine with hand-picked numbers.  Values are the *final* result of
//! a query, looked up by the query's first `instance="…"` label and the first
//! known metric name that appears in the expression:
//!
//! ```yaml
//! instances:
//!   "10.0.0.11:9100":
//!     node_cpu_seconds_total: 42.0              # CPU busy %
//!     node_memory_MemTotal_bytes: 0.55          # used-memory ratio
//!     node_network_transmit_bytes_total: 3.1e7  # host bytes/s
//!   "10.0.0.11:9101":
//!     ovs_interface_tx_dropped_total: 0.01      # tx drop ratio
//!     ovs_interface_rx_errors_total: 0.0        # rx error ratio
//!     ovs_interface_tx_bytes_total: 25.0        # switch utilisation %
//! ```
//!
//! Anything not listed answers with an empty vector, which the scheduler
//! treats as missing data.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "prom-sim", about = "Fake Prometheus query endpoint for manual scheduler tests")]
struct Cli {
    /// Listen port (the scheduler expects 9090 by default).
    #[arg(short = 'p', long = "port", default_value_t = 9090)]
    port: u16,

    /// YAML file of per-instance metric values.
    #[arg(short = 'm', long = "metrics")]
    metrics: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct SimMetrics {
    #[serde(default)]
    instances: BTreeMap<String, BTreeMap<String, f64>>,
}

impl SimMetrics {
    /// Resolve `expr` to a configured value, if any.
    fn lookup(&self, expr: &str) -> Option<f64> {
        let start = expr.find("instance=\"")? + "instance=\"".len();
        let end = start + expr[start..].find('"')?;
        let metrics = self.instances.get(&expr[start..end])?;

        metrics
            .iter()
            .filter_map(|(name, value)| expr.find(name.as_str()).map(|pos| (pos, *value)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    query: String,
    time: Option<String>,
}

async fn instant_query(
    State(sim): State<Arc<SimMetrics>>,
    Query(params): Query<QueryParams>,
) -> Json<Value> {
    let ts: f64 = params
        .time
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or_default();

    let result = match sim.lookup(&params.query) {
        Some(v) => {
            debug!(query = %params.query, value = v, "hit");
            json!([{ "metric": {}, "value": [ts, v.to_string()] }])
        }
        None => {
            debug!(query = %params.query, "miss");
            json!([])
        }
    };

    Json(json!({
        "status": "success",
        "data": { "resultType": "vector", "result": result }
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.metrics)
        .with_context(|| format!("Cannot open metrics file: {}", cli.metrics.display()))?;
    let sim: SimMetrics = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML file: {}", cli.metrics.display()))?;
    info!("Loaded metrics for {} instance(s)", sim.instances.len());

    let app = Router::new()
        .route("/api/v1/query", get(instant_query))
        .with_state(Arc::new(sim));

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    info!("prom-sim listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")
}
