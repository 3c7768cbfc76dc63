/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use vnf_scheduler::cluster::k8s::{self, KubeCluster};
use vnf_scheduler::config::{ScoringConfig, DEFAULT_SCHEDULER_NAME};
use vnf_scheduler::placement::PlacementLoop;
use vnf_scheduler::scheduler::ScoringEngine;
use vnf_scheduler::telemetry::PrometheusClient;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Telemetry-driven scheduler for VNF pods.
///
/// Example:
///   vnf-scheduler --prometheus-host 10.0.0.5 --config scheduler.yaml
#[derive(Debug, Parser)]
#[command(
    name = "vnf-scheduler",
    about = "Places pods on the healthiest worker node using live Prometheus telemetry",
    long_about = None,
)]
struct Cli {
    /// Pods whose spec.schedulerName equals this value are scheduled.
    #[arg(short = 'n', long = "scheduler-name", default_value = DEFAULT_SCHEDULER_NAME)]
    scheduler_name: String,

    /// Host (without port) of the Prometheus server.
    #[arg(short = 'p', long = "prometheus-host", default_value = "1.1.1.1")]
    prometheus_host: String,

    /// Path to the YAML scoring configuration.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Path to a kubeconfig file (skips in-cluster / default discovery).
    #[arg(short = 'k', long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!(
        scheduler_name  = %cli.scheduler_name,
        prometheus_host = %cli.prometheus_host,
        config          = ?cli.config,
        kubeconfig      = ?cli.kubeconfig,
        "VNF scheduler starting up"
    );

    // ── Scoring configuration ─────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => ScoringConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default scoring settings");
            ScoringConfig::default()
        }
    };
    info!(
        weights = ?config.weights,
        cpu_threshold = config.cpu_threshold_percent,
        memory_threshold = config.memory_threshold_ratio,
        gate_policy = ?config.gate_failure_policy,
        "Scoring configuration"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let client = k8s::connect(cli.kubeconfig.as_deref()).await?;
    let cluster = Arc::new(KubeCluster::new(client.clone()));
    let metrics = Arc::new(
        PrometheusClient::new(config.prometheus_port, config.query_timeout())
            .context("Failed to build Prometheus client")?,
    );

    let engine = Arc::new(ScoringEngine::new(cluster.clone(), metrics, config));
    let placement = PlacementLoop::new(engine, cluster, cli.prometheus_host);

    // ── Control loop ──────────────────────────────────────────────────────────
    let events = k8s::watch_unscheduled_workloads(client, &cli.scheduler_name);
    info!(scheduler_name = %cli.scheduler_name, "Watching for unscheduled pods");

    tokio::select! {
        _ = placement.run(events) => {
            warn!("Pod watch ended unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
