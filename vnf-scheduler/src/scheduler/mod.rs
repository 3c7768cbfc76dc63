/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Telemetry-driven node selection.
//!
//! [`ScoringEngine`] turns a fresh node inventory and six live metrics per
//! node into one placement choice:
//!
//! ```text
//! inventory ──► per node: CPU gate ─► memory gate ─► 4 signals ─► composite score
//!                            │             │
//!                            └─ Excluded ◄─┘
//!           ──► first node with the strictly greatest score
//! ```
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless rounds — inventory and samples are locals of one call |
//! | Tuning | Immutable [`ScoringConfig`] injected at construction |
//! | Concurrency | Candidates scored concurrently; gate pair and signal quartet each joined |
//! | Ordering | Results keep inventory order, so ties go to the first-listed node |
//! | Missing signals | Fail-open: logged and replaced by `0` |
//! | Missing gates | [`GateFailurePolicy`], fail-open by default |
//!
//! # Example
//! ```rust,ignore
//! let engine = ScoringEngine::new(inventory, metrics, ScoringConfig::default());
//! let best = engine.select_best_node("prometheus.monitoring").await?;
//! ```

pub mod error;
pub mod score;

pub use error::{ExclusionReason, SchedulerError};
pub use score::NodeSignals;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cluster::NodeInventory;
use crate::config::{GateFailurePolicy, ScoringConfig};
use crate::node::{MetricSample, WorkerNode};
use crate::telemetry::{query, MetricSource, TelemetryError};

// ── Round results ─────────────────────────────────────────────────────────────

/// How one candidate fared in a round.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Scored { score: f64, signals: NodeSignals },
    Excluded(ExclusionReason),
}

/// One entry per eligible node per round.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub node: WorkerNode,
    pub outcome: CandidateOutcome,
}

impl CandidateScore {
    /// The composite score, or `None` for an excluded node.
    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            CandidateOutcome::Scored { score, .. } => Some(score),
            CandidateOutcome::Excluded(_) => None,
        }
    }
}

/// The winning node of a round.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: WorkerNode,
    pub score: f64,
}

/// Pick the first candidate holding the strictly greatest score.
///
/// Excluded candidates never win.  Scores that are not comparable (`NaN`)
/// never replace the current best.
pub fn pick_best(candidates: &[CandidateScore]) -> Result<Selection, SchedulerError> {
    if candidates.is_empty() {
        return Err(SchedulerError::NoCandidates);
    }

    let mut best: Option<Selection> = None;
    for candidate in candidates {
        let Some(score) = candidate.score() else {
            continue;
        };
        let better = match &best {
            None => !score.is_nan(),
            Some(current) => score > current.score,
        };
        if better {
            best = Some(Selection {
                node: candidate.node.clone(),
                score,
            });
        }
    }

    best.ok_or(SchedulerError::AllExcluded {
        excluded: candidates.len(),
    })
}

// ── ScoringEngine ─────────────────────────────────────────────────────────────

/// Scores candidate nodes from live telemetry and selects the best one.
///
/// Holds only shared handles and immutable tuning; every round allocates its
/// own inventory snapshot and samples and drops them on return.
pub struct ScoringEngine {
    inventory: Arc<dyn NodeInventory>,
    metrics: Arc<dyn MetricSource>,
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(
        inventory: Arc<dyn NodeInventory>,
        metrics: Arc<dyn MetricSource>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            inventory,
            metrics,
            config,
        }
    }

    // ── Public entry points ───────────────────────────────────────────────────

    /// Run one full round against the telemetry backend at `telemetry_address`.
    ///
    /// # Errors
    /// * [`SchedulerError::InventoryUnavailable`] — the node list could not be read.
    /// * [`SchedulerError::NoCandidates`] — the cluster has no worker nodes.
    /// * [`SchedulerError::AllExcluded`] — every node failed a hard gate.
    pub async fn select_best_node(
        &self,
        telemetry_address: &str,
    ) -> Result<Selection, SchedulerError> {
        let nodes = self.inventory.list_eligible_nodes().await?;

        info!(
            candidates = nodes.len(),
            backend = telemetry_address,
            "=== Scoring round ==="
        );

        let candidates = self.score_candidates(telemetry_address, &nodes).await;
        let selection = pick_best(&candidates)?;

        info!(
            node = %selection.node.name,
            "Best node selected (score: {:.4})",
            selection.score
        );
        Ok(selection)
    }

    /// Evaluate every node in `nodes`, returning one entry per node in the
    /// same order.
    pub async fn score_candidates(
        &self,
        telemetry_address: &str,
        nodes: &[WorkerNode],
    ) -> Vec<CandidateScore> {
        join_all(
            nodes
                .iter()
                .map(|node| self.score_candidate(telemetry_address, node)),
        )
        .await
    }

    // ── Per-candidate evaluation ──────────────────────────────────────────────

    async fn score_candidate(&self, backend: &str, node: &WorkerNode) -> CandidateScore {
        let outcome = match self.check_gates(backend, node).await {
            Some(reason) => {
                warn!(node = %node.name, %reason, "✗ excluded");
                CandidateOutcome::Excluded(reason)
            }
            None => {
                let signals = self.read_signals(backend, node).await;
                let score = score::composite_score(
                    &signals,
                    &self.config.weights,
                    self.config.link_capacity_bytes_per_sec,
                );
                info!(
                    node = %node.name,
                    "✓ scored {:.4} (txDrop={:.4} rxErr={:.4} switchUtil={:.2}% traffic={:.2}MB/s)",
                    score,
                    signals.tx_drop_ratio,
                    signals.rx_error_ratio,
                    signals.switch_utilization_percent,
                    signals.traffic_bytes_per_sec / (1024.0 * 1024.0),
                );
                CandidateOutcome::Scored { score, signals }
            }
        };

        CandidateScore {
            node: node.clone(),
            outcome,
        }
    }

    /// Apply the CPU and memory hard gates.  `None` means the node is admitted.
    async fn check_gates(&self, backend: &str, node: &WorkerNode) -> Option<ExclusionReason> {
        let host = node.instance(self.config.node_exporter_port);
        let cpu_q = query::cpu_usage_percent(&host, &self.config.lookback);
        let mem_q = query::memory_used_ratio(&host);

        let (cpu, mem) = tokio::join!(
            self.metrics.query(backend, &cpu_q),
            self.metrics.query(backend, &mem_q),
        );

        let cpu = match self.gate_value(node, "cpu", cpu) {
            Ok(v) => v,
            Err(reason) => return Some(reason),
        };
        debug!(node = %node.name, cpu_percent = cpu, "CPU gate");
        if cpu > self.config.cpu_threshold_percent {
            return Some(ExclusionReason::CpuSaturated {
                usage_percent: cpu,
                threshold: self.config.cpu_threshold_percent,
            });
        }

        let mem = match self.gate_value(node, "memory", mem) {
            Ok(v) => v,
            Err(reason) => return Some(reason),
        };
        debug!(node = %node.name, memory_ratio = mem, "Memory gate");
        if mem > self.config.memory_threshold_ratio {
            return Some(ExclusionReason::MemorySaturated {
                used_ratio: mem,
                threshold: self.config.memory_threshold_ratio,
            });
        }

        None
    }

    /// Resolve a gate query result according to the gate failure policy.
    fn gate_value(
        &self,
        node: &WorkerNode,
        metric: &'static str,
        result: Result<MetricSample, TelemetryError>,
    ) -> Result<f64, ExclusionReason> {
        match result {
            Ok(sample) => Ok(sample.value()),
            Err(e) => match self.config.gate_failure_policy {
                GateFailurePolicy::FailOpen => {
                    warn!(
                        node = %node.name,
                        metric,
                        error = %e,
                        "Gate metric unavailable, assuming 0"
                    );
                    Ok(0.0)
                }
                GateFailurePolicy::FailClosed => {
                    warn!(node = %node.name, metric, error = %e, "Gate metric unavailable");
                    Err(ExclusionReason::GateMetricUnavailable { metric })
                }
            },
        }
    }

    /// Read the four continuous signals concurrently, defaulting each to 0.
    async fn read_signals(&self, backend: &str, node: &WorkerNode) -> NodeSignals {
        let host = node.instance(self.config.node_exporter_port);
        let switch = node.instance(self.config.ovs_exporter_port);
        let window = self.config.lookback.as_str();

        let tx_q = query::switch_tx_drop_ratio(&switch, window);
        let rx_q = query::switch_rx_error_ratio(&switch, window);
        let util_q = query::switch_utilization_percent(
            &switch,
            window,
            self.config.link_capacity_bytes_per_sec,
        );
        let traffic_q = query::host_traffic_bytes(&host, window);

        let (tx, rx, util, traffic) = tokio::join!(
            self.metrics.query(backend, &tx_q),
            self.metrics.query(backend, &rx_q),
            self.metrics.query(backend, &util_q),
            self.metrics.query(backend, &traffic_q),
        );

        NodeSignals {
            tx_drop_ratio: signal_or_zero(node, "switch_tx_drop", tx),
            rx_error_ratio: signal_or_zero(node, "switch_rx_error", rx),
            switch_utilization_percent: signal_or_zero(node, "switch_utilization", util),
            traffic_bytes_per_sec: signal_or_zero(node, "host_traffic", traffic),
        }
    }
}

fn signal_or_zero(
    node: &WorkerNode,
    metric: &'static str,
    result: Result<MetricSample, TelemetryError>,
) -> f64 {
    match result {
        Ok(sample) => sample.value(),
        Err(e) => {
            warn!(node = %node.name, metric, error = %e, "Signal unavailable, assuming 0");
            0.0
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
