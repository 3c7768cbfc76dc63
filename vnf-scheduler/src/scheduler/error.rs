/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Why candidates drop out of a scoring round, and why a round can fail.
//!
//! * [`ExclusionReason`] — a hard-gate disqualification of one node.  This is
//!   not an error: the round carries on with the remaining candidates.
//! * [`SchedulerError`] — a round that produced no placement.
//!
//! Every variant carries the measured values so a single `tracing` event is
//! enough to explain the outcome.

use thiserror::Error;

use crate::cluster::ClusterError;

// ── Hard-gate exclusion ───────────────────────────────────────────────────────

/// Reason a node was removed from a round before composite scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    /// CPU usage is above the configured threshold.
    CpuSaturated { usage_percent: f64, threshold: f64 },

    /// Used-memory ratio is above the configured threshold.
    MemorySaturated { used_ratio: f64, threshold: f64 },

    /// A gate metric could not be read and the policy is fail-closed.
    GateMetricUnavailable { metric: &'static str },
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::CpuSaturated {
                usage_percent,
                threshold,
            } => write!(
                f,
                "CPU usage {:.2}% exceeds threshold {:.0}%",
                usage_percent, threshold
            ),

            ExclusionReason::MemorySaturated {
                used_ratio,
                threshold,
            } => write!(
                f,
                "memory usage {:.1}% exceeds threshold {:.1}%",
                used_ratio * 100.0,
                threshold * 100.0
            ),

            ExclusionReason::GateMetricUnavailable { metric } => {
                write!(f, "{} metric unavailable (gate policy is fail-closed)", metric)
            }
        }
    }
}

// ── Round-level errors ────────────────────────────────────────────────────────

/// A scoring round that ended without a winner.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The node inventory could not be read.
    #[error("node inventory unavailable: {0}")]
    InventoryUnavailable(#[from] ClusterError),

    /// The inventory returned no worker nodes.
    #[error("no worker nodes available")]
    NoCandidates,

    /// Every candidate was excluded by a hard gate.
    #[error("all {excluded} candidate node(s) were excluded")]
    AllExcluded { excluded: usize },
}
