/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data structures shared by the scoring engine and the control loop.
//!
//! ```text
//! Kubernetes watch ──(WorkloadEvent)──► PlacementLoop ──► ScoringEngine
//!                                            │                 │ WorkerNode × MetricSample
//!                                            ◄──(Selection)────┘
//!                                            │
//!                                            └──(PlacementDecision)──► binding
//! ```
//!
//! # Ownership model
//! Every value here is round-local.  `WorkerNode`s are a fresh inventory
//! snapshot per scoring round, `MetricSample`s are consumed as soon as they
//! are produced, and a `PlacementDecision` lives only between selection and
//! the binding commit.

use std::fmt;

// ── WorkerNode ────────────────────────────────────────────────────────────────

/// A schedulable worker node as reported by cluster membership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerNode {
    /// Node name, unique within the cluster.
    pub name: String,
    /// Internal address used to reach the node's exporters.
    ///
    /// Empty when the node reports no `InternalIP`; every metric query for
    /// such a node will then fail and fall back to its default.
    pub address: String,
}

impl WorkerNode {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// `address:port` label as used by Prometheus `instance` selectors.
    pub fn instance(&self, port: u16) -> String {
        format!("{}:{}", self.address, port)
    }
}

// ── MetricSample ──────────────────────────────────────────────────────────────

/// A scalar telemetry value, rounded to two decimal places.
///
/// There is no "empty" sample: a query that produced no data is an
/// `Err(TelemetryError)` at the call site, which keeps a genuine `0.0`
/// distinguishable from missing data.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MetricSample(f64);

impl MetricSample {
    /// Round `raw` half away from zero to two decimals.
    pub fn rounded(raw: f64) -> Self {
        Self((raw * 100.0).round() / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ── Workloads ─────────────────────────────────────────────────────────────────

/// Identity of a pod awaiting placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadRef {
    pub name: String,
    pub namespace: String,
}

impl WorkloadRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// One observation of a pod that opted into this scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadEvent {
    pub workload: WorkloadRef,
    /// `spec.nodeName` at observation time. `Some` means already placed.
    pub node_name: Option<String>,
}

impl WorkloadEvent {
    /// Returns `true` when the pod already has a node assignment.
    pub fn is_assigned(&self) -> bool {
        self.node_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

// ── PlacementDecision ─────────────────────────────────────────────────────────

/// The outcome of one scoring round for one workload.
///
/// Built once, handed to the binder, then dropped.  It is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDecision {
    pub workload: WorkloadRef,
    pub node: String,
    /// Composite score of `node` at decision time.
    pub score: f64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
