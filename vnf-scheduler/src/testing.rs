/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cluster::{ClusterError, NodeInventory, WorkloadBinder};
use crate::node::{MetricSample, WorkerNode, WorkloadRef};
use crate::telemetry::{MetricSource, TelemetryError};

/// A `kube::Error` as the API server would return it.
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("simulated {reason}"),
        reason: reason.to_string(),
        code,
    })
}

// ── Inventory ─────────────────────────────────────────────────────────────────

pub struct FakeInventory {
    nodes: Option<Vec<WorkerNode>>,
    calls: AtomicUsize,
}

impl FakeInventory {
    pub fn new(nodes: Vec<WorkerNode>) -> Self {
        Self {
            nodes: Some(nodes),
            calls: AtomicUsize::new(0),
        }
    }

    /// An inventory whose every listing fails.
    pub fn failing() -> Self {
        Self {
            nodes: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeInventory for FakeInventory {
    async fn list_eligible_nodes(&self) -> Result<Vec<WorkerNode>, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.nodes
            .clone()
            .ok_or_else(|| ClusterError::ListNodes(api_error(503, "ServiceUnavailable")))
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

/// Per-node metric values; `None` makes the matching query fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeMetrics {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub tx_drop: Option<f64>,
    pub rx_error: Option<f64>,
    pub traffic: Option<f64>,
    pub utilization: Option<f64>,
}

/// Answers queries by node address and metric family.
///
/// Unknown addresses and unset metrics produce [`TelemetryError::EmptyResult`],
/// which is what Prometheus does for a series that does not exist.
#[derive(Default)]
pub struct FakeMetrics {
    by_address: HashMap<String, NodeMetrics>,
    calls: AtomicUsize,
}

impl FakeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: &WorkerNode, metrics: NodeMetrics) -> Self {
        self.by_address.insert(node.address.clone(), metrics);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, expr: &str) -> Option<f64> {
        // instance="<address>:<port>"
        let start = expr.find("instance=\"")? + "instance=\"".len();
        let instance = &expr[start..start + expr[start..].find('"')?];
        let address = instance.rsplit_once(':').map_or(instance, |(a, _)| a);
        let m = self.by_address.get(address)?;

        if expr.contains("node_cpu_seconds_total") {
            m.cpu
        } else if expr.contains("node_memory_MemTotal_bytes") {
            m.memory
        } else if expr.contains("ovs_interface_tx_dropped_total") {
            m.tx_drop
        } else if expr.contains("ovs_interface_rx_errors_total") {
            m.rx_error
        } else if expr.contains("ovs_interface_tx_bytes_total") {
            m.utilization
        } else if expr.contains("node_network_transmit_bytes_total") {
            m.traffic
        } else {
            None
        }
    }
}

#[async_trait]
impl MetricSource for FakeMetrics {
    async fn query(&self, _backend: &str, expr: &str) -> Result<MetricSample, TelemetryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(expr)
            .map(MetricSample::rounded)
            .ok_or(TelemetryError::EmptyResult)
    }
}

// ── Binder ────────────────────────────────────────────────────────────────────

/// Records every bind; optionally rejects them all.
#[derive(Default)]
pub struct FakeBinder {
    reject: bool,
    binds: Mutex<Vec<(WorkloadRef, String)>>,
}

impl FakeBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn binds(&self) -> Vec<(WorkloadRef, String)> {
        self.binds.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkloadBinder for FakeBinder {
    async fn bind(&self, workload: &WorkloadRef, node: &str) -> Result<(), ClusterError> {
        self.binds
            .lock()
            .unwrap()
            .push((workload.clone(), node.to_string()));
        if self.reject {
            return Err(ClusterError::Bind {
                workload: workload.clone(),
                node: node.to_string(),
                source: api_error(409, "Conflict"),
            });
        }
        Ok(())
    }
}
