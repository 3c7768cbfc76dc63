/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cluster-facing collaborators of the scheduler.
//!
//! The scoring engine and the control loop only see the two traits below.
//! [`k8s`] provides their Kubernetes implementations plus the pod watch.

pub mod k8s;

use async_trait::async_trait;
use thiserror::Error;

use crate::node::{WorkerNode, WorkloadRef};

/// Label carried by control-plane nodes; such nodes are never candidates.
pub const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";

/// Failure talking to the cluster API.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to list nodes: {0}")]
    ListNodes(#[source] kube::Error),

    #[error("failed to bind {workload} to node '{node}': {source}")]
    Bind {
        workload: WorkloadRef,
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to encode binding for {workload}: {source}")]
    EncodeBinding {
        workload: WorkloadRef,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of candidate nodes for a scoring round.
#[async_trait]
pub trait NodeInventory: Send + Sync {
    /// Fresh snapshot of schedulable worker nodes, control-plane excluded.
    async fn list_eligible_nodes(&self) -> Result<Vec<WorkerNode>, ClusterError>;
}

/// Commits a placement decision to the control plane.
#[async_trait]
pub trait WorkloadBinder: Send + Sync {
    /// Bind `workload` to `node`.  The control plane rejects a second bind of
    /// the same pod, so callers need no extra exclusion.
    async fn bind(&self, workload: &WorkloadRef, node: &str) -> Result<(), ClusterError>;
}
