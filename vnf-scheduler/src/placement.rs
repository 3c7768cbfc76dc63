/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The placement control loop.
//!
//! ```text
//!            event (unassigned)                 bind attempted
//!   Idle ─────────────────────────► Deciding ─────────────────► Idle
//!    ▲  └─ event (assigned): ignored    │
//!    └──────────────────────────────────┘ no eligible node: dropped
//! ```
//!
//! One event is decided at a time, in arrival order.  Nothing is retried
//! here: a pod that could not be placed stays unscheduled and comes back
//! through the watch.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::cluster::{ClusterError, WorkloadBinder};
use crate::node::{PlacementDecision, WorkloadEvent};
use crate::scheduler::{SchedulerError, ScoringEngine};

/// Result of handling one workload event.
#[derive(Debug)]
pub enum PlacementOutcome {
    /// The pod already had a node; nothing was done.
    AlreadyAssigned,
    /// The scoring round produced no node.
    NoEligibleNode(SchedulerError),
    /// The binding was committed.
    Bound(PlacementDecision),
    /// A node was chosen but the binding was rejected.
    BindFailed {
        decision: PlacementDecision,
        error: ClusterError,
    },
}

/// Consumes workload events and commits one placement per unscheduled pod.
pub struct PlacementLoop {
    engine: Arc<ScoringEngine>,
    binder: Arc<dyn WorkloadBinder>,
    telemetry_address: String,
}

impl PlacementLoop {
    pub fn new(
        engine: Arc<ScoringEngine>,
        binder: Arc<dyn WorkloadBinder>,
        telemetry_address: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            binder,
            telemetry_address: telemetry_address.into(),
        }
    }

    /// Decide and commit placement for a single event.
    pub async fn handle_event(&self, event: WorkloadEvent) -> PlacementOutcome {
        if event.is_assigned() {
            return PlacementOutcome::AlreadyAssigned;
        }

        info!(workload = %event.workload, "Scheduling pod");

        let selection = match self.engine.select_best_node(&self.telemetry_address).await {
            Ok(selection) => selection,
            Err(e) => return PlacementOutcome::NoEligibleNode(e),
        };

        let decision = PlacementDecision {
            workload: event.workload,
            node: selection.node.name,
            score: selection.score,
        };

        match self.binder.bind(&decision.workload, &decision.node).await {
            Ok(()) => PlacementOutcome::Bound(decision),
            Err(error) => PlacementOutcome::BindFailed { decision, error },
        }
    }

    /// Drive the loop until `events` ends.
    pub async fn run<S>(self, events: S)
    where
        S: Stream<Item = WorkloadEvent>,
    {
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            let workload = event.workload.clone();
            match self.handle_event(event).await {
                PlacementOutcome::AlreadyAssigned => {}
                PlacementOutcome::NoEligibleNode(reason) => {
                    warn!(workload = %workload, %reason, "No suitable node found");
                }
                PlacementOutcome::Bound(decision) => {
                    info!(
                        workload = %decision.workload,
                        node = %decision.node,
                        "Bound pod (score: {:.4})",
                        decision.score
                    );
                }
                PlacementOutcome::BindFailed { decision, error } => {
                    error!(
                        workload = %decision.workload,
                        node = %decision.node,
                        "Failed to bind pod: {}",
                        error
                    );
                }
            }
        }

        info!("Workload event stream ended");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::node::{WorkerNode, WorkloadRef};
    use crate::testing::{FakeBinder, FakeInventory, FakeMetrics, NodeMetrics};

    fn healthy() -> NodeMetrics {
        NodeMetrics {
            cpu: Some(30.0),
            memory: Some(0.3),
            tx_drop: Some(0.0),
            rx_error: Some(0.0),
            traffic: Some(0.0),
            utilization: Some(0.0),
        }
    }

    fn unscheduled(name: &str) -> WorkloadEvent {
        WorkloadEvent {
            workload: WorkloadRef::new("vnf", name),
            node_name: None,
        }
    }

    struct Harness {
        inventory: Arc<FakeInventory>,
        binder: Arc<FakeBinder>,
        lp: PlacementLoop,
    }

    fn harness(nodes: Vec<WorkerNode>, metrics: FakeMetrics, binder: FakeBinder) -> Harness {
        let inventory = Arc::new(FakeInventory::new(nodes));
        let binder = Arc::new(binder);
        let engine = Arc::new(ScoringEngine::new(
            inventory.clone(),
            Arc::new(metrics),
            ScoringConfig::default(),
        ));
        let lp = PlacementLoop::new(engine, binder.clone(), "prom");
        Harness {
            inventory,
            binder,
            lp,
        }
    }

    #[tokio::test]
    async fn assigned_pod_is_never_scored_or_bound() {
        let n = WorkerNode::new("worker-1", "10.0.0.1");
        let h = harness(
            vec![n.clone()],
            FakeMetrics::new().with_node(&n, healthy()),
            FakeBinder::new(),
        );

        let event = WorkloadEvent {
            workload: WorkloadRef::new("vnf", "fw-0"),
            node_name: Some("worker-1".into()),
        };
        let outcome = h.lp.handle_event(event).await;

        assert!(matches!(outcome, PlacementOutcome::AlreadyAssigned));
        assert_eq!(h.inventory.calls(), 0, "no scoring round may start");
        assert!(h.binder.binds().is_empty(), "no bind may be attempted");
    }

    #[tokio::test]
    async fn unscheduled_pod_is_bound_to_best_node() {
        let busy = WorkerNode::new("busy", "10.0.0.1");
        let idle = WorkerNode::new("idle", "10.0.0.2");
        let metrics = FakeMetrics::new()
            .with_node(&busy, NodeMetrics { utilization: Some(90.0), ..healthy() })
            .with_node(&idle, healthy());
        let h = harness(vec![busy, idle], metrics, FakeBinder::new());

        let outcome = h.lp.handle_event(unscheduled("fw-0")).await;

        match outcome {
            PlacementOutcome::Bound(d) => {
                assert_eq!(d.workload, WorkloadRef::new("vnf", "fw-0"));
                assert_eq!(d.node, "idle");
                assert!((d.score - 1.0).abs() < 1e-9);
            }
            other => panic!("expected Bound, got {other:?}"),
        }
        assert_eq!(
            h.binder.binds(),
            vec![(WorkloadRef::new("vnf", "fw-0"), "idle".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_inventory_attempts_no_bind() {
        let h = harness(vec![], FakeMetrics::new(), FakeBinder::new());

        let outcome = h.lp.handle_event(unscheduled("fw-0")).await;

        assert!(matches!(
            outcome,
            PlacementOutcome::NoEligibleNode(SchedulerError::NoCandidates)
        ));
        assert!(h.binder.binds().is_empty());
    }

    #[tokio::test]
    async fn saturated_cluster_attempts_no_bind() {
        let n = WorkerNode::new("worker-1", "10.0.0.1");
        let saturated = NodeMetrics { cpu: Some(99.0), ..healthy() };
        let metrics = FakeMetrics::new().with_node(&n, saturated);
        let h = harness(vec![n], metrics, FakeBinder::new());

        let outcome = h.lp.handle_event(unscheduled("fw-0")).await;

        assert!(matches!(
            outcome,
            PlacementOutcome::NoEligibleNode(SchedulerError::AllExcluded { .. })
        ));
        assert!(h.binder.binds().is_empty());
    }

    #[tokio::test]
    async fn bind_failure_is_reported_not_retried() {
        let n = WorkerNode::new("worker-1", "10.0.0.1");
        let h = harness(
            vec![n.clone()],
            FakeMetrics::new().with_node(&n, healthy()),
            FakeBinder::rejecting(),
        );

        let outcome = h.lp.handle_event(unscheduled("fw-0")).await;

        match outcome {
            PlacementOutcome::BindFailed { decision, error } => {
                assert_eq!(decision.node, "worker-1");
                assert!(matches!(error, ClusterError::Bind { .. }));
            }
            other => panic!("expected BindFailed, got {other:?}"),
        }
        assert_eq!(h.binder.binds().len(), 1, "exactly one bind attempt");
    }

    #[tokio::test]
    async fn run_processes_events_in_order_and_survives_failures() {
        let n = WorkerNode::new("worker-1", "10.0.0.1");
        let h = harness(
            vec![n.clone()],
            FakeMetrics::new().with_node(&n, healthy()),
            FakeBinder::new(),
        );
        let events = futures::stream::iter(vec![
            unscheduled("a"),
            WorkloadEvent {
                workload: WorkloadRef::new("vnf", "already"),
                node_name: Some("worker-1".into()),
            },
            unscheduled("b"),
            unscheduled("c"),
        ]);

        let binder = h.binder.clone();
        let inventory = h.inventory.clone();
        h.lp.run(events).await;

        let bound: Vec<_> = binder.binds().into_iter().map(|(w, _)| w.name).collect();
        assert_eq!(bound, ["a", "b", "c"]);
        assert_eq!(inventory.calls(), 3, "one fresh inventory per decision");
    }

    #[tokio::test]
    async fn run_keeps_going_after_bind_errors() {
        let n = WorkerNode::new("worker-1", "10.0.0.1");
        let h = harness(
            vec![n.clone()],
            FakeMetrics::new().with_node(&n, healthy()),
            FakeBinder::rejecting(),
        );
        let binder = h.binder.clone();

        h.lp
            .run(futures::stream::iter(vec![unscheduled("a"), unscheduled("b")]))
            .await;

        assert_eq!(binder.binds().len(), 2);
    }
}
