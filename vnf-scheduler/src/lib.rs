/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! VNF scheduler – telemetry-driven pod placement for Kubernetes
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── node          – WorkerNode, MetricSample, workload events, PlacementDecision
//! ├── config/       – scoring weights, gate thresholds, ports (YAML + defaults)
//! ├── telemetry/    – Prometheus instant queries + PromQL builders
//! ├── cluster/      – inventory / binding seams and their kube-rs implementation
//! ├── scheduler/    – ScoringEngine: gates, normalisation, composite score
//! └── placement     – control loop: watch event → score → bind
//! ```

pub mod cluster;
pub mod config;
pub mod node;
pub mod placement;
pub mod scheduler;
pub mod telemetry;

#[cfg(test)]
mod testing;
