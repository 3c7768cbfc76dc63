/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Kubernetes-backed cluster collaborators (kube-rs).
//!
//! * [`connect`] — credential chain: explicit kubeconfig, else the pod's
//!   service account, then `$KUBECONFIG` or `~/.kube/config`, then the
//!   kubeadm admin config.
//! * [`KubeCluster`] — node inventory and pod binding.
//! * [`watch_unscheduled_workloads`] — pods that name this scheduler.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::{Binding, Node, ObjectReference, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, Config};
use tracing::{debug, info, warn};

use super::{ClusterError, NodeInventory, WorkloadBinder, CONTROL_PLANE_LABEL};
use crate::node::{WorkerNode, WorkloadEvent, WorkloadRef};

/// kubeadm's admin credentials, the last resort on a control-plane host.
pub const ADMIN_KUBECONFIG: &str = "/etc/kubernetes/admin.conf";

// ── Connection ────────────────────────────────────────────────────────────────

/// Build an authenticated client.
///
/// With `kubeconfig` set only that file is tried.  Otherwise the in-cluster
/// service account wins, then the user kubeconfig, then [`ADMIN_KUBECONFIG`].
pub async fn connect(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => config_from_file(path).await?,
        None => discover_config(Config::incluster).await?,
    };

    info!(cluster_url = %config.cluster_url, "Connecting to Kubernetes API");
    Client::try_from(config).context("Failed to build Kubernetes client")
}

/// Walk the credential chain, starting from `incluster`.
async fn discover_config<E>(incluster: impl FnOnce() -> Result<Config, E>) -> Result<Config>
where
    E: std::fmt::Display,
{
    match incluster() {
        Ok(config) => {
            debug!("Using in-cluster service account");
            return Ok(config);
        }
        Err(e) => debug!(error = %e, "No in-cluster configuration"),
    }

    match Config::from_kubeconfig(&KubeConfigOptions::default()).await {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(error = %e, "No user kubeconfig, trying {}", ADMIN_KUBECONFIG);
            config_from_file(Path::new(ADMIN_KUBECONFIG)).await
        }
    }
}

async fn config_from_file(path: &Path) -> Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("Cannot read kubeconfig: {}", path.display()))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .with_context(|| format!("Invalid kubeconfig: {}", path.display()))
}

// ── Conversions ───────────────────────────────────────────────────────────────

/// Map a `Node` to a scheduling candidate.
///
/// Returns `None` for control-plane nodes and nameless objects.  A worker
/// without an `InternalIP` is kept with an empty address.
pub fn worker_from_node(node: &Node) -> Option<WorkerNode> {
    let name = node.metadata.name.clone()?;

    let is_control_plane = node
        .metadata
        .labels
        .as_ref()
        .is_some_and(|labels| labels.contains_key(CONTROL_PLANE_LABEL));
    if is_control_plane {
        debug!(node = %name, "Skipping control-plane node");
        return None;
    }

    let address = node
        .status
        .as_ref()
        .and_then(|s| s.addresses.as_ref())
        .and_then(|addrs| addrs.iter().find(|a| a.type_ == "InternalIP"))
        .map(|a| a.address.clone())
        .unwrap_or_default();

    if address.is_empty() {
        warn!(node = %name, "Node reports no InternalIP; its metrics will be unavailable");
    }

    Some(WorkerNode { name, address })
}

/// Map a watched `Pod` to a workload event.  Pods being deleted are dropped.
pub fn event_from_pod(pod: &Pod) -> Option<WorkloadEvent> {
    if pod.metadata.deletion_timestamp.is_some() {
        return None;
    }
    let name = pod.metadata.name.clone()?;
    let namespace = pod
        .metadata
        .namespace
        .clone()
        .unwrap_or_else(|| "default".to_string());
    let node_name = pod.spec.as_ref().and_then(|s| s.node_name.clone());

    Some(WorkloadEvent {
        workload: WorkloadRef { name, namespace },
        node_name,
    })
}

/// The `Binding` object that assigns `workload` to `node`.
pub fn binding_for(workload: &WorkloadRef, node: &str) -> Binding {
    Binding {
        metadata: ObjectMeta {
            name: Some(workload.name.clone()),
            namespace: Some(workload.namespace.clone()),
            ..ObjectMeta::default()
        },
        target: ObjectReference {
            api_version: Some("v1".to_string()),
            kind: Some("Node".to_string()),
            name: Some(node.to_string()),
            ..ObjectReference::default()
        },
    }
}

// ── KubeCluster ───────────────────────────────────────────────────────────────

/// Node inventory and pod binding against the Kubernetes API.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeInventory for KubeCluster {
    async fn list_eligible_nodes(&self) -> Result<Vec<WorkerNode>, ClusterError> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .map_err(ClusterError::ListNodes)?;

        let workers: Vec<WorkerNode> = list.items.iter().filter_map(worker_from_node).collect();
        debug!(
            total = list.items.len(),
            workers = workers.len(),
            "Listed cluster nodes"
        );
        Ok(workers)
    }
}

#[async_trait]
impl WorkloadBinder for KubeCluster {
    async fn bind(&self, workload: &WorkloadRef, node: &str) -> Result<(), ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &workload.namespace);
        let body = serde_json::to_vec(&binding_for(workload, node)).map_err(|source| {
            ClusterError::EncodeBinding {
                workload: workload.clone(),
                source,
            }
        })?;

        // The API server answers with a `Status` object; its content is not needed.
        pods.create_subresource::<serde_json::Value>(
            "binding",
            &workload.name,
            &PostParams::default(),
            body,
        )
        .await
        .map_err(|source| ClusterError::Bind {
            workload: workload.clone(),
            node: node.to_string(),
            source,
        })?;

        Ok(())
    }
}

// ── Watch ─────────────────────────────────────────────────────────────────────

/// Endless stream of pods whose `spec.schedulerName` is `scheduler_name`.
///
/// Watch errors are logged; the watcher reconnects with its default backoff,
/// relisting on reconnect, which also re-delivers still-unscheduled pods.
pub fn watch_unscheduled_workloads(
    client: Client,
    scheduler_name: &str,
) -> impl Stream<Item = WorkloadEvent> + Send {
    let pods: Api<Pod> = Api::all(client);
    let config = watcher::Config::default().fields(&format!("spec.schedulerName={scheduler_name}"));

    watcher(pods, config)
        .default_backoff()
        .applied_objects()
        .filter_map(|result| async move {
            match result {
                Ok(pod) => event_from_pod(&pod),
                Err(e) => {
                    warn!(error = %e, "Pod watch error, retrying");
                    None
                }
            }
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
