//! Scheduler configuration loading.
//!
//! Every tunable of the scoring engine has a built-in default, so the YAML
//! file is optional and may be partial:
//! ```yaml
//! prometheus_port: 9090
//! query_timeout_secs: 10
//! node_exporter_port: 9100
//! ovs_exporter_port: 9101
//! lookback: "5m"
//! link_capacity_bytes_per_sec: 125000000
//! cpu_threshold_percent: 95
//! memory_threshold_ratio: 0.95
//! gate_failure_policy: fail_open
//! weights:
//!   tx_drop: 0.1
//!   rx_error: 0.2
//!   traffic: 0.5
//!   utilization: 0.2
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Scheduler name matched against `spec.schedulerName`.
pub const DEFAULT_SCHEDULER_NAME: &str = "custom-vnf-scheduler";

/// 1 Gbit/s expressed in bytes per second.
pub const DEFAULT_LINK_CAPACITY: f64 = 125_000_000.0;

// ── Scoring weights ───────────────────────────────────────────────────────────

/// Coefficients of the composite score.
///
/// They do not need to sum to 1; their sum is the best score a node can get.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub tx_drop: f64,
    pub rx_error: f64,
    pub traffic: f64,
    pub utilization: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tx_drop: 0.1,
            rx_error: 0.2,
            traffic: 0.5,
            utilization: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.tx_drop + self.rx_error + self.traffic + self.utilization
    }
}

// ── Gate failure policy ───────────────────────────────────────────────────────

/// What to do when a CPU or memory gate query returns no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateFailurePolicy {
    /// Treat the missing value as 0 and admit the node.
    #[default]
    FailOpen,
    /// Exclude the node from the round.
    FailClosed,
}

// ── ScoringConfig ─────────────────────────────────────────────────────────────

/// Immutable tuning handed to the [`ScoringEngine`] at construction.
///
/// [`ScoringEngine`]: crate::scheduler::ScoringEngine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Port of the Prometheus HTTP API on the telemetry host.
    pub prometheus_port: u16,
    /// Per-query timeout, in seconds.
    pub query_timeout_secs: u64,
    /// node-exporter port appended to each node address.
    pub node_exporter_port: u16,
    /// OvS exporter port appended to each node address.
    pub ovs_exporter_port: u16,
    /// PromQL range used by every `rate()` in the queries.
    pub lookback: String,
    pub link_capacity_bytes_per_sec: f64,
    /// Nodes above this CPU usage (percent) are excluded.
    pub cpu_threshold_percent: f64,
    /// Nodes above this used-memory ratio are excluded.
    pub memory_threshold_ratio: f64,
    pub gate_failure_policy: GateFailurePolicy,
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            prometheus_port: 9090,
            query_timeout_secs: 10,
            node_exporter_port: 9100,
            ovs_exporter_port: 9101,
            lookback: String::from("5m"),
            link_capacity_bytes_per_sec: DEFAULT_LINK_CAPACITY,
            cpu_threshold_percent: 95.0,
            memory_threshold_ratio: 0.95,
            gate_failure_policy: GateFailurePolicy::FailOpen,
            weights: ScoringWeights::default(),
        }
    }
}

impl ScoringConfig {
    /// Parses `path` into a config, filling absent fields with defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, or a value fails [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        // An empty document deserialises to `null`; treat it as "all defaults".
        let config: ScoringConfig = if content.trim().is_empty() {
            ScoringConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "Scheduler configuration loaded");
        Ok(config)
    }

    /// Rejects values the scoring math cannot work with.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("tx_drop", w.tx_drop),
            ("rx_error", w.rx_error),
            ("traffic", w.traffic),
            ("utilization", w.utilization),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("weight '{}' must be a non-negative number, got {}", name, value);
            }
        }
        if !(self.link_capacity_bytes_per_sec.is_finite() && self.link_capacity_bytes_per_sec > 0.0)
        {
            bail!(
                "link_capacity_bytes_per_sec must be positive, got {}",
                self.link_capacity_bytes_per_sec
            );
        }
        if self.query_timeout_secs == 0 {
            bail!("query_timeout_secs must be at least 1");
        }
        if self.lookback.trim().is_empty() {
            bail!("lookback must not be empty");
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
