/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! PromQL expressions for the six per-node signals.
//!
//! `host` is the node-exporter instance (`addr:9100`), `switch` the OvS
//! exporter instance (`addr:9101`), and `window` the `rate()` lookback.

/// CPU busy percentage: `100 - idle% averaged over all cores`.
pub fn cpu_usage_percent(host: &str, window: &str) -> String {
    format!(
        r#"100 - (avg by(instance) (rate(node_cpu_seconds_total{{instance="{host}", mode="idle"}}[{window}])) * 100)"#
    )
}

/// Used-memory ratio in `[0, 1]`.
pub fn memory_used_ratio(host: &str) -> String {
    format!(
        r#"(node_memory_MemTotal_bytes{{instance="{host}"}} - node_memory_MemAvailable_bytes{{instance="{host}"}}) / node_memory_MemTotal_bytes{{instance="{host}"}}"#
    )
}

/// Fraction of transmitted packets dropped by the virtual switch.
pub fn switch_tx_drop_ratio(switch: &str, window: &str) -> String {
    format!(
        r#"sum(rate(ovs_interface_tx_dropped_total{{instance="{switch}"}}[{window}])) / sum(rate(ovs_interface_tx_packets_total{{instance="{switch}"}}[{window}]))"#
    )
}

/// Fraction of received packets with errors on the virtual switch.
pub fn switch_rx_error_ratio(switch: &str, window: &str) -> String {
    format!(
        r#"sum(rate(ovs_interface_rx_errors_total{{instance="{switch}"}}[{window}])) / sum(rate(ovs_interface_rx_packets_total{{instance="{switch}"}}[{window}]))"#
    )
}

/// Switch throughput as a percentage of `link_capacity` (bytes/s).
pub fn switch_utilization_percent(switch: &str, window: &str, link_capacity: f64) -> String {
    format!(
        r#"100 * (sum(rate(ovs_interface_tx_bytes_total{{instance="{switch}"}}[{window}])) + sum(rate(ovs_interface_rx_bytes_total{{instance="{switch}"}}[{window}]))) / {link_capacity}"#
    )
}

/// Host NIC transmit + receive rate in bytes/s.
pub fn host_traffic_bytes(host: &str, window: &str) -> String {
    format!(
        r#"rate(node_network_transmit_bytes_total{{instance="{host}"}}[{window}]) + rate(node_network_receive_bytes_total{{instance="{host}"}}[{window}])"#
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
