/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Normalisation and weighted composition of the continuous node signals.
//!
//! Four signals survive the hard gates and are blended into one score:
//!
//! | Signal | Raw unit | Normalised term |
//! |---|---|---|
//! | switch tx drop | ratio | `1 - tx_drop_ratio` |
//! | switch rx error | ratio | `1 - rx_error_ratio` |
//! | host traffic | bytes/s | `max(0, 1 - traffic / link_capacity)` |
//! | switch utilisation | percent | `max(0, 1 - util / 100)` |
//!
//! The two capacity terms are floored at zero so a link running above 100 %
//! scores the same as a saturated one.  Higher composite scores are better.

use crate::config::ScoringWeights;

/// Raw continuous signals of one candidate, as read from telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeSignals {
    pub tx_drop_ratio: f64,
    pub rx_error_ratio: f64,
    pub traffic_bytes_per_sec: f64,
    pub switch_utilization_percent: f64,
}

/// Remaining traffic headroom in `[0, 1]`.
pub fn normalized_traffic(traffic_bytes_per_sec: f64, link_capacity: f64) -> f64 {
    (1.0 - traffic_bytes_per_sec / link_capacity).max(0.0)
}

/// Remaining switch headroom in `[0, 1]`.
pub fn normalized_utilization(utilization_percent: f64) -> f64 {
    (1.0 - utilization_percent / 100.0).max(0.0)
}

/// Weighted composite score of `signals`.
pub fn composite_score(signals: &NodeSignals, weights: &ScoringWeights, link_capacity: f64) -> f64 {
    weights.tx_drop * (1.0 - signals.tx_drop_ratio)
        + weights.rx_error * (1.0 - signals.rx_error_ratio)
        + weights.traffic * normalized_traffic(signals.traffic_bytes_per_sec, link_capacity)
        + weights.utilization * normalized_utilization(signals.switch_utilization_percent)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LINK_CAPACITY;

    const EPS: f64 = 1e-9;

    fn score(signals: NodeSignals) -> f64 {
        composite_score(&signals, &ScoringWeights::default(), DEFAULT_LINK_CAPACITY)
    }

    #[test]
    fn half_loaded_node_scores_0_645() {
        let s = NodeSignals {
            tx_drop_ratio: 0.01,
            rx_error_ratio: 0.02,
            traffic_bytes_per_sec: 62_500_000.0,
            switch_utilization_percent: 50.0,
        };
        let traffic = normalized_traffic(s.traffic_bytes_per_sec, DEFAULT_LINK_CAPACITY);
        assert!((traffic - 0.5).abs() < EPS);
        assert!((normalized_utilization(s.switch_utilization_percent) - 0.5).abs() < EPS);
        let got = score(s);
        assert!((got - 0.645).abs() < EPS, "expected 0.645, got {got}");
    }

    #[test]
    fn idle_node_scores_weight_total() {
        let got = score(NodeSignals::default());
        assert!((got - ScoringWeights::default().total()).abs() < EPS);
    }

    #[test]
    fn normalised_terms_never_go_negative() {
        for traffic in [0.0, 1.0, 125_000_000.0, 250_000_000.0, 1e15, f64::MAX] {
            let n = normalized_traffic(traffic, DEFAULT_LINK_CAPACITY);
            assert!(n >= 0.0 && n <= 1.0, "traffic {traffic} → {n}");
        }
        for util in [0.0, 50.0, 100.0, 100.01, 250.0, 1e12] {
            let n = normalized_utilization(util);
            assert!(n >= 0.0 && n <= 1.0, "util {util} → {n}");
        }
    }

    #[test]
    fn over_capacity_is_no_worse_than_saturated() {
        let saturated = score(NodeSignals {
            traffic_bytes_per_sec: 125_000_000.0,
            switch_utilization_percent: 100.0,
            ..Default::default()
        });
        let over = score(NodeSignals {
            traffic_bytes_per_sec: 500_000_000.0,
            switch_utilization_percent: 400.0,
            ..Default::default()
        });
        assert!((saturated - over).abs() < EPS);
    }

    #[test]
    fn score_is_monotone_in_every_signal() {
        let base = NodeSignals {
            tx_drop_ratio: 0.2,
            rx_error_ratio: 0.2,
            traffic_bytes_per_sec: 50_000_000.0,
            switch_utilization_percent: 40.0,
        };
        let b = score(base);

        // Improving any single signal must not lower the score.
        let better = [
            NodeSignals { tx_drop_ratio: 0.1, ..base },
            NodeSignals { rx_error_ratio: 0.1, ..base },
            NodeSignals { traffic_bytes_per_sec: 10_000_000.0, ..base },
            NodeSignals { switch_utilization_percent: 10.0, ..base },
        ];
        for s in better {
            assert!(score(s) >= b, "{s:?} scored below base");
        }

        let worse = [
            NodeSignals { tx_drop_ratio: 0.3, ..base },
            NodeSignals { rx_error_ratio: 0.3, ..base },
            NodeSignals { traffic_bytes_per_sec: 90_000_000.0, ..base },
            NodeSignals { switch_utilization_percent: 80.0, ..base },
        ];
        for s in worse {
            assert!(score(s) <= b, "{s:?} scored above base");
        }
    }

    #[test]
    fn alternate_weights_change_the_ranking() {
        // Node A: clean switch, busy NIC.  Node B: lossy switch, idle NIC.
        let a = NodeSignals {
            traffic_bytes_per_sec: 100_000_000.0,
            ..Default::default()
        };
        let b = NodeSignals {
            tx_drop_ratio: 0.5,
            rx_error_ratio: 0.5,
            ..Default::default()
        };
        let traffic_heavy = ScoringWeights::default();
        let loss_heavy = ScoringWeights {
            tx_drop: 0.45,
            rx_error: 0.45,
            traffic: 0.05,
            utilization: 0.05,
        };

        let cap = DEFAULT_LINK_CAPACITY;
        assert!(
            composite_score(&b, &traffic_heavy, cap) > composite_score(&a, &traffic_heavy, cap)
        );
        assert!(composite_score(&a, &loss_heavy, cap) > composite_score(&b, &loss_heavy, cap));
    }
}
