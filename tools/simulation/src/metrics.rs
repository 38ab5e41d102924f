//! Per-step and whole-run metrics
//!
//! Every step produces a [`StepMetrics`] snapshot; [`summarize`] folds the
//! collected history into a [`SummaryMetrics`] for export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity and population measurements for a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Step index this snapshot describes
    pub step: u64,
    /// Simulation-clock time of the step
    pub timestamp: DateTime<Utc>,
    /// Wall-clock seconds spent executing the step
    pub duration_seconds: f64,
    /// Orders accepted by the engine during the step
    pub orders_created: u64,
    /// Trades executed during the step
    pub transactions_executed: u64,
    /// Units changing hands during the step
    pub total_volume: u64,
    /// Cash changing hands during the step
    pub total_value: f64,
    pub active_buyers: usize,
    pub active_sellers: usize,
    pub avg_buyer_cash: f64,
    pub avg_seller_cash: f64,
    /// Orders still open after the step
    pub pending_orders: usize,
}

/// Aggregates over a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_transactions: u64,
    pub total_volume: u64,
    pub total_value: f64,
    pub avg_transactions_per_step: f64,
    pub avg_volume_per_step: f64,
    pub avg_value_per_step: f64,
    pub final_agent_count: usize,
    pub steps_completed: u64,
}

/// Folds a step history into run-level totals and per-step averages.
///
/// An empty history yields an all-zero summary.
pub fn summarize(history: &[StepMetrics], agent_count: usize) -> SummaryMetrics {
    let steps = history.len() as u64;
    let total_transactions: u64 = history.iter().map(|m| m.transactions_executed).sum();
    let total_volume: u64 = history.iter().map(|m| m.total_volume).sum();
    let total_value: f64 = history.iter().map(|m| m.total_value).sum();

    let divisor = if steps == 0 { 1.0 } else { steps as f64 };
    SummaryMetrics {
        total_transactions,
        total_volume,
        total_value,
        avg_transactions_per_step: total_transactions as f64 / divisor,
        avg_volume_per_step: total_volume as f64 / divisor,
        avg_value_per_step: total_value / divisor,
        final_agent_count: agent_count,
        steps_completed: steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(step: u64, transactions: u64, volume: u64, value: f64) -> StepMetrics {
        StepMetrics {
            step,
            timestamp: Utc::now(),
            duration_seconds: 0.001,
            orders_created: transactions + 2,
            transactions_executed: transactions,
            total_volume: volume,
            total_value: value,
            active_buyers: 3,
            active_sellers: 2,
            avg_buyer_cash: 900.0,
            avg_seller_cash: 400.0,
            pending_orders: 5,
        }
    }

    #[test]
    fn test_summarize_totals_and_averages() {
        let history = vec![step(0, 2, 10, 50.0), step(1, 4, 20, 150.0)];
        let summary = summarize(&history, 5);

        assert_eq!(summary.total_transactions, 6);
        assert_eq!(summary.total_volume, 30);
        assert!((summary.total_value - 200.0).abs() < 1e-9);
        assert!((summary.avg_transactions_per_step - 3.0).abs() < 1e-9);
        assert!((summary.avg_volume_per_step - 15.0).abs() < 1e-9);
        assert!((summary.avg_value_per_step - 100.0).abs() < 1e-9);
        assert_eq!(summary.final_agent_count, 5);
        assert_eq!(summary.steps_completed, 2);
    }

    #[test]
    fn test_summarize_empty_history() {
        let summary = summarize(&[], 0);

        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.total_volume, 0);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.avg_transactions_per_step, 0.0);
        assert_eq!(summary.steps_completed, 0);
    }

    #[test]
    fn test_step_metrics_serde_round_trip() {
        let metrics = step(7, 3, 12, 88.5);
        let json = serde_json::to_string(&metrics).unwrap();
        let back: StepMetrics = serde_json::from_str(&json).unwrap();

        assert_eq!(back.step, 7);
        assert_eq!(back.transactions_executed, 3);
        assert_eq!(back.total_volume, 12);
        assert!((back.total_value - 88.5).abs() < 1e-9);
    }
}
