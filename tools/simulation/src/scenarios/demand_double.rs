//! Demand doubling scenario
//!
//! For a bounded window every buyer spends more freely: budget times 1.5 and
//! risk tolerance times 1.3 (capped). Pre-boost values are captured per buyer
//! on first application and restored when the window closes, so re-applying
//! inside the window never compounds.

use crate::agents::Agent;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;
use types::ids::AgentId;

/// 1.5
const BUDGET_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Configuration for a demand doubling window.
#[derive(Debug, Clone)]
pub struct DemandDoubleConfig {
    /// First step of the boost window
    pub trigger_step: u64,
    /// Window length in steps
    pub duration: u64,
}

impl Default for DemandDoubleConfig {
    fn default() -> Self {
        Self {
            trigger_step: 50,
            duration: 30,
        }
    }
}

/// Pre-boost values for one buyer.
#[derive(Debug, Clone)]
struct BuyerBaseline {
    budget_per_item: Decimal,
    risk_tolerance: f64,
}

#[derive(Debug, Clone)]
pub struct DemandDouble {
    pub config: DemandDoubleConfig,
    baselines: HashMap<AgentId, BuyerBaseline>,
}

impl DemandDouble {
    pub fn new(config: DemandDoubleConfig) -> Self {
        Self {
            config,
            baselines: HashMap::new(),
        }
    }

    fn in_window(&self, step: u64) -> bool {
        step >= self.config.trigger_step && step < self.config.trigger_step + self.config.duration
    }

    pub fn apply(&mut self, step: u64, agents: &mut [Agent]) {
        if self.in_window(step) {
            if step == self.config.trigger_step {
                info!(step, duration = self.config.duration, "demand boost begins");
            }
            for agent in agents.iter_mut() {
                let Agent::Buyer(buyer) = agent else { continue };
                let baseline = self
                    .baselines
                    .entry(buyer.state.id.clone())
                    .or_insert_with(|| BuyerBaseline {
                        budget_per_item: buyer.budget_per_item,
                        risk_tolerance: buyer.state.risk_tolerance,
                    });
                // Always derived from the captured baseline, never compounded
                buyer.budget_per_item = baseline.budget_per_item * BUDGET_FACTOR;
                buyer.state.risk_tolerance = (baseline.risk_tolerance * 1.3).min(0.95);
            }
        } else if step >= self.config.trigger_step + self.config.duration
            && !self.baselines.is_empty()
        {
            for agent in agents.iter_mut() {
                let Agent::Buyer(buyer) = agent else { continue };
                if let Some(baseline) = self.baselines.get(&buyer.state.id) {
                    buyer.budget_per_item = baseline.budget_per_item;
                    buyer.state.risk_tolerance = baseline.risk_tolerance;
                }
            }
            self.baselines.clear();
            info!(step, "demand boost ends, buyers restored");
        }
    }
}
