//! Liquidity drain scenario
//!
//! At the trigger step a configurable share of all agents, buyers and sellers
//! alike, loses almost all patience and stops trading. Their original patience
//! is captured and restored after a fixed recovery delay.

use std::collections::HashMap;

use crate::agents::Agent;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use types::ids::AgentId;

/// Steps between the drain and the recovery.
const RECOVERY_DELAY: u64 = 20;

/// Configuration for a liquidity drain.
#[derive(Debug, Clone)]
pub struct LiquidityDrainConfig {
    /// Step at which participants withdraw
    pub trigger_step: u64,
    /// Share of all agents affected, in [0, 1]
    pub affected_ratio: f64,
}

impl Default for LiquidityDrainConfig {
    fn default() -> Self {
        Self { trigger_step: 40, affected_ratio: 0.3 }
    }
}

#[derive(Debug, Clone)]
pub struct LiquidityDrain {
    pub config: LiquidityDrainConfig,
    baselines: HashMap<AgentId, f64>,
}

impl LiquidityDrain {
    pub fn new(config: LiquidityDrainConfig) -> Self {
        Self { config, baselines: HashMap::new() }
    }

    pub fn apply(&mut self, step: u64, agents: &mut [Agent], rng: &mut ChaCha8Rng) {
        if step == self.config.trigger_step {
            let count = (agents.len() as f64 * self.config.affected_ratio).floor() as usize;
            let indices: Vec<usize> = (0..agents.len()).collect();
            let chosen: Vec<usize> = indices.choose_multiple(rng, count).copied().collect();
            for idx in chosen {
                let state = agents[idx].state_mut();
                self.baselines.insert(state.id.clone(), state.patience);
                state.patience = 0.05;
            }
            info!(step, withdrawn = count, "liquidity drain sidelined participants");
        } else if step == self.config.trigger_step + RECOVERY_DELAY && !self.baselines.is_empty() {
            let mut restored = 0;
            for agent in agents.iter_mut() {
                let state = agent.state_mut();
                if let Some(patience) = self.baselines.get(&state.id) {
                    state.patience = *patience;
                    restored += 1;
                }
            }
            self.baselines.clear();
            info!(step, restored, "liquidity drain recovered");
        }
    }
}
