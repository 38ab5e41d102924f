//! Market crash scenario
//!
//! A one-shot panic at the trigger step: half of the sellers, chosen at
//! random, slash their profit target below cost and lose nearly all patience.
//! The panic does not repeat even if the trigger step is replayed.

use crate::agents::Agent;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Configuration for a market crash.
#[derive(Debug, Clone)]
pub struct MarketCrashConfig {
    /// Step at which sellers panic
    pub trigger_step: u64,
}

impl Default for MarketCrashConfig {
    fn default() -> Self {
        Self { trigger_step: 60 }
    }
}

#[derive(Debug, Clone)]
pub struct MarketCrash {
    pub config: MarketCrashConfig,
    fired: bool,
}

impl MarketCrash {
    pub fn new(config: MarketCrashConfig) -> Self {
        Self { config, fired: false }
    }

    pub fn apply(&mut self, step: u64, agents: &mut [Agent], rng: &mut ChaCha8Rng) {
        if self.fired || step != self.config.trigger_step {
            return;
        }
        self.fired = true;

        let seller_indices: Vec<usize> = agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.is_seller())
            .map(|(idx, _)| idx)
            .collect();
        let panic_count = seller_indices.len() / 2;
        let chosen: Vec<usize> = seller_indices
            .choose_multiple(rng, panic_count)
            .copied()
            .collect();

        for idx in chosen {
            if let Agent::Seller(seller) = &mut agents[idx] {
                seller.profit_target = 0.8;
                seller.state.patience = 0.1;
            }
        }
        info!(step, panicked = panic_count, "market crash triggered seller panic");
    }
}
