//! Volatility spike scenario
//!
//! At the trigger step every agent's risk tolerance jumps: a fair coin per
//! agent multiplies it by 0.7 or 1.4, clamped back into the valid range. The
//! shift is permanent for the rest of the run. The configured intensity is
//! carried into parameters and logs; the shift factors themselves are fixed.

use crate::agents::Agent;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Configuration for a volatility spike.
#[derive(Debug, Clone)]
pub struct VolatilitySpikeConfig {
    /// Step at which risk appetite shifts
    pub trigger_step: u64,
    /// Spike magnitude recorded in run artifacts; does not scale the shift
    pub intensity: f64,
}

impl Default for VolatilitySpikeConfig {
    fn default() -> Self {
        Self {
            trigger_step: 75,
            intensity: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolatilitySpike {
    pub config: VolatilitySpikeConfig,
}

impl VolatilitySpike {
    pub fn new(config: VolatilitySpikeConfig) -> Self {
        Self { config }
    }

    pub fn apply(&mut self, step: u64, agents: &mut [Agent], rng: &mut ChaCha8Rng) {
        if step != self.config.trigger_step {
            return;
        }
        for agent in agents.iter_mut() {
            let factor = if rng.gen_bool(0.5) { 0.7 } else { 1.4 };
            let state = agent.state_mut();
            state.risk_tolerance = (state.risk_tolerance * factor).clamp(0.1, 0.9);
        }
        info!(
            step,
            agents = agents.len(),
            intensity = self.config.intensity,
            "volatility spike shifted risk appetite"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Buyer, Seller};
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use types::ids::AgentId;

    fn test_population() -> Vec<Agent> {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        (1..=6)
            .map(|i| {
                if i % 2 == 0 {
                    Agent::Buyer(Buyer::new(
                        AgentId::new(format!("buyer_{i}")),
                        Decimal::from(1000),
                        &mut rng,
                    ))
                } else {
                    Agent::Seller(Seller::new(
                        AgentId::new(format!("seller_{i}")),
                        Decimal::from(500),
                        &[],
                        &mut rng,
                    ))
                }
            })
            .collect()
    }

    fn risk_values(agents: &[Agent]) -> Vec<f64> {
        agents.iter().map(|a| a.state().risk_tolerance).collect()
    }

    #[test]
    fn test_only_fires_at_trigger_step() {
        let mut agents = test_population();
        let before = risk_values(&agents);
        let mut spike = VolatilitySpike::new(VolatilitySpikeConfig {
            trigger_step: 7,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        spike.apply(6, &mut agents, &mut rng);
        assert_eq!(risk_values(&agents), before);

        spike.apply(8, &mut agents, &mut rng);
        assert_eq!(risk_values(&agents), before);
    }

    #[test]
    fn test_shifts_every_agent_within_bounds() {
        let mut agents = test_population();
        let before = risk_values(&agents);
        let mut spike = VolatilitySpike::new(VolatilitySpikeConfig {
            trigger_step: 0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        spike.apply(0, &mut agents, &mut rng);

        for (old, new) in before.iter().zip(risk_values(&agents)) {
            let up = (old * 1.4).clamp(0.1, 0.9);
            let down = (old * 0.7).clamp(0.1, 0.9);
            assert!(
                (new - up).abs() < 1e-12 || (new - down).abs() < 1e-12,
                "risk {new} is neither {down} nor {up}"
            );
            assert!((0.1..=0.9).contains(&new));
        }
    }
}
