//! Market perturbation scenarios
//!
//! A scenario is constructed once per run and keeps its own state (captured
//! baselines, fired flags), so applying it on every step never compounds an
//! effect. Scenarios mutate agents only; the engine is never touched.

pub mod demand_double;
pub mod liquidity_drain;
pub mod market_crash;
pub mod volatility_spike;

pub use demand_double::{DemandDouble, DemandDoubleConfig};
pub use liquidity_drain::{LiquidityDrain, LiquidityDrainConfig};
pub use market_crash::{MarketCrash, MarketCrashConfig};
pub use volatility_spike::{VolatilitySpike, VolatilitySpikeConfig};

use crate::agents::Agent;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use types::errors::MarketError;

/// Names the factory resolves; run artifacts carry these exact strings.
pub const SCENARIO_NAMES: [&str; 5] = [
    "baseline",
    "demand_x2",
    "volatility_spike",
    "market_crash",
    "liquidity_drain",
];

/// Optional overrides for scenario defaults, carried in the run config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub trigger_step: Option<u64>,
    pub duration: Option<u64>,
    pub intensity: Option<f64>,
    pub affected_ratio: Option<f64>,
}

/// A perturbation applied to the agent population as steps advance.
#[derive(Debug, Clone)]
pub enum Scenario {
    Baseline,
    DemandDouble(DemandDouble),
    VolatilitySpike(VolatilitySpike),
    MarketCrash(MarketCrash),
    LiquidityDrain(LiquidityDrain),
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::DemandDouble(_) => "demand_x2",
            Scenario::VolatilitySpike(_) => "volatility_spike",
            Scenario::MarketCrash(_) => "market_crash",
            Scenario::LiquidityDrain(_) => "liquidity_drain",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Normal market conditions without perturbations",
            Scenario::DemandDouble(_) => "Buyers gain budget and appetite for a bounded window",
            Scenario::VolatilitySpike(_) => "Risk appetite shifts sharply across all agents",
            Scenario::MarketCrash(_) => "Half the sellers panic and list below break-even",
            Scenario::LiquidityDrain(_) => "Part of the population loses patience and stops trading",
        }
    }

    /// Apply this scenario's effects for one step. Effects cannot fail.
    pub fn apply_step_effects(&mut self, step: u64, agents: &mut [Agent], rng: &mut ChaCha8Rng) {
        match self {
            Scenario::Baseline => {}
            Scenario::DemandDouble(s) => s.apply(step, agents),
            Scenario::VolatilitySpike(s) => s.apply(step, agents, rng),
            Scenario::MarketCrash(s) => s.apply(step, agents, rng),
            Scenario::LiquidityDrain(s) => s.apply(step, agents, rng),
        }
    }
}

/// Resolve a scenario by name, applying any parameter overrides.
pub fn create_scenario(name: &str, params: &ScenarioParams) -> Result<Scenario, MarketError> {
    match name {
        "baseline" => Ok(Scenario::Baseline),
        "demand_x2" => {
            let mut config = DemandDoubleConfig::default();
            if let Some(trigger) = params.trigger_step {
                config.trigger_step = trigger;
            }
            if let Some(duration) = params.duration {
                config.duration = duration;
            }
            Ok(Scenario::DemandDouble(DemandDouble::new(config)))
        }
        "volatility_spike" => {
            let mut config = VolatilitySpikeConfig::default();
            if let Some(trigger) = params.trigger_step {
                config.trigger_step = trigger;
            }
            if let Some(intensity) = params.intensity {
                config.intensity = intensity;
            }
            Ok(Scenario::VolatilitySpike(VolatilitySpike::new(config)))
        }
        "market_crash" => {
            let mut config = MarketCrashConfig::default();
            if let Some(trigger) = params.trigger_step {
                config.trigger_step = trigger;
            }
            Ok(Scenario::MarketCrash(MarketCrash::new(config)))
        }
        "liquidity_drain" => {
            let mut config = LiquidityDrainConfig::default();
            if let Some(trigger) = params.trigger_step {
                config.trigger_step = trigger;
            }
            if let Some(ratio) = params.affected_ratio {
                config.affected_ratio = ratio;
            }
            Ok(Scenario::LiquidityDrain(LiquidityDrain::new(config)))
        }
        _ => Err(MarketError::UnknownScenario {
            name: name.to_string(),
            available: SCENARIO_NAMES.join(", "),
        }),
    }
}
