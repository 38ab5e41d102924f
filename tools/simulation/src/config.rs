//! Run configuration
//!
//! Plain serde structs; defaults describe a small but lively market. The
//! config is embedded verbatim in the exported results artifact.

use crate::scenarios::ScenarioParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Scenario name resolved by the scenario factory
    pub scenario: String,
    /// Per-scenario parameter overrides
    pub scenario_params: ScenarioParams,
    /// Number of catalog items
    pub n_items: usize,
    /// Number of buyer agents
    pub n_buyers: usize,
    /// Number of seller agents
    pub n_sellers: usize,
    /// Seed for the run RNG; same seed, same run
    pub seed: u64,
    /// Checkpoint every N steps; 0 disables checkpoints
    pub checkpoint_interval: u64,
    /// Directory for results and checkpoint files
    pub output_dir: PathBuf,
    /// Write the results artifact at the end of `run`
    pub save_results: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: "baseline".to_string(),
            scenario_params: ScenarioParams::default(),
            n_items: 10,
            n_buyers: 30,
            n_sellers: 20,
            seed: 42,
            checkpoint_interval: 50,
            output_dir: PathBuf::from("results"),
            save_results: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.scenario, "baseline");
        assert_eq!(config.n_items, 10);
        assert_eq!(config.n_buyers, 30);
        assert_eq!(config.n_sellers, 20);
        assert_eq!(config.checkpoint_interval, 50);
        assert!(config.save_results);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = SimulationConfig {
            scenario: "demand_x2".to_string(),
            seed: 7,
            save_results: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scenario, "demand_x2");
        assert_eq!(back.seed, 7);
        assert!(!back.save_results);
    }
}
