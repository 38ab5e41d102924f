//! Agent-Based Collectibles Market Simulation
//!
//! Drives the matching engine with probabilistic buyer and seller agents,
//! perturbs them through market scenarios, and collects per-step metrics.
//! Every decision draws from one seeded RNG owned by the manager, so a fixed
//! seed reproduces a run exactly.
//!
//! # Modules
//! - `config` — Run configuration with serde defaults
//! - `agents` — Buyer and seller agents with personality traits
//! - `selector` — Weighted random choice used by agent item selection
//! - `scenarios` — Baseline, demand doubling, volatility spike, crash, drain
//! - `manager` — Step orchestration, settlement, checkpoints
//! - `metrics` — Per-step and summary metrics
//! - `export` — JSON results artifact and checkpoint files

pub mod agents;
pub mod config;
pub mod export;
pub mod manager;
pub mod metrics;
pub mod scenarios;
pub mod selector;

pub use config::SimulationConfig;
pub use manager::SimulationManager;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
