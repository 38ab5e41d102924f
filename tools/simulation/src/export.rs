//! Results and checkpoint export
//!
//! Serializes completed runs and mid-run checkpoints to pretty-printed JSON
//! files under the configured output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::errors::MarketError;

use crate::agents::AgentReport;
use crate::config::SimulationConfig;
use crate::metrics::{StepMetrics, SummaryMetrics};

/// Complete artifact of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub simulation_id: String,
    pub config: SimulationConfig,
    pub scenario: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
    pub total_steps: u64,
    pub summary_metrics: SummaryMetrics,
    pub agent_results: Vec<AgentReport>,
    pub step_metrics: Vec<StepMetrics>,
}

/// Mid-run snapshot sufficient to inspect agent state offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub simulation_id: String,
    pub step: u64,
    pub timestamp: DateTime<Utc>,
    pub agents: Vec<AgentReport>,
    pub metrics_summary: SummaryMetrics,
}

/// Render results as pretty-printed JSON.
pub fn results_json(results: &SimulationResults) -> Result<String, MarketError> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Write results under `output_dir`, creating it if needed.
///
/// The filename carries both the export wall-clock time and the run id:
/// `simulation_<YYYYmmdd_HHMMSS>_<sim_id>.json`.
pub fn write_results(
    results: &SimulationResults,
    output_dir: &Path,
) -> Result<PathBuf, MarketError> {
    fs::create_dir_all(output_dir)?;
    let filename = format!(
        "simulation_{}_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S"),
        results.simulation_id
    );
    let path = output_dir.join(filename);
    fs::write(&path, results_json(results)?)?;
    Ok(path)
}

/// Write a checkpoint as `<sim_id>_checkpoint_<step>.json` under `output_dir`.
pub fn write_checkpoint(
    checkpoint: &Checkpoint,
    output_dir: &Path,
) -> Result<PathBuf, MarketError> {
    fs::create_dir_all(output_dir)?;
    let filename = format!(
        "{}_checkpoint_{}.json",
        checkpoint.simulation_id, checkpoint.step
    );
    let path = output_dir.join(filename);
    fs::write(&path, serde_json::to_string_pretty(checkpoint)?)?;
    Ok(path)
}
