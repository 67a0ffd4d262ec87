//! Analyse command implementation
//!
//! Runs the five-stage pipeline for one property under one scenario.

use std::path::Path;
use tracing::info;

use crate::config::DcfConfig;
use crate::input::{load_property, load_scenario};
use crate::output::{analysis_table, OutputFormat};
use crate::Result;
use dcf_engine::AnalysisPipeline;
use dcf_scenarios::ScenarioGenerator;

/// Run the analyse command
///
/// Without a scenario file the property is analysed under the mean market
/// (every parameter at its configured mean, neutral regime).
pub fn run(
    config: &DcfConfig,
    property_path: &Path,
    scenario_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    info!("Starting analysis...");
    info!("  Property: {}", property_path.display());

    let property = load_property(property_path)?;
    let scenario = match scenario_path {
        Some(path) => {
            info!("  Scenario: {}", path.display());
            load_scenario(path)?
        }
        None => {
            info!("  Scenario: market mean");
            ScenarioGenerator::new(
                config.statistics(),
                &config.correlation(),
                config.generator_config(),
            )?
            .baseline_scenario()
        }
    };

    let pipeline = AnalysisPipeline::new(config.analysis_config())?;
    let analysis = pipeline.analyse(&property, &scenario)?;
    info!(
        npv = analysis.metrics.npv,
        recommendation = %analysis.metrics.recommendation,
        "Analysis complete"
    );

    super::emit(format, &analysis, analysis_table)
}
