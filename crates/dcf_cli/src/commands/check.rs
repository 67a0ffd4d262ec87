//! Check command implementation
//!
//! Validates the configuration, the market model and optionally a property.

use std::path::Path;
use tracing::info;

use crate::config::DcfConfig;
use crate::input::load_property;
use crate::Result;
use dcf_engine::AnalysisPipeline;
use dcf_scenarios::ScenarioGenerator;

/// Run the check command
pub fn run(config: &DcfConfig, property_path: Option<&Path>) -> Result<()> {
    info!("Checking configuration...");

    AnalysisPipeline::new(config.analysis_config())?;
    let generator = ScenarioGenerator::new(
        config.statistics(),
        &config.correlation(),
        config.generator_config(),
    )?;
    let baseline = generator.baseline_scenario();

    println!("Configuration");
    println!("  Log level          {}", config.log_level);
    println!("  Horizon            {} years", config.analysis.horizon_years);
    println!("  Discount rate      {:.2}%", config.analysis.discount_rate * 100.0);
    println!("  Scenarios          {}", config.batch.scenario_count);
    println!("  Seed               {}", config.batch.seed);
    println!(
        "  Threads            {} ({} available)",
        config.batch_config().effective_threads(),
        num_cpus::get()
    );
    println!("  Market overrides   {}", config.market.len());
    println!(
        "  Correlation rules  {}",
        config.correlation().rules().len()
    );
    println!("  Mean-market regime {}", baseline.regime);

    if let Some(path) = property_path {
        let property = load_property(path)?;
        println!();
        println!("Property {}", property.id.as_deref().unwrap_or("(unnamed)"));
        println!("  Type               {}", property.property_type());
        println!("  Units              {}", property.total_units());
        println!("  Purchase price     {:.0}", property.purchase_price);
        println!("  Baseline rent      {:.0} / year", property.baseline_gross_rent());
    }

    println!();
    println!("OK");
    info!("Check complete");
    Ok(())
}
