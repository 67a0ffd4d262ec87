//! Simulate command implementation
//!
//! Draws a batch of correlated market scenarios and aggregates the results.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::DcfConfig;
use crate::input::load_property;
use crate::output::{batch_table, OutputFormat};
use crate::{CliError, Result};
use dcf_engine::{BatchAnalysis, BatchRunner, ProgressCallback};

/// Overrides for the `[batch]` configuration section
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulateOptions {
    pub scenarios: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    /// Keep per-scenario results in JSON output
    pub full: bool,
}

/// Run the simulate command
pub fn run(
    config: &DcfConfig,
    property_path: &Path,
    options: SimulateOptions,
    format: OutputFormat,
) -> Result<()> {
    let count = options.scenarios.unwrap_or(config.batch.scenario_count);
    if count == 0 {
        return Err(CliError::InvalidArgument(
            "scenario count must be positive".to_string(),
        ));
    }
    if options.threads == Some(0) {
        return Err(CliError::InvalidArgument(
            "thread count must be positive".to_string(),
        ));
    }

    let mut generator = config.generator_config();
    if let Some(seed) = options.seed {
        generator.base_seed = seed;
    }
    let mut batch_config = config.batch_config();
    if options.threads.is_some() {
        batch_config.num_threads = options.threads;
    }

    info!("Starting simulation...");
    info!("  Property: {}", property_path.display());
    info!("  Scenarios: {}", count);
    info!("  Seed: {}", generator.base_seed);
    info!("  Threads: {}", batch_config.effective_threads());

    let property = load_property(property_path)?;

    let step = (count / 10).max(1);
    let progress: ProgressCallback = Arc::new(move |done, total| {
        if done % step == 0 || done == total {
            debug!(done, total, "batch progress");
        }
    });

    let runner = BatchRunner::new(config.analysis_config())?
        .with_generator(generator)
        .with_statistics(config.statistics())
        .with_batch_config(batch_config)
        .with_progress(progress);
    let mut batch = runner.run_batch_analysis(&property, count, &config.correlation())?;

    if batch.summary.cancelled {
        warn!(skipped = batch.summary.skipped, "Simulation stopped early");
    }
    if let Some(aggregate) = &batch.aggregate {
        info!(
            succeeded = batch.summary.succeeded,
            consensus = %aggregate.consensus,
            "Simulation complete"
        );
    }

    if !options.full {
        batch.per_scenario.clear();
    }
    super::emit(format, &batch, |b: &BatchAnalysis| batch_table(b))
}
