//! Parallel Monte Carlo batches.
//!
//! Scenarios are independent: each one is drawn from its own seed and runs
//! the full pipeline on a rayon worker. Small batches run sequentially.
//! Cancellation and the optional deadline are checked before each scenario
//! starts; scenarios never started are reported as skipped.

use crate::aggregate::AggregateMetrics;
use crate::pipeline::{AnalysisPipeline, PipelineStage, StageError};
use crate::policy::AnalysisConfig;
use dcf_core::types::{FinancialMetrics, MarketScenario, PropertyDescription};
use dcf_core::DcfError;
use dcf_scenarios::{CorrelationConfig, GeneratorConfig, MarketStatistics, ScenarioGenerator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation shared between a batch and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running batches to stop starting new scenarios.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Called with `(completed, total)` after each scenario.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Execution settings for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses the global rayon pool
    pub num_threads: Option<usize>,
    /// Smallest batch run in parallel
    pub min_parallel_batch: usize,
    /// Wall-clock limit in seconds
    pub time_limit_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_parallel_batch: 64,
            time_limit_secs: None,
        }
    }
}

impl BatchConfig {
    /// Whether `n_items` scenarios should run in parallel.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.min_parallel_batch
    }

    /// Threads the batch will use.
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// A scenario that completed every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Market scenario
    pub scenario: MarketScenario,
    /// Metrics and recommendation
    pub metrics: FinancialMetrics,
}

/// A scenario that stopped at some stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFailure {
    /// Scenario id
    pub scenario_id: u64,
    /// Stage that failed
    pub stage: PipelineStage,
    /// Error raised
    pub error: DcfError,
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Scenarios requested
    pub requested: usize,
    /// Scenarios with metrics
    pub succeeded: usize,
    /// Scenarios that failed a stage
    pub failed: usize,
    /// Scenarios never started
    pub skipped: usize,
    /// Successful scenarios whose IRR was undefined
    pub irr_undefined: usize,
    /// Whether cancellation or the deadline stopped the batch early
    pub cancelled: bool,
    /// Wall-clock duration
    pub elapsed_ms: u64,
}

/// Results of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    /// Successful scenarios in id order
    pub per_scenario: Vec<ScenarioOutcome>,
    /// Statistics over `per_scenario`; `None` when it is empty
    pub aggregate: Option<AggregateMetrics>,
    /// Counts
    pub summary: BatchSummary,
    /// Failed scenarios in id order
    pub failures: Vec<ScenarioFailure>,
}

enum Slot {
    Done(Box<ScenarioOutcome>),
    Failed(ScenarioFailure),
    Skipped,
}

/// Runs the pipeline over many scenarios.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::PropertyDescription;
/// use dcf_engine::batch::BatchRunner;
/// use dcf_scenarios::CorrelationConfig;
///
/// let property = PropertyDescription::new(2_000_000.0, "DEFAULT").with_residential(20, 1_400.0);
/// let runner = BatchRunner::with_defaults();
/// let batch = runner
///     .run_batch_analysis(&property, 32, &CorrelationConfig::standard())
///     .unwrap();
///
/// assert_eq!(batch.summary.requested, 32);
/// assert_eq!(batch.summary.succeeded + batch.summary.failed, 32);
/// ```
#[derive(Clone, Default)]
pub struct BatchRunner {
    pipeline: AnalysisPipeline,
    statistics: Option<MarketStatistics>,
    generator: GeneratorConfig,
    batch: BatchConfig,
    cancellation: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("pipeline", &self.pipeline)
            .field("generator", &self.generator)
            .field("batch", &self.batch)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl BatchRunner {
    /// Runner with a validated analysis configuration.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` when the analysis configuration is invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self, DcfError> {
        Ok(Self {
            pipeline: AnalysisPipeline::new(config)?,
            ..Self::default()
        })
    }

    /// Runner with default policies, seed and execution settings.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Builder: generator settings (seed, resampling, regime thresholds).
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Builder: marginal statistics; the standard set is used otherwise.
    pub fn with_statistics(mut self, statistics: MarketStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Builder: execution settings.
    pub fn with_batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    /// Builder: cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder: progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The pipeline each scenario runs through.
    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    /// Draw `scenario_count` scenarios and analyse each of them.
    ///
    /// Scenario `i` is drawn from the seed derived from the base seed and
    /// `i`, so its result does not depend on the batch size or thread count.
    ///
    /// # Errors
    ///
    /// - `DcfError::InvalidProperty` when the property is invalid
    /// - `DcfError::Configuration` for invalid statistics, correlation rules
    ///   or thread settings
    pub fn run_batch_analysis(
        &self,
        property: &PropertyDescription,
        scenario_count: usize,
        correlation: &CorrelationConfig,
    ) -> Result<BatchAnalysis, DcfError> {
        property.validate()?;
        let statistics = self
            .statistics
            .clone()
            .unwrap_or_else(MarketStatistics::standard);
        let generator = ScenarioGenerator::new(statistics, correlation, self.generator)?;

        tracing::info!(
            scenarios = scenario_count,
            seed = self.generator.base_seed,
            threads = self.batch.effective_threads(),
            "starting batch analysis"
        );
        let ids: Vec<u64> = (0..scenario_count as u64).collect();
        self.execute(&ids, |&id| match generator.generate_one(id) {
            Ok(scenario) => self.analyse(property, scenario),
            Err(error) => Slot::Failed(ScenarioFailure {
                scenario_id: id,
                stage: PipelineStage::ScenarioGeneration,
                error,
            }),
        })
    }

    /// Analyse caller-supplied scenarios.
    ///
    /// # Errors
    ///
    /// - `DcfError::InvalidProperty` when the property is invalid
    /// - `DcfError::Configuration` for invalid thread settings
    pub fn run_scenarios(
        &self,
        property: &PropertyDescription,
        scenarios: &[MarketScenario],
    ) -> Result<BatchAnalysis, DcfError> {
        property.validate()?;
        tracing::info!(
            scenarios = scenarios.len(),
            threads = self.batch.effective_threads(),
            "starting batch analysis of supplied scenarios"
        );
        self.execute(scenarios, |scenario| self.analyse(property, scenario.clone()))
    }

    fn analyse(&self, property: &PropertyDescription, scenario: MarketScenario) -> Slot {
        match self.pipeline.run_single_analysis(property, &scenario) {
            Ok(metrics) => Slot::Done(Box::new(ScenarioOutcome { scenario, metrics })),
            Err(StageError { stage, source }) => {
                tracing::debug!(
                    scenario_id = scenario.scenario_id,
                    %stage,
                    error = %source,
                    "scenario failed"
                );
                Slot::Failed(ScenarioFailure {
                    scenario_id: scenario.scenario_id,
                    stage,
                    error: source,
                })
            }
        }
    }

    fn execute<T, F>(&self, items: &[T], run: F) -> Result<BatchAnalysis, DcfError>
    where
        T: Sync,
        F: Fn(&T) -> Slot + Sync + Send,
    {
        let started = Instant::now();
        let deadline = self
            .batch
            .time_limit_secs
            .map(|secs| started + Duration::from_secs(secs));
        let total = items.len();
        let completed = AtomicUsize::new(0);

        let step = |item: &T| -> Slot {
            if self.cancellation.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
                return Slot::Skipped;
            }
            let slot = run(item);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = &self.progress {
                progress(done, total);
            }
            slot
        };

        let slots: Vec<Slot> = if !self.batch.should_parallelize(total) {
            items.iter().map(step).collect()
        } else if let Some(threads) = self.batch.num_threads {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| DcfError::configuration(format!("cannot build thread pool: {}", e)))?;
            pool.install(|| items.par_iter().map(step).collect())
        } else {
            items.par_iter().map(step).collect()
        };

        let mut per_scenario = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = 0;
        for slot in slots {
            match slot {
                Slot::Done(outcome) => per_scenario.push(*outcome),
                Slot::Failed(failure) => failures.push(failure),
                Slot::Skipped => skipped += 1,
            }
        }

        if let Some(fatal) = failures.iter().find(|f| f.error.is_request_fatal()) {
            tracing::error!(
                scenario_id = fatal.scenario_id,
                stage = %fatal.stage,
                error = %fatal.error,
                "batch aborted"
            );
            return Err(fatal.error.clone());
        }

        let summary = BatchSummary {
            requested: total,
            succeeded: per_scenario.len(),
            failed: failures.len(),
            skipped,
            irr_undefined: per_scenario
                .iter()
                .filter(|o| !o.metrics.irr.is_defined())
                .count(),
            cancelled: skipped > 0,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        if summary.cancelled {
            tracing::warn!(skipped, "batch stopped before every scenario started");
        }
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            irr_undefined = summary.irr_undefined,
            elapsed_ms = summary.elapsed_ms,
            "batch analysis finished"
        );

        Ok(BatchAnalysis {
            aggregate: AggregateMetrics::from_outcomes(&per_scenario),
            per_scenario,
            summary,
            failures,
        })
    }
}

/// Draw and analyse `scenario_count` scenarios with default settings.
///
/// # Errors
///
/// See [`BatchRunner::run_batch_analysis`].
pub fn run_batch_analysis(
    property: &PropertyDescription,
    scenario_count: usize,
    correlation: &CorrelationConfig,
) -> Result<BatchAnalysis, DcfError> {
    BatchRunner::with_defaults().run_batch_analysis(property, scenario_count, correlation)
}
