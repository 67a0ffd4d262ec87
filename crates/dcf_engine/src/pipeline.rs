//! The per-scenario DCF pipeline.
//!
//! Each scenario moves through the stages in [`PipelineStage`] order. A
//! failing stage ends that scenario only; the error records where it
//! stopped.

use crate::assumptions::map_assumptions;
use crate::cash_flow::project_cash_flows;
use crate::initial::compute_initial_numbers;
use crate::metrics::calculate_metrics;
use crate::policy::AnalysisConfig;
use dcf_core::types::{
    CashFlowYear, DcfAssumptions, FinancialMetrics, InitialNumbers, MarketScenario,
    PropertyDescription,
};
use dcf_core::DcfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stages a scenario passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Drawing the market scenario
    ScenarioGeneration,
    /// Scenario → property assumptions
    AssumptionMapping,
    /// Acquisition and financing
    InitialNumbers,
    /// Year-by-year projection
    CashFlowProjection,
    /// NPV, IRR and recommendation
    MetricsCalculation,
}

impl PipelineStage {
    /// Every stage in execution order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::ScenarioGeneration,
        PipelineStage::AssumptionMapping,
        PipelineStage::InitialNumbers,
        PipelineStage::CashFlowProjection,
        PipelineStage::MetricsCalculation,
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            PipelineStage::ScenarioGeneration => "scenario_generation",
            PipelineStage::AssumptionMapping => "assumption_mapping",
            PipelineStage::InitialNumbers => "initial_numbers",
            PipelineStage::CashFlowProjection => "cash_flow_projection",
            PipelineStage::MetricsCalculation => "metrics_calculation",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pipeline failure tagged with the stage that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    /// Stage that failed
    pub stage: PipelineStage,
    /// Underlying error
    #[source]
    pub source: DcfError,
}

impl StageError {
    /// Tag `source` with `stage`.
    pub fn new(stage: PipelineStage, source: DcfError) -> Self {
        Self { stage, source }
    }

    /// Drop the stage tag.
    pub fn into_inner(self) -> DcfError {
        self.source
    }
}

impl From<StageError> for DcfError {
    fn from(err: StageError) -> Self {
        err.source
    }
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T, DcfError> {
    fn at(self, stage: PipelineStage) -> Result<T, StageError> {
        self.map_err(|source| StageError::new(stage, source))
    }
}

/// Every intermediate result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    /// Market scenario analysed
    pub scenario: MarketScenario,
    /// Resolved assumptions
    pub assumptions: DcfAssumptions,
    /// Acquisition and financing
    pub initial: InitialNumbers,
    /// Projected years
    pub cash_flows: Vec<CashFlowYear>,
    /// Metrics and recommendation
    pub metrics: FinancialMetrics,
}

/// Runs the four property stages for one scenario at a time.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{MarketRegime, MarketScenario, PropertyDescription};
/// use dcf_engine::pipeline::AnalysisPipeline;
///
/// let property = PropertyDescription::new(2_000_000.0, "DEFAULT").with_residential(20, 1_400.0);
/// let scenario = MarketScenario::from_parameters(
///     0,
///     [0.065, 0.06, 0.06, 0.03, 0.03, 0.035, 0.75, 0.05, 0.02],
///     MarketRegime::Neutral,
///     0.5,
///     0.4,
/// );
/// let pipeline = AnalysisPipeline::with_defaults();
/// let analysis = pipeline.analyse(&property, &scenario).unwrap();
/// assert_eq!(analysis.cash_flows.len(), 5);
/// assert!(analysis.metrics.npv.is_finite());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` when the configuration is invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self, DcfError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Pipeline with default policies.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage and keep the intermediate results.
    ///
    /// # Errors
    ///
    /// [`StageError`] naming the stage that failed.
    pub fn analyse(
        &self,
        property: &PropertyDescription,
        scenario: &MarketScenario,
    ) -> Result<ScenarioAnalysis, StageError> {
        let config = &self.config;
        let assumptions = map_assumptions(property, scenario, &config.mapping)
            .at(PipelineStage::AssumptionMapping)?;
        let initial = compute_initial_numbers(property, &assumptions, &config.financing)
            .at(PipelineStage::InitialNumbers)?;
        let cash_flows =
            project_cash_flows(&assumptions, &initial, config.horizon_years, &property.equity)
                .at(PipelineStage::CashFlowProjection)?;
        let metrics = calculate_metrics(
            &cash_flows,
            &assumptions,
            &initial,
            config.discount_rate,
            &config.metrics,
            &config.recommendation,
        )
        .at(PipelineStage::MetricsCalculation)?;

        Ok(ScenarioAnalysis {
            scenario: scenario.clone(),
            assumptions,
            initial,
            cash_flows,
            metrics,
        })
    }

    /// Run every stage and return the metrics only.
    ///
    /// # Errors
    ///
    /// [`StageError`] naming the stage that failed.
    pub fn run_single_analysis(
        &self,
        property: &PropertyDescription,
        scenario: &MarketScenario,
    ) -> Result<FinancialMetrics, StageError> {
        self.analyse(property, scenario).map(|analysis| analysis.metrics)
    }
}

/// Analyse one scenario with default policies.
///
/// # Errors
///
/// [`StageError`] naming the stage that failed.
pub fn run_single_analysis(
    property: &PropertyDescription,
    scenario: &MarketScenario,
) -> Result<FinancialMetrics, StageError> {
    AnalysisPipeline::with_defaults().run_single_analysis(property, scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::types::{MarketParameter, MarketRegime};

    fn property() -> PropertyDescription {
        PropertyDescription::new(2_000_000.0, "DEFAULT").with_residential(20, 1_400.0)
    }

    fn scenario() -> MarketScenario {
        MarketScenario::from_parameters(
            9,
            [0.065, 0.06, 0.06, 0.03, 0.03, 0.035, 0.75, 0.05, 0.02],
            MarketRegime::Neutral,
            0.5,
            0.4,
        )
    }

    #[test]
    fn test_analysis_carries_every_stage() {
        let analysis = AnalysisPipeline::with_defaults()
            .analyse(&property(), &scenario())
            .unwrap();
        assert_eq!(analysis.scenario.scenario_id, 9);
        assert_eq!(analysis.assumptions.scenario_id, 9);
        assert_eq!(analysis.metrics.scenario_id, 9);
        assert_eq!(analysis.cash_flows.len(), 5);
        assert_eq!(
            analysis.metrics.cash_invested,
            analysis.initial.total_cash_required
        );
    }

    #[test]
    fn test_free_function_matches_pipeline() {
        let a = run_single_analysis(&property(), &scenario()).unwrap();
        let b = AnalysisPipeline::with_defaults()
            .run_single_analysis(&property(), &scenario())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failure_names_stage() {
        let bad = scenario().with_value(MarketParameter::CapRate, -1.0);
        let err = run_single_analysis(&property(), &bad).unwrap_err();
        assert_eq!(err.stage, PipelineStage::AssumptionMapping);
        assert!(matches!(err.source, DcfError::InvalidAssumptions { .. }));
        assert!(err.to_string().starts_with("assumption_mapping failed"));
    }

    #[test]
    fn test_invalid_property_is_reported() {
        let empty = PropertyDescription::new(2_000_000.0, "DEFAULT");
        let err = run_single_analysis(&empty, &scenario()).unwrap_err();
        assert!(matches!(
            err.into_inner(),
            DcfError::InvalidProperty { ref field, .. } if field == "total_units"
        ));
    }

    #[test]
    fn test_horizon_follows_config() {
        let config = AnalysisConfig {
            horizon_years: 10,
            ..AnalysisConfig::default()
        };
        let pipeline = AnalysisPipeline::new(config).unwrap();
        let analysis = pipeline.analyse(&property(), &scenario()).unwrap();
        assert_eq!(analysis.cash_flows.len(), 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            horizon_years: 31,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            AnalysisPipeline::new(config),
            Err(DcfError::Configuration(_))
        ));
    }
}
