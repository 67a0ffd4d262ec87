//! Distribution statistics across the scenarios of a batch.

use crate::batch::ScenarioOutcome;
use dcf_core::math::statistics::DistributionSummary;
use dcf_core::types::{MarketRegime, Recommendation, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Batch-level view of the successful scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Scenarios aggregated
    pub scenario_count: usize,
    /// NPV distribution
    pub npv: DistributionSummary,
    /// Distribution of the defined IRRs; `None` when no IRR was defined
    pub irr: Option<DistributionSummary>,
    /// Equity multiple distribution
    pub equity_multiple: DistributionSummary,
    /// Share of scenarios with positive NPV
    pub probability_positive_npv: f64,
    /// Share of scenarios losing capital (total return below zero)
    pub probability_of_loss: f64,
    /// Scenarios whose IRR was undefined
    pub irr_undefined: usize,
    /// Scenarios per recommendation
    pub recommendation_counts: BTreeMap<Recommendation, usize>,
    /// Scenarios per market regime
    pub regime_counts: BTreeMap<MarketRegime, usize>,
    /// Scenarios per risk level
    pub risk_counts: BTreeMap<RiskLevel, usize>,
    /// Most frequent recommendation
    pub consensus: Recommendation,
}

impl AggregateMetrics {
    /// Aggregate `outcomes`; `None` when there are none.
    pub fn from_outcomes(outcomes: &[ScenarioOutcome]) -> Option<Self> {
        if outcomes.is_empty() {
            return None;
        }
        let n = outcomes.len();
        let npvs: Vec<f64> = outcomes.iter().map(|o| o.metrics.npv).collect();
        let irrs: Vec<f64> = outcomes.iter().filter_map(|o| o.metrics.irr.rate()).collect();
        let multiples: Vec<f64> = outcomes.iter().map(|o| o.metrics.equity_multiple).collect();

        let mut recommendation_counts = BTreeMap::new();
        let mut regime_counts = BTreeMap::new();
        let mut risk_counts = BTreeMap::new();
        for o in outcomes {
            *recommendation_counts.entry(o.metrics.recommendation).or_insert(0) += 1;
            *regime_counts.entry(o.scenario.regime).or_insert(0) += 1;
            *risk_counts.entry(o.metrics.risk_level).or_insert(0) += 1;
        }

        let share = |count: usize| count as f64 / n as f64;
        Some(Self {
            scenario_count: n,
            npv: DistributionSummary::from_values(&npvs)?,
            irr: DistributionSummary::from_values(&irrs),
            equity_multiple: DistributionSummary::from_values(&multiples)?,
            probability_positive_npv: share(npvs.iter().filter(|&&v| v > 0.0).count()),
            probability_of_loss: share(
                outcomes.iter().filter(|o| o.metrics.total_return < 0.0).count(),
            ),
            irr_undefined: n - irrs.len(),
            consensus: consensus(&recommendation_counts),
            recommendation_counts,
            regime_counts,
            risk_counts,
        })
    }
}

/// Most frequent recommendation; ties go to the less bullish one.
pub fn consensus(counts: &BTreeMap<Recommendation, usize>) -> Recommendation {
    counts
        .iter()
        .max_by(|(ra, ca), (rb, cb)| ca.cmp(cb).then(ra.cmp(rb)))
        .map_or(Recommendation::Hold, |(r, _)| *r)
}
