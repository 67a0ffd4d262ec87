//! Correlated scenario generation.

use crate::correlation::{CorrelationConfig, CorrelationPlan};
use crate::regime::{classify_deviations, RegimeThresholds};
use crate::rng::ScenarioRng;
use crate::statistics::MarketStatistics;
use dcf_core::types::{MarketParameter, MarketRegime, MarketScenario};
use dcf_core::DcfError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base seed for the run
    pub base_seed: u64,
    /// Resamples allowed per parameter before the scenario is abandoned
    pub max_resample_attempts: u32,
    /// Regime thresholds
    pub thresholds: RegimeThresholds,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_seed: 42,
            max_resample_attempts: 8,
            thresholds: RegimeThresholds::default(),
        }
    }
}

impl GeneratorConfig {
    /// Default settings with a different seed.
    pub fn with_seed(base_seed: u64) -> Self {
        Self {
            base_seed,
            ..Self::default()
        }
    }
}

/// Draws correlated market scenarios.
///
/// Dependents follow the weighted composition
/// `z_p = Σ ρ_i ẑ_{d_i} + sqrt(1 − Σ ρ_i²) ε`, where `ẑ_d` is the realised
/// standardised deviation of driver `d`, and `x_p = μ_p + σ_p z_p`. A draw
/// outside `[min, max]` keeps its driver contribution and redraws `ε`.
///
/// # Examples
///
/// ```rust
/// use dcf_scenarios::correlation::CorrelationConfig;
/// use dcf_scenarios::generator::{GeneratorConfig, ScenarioGenerator};
/// use dcf_scenarios::statistics::MarketStatistics;
///
/// let generator = ScenarioGenerator::new(
///     MarketStatistics::standard(),
///     &CorrelationConfig::standard(),
///     GeneratorConfig::with_seed(7),
/// )
/// .unwrap();
///
/// let batch = generator.generate(100);
/// assert_eq!(batch.len(), 100);
/// let third = generator.generate_one(3).unwrap();
/// assert_eq!(batch[3].as_ref().unwrap(), &third);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    statistics: MarketStatistics,
    plan: CorrelationPlan,
    config: GeneratorConfig,
}

impl ScenarioGenerator {
    /// Validate the inputs and build a generator.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` for incomplete statistics, invalid
    /// correlation rules or invalid thresholds.
    pub fn new(
        statistics: MarketStatistics,
        correlation: &CorrelationConfig,
        config: GeneratorConfig,
    ) -> Result<Self, DcfError> {
        statistics.validate()?;
        if !config.thresholds.is_valid() {
            return Err(DcfError::configuration(format!(
                "regime thresholds require 0 <= low < high <= 1 (low = {}, high = {})",
                config.thresholds.low, config.thresholds.high
            )));
        }
        let plan = correlation.validate(&statistics)?;
        Ok(Self {
            statistics,
            plan,
            config,
        })
    }

    /// Standard statistics and correlation with the given settings.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` when the thresholds are invalid.
    pub fn standard(config: GeneratorConfig) -> Result<Self, DcfError> {
        Self::new(
            MarketStatistics::standard(),
            &CorrelationConfig::standard(),
            config,
        )
    }

    /// Marginal statistics in use.
    pub fn statistics(&self) -> &MarketStatistics {
        &self.statistics
    }

    /// Settings in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw scenario `scenario_id`.
    ///
    /// # Errors
    ///
    /// `DcfError::ScenarioGeneration` when a parameter stays outside its
    /// bounds after `max_resample_attempts` resamples.
    pub fn generate_one(&self, scenario_id: u64) -> Result<MarketScenario, DcfError> {
        let mut rng = ScenarioRng::for_scenario(self.config.base_seed, scenario_id);
        let mut values = [0.0; MarketParameter::COUNT];
        let mut z = [0.0; MarketParameter::COUNT];

        for &parameter in self.plan.order() {
            let stats = self.statistics.require(parameter)?;
            let driven: f64 = self
                .plan
                .drivers(parameter)
                .iter()
                .map(|(driver, strength)| strength * z[driver.index()])
                .sum();
            let residual = self.plan.residual_weight(parameter);

            let mut accepted = None;
            for attempt in 0..=self.config.max_resample_attempts {
                let draw = stats.mean + stats.std_dev * (driven + residual * rng.gen_normal());
                if stats.contains(draw) {
                    if attempt > 0 {
                        tracing::trace!(scenario_id, %parameter, attempt, "resampled draw accepted");
                    }
                    accepted = Some(draw);
                    break;
                }
            }
            let value = accepted.ok_or_else(|| DcfError::ScenarioGeneration {
                scenario_id,
                parameter: parameter.name().to_string(),
                attempts: self.config.max_resample_attempts,
            })?;

            values[parameter.index()] = value;
            z[parameter.index()] = stats.standardise(value);
        }

        let (growth, risk, regime) = classify_deviations(&z, &self.config.thresholds);
        Ok(MarketScenario::from_parameters(
            scenario_id,
            values,
            regime,
            growth,
            risk,
        ))
    }

    /// Draw scenarios `0..count` in parallel. Failures are reported per scenario.
    pub fn generate(&self, count: usize) -> Vec<Result<MarketScenario, DcfError>> {
        let results: Vec<_> = (0..count as u64)
            .into_par_iter()
            .map(|id| self.generate_one(id))
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(count, failed, "scenario generation failures");
        }
        results
    }

    /// Every parameter at its mean, neutral regime, id 0.
    pub fn baseline_scenario(&self) -> MarketScenario {
        let values = MarketParameter::ALL.map(|p| {
            self.statistics
                .get(p)
                .map(|s| s.mean)
                .unwrap_or_default()
        });
        MarketScenario::from_parameters(0, values, MarketRegime::Neutral, 0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationRule;
    use crate::statistics::ParameterStatistics;
    use dcf_core::math::statistics::mean;

    fn standard(seed: u64) -> ScenarioGenerator {
        ScenarioGenerator::standard(GeneratorConfig::with_seed(seed)).unwrap()
    }

    #[test]
    fn test_scenarios_respect_bounds() {
        let generator = standard(11);
        let stats = MarketStatistics::standard();
        for result in generator.generate(2_000) {
            let scenario = result.unwrap();
            for p in MarketParameter::ALL {
                assert!(stats.get(p).unwrap().contains(scenario.value(p)));
            }
            assert!((0.0..=1.0).contains(&scenario.growth_score));
            assert!((0.0..=1.0).contains(&scenario.risk_score));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = standard(5).generate(50);
        let b = standard(5).generate(50);
        assert_eq!(a, b);
        let c = standard(6).generate(50);
        assert_ne!(a, c);
    }

    #[test]
    fn test_scenario_independent_of_batch() {
        let generator = standard(9);
        let batch = generator.generate(20);
        for id in [0u64, 7, 19] {
            assert_eq!(batch[id as usize].as_ref().unwrap(), &generator.generate_one(id).unwrap());
        }
    }

    #[test]
    fn test_positive_correlation_moves_together() {
        let generator = standard(3);
        let scenarios: Vec<MarketScenario> =
            generator.generate(3_000).into_iter().map(|r| r.unwrap()).collect();
        let rates: Vec<f64> = scenarios.iter().map(|s| s.interest_rate).collect();
        let caps: Vec<f64> = scenarios.iter().map(|s| s.cap_rate).collect();
        let (mr, mc) = (mean(&rates).unwrap(), mean(&caps).unwrap());
        let cov: f64 = rates.iter().zip(&caps).map(|(r, c)| (r - mr) * (c - mc)).sum();
        let vr: f64 = rates.iter().map(|r| (r - mr) * (r - mr)).sum();
        let vc: f64 = caps.iter().map(|c| (c - mc) * (c - mc)).sum();
        let corr = cov / (vr * vc).sqrt();
        assert!(corr > 0.45 && corr < 0.75, "correlation {}", corr);
    }

    #[test]
    fn test_impossible_bounds_raise_generation_error() {
        // the admissible band is a sliver of the marginal
        let stats = MarketStatistics::standard().with(
            MarketParameter::VacancyRate,
            ParameterStatistics::new(0.25, 0.5, 0.2499, 0.25),
        );
        let generator = ScenarioGenerator::new(
            stats,
            &CorrelationConfig::independent(),
            GeneratorConfig {
                max_resample_attempts: 2,
                ..GeneratorConfig::default()
            },
        )
        .unwrap();
        let failures: Vec<DcfError> = generator
            .generate(200)
            .into_iter()
            .filter_map(Result::err)
            .collect();
        assert!(!failures.is_empty());
        for err in failures {
            match err {
                DcfError::ScenarioGeneration {
                    parameter, attempts, ..
                } => {
                    assert_eq!(parameter, "vacancy_rate");
                    assert_eq!(attempts, 2);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_correlation_is_configuration_error() {
        let rules = CorrelationConfig::new(vec![CorrelationRule::new(
            MarketParameter::CapRate,
            MarketParameter::CapRate,
            0.3,
        )]);
        let result = ScenarioGenerator::new(
            MarketStatistics::standard(),
            &rules,
            GeneratorConfig::default(),
        );
        assert!(matches!(result, Err(DcfError::Configuration(_))));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let config = GeneratorConfig {
            thresholds: RegimeThresholds { high: 0.3, low: 0.5 },
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            ScenarioGenerator::standard(config),
            Err(DcfError::Configuration(_))
        ));
    }

    #[test]
    fn test_baseline_scenario_uses_means() {
        let generator = standard(1);
        let baseline = generator.baseline_scenario();
        assert_eq!(baseline.cap_rate, 0.06);
        assert_eq!(baseline.loan_to_value, 0.75);
        assert_eq!(baseline.regime, MarketRegime::Neutral);
    }
}
