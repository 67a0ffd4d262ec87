//! Correlation rules between market parameters.
//!
//! A rule says a dependent parameter leans on a driver with a given
//! strength. Validation turns a rule set into a [`CorrelationPlan`]: the
//! order parameters are drawn in (drivers before dependents) and the
//! effective weights of each dependent's drivers.

use crate::statistics::MarketStatistics;
use dcf_core::types::MarketParameter;
use dcf_core::DcfError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper limit on the summed squared strengths of one dependent.
pub const MAX_EXPLAINED_VARIANCE: f64 = 0.99;

/// One driver → dependent relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRule {
    /// Parameter drawn first
    pub driver: MarketParameter,
    /// Parameter nudged by the driver
    pub dependent: MarketParameter,
    /// Strength in [-1, 1]
    pub strength: f64,
}

impl CorrelationRule {
    /// Create a rule.
    pub const fn new(driver: MarketParameter, dependent: MarketParameter, strength: f64) -> Self {
        Self {
            driver,
            dependent,
            strength,
        }
    }
}

/// A set of correlation rules.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::MarketParameter;
/// use dcf_scenarios::correlation::CorrelationConfig;
/// use dcf_scenarios::statistics::MarketStatistics;
///
/// let plan = CorrelationConfig::standard()
///     .validate(&MarketStatistics::standard())
///     .unwrap();
/// let order = plan.order();
/// let position = |p: MarketParameter| order.iter().position(|q| *q == p).unwrap();
/// assert!(position(MarketParameter::InterestRate) < position(MarketParameter::CapRate));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationConfig {
    rules: Vec<CorrelationRule>,
}

impl CorrelationConfig {
    /// Rule set from an explicit list.
    pub fn new(rules: Vec<CorrelationRule>) -> Self {
        Self { rules }
    }

    /// No correlation: every parameter is drawn independently.
    pub fn independent() -> Self {
        Self::default()
    }

    /// Default relationships between the market parameters.
    pub fn standard() -> Self {
        use MarketParameter::*;
        Self::new(vec![
            CorrelationRule::new(InterestRate, CapRate, 0.60),
            CorrelationRule::new(InterestRate, PropertyGrowth, -0.40),
            CorrelationRule::new(InterestRate, LoanToValue, -0.30),
            CorrelationRule::new(CapRate, PropertyGrowth, -0.30),
            CorrelationRule::new(VacancyRate, RentGrowth, -0.50),
            CorrelationRule::new(RentGrowth, PropertyGrowth, 0.50),
            CorrelationRule::new(RentGrowth, ExpenseGrowth, 0.30),
        ])
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    /// Append a rule.
    pub fn push(&mut self, rule: CorrelationRule) {
        self.rules.push(rule);
    }

    /// Check the rules against `statistics` and build the draw plan.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` for a strength outside [-1, 1], a
    /// self-referencing or duplicated pair, a cycle, or a parameter without
    /// statistics.
    pub fn validate(&self, statistics: &MarketStatistics) -> Result<CorrelationPlan, DcfError> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !rule.strength.is_finite() || !(-1.0..=1.0).contains(&rule.strength) {
                return Err(DcfError::configuration(format!(
                    "correlation {} -> {}: strength {} outside [-1, 1]",
                    rule.driver, rule.dependent, rule.strength
                )));
            }
            if rule.driver == rule.dependent {
                return Err(DcfError::configuration(format!(
                    "correlation rule on {} references itself",
                    rule.driver
                )));
            }
            if !seen.insert((rule.driver, rule.dependent)) {
                return Err(DcfError::configuration(format!(
                    "duplicate correlation rule {} -> {}",
                    rule.driver, rule.dependent
                )));
            }
            statistics.require(rule.driver)?;
            statistics.require(rule.dependent)?;
        }

        let order = self.topological_order()?;

        let mut drivers: [Vec<(MarketParameter, f64)>; MarketParameter::COUNT] = Default::default();
        for rule in &self.rules {
            drivers[rule.dependent.index()].push((rule.driver, rule.strength));
        }
        let mut residual = [1.0; MarketParameter::COUNT];
        for (index, weights) in drivers.iter_mut().enumerate() {
            let explained: f64 = weights.iter().map(|(_, s)| s * s).sum();
            if explained >= 1.0 {
                let scale = (MAX_EXPLAINED_VARIANCE / explained).sqrt();
                tracing::debug!(
                    parameter = %MarketParameter::ALL[index],
                    explained,
                    scale,
                    "scaling correlation strengths"
                );
                for (_, strength) in weights.iter_mut() {
                    *strength *= scale;
                }
            }
            let explained: f64 = weights.iter().map(|(_, s)| s * s).sum();
            residual[index] = (1.0 - explained).max(0.0).sqrt();
        }

        Ok(CorrelationPlan {
            order,
            drivers,
            residual,
        })
    }

    /// Kahn's algorithm, ties broken by canonical parameter order.
    fn topological_order(&self) -> Result<Vec<MarketParameter>, DcfError> {
        let mut in_degree = [0usize; MarketParameter::COUNT];
        for rule in &self.rules {
            in_degree[rule.dependent.index()] += 1;
        }
        let mut ready: BTreeSet<MarketParameter> = MarketParameter::ALL
            .iter()
            .copied()
            .filter(|p| in_degree[p.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(MarketParameter::COUNT);
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for rule in self.rules.iter().filter(|r| r.driver == next) {
                let degree = &mut in_degree[rule.dependent.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(rule.dependent);
                }
            }
        }

        if order.len() < MarketParameter::COUNT {
            let cyclic: Vec<&str> = MarketParameter::ALL
                .iter()
                .filter(|p| in_degree[p.index()] > 0)
                .map(|p| p.name())
                .collect();
            return Err(DcfError::configuration(format!(
                "correlation rules form a cycle through: {}",
                cyclic.join(", ")
            )));
        }
        Ok(order)
    }
}

/// Validated draw plan.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPlan {
    order: Vec<MarketParameter>,
    drivers: [Vec<(MarketParameter, f64)>; MarketParameter::COUNT],
    residual: [f64; MarketParameter::COUNT],
}

impl CorrelationPlan {
    /// Draw order: every driver precedes its dependents.
    pub fn order(&self) -> &[MarketParameter] {
        &self.order
    }

    /// Effective (possibly scaled) driver weights of `parameter`.
    pub fn drivers(&self, parameter: MarketParameter) -> &[(MarketParameter, f64)] {
        &self.drivers[parameter.index()]
    }

    /// Weight of the idiosyncratic shock: `sqrt(1 − Σρ²)`.
    pub fn residual_weight(&self, parameter: MarketParameter) -> f64 {
        self.residual[parameter.index()]
    }
}
