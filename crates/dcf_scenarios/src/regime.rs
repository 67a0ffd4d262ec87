//! Composite growth / risk scores and regime classification.
//!
//! Each parameter's standardised deviation `z` is mapped to
//! `n = clamp(0.5 + z / 6, 0, 1)`, so ±3σ spans the unit interval. A score
//! is the weighted mean of these normalised values; terms whose sign is
//! negative contribute `1 − n`.

use dcf_core::types::{MarketParameter, MarketRegime};
use serde::{Deserialize, Serialize};

/// Direction in which a parameter moves a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Higher values raise the score
    Positive,
    /// Higher values lower the score
    Negative,
}

/// One weighted score component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTerm {
    /// Parameter
    pub parameter: MarketParameter,
    /// Weight in the mean
    pub weight: f64,
    /// Direction
    pub direction: Direction,
}

const fn term(parameter: MarketParameter, weight: f64, direction: Direction) -> ScoreTerm {
    ScoreTerm {
        parameter,
        weight,
        direction,
    }
}

/// Growth score components.
pub const GROWTH_TERMS: [ScoreTerm; 4] = [
    term(MarketParameter::RentGrowth, 0.35, Direction::Positive),
    term(MarketParameter::PropertyGrowth, 0.35, Direction::Positive),
    term(MarketParameter::VacancyRate, 0.15, Direction::Negative),
    term(MarketParameter::InterestRate, 0.15, Direction::Negative),
];

/// Risk score components.
pub const RISK_TERMS: [ScoreTerm; 6] = [
    term(MarketParameter::InterestRate, 0.25, Direction::Positive),
    term(MarketParameter::CapRate, 0.20, Direction::Positive),
    term(MarketParameter::VacancyRate, 0.20, Direction::Positive),
    term(MarketParameter::ExpenseGrowth, 0.10, Direction::Positive),
    term(MarketParameter::LoanToValue, 0.10, Direction::Positive),
    term(MarketParameter::RentGrowth, 0.15, Direction::Negative),
];

/// Map a standardised deviation to [0, 1].
#[inline]
pub fn normalise(z: f64) -> f64 {
    (0.5 + z / 6.0).clamp(0.0, 1.0)
}

/// Weighted mean of normalised deviations. `z` is indexed by
/// [`MarketParameter::index`].
pub fn composite_score(terms: &[ScoreTerm], z: &[f64; MarketParameter::COUNT]) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for t in terms {
        let n = normalise(z[t.parameter.index()]);
        let contribution = match t.direction {
            Direction::Positive => n,
            Direction::Negative => 1.0 - n,
        };
        weighted += t.weight * contribution;
        total += t.weight;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.5
    }
}

/// Regime cut-offs applied to both scores.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::MarketRegime;
/// use dcf_scenarios::regime::RegimeThresholds;
///
/// let t = RegimeThresholds::default();
/// assert_eq!(t.classify(0.7, 0.3), MarketRegime::Growth);
/// assert_eq!(t.classify(0.5, 0.5), MarketRegime::Neutral);
/// assert_eq!(t.classify(0.9, 0.7), MarketRegime::Stress);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    /// Scores above this are high
    pub high: f64,
    /// Scores below this are low
    pub low: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            high: 0.6,
            low: 0.4,
        }
    }
}

impl RegimeThresholds {
    /// Check `0 ≤ low < high ≤ 1`.
    pub fn is_valid(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && 0.0 <= self.low
            && self.low < self.high
            && self.high <= 1.0
    }

    /// Classify a scenario. Rules are evaluated in order, first match wins:
    ///
    /// 1. risk > high → `Stress`
    /// 2. growth > high and risk < low → `Growth`
    /// 3. growth > high, or risk < low with growth ≥ low → `Bull`
    /// 4. growth < low → `Bear`
    /// 5. otherwise → `Neutral`
    pub fn classify(&self, growth_score: f64, risk_score: f64) -> MarketRegime {
        if risk_score > self.high {
            MarketRegime::Stress
        } else if growth_score > self.high && risk_score < self.low {
            MarketRegime::Growth
        } else if growth_score > self.high || (risk_score < self.low && growth_score >= self.low) {
            MarketRegime::Bull
        } else if growth_score < self.low {
            MarketRegime::Bear
        } else {
            MarketRegime::Neutral
        }
    }
}

/// Growth score, risk score and regime for a vector of standardised deviations.
pub fn classify_deviations(
    z: &[f64; MarketParameter::COUNT],
    thresholds: &RegimeThresholds,
) -> (f64, f64, MarketRegime) {
    let growth = composite_score(&GROWTH_TERMS, z);
    let risk = composite_score(&RISK_TERMS, z);
    (growth, risk, thresholds.classify(growth, risk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_weights_sum_to_one() {
        let g: f64 = GROWTH_TERMS.iter().map(|t| t.weight).sum();
        let r: f64 = RISK_TERMS.iter().map(|t| t.weight).sum();
        assert_relative_eq!(g, 1.0, max_relative = 1e-12);
        assert_relative_eq!(r, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_mean_scenario_is_neutral() {
        let z = [0.0; MarketParameter::COUNT];
        let (growth, risk, regime) = classify_deviations(&z, &RegimeThresholds::default());
        assert_relative_eq!(growth, 0.5);
        assert_relative_eq!(risk, 0.5);
        assert_eq!(regime, MarketRegime::Neutral);
    }

    #[test]
    fn test_normalise_clamps() {
        assert_eq!(normalise(0.0), 0.5);
        assert_eq!(normalise(3.0), 1.0);
        assert_eq!(normalise(10.0), 1.0);
        assert_eq!(normalise(-10.0), 0.0);
    }

    #[test]
    fn test_rate_shock_is_stress() {
        let mut z = [0.0; MarketParameter::COUNT];
        z[MarketParameter::InterestRate.index()] = 3.0;
        z[MarketParameter::CapRate.index()] = 3.0;
        z[MarketParameter::VacancyRate.index()] = 3.0;
        let (_, risk, regime) = classify_deviations(&z, &RegimeThresholds::default());
        assert!(risk > 0.6);
        assert_eq!(regime, MarketRegime::Stress);
    }

    #[test]
    fn test_strong_rent_growth_is_growth() {
        let mut z = [0.0; MarketParameter::COUNT];
        z[MarketParameter::RentGrowth.index()] = 3.0;
        z[MarketParameter::PropertyGrowth.index()] = 3.0;
        z[MarketParameter::InterestRate.index()] = -2.0;
        z[MarketParameter::VacancyRate.index()] = -2.0;
        z[MarketParameter::CapRate.index()] = -2.0;
        let (growth, risk, regime) = classify_deviations(&z, &RegimeThresholds::default());
        assert!(growth > 0.6, "growth {}", growth);
        assert!(risk < 0.4, "risk {}", risk);
        assert_eq!(regime, MarketRegime::Growth);
    }

    #[test]
    fn test_rule_order() {
        let t = RegimeThresholds::default();
        assert_eq!(t.classify(0.65, 0.5), MarketRegime::Bull);
        assert_eq!(t.classify(0.45, 0.35), MarketRegime::Bull);
        assert_eq!(t.classify(0.35, 0.35), MarketRegime::Bear);
        assert_eq!(t.classify(0.35, 0.5), MarketRegime::Bear);
        assert_eq!(t.classify(0.4, 0.6), MarketRegime::Neutral);
        assert_eq!(t.classify(0.1, 0.61), MarketRegime::Stress);
    }

    #[test]
    fn test_threshold_validity() {
        assert!(RegimeThresholds::default().is_valid());
        assert!(!RegimeThresholds { high: 0.4, low: 0.6 }.is_valid());
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_unit_interval(z in proptest::array::uniform9(-20.0..20.0f64)) {
            let (growth, risk, _) = classify_deviations(&z, &RegimeThresholds::default());
            prop_assert!((0.0..=1.0).contains(&growth));
            prop_assert!((0.0..=1.0).contains(&risk));
        }
    }
}
