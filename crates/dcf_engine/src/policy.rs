//! Tunable policy constants for every pipeline stage.
//!
//! Each struct carries `Default` values that the regression fixtures pin.
//! Changing a default changes fixture outputs.

use dcf_core::types::{IrrOutcome, Recommendation, RiskLevel};
use dcf_core::DcfError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Longest supported projection horizon in years.
pub const MAX_HORIZON_YEARS: u32 = 30;

/// Spreads applied to properties in one location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationAdjustment {
    /// Added to the cap rate
    pub cap_rate_spread: f64,
    /// Added to the vacancy rate
    pub vacancy_spread: f64,
    /// Added to rent growth
    pub rent_growth_spread: f64,
}

/// Scenario → assumptions adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingPolicy {
    /// Cap-rate premium for commercial space
    pub commercial_cap_premium: f64,
    /// Vacancy premium for commercial space
    pub commercial_vacancy_premium: f64,
    /// Exit cap rate minus entry cap rate
    pub exit_cap_spread: f64,
    /// Adjustments keyed by location code
    pub locations: HashMap<String, LocationAdjustment>,
}

impl Default for MappingPolicy {
    fn default() -> Self {
        Self {
            commercial_cap_premium: 0.0075,
            commercial_vacancy_premium: 0.02,
            exit_cap_spread: 0.0,
            locations: HashMap::new(),
        }
    }
}

impl MappingPolicy {
    /// Adjustment for `location`; unknown codes get none.
    pub fn location(&self, location: &str) -> LocationAdjustment {
        self.locations.get(location).copied().unwrap_or_default()
    }

    /// Builder: register a location adjustment.
    pub fn with_location(mut self, location: impl Into<String>, adjustment: LocationAdjustment) -> Self {
        self.locations.insert(location.into(), adjustment);
        self
    }
}

/// Loan sizing rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingPolicy {
    /// Minimum year-1 NOI / debt service
    pub min_dscr: f64,
    /// Amortisation term in years
    pub amortization_years: u32,
}

impl Default for FinancingPolicy {
    fn default() -> Self {
        Self {
            min_dscr: 1.20,
            amortization_years: 30,
        }
    }
}

/// How the sale price at the end of the horizon is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitValuation {
    /// Exit-year NOI over the exit cap rate
    #[default]
    DirectCapitalisation,
    /// Projected property value
    Appreciation,
}

/// Metric calculation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsPolicy {
    /// Sale costs as a share of gross sale value
    pub sale_cost_pct: f64,
    /// Exit valuation method
    pub exit_valuation: ExitValuation,
    /// Lower end of the IRR search range
    pub irr_lower_bound: f64,
    /// Upper end of the IRR search range
    pub irr_upper_bound: f64,
    /// Sub-intervals scanned for a sign change
    pub irr_scan_steps: usize,
    /// Root-finder iteration budget
    pub irr_max_iterations: usize,
    /// Root-finder tolerance on NPV per unit of cash invested
    pub irr_tolerance: f64,
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self {
            sale_cost_pct: 0.03,
            exit_valuation: ExitValuation::DirectCapitalisation,
            irr_lower_bound: -0.99,
            irr_upper_bound: 10.0,
            irr_scan_steps: 400,
            irr_max_iterations: 100,
            irr_tolerance: 1e-10,
        }
    }
}

/// Risk score cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Below this: `Low`
    pub low: f64,
    /// Below this: `Moderate`
    pub moderate: f64,
    /// Below this: `High`; otherwise `VeryHigh`
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 0.25,
            moderate: 0.50,
            high: 0.75,
        }
    }
}

impl RiskThresholds {
    /// Risk level for a composite risk score.
    pub fn classify(&self, risk_score: f64) -> RiskLevel {
        if risk_score < self.low {
            RiskLevel::Low
        } else if risk_score < self.moderate {
            RiskLevel::Moderate
        } else if risk_score < self.high {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

/// Buy / sell decision rules.
///
/// With `r = NPV / cash invested`:
/// - `|r| ≤ hold_band` → Hold
/// - `r > hold_band`: IRR ≥ `strong_buy_irr` and risk Low → StrongBuy;
///   risk VeryHigh → Hold; otherwise Buy
/// - `r < −hold_band`: `r ≤ −strong_sell_npv_ratio` or risk High / VeryHigh
///   → StrongSell; otherwise Sell
///
/// An undefined IRR never qualifies for StrongBuy.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{IrrOutcome, Recommendation, RiskLevel};
/// use dcf_engine::policy::RecommendationPolicy;
///
/// let policy = RecommendationPolicy::default();
/// let irr = IrrOutcome::Converged(0.18);
/// assert_eq!(policy.recommend(0.30, &irr, RiskLevel::Low), Recommendation::StrongBuy);
/// assert_eq!(policy.recommend(0.01, &irr, RiskLevel::Low), Recommendation::Hold);
/// assert_eq!(policy.recommend(-0.10, &irr, RiskLevel::High), Recommendation::StrongSell);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationPolicy {
    /// Half-width of the Hold band around zero NPV ratio
    pub hold_band: f64,
    /// IRR needed for StrongBuy
    pub strong_buy_irr: f64,
    /// NPV loss ratio at which Sell becomes StrongSell
    pub strong_sell_npv_ratio: f64,
    /// Risk score cut-offs
    pub risk: RiskThresholds,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            hold_band: 0.02,
            strong_buy_irr: 0.15,
            strong_sell_npv_ratio: 0.20,
            risk: RiskThresholds::default(),
        }
    }
}

impl RecommendationPolicy {
    /// Risk level for a composite risk score.
    pub fn risk_level(&self, risk_score: f64) -> RiskLevel {
        self.risk.classify(risk_score)
    }

    /// Recommendation for an NPV ratio, IRR outcome and risk level.
    pub fn recommend(&self, npv_ratio: f64, irr: &IrrOutcome, risk: RiskLevel) -> Recommendation {
        if !npv_ratio.is_finite() || npv_ratio.abs() <= self.hold_band {
            return Recommendation::Hold;
        }
        if npv_ratio > 0.0 {
            let strong_irr = irr.rate().is_some_and(|rate| rate >= self.strong_buy_irr);
            match risk {
                RiskLevel::Low if strong_irr => Recommendation::StrongBuy,
                RiskLevel::VeryHigh => Recommendation::Hold,
                _ => Recommendation::Buy,
            }
        } else if npv_ratio <= -self.strong_sell_npv_ratio
            || matches!(risk, RiskLevel::High | RiskLevel::VeryHigh)
        {
            Recommendation::StrongSell
        } else {
            Recommendation::Sell
        }
    }
}

/// Everything a single analysis needs besides its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Projection horizon in years
    pub horizon_years: u32,
    /// Discount rate for NPV
    pub discount_rate: f64,
    /// Assumption mapping
    pub mapping: MappingPolicy,
    /// Loan sizing
    pub financing: FinancingPolicy,
    /// Metric calculation
    pub metrics: MetricsPolicy,
    /// Recommendation rules
    pub recommendation: RecommendationPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            horizon_years: 5,
            discount_rate: 0.10,
            mapping: MappingPolicy::default(),
            financing: FinancingPolicy::default(),
            metrics: MetricsPolicy::default(),
            recommendation: RecommendationPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check the configuration, collecting every problem.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` listing each invalid setting.
    pub fn validate(&self) -> Result<(), DcfError> {
        let mut problems = Vec::new();
        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            problems.push(format!(
                "horizon_years must be in 1..={} (got {})",
                MAX_HORIZON_YEARS, self.horizon_years
            ));
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            problems.push(format!("discount_rate must exceed -1 (got {})", self.discount_rate));
        }
        if !self.financing.min_dscr.is_finite() || self.financing.min_dscr < 0.0 {
            problems.push(format!(
                "financing.min_dscr must be non-negative (got {})",
                self.financing.min_dscr
            ));
        }
        if self.financing.amortization_years == 0 {
            problems.push("financing.amortization_years must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.metrics.sale_cost_pct) {
            problems.push(format!(
                "metrics.sale_cost_pct must lie in [0, 1) (got {})",
                self.metrics.sale_cost_pct
            ));
        }
        if !(self.metrics.irr_lower_bound > -1.0
            && self.metrics.irr_lower_bound < self.metrics.irr_upper_bound)
        {
            problems.push(format!(
                "IRR search range [{}, {}] must be increasing and above -1",
                self.metrics.irr_lower_bound, self.metrics.irr_upper_bound
            ));
        }
        if self.metrics.irr_scan_steps == 0 || self.metrics.irr_max_iterations == 0 {
            problems.push("IRR scan steps and iterations must be positive".to_string());
        }
        if !(self.metrics.irr_tolerance > 0.0) {
            problems.push(format!(
                "metrics.irr_tolerance must be positive (got {})",
                self.metrics.irr_tolerance
            ));
        }
        let r = &self.recommendation;
        if !(r.hold_band >= 0.0 && r.strong_sell_npv_ratio >= r.hold_band) {
            problems.push(format!(
                "recommendation bands need 0 <= hold_band <= strong_sell_npv_ratio (got {}, {})",
                r.hold_band, r.strong_sell_npv_ratio
            ));
        }
        if !(r.risk.low <= r.risk.moderate && r.risk.moderate <= r.risk.high) {
            problems.push("risk thresholds must be non-decreasing".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DcfError::configuration(problems.join("; ")))
        }
    }
}
