//! Investment metrics and the decision enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal investment recommendation, strongest buy first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Clearly value-creating at low risk
    StrongBuy,
    /// Value-creating
    Buy,
    /// Roughly break-even, or value-creating at very high risk
    Hold,
    /// Value-destroying
    Sell,
    /// Clearly value-destroying, or value-destroying at high risk
    StrongSell,
}

impl Recommendation {
    /// Every recommendation, strongest buy first.
    pub const ALL: [Recommendation; 5] = [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::Hold,
        Recommendation::Sell,
        Recommendation::StrongSell,
    ];

    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal risk label, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Risk score below 0.25
    Low,
    /// Risk score below 0.50
    Moderate,
    /// Risk score below 0.75
    High,
    /// Everything else
    VeryHigh,
}

impl RiskLevel {
    /// Every risk level, lowest first.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY_HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reason an IRR could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrFailure {
    /// The cash-flow series never changes sign over the search range
    NoSignChange,
    /// The root finder ran out of iterations
    NonConvergence,
}

impl fmt::Display for IrrFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrrFailure::NoSignChange => f.write_str("no sign change"),
            IrrFailure::NonConvergence => f.write_str("did not converge"),
        }
    }
}

/// Result of the IRR search.
///
/// # Examples
///
/// ```
/// use dcf_core::types::{IrrFailure, IrrOutcome};
///
/// assert_eq!(IrrOutcome::Converged(0.12).rate(), Some(0.12));
/// assert_eq!(IrrOutcome::Undefined(IrrFailure::NoSignChange).rate(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum IrrOutcome {
    /// Solved rate
    Converged(f64),
    /// No rate could be produced
    Undefined(IrrFailure),
}

impl IrrOutcome {
    /// Solved rate, if any.
    #[inline]
    pub fn rate(&self) -> Option<f64> {
        match self {
            IrrOutcome::Converged(rate) => Some(*rate),
            IrrOutcome::Undefined(_) => None,
        }
    }

    /// Whether a rate was produced.
    #[inline]
    pub fn is_defined(&self) -> bool {
        matches!(self, IrrOutcome::Converged(_))
    }
}

impl fmt::Display for IrrOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrrOutcome::Converged(rate) => write!(f, "{:.2}%", rate * 100.0),
            IrrOutcome::Undefined(reason) => write!(f, "undefined ({})", reason),
        }
    }
}

/// Metrics for one property under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// Scenario the metrics were computed for
    pub scenario_id: u64,
    /// Net present value at the configured discount rate
    pub npv: f64,
    /// Internal rate of return
    pub irr: IrrOutcome,
    /// Net sale proceeds at the end of the horizon
    pub terminal_value: f64,
    /// Total distributions plus positive terminal value over cash invested
    pub equity_multiple: f64,
    /// Total cash returned over cash invested, minus one
    pub total_return: f64,
    /// First year the investment is recovered
    pub payback_year: Option<u32>,
    /// Mean annual net cash flow over cash invested
    pub average_cash_on_cash: f64,
    /// Lowest DSCR over the horizon; `None` when unlevered
    pub min_dscr: Option<f64>,
    /// Sum of annual distributions
    pub total_distributions: f64,
    /// Cash invested at acquisition
    pub cash_invested: f64,
    /// Recommendation
    pub recommendation: Recommendation,
    /// Risk label
    pub risk_level: RiskLevel,
}

impl FinancialMetrics {
    /// NPV per unit of cash invested.
    pub fn npv_ratio(&self) -> f64 {
        if self.cash_invested > 0.0 {
            self.npv / self.cash_invested
        } else {
            0.0
        }
    }
}
