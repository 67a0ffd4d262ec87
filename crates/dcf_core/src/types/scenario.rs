//! Market parameters, regimes and the scenario record.

use super::error::DcfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the correlated market parameters drawn per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketParameter {
    /// Mortgage interest rate
    InterestRate,
    /// Entry capitalisation rate
    CapRate,
    /// Vacancy rate
    VacancyRate,
    /// Annual rent growth
    RentGrowth,
    /// Annual operating-expense growth
    ExpenseGrowth,
    /// Annual property value growth
    PropertyGrowth,
    /// Loan-to-value ratio
    LoanToValue,
    /// Closing costs as a share of purchase price
    ClosingCostPct,
    /// Capital reserve as a share of purchase price
    ReservePct,
}

impl MarketParameter {
    /// Number of parameters.
    pub const COUNT: usize = 9;

    /// Every parameter in canonical order.
    pub const ALL: [MarketParameter; Self::COUNT] = [
        MarketParameter::InterestRate,
        MarketParameter::CapRate,
        MarketParameter::VacancyRate,
        MarketParameter::RentGrowth,
        MarketParameter::ExpenseGrowth,
        MarketParameter::PropertyGrowth,
        MarketParameter::LoanToValue,
        MarketParameter::ClosingCostPct,
        MarketParameter::ReservePct,
    ];

    /// Position in [`MarketParameter::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            MarketParameter::InterestRate => "interest_rate",
            MarketParameter::CapRate => "cap_rate",
            MarketParameter::VacancyRate => "vacancy_rate",
            MarketParameter::RentGrowth => "rent_growth",
            MarketParameter::ExpenseGrowth => "expense_growth",
            MarketParameter::PropertyGrowth => "property_growth",
            MarketParameter::LoanToValue => "loan_to_value",
            MarketParameter::ClosingCostPct => "closing_cost_pct",
            MarketParameter::ReservePct => "reserve_pct",
        }
    }
}

impl fmt::Display for MarketParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarketParameter {
    type Err = DcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        MarketParameter::ALL
            .iter()
            .copied()
            .find(|p| p.name() == key)
            .ok_or_else(|| DcfError::configuration(format!("unknown market parameter '{}'", s)))
    }
}

/// Market regime label attached to every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    /// Strong growth with low risk
    Growth,
    /// Favourable conditions
    Bull,
    /// Neither favourable nor adverse
    Neutral,
    /// Weak growth
    Bear,
    /// Elevated risk
    Stress,
}

impl MarketRegime {
    /// Every regime.
    pub const ALL: [MarketRegime; 5] = [
        MarketRegime::Growth,
        MarketRegime::Bull,
        MarketRegime::Neutral,
        MarketRegime::Bear,
        MarketRegime::Stress,
    ];

    /// Lower-case label.
    pub fn name(self) -> &'static str {
        match self {
            MarketRegime::Growth => "growth",
            MarketRegime::Bull => "bull",
            MarketRegime::Neutral => "neutral",
            MarketRegime::Bear => "bear",
            MarketRegime::Stress => "stress",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One correlated draw of market conditions.
///
/// # Examples
///
/// ```
/// use dcf_core::types::{MarketParameter, MarketRegime, MarketScenario};
///
/// let values = [0.065, 0.06, 0.05, 0.03, 0.025, 0.03, 0.75, 0.05, 0.0];
/// let scenario = MarketScenario::from_parameters(7, values, MarketRegime::Neutral, 0.5, 0.2);
///
/// assert_eq!(scenario.value(MarketParameter::CapRate), 0.06);
/// let shocked = scenario.with_value(MarketParameter::CapRate, 0.07);
/// assert_eq!(shocked.cap_rate, 0.07);
/// assert_eq!(scenario.cap_rate, 0.06);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketScenario {
    /// Scenario identifier, unique within a run
    pub scenario_id: u64,
    /// Mortgage interest rate
    pub interest_rate: f64,
    /// Entry capitalisation rate
    pub cap_rate: f64,
    /// Vacancy rate
    pub vacancy_rate: f64,
    /// Annual rent growth
    pub rent_growth: f64,
    /// Annual expense growth
    pub expense_growth: f64,
    /// Annual property value growth
    pub property_growth: f64,
    /// Loan-to-value ratio
    pub loan_to_value: f64,
    /// Closing costs as a share of purchase price
    pub closing_cost_pct: f64,
    /// Capital reserve as a share of purchase price
    pub reserve_pct: f64,
    /// Regime label
    pub regime: MarketRegime,
    /// Composite growth score in [0, 1]
    pub growth_score: f64,
    /// Composite risk score in [0, 1]
    pub risk_score: f64,
}

impl MarketScenario {
    /// Build a scenario from values ordered as [`MarketParameter::ALL`].
    pub fn from_parameters(
        scenario_id: u64,
        values: [f64; MarketParameter::COUNT],
        regime: MarketRegime,
        growth_score: f64,
        risk_score: f64,
    ) -> Self {
        Self {
            scenario_id,
            interest_rate: values[0],
            cap_rate: values[1],
            vacancy_rate: values[2],
            rent_growth: values[3],
            expense_growth: values[4],
            property_growth: values[5],
            loan_to_value: values[6],
            closing_cost_pct: values[7],
            reserve_pct: values[8],
            regime,
            growth_score,
            risk_score,
        }
    }

    /// Value of one parameter.
    pub fn value(&self, parameter: MarketParameter) -> f64 {
        match parameter {
            MarketParameter::InterestRate => self.interest_rate,
            MarketParameter::CapRate => self.cap_rate,
            MarketParameter::VacancyRate => self.vacancy_rate,
            MarketParameter::RentGrowth => self.rent_growth,
            MarketParameter::ExpenseGrowth => self.expense_growth,
            MarketParameter::PropertyGrowth => self.property_growth,
            MarketParameter::LoanToValue => self.loan_to_value,
            MarketParameter::ClosingCostPct => self.closing_cost_pct,
            MarketParameter::ReservePct => self.reserve_pct,
        }
    }

    /// Values ordered as [`MarketParameter::ALL`].
    pub fn values(&self) -> [f64; MarketParameter::COUNT] {
        MarketParameter::ALL.map(|p| self.value(p))
    }

    /// Copy of this scenario with one parameter replaced.
    pub fn with_value(&self, parameter: MarketParameter, value: f64) -> Self {
        let mut values = self.values();
        values[parameter.index()] = value;
        Self::from_parameters(
            self.scenario_id,
            values,
            self.regime,
            self.growth_score,
            self.risk_score,
        )
    }

    /// Copy of this scenario under a different identifier.
    pub fn with_id(&self, scenario_id: u64) -> Self {
        Self {
            scenario_id,
            ..self.clone()
        }
    }
}
