//! Resolved, property-specific DCF assumptions.

use super::error::DcfError;
use super::scenario::MarketRegime;
use serde::{Deserialize, Serialize};

/// Rates the downstream stages consume for one property under one scenario.
///
/// Produced by the assumptions mapper; [`validate`](Self::validate) is the
/// gate every instance passes before it reaches the financing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Scenario the assumptions were derived from
    pub scenario_id: u64,
    /// Regime of the source scenario
    pub regime: MarketRegime,
    /// Risk score of the source scenario
    pub risk_score: f64,
    /// Mortgage interest rate
    pub interest_rate: f64,
    /// Entry capitalisation rate, adjusted for property type and location
    pub cap_rate: f64,
    /// Capitalisation rate applied at sale
    pub exit_cap_rate: f64,
    /// Vacancy rate, adjusted for property type and location
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
}

impl DcfAssumptions {
    /// Check the invariants the financing and projection stages rely on.
    ///
    /// # Errors
    ///
    /// Returns `DcfError::InvalidAssumptions` naming the first offending field.
    pub fn validate(&self) -> Result<(), DcfError> {
        let fields = [
            ("interest_rate", self.interest_rate),
            ("cap_rate", self.cap_rate),
            ("exit_cap_rate", self.exit_cap_rate),
            ("vacancy_rate", self.vacancy_rate),
            ("rent_growth", self.rent_growth),
            ("expense_growth", self.expense_growth),
            ("property_growth", self.property_growth),
            ("loan_to_value", self.loan_to_value),
            ("closing_cost_pct", self.closing_cost_pct),
            ("reserve_pct", self.reserve_pct),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DcfError::invalid_assumption(field, value, "must be finite"));
            }
        }

        if self.cap_rate <= 0.0 {
            return Err(DcfError::invalid_assumption(
                "cap_rate",
                self.cap_rate,
                "must be strictly positive",
            ));
        }
        if self.exit_cap_rate <= 0.0 {
            return Err(DcfError::invalid_assumption(
                "exit_cap_rate",
                self.exit_cap_rate,
                "must be strictly positive",
            ));
        }
        if self.loan_to_value <= 0.0 || self.loan_to_value > 1.0 {
            return Err(DcfError::invalid_assumption(
                "loan_to_value",
                self.loan_to_value,
                "must lie in (0, 1]",
            ));
        }
        if !(0.0..1.0).contains(&self.vacancy_rate) {
            return Err(DcfError::invalid_assumption(
                "vacancy_rate",
                self.vacancy_rate,
                "must lie in [0, 1)",
            ));
        }
        if self.interest_rate < 0.0 {
            return Err(DcfError::invalid_assumption(
                "interest_rate",
                self.interest_rate,
                "must be non-negative",
            ));
        }
        for (field, value) in [
            ("closing_cost_pct", self.closing_cost_pct),
            ("reserve_pct", self.reserve_pct),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DcfError::invalid_assumption(field, value, "must lie in [0, 1]"));
            }
        }
        for (field, value) in [
            ("rent_growth", self.rent_growth),
            ("expense_growth", self.expense_growth),
            ("property_growth", self.property_growth),
        ] {
            if value <= -1.0 {
                return Err(DcfError::invalid_assumption(field, value, "must exceed -100%"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DcfAssumptions {
        DcfAssumptions {
            scenario_id: 0,
            regime: MarketRegime::Neutral,
            risk_score: 0.2,
            interest_rate: 0.065,
            cap_rate: 0.06,
            exit_cap_rate: 0.06,
            vacancy_rate: 0.05,
            rent_growth: 0.03,
            expense_growth: 0.025,
            property_growth: 0.03,
            loan_to_value: 0.75,
            closing_cost_pct: 0.05,
            reserve_pct: 0.0,
        }
    }

    fn rejected_field(a: &DcfAssumptions) -> String {
        match a.validate() {
            Err(DcfError::InvalidAssumptions { field, .. }) => field,
            other => panic!("expected InvalidAssumptions, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_assumptions_pass() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_cap_rate_rejected() {
        let a = DcfAssumptions {
            cap_rate: 0.0,
            ..valid()
        };
        assert_eq!(rejected_field(&a), "cap_rate");
    }

    #[test]
    fn test_non_finite_rejected_first() {
        let a = DcfAssumptions {
            rent_growth: f64::NAN,
            cap_rate: -1.0,
            ..valid()
        };
        assert_eq!(rejected_field(&a), "rent_growth");
    }

    #[test]
    fn test_ltv_bounds() {
        let zero = DcfAssumptions {
            loan_to_value: 0.0,
            ..valid()
        };
        assert_eq!(rejected_field(&zero), "loan_to_value");
        let full = DcfAssumptions {
            loan_to_value: 1.0,
            ..valid()
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_full_vacancy_rejected() {
        let a = DcfAssumptions {
            vacancy_rate: 1.0,
            ..valid()
        };
        assert_eq!(rejected_field(&a), "vacancy_rate");
    }
}
