//! Acquisition cost, loan sizing and year-0 baseline.

use crate::cash_flow::first_year_operations;
use crate::policy::FinancingPolicy;
use dcf_core::math::finance::{annuity_payment, principal_for_payment};
use dcf_core::types::{DcfAssumptions, InitialNumbers, OperatingExpenseBaseline, PropertyDescription};
use dcf_core::DcfError;

/// Year-0 operating-expense line items for `property`.
pub fn baseline_expenses(property: &PropertyDescription) -> OperatingExpenseBaseline {
    let units = property.total_units() as f64;
    let inputs = &property.expenses;
    OperatingExpenseBaseline {
        property_tax: property.purchase_price * inputs.property_tax_rate,
        insurance: units * inputs.insurance_per_unit,
        maintenance: units * inputs.maintenance_per_unit,
        utilities: units * inputs.utilities_per_unit,
        management_fee_rate: inputs.management_fee_rate,
    }
}

/// Share of year-1 residential rent lost while units are renovated.
pub fn renovation_downtime_fraction(property: &PropertyDescription) -> f64 {
    let residential = property.residential.units;
    if residential == 0 {
        return 0.0;
    }
    let months = property.renovation.duration_months.clamp(0.0, 12.0);
    (months / 12.0) * f64::from(property.renovated_units()) / f64::from(residential)
}

/// Compute acquisition, financing and baseline figures.
///
/// The loan starts at `LTV × after-repair value` and is reduced when the
/// year-1 NOI would not cover its debt service `min_dscr` times over.
///
/// # Errors
///
/// - `DcfError::InvalidProperty` for an invalid property or a non-positive
///   after-repair value
/// - `DcfError::InvalidAssumptions` when the loan or required cash come out
///   non-positive or non-finite
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{MarketRegime, MarketScenario, PropertyDescription};
/// use dcf_engine::assumptions::map_assumptions;
/// use dcf_engine::initial::compute_initial_numbers;
/// use dcf_engine::policy::{FinancingPolicy, MappingPolicy};
///
/// let property = PropertyDescription::new(1_000_000.0, "DEFAULT")
///     .with_residential(8, 1_600.0)
///     .with_renovation(100_000.0, 0.0);
/// let scenario = MarketScenario::from_parameters(
///     0,
///     [0.06, 0.065, 0.05, 0.03, 0.025, 0.03, 0.70, 0.03, 0.01],
///     MarketRegime::Neutral,
///     0.5,
///     0.4,
/// );
/// let a = map_assumptions(&property, &scenario, &MappingPolicy::default()).unwrap();
/// let initial = compute_initial_numbers(&property, &a, &FinancingPolicy::default()).unwrap();
///
/// assert_eq!(initial.after_repair_value, 1_100_000.0);
/// assert!(initial.loan_amount <= 0.70 * 1_100_000.0 + 1e-6);
/// ```
pub fn compute_initial_numbers(
    property: &PropertyDescription,
    assumptions: &DcfAssumptions,
    financing: &FinancingPolicy,
) -> Result<InitialNumbers, DcfError> {
    property.validate()?;

    let purchase_price = property.purchase_price;
    let renovation_capex = property.renovation.capex;
    let closing_costs = purchase_price * assumptions.closing_cost_pct;
    let acquisition_cost = purchase_price + renovation_capex + closing_costs;
    let reserve_amount = purchase_price * assumptions.reserve_pct;
    let cost_basis = acquisition_cost + reserve_amount;

    let after_repair_value = property
        .appraised_value
        .unwrap_or(purchase_price + renovation_capex);
    if !(after_repair_value > 0.0) {
        return Err(DcfError::invalid_property(
            "after_repair_value",
            after_repair_value,
            "must be strictly positive",
        ));
    }

    let expenses = baseline_expenses(property);
    let downtime = renovation_downtime_fraction(property);
    let baseline_residential_rent = property.baseline_residential_rent();
    let baseline_commercial_rent = property.baseline_commercial_rent();

    let year_one = first_year_operations(
        assumptions,
        baseline_residential_rent,
        baseline_commercial_rent,
        expenses.fixed_total(),
        expenses.management_fee_rate,
        downtime,
    );

    let rate = assumptions.interest_rate;
    let years = financing.amortization_years;
    let uncapped_loan_amount = after_repair_value * assumptions.loan_to_value;
    let mut loan_amount = uncapped_loan_amount;
    let mut dscr_capped = false;
    if financing.min_dscr > 0.0 {
        let max_payment = year_one.noi / financing.min_dscr;
        let max_loan = principal_for_payment(max_payment, rate, years);
        if max_loan < uncapped_loan_amount {
            tracing::warn!(
                scenario_id = assumptions.scenario_id,
                year_one_noi = year_one.noi,
                min_dscr = financing.min_dscr,
                uncapped = uncapped_loan_amount,
                capped = max_loan,
                "loan reduced to meet minimum debt-service coverage"
            );
            loan_amount = max_loan;
            dscr_capped = true;
        }
    }
    if !loan_amount.is_finite() || loan_amount < 0.0 {
        return Err(DcfError::invalid_assumption(
            "loan_amount",
            loan_amount,
            "loan must be finite and non-negative",
        ));
    }

    let total_cash_required = cost_basis - loan_amount;
    if !total_cash_required.is_finite() || total_cash_required <= 0.0 {
        return Err(DcfError::invalid_assumption(
            "total_cash_required",
            total_cash_required,
            "financing covers the whole cost basis; no equity is invested",
        ));
    }
    let operator_cash_required = total_cash_required * property.equity.self_cash_pct;

    Ok(InitialNumbers {
        purchase_price,
        closing_costs,
        renovation_capex,
        acquisition_cost,
        reserve_amount,
        cost_basis,
        after_repair_value,
        uncapped_loan_amount,
        loan_amount,
        dscr_capped,
        amortization_years: years,
        annual_debt_service: annuity_payment(loan_amount, rate, years),
        annual_interest_expense: loan_amount * rate,
        total_cash_required,
        investor_cash_required: total_cash_required - operator_cash_required,
        operator_cash_required,
        baseline_residential_rent,
        baseline_commercial_rent,
        baseline_expenses: expenses,
        renovation_downtime_fraction: downtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dcf_core::types::{MarketRegime, RenovationPlan};

    fn assumptions() -> DcfAssumptions {
        DcfAssumptions {
            scenario_id: 3,
            regime: MarketRegime::Neutral,
            risk_score: 0.2,
            interest_rate: 0.065,
            cap_rate: 0.0615,
            exit_cap_rate: 0.0615,
            vacancy_rate: 0.054,
            rent_growth: 0.03,
            expense_growth: 0.025,
            property_growth: 0.03,
            loan_to_value: 0.75,
            closing_cost_pct: 0.05,
            reserve_pct: 0.0,
        }
    }

    fn mixed_use() -> PropertyDescription {
        PropertyDescription::new(3_500_000.0, "DEFAULT")
            .with_residential(24, 1_250.0)
            .with_commercial(3, 2_500.0)
            .with_renovation(400_000.0, 0.0)
            .with_appraisal(4_080_000.0)
    }

    #[test]
    fn test_acquisition_and_financing() {
        let initial =
            compute_initial_numbers(&mixed_use(), &assumptions(), &FinancingPolicy::default())
                .unwrap();
        assert_relative_eq!(initial.closing_costs, 175_000.0, max_relative = 1e-12);
        assert_relative_eq!(initial.acquisition_cost, 4_075_000.0, max_relative = 1e-12);
        assert_relative_eq!(initial.cost_basis, 4_075_000.0, max_relative = 1e-12);
        assert!(!initial.dscr_capped);
        assert_relative_eq!(initial.loan_amount, 3_060_000.0, max_relative = 1e-12);
        assert_relative_eq!(initial.total_cash_required, 1_015_000.0, max_relative = 1e-12);
        assert_relative_eq!(initial.operator_cash_required, 101_500.0, max_relative = 1e-12);
        assert_relative_eq!(initial.investor_cash_required, 913_500.0, max_relative = 1e-12);
        assert_relative_eq!(initial.annual_interest_expense, 198_900.0, max_relative = 1e-12);
        assert_relative_eq!(initial.effective_ltv(), 0.75, max_relative = 1e-12);
    }

    #[test]
    fn test_baseline_line_items() {
        let initial =
            compute_initial_numbers(&mixed_use(), &assumptions(), &FinancingPolicy::default())
                .unwrap();
        let e = initial.baseline_expenses;
        assert_relative_eq!(e.property_tax, 42_000.0, max_relative = 1e-12);
        assert_relative_eq!(e.insurance, 27.0 * 600.0);
        assert_relative_eq!(e.maintenance, 27.0 * 900.0);
        assert_relative_eq!(e.utilities, 27.0 * 300.0);
        assert_relative_eq!(initial.baseline_gross_rent(), 450_000.0);
        assert_eq!(initial.renovation_downtime_fraction, 0.0);
    }

    #[test]
    fn test_arv_defaults_to_purchase_plus_capex() {
        let property = PropertyDescription::new(1_000_000.0, "DEFAULT")
            .with_residential(10, 2_000.0)
            .with_renovation(150_000.0, 3.0);
        let initial =
            compute_initial_numbers(&property, &assumptions(), &FinancingPolicy::default())
                .unwrap();
        assert_eq!(initial.after_repair_value, 1_150_000.0);
        assert_relative_eq!(initial.renovation_downtime_fraction, 0.25);
    }

    #[test]
    fn test_partial_renovation_downtime() {
        let property = PropertyDescription::new(1_000_000.0, "DEFAULT")
            .with_residential(10, 2_000.0)
            .with_renovation_plan(RenovationPlan {
                capex: 50_000.0,
                duration_months: 18.0,
                units_offline: Some(4),
            });
        assert_relative_eq!(renovation_downtime_fraction(&property), 0.4);
    }

    #[test]
    fn test_dscr_cap_reduces_loan() {
        // rents too thin to carry 75% leverage
        let property = PropertyDescription::new(2_000_000.0, "DEFAULT").with_residential(10, 1_000.0);
        let a = assumptions();
        let initial = compute_initial_numbers(&property, &a, &FinancingPolicy::default()).unwrap();
        assert!(initial.dscr_capped);
        assert!(initial.loan_amount < initial.uncapped_loan_amount);
        let noi = first_year_operations(
            &a,
            initial.baseline_residential_rent,
            initial.baseline_commercial_rent,
            initial.baseline_expenses.fixed_total(),
            initial.baseline_expenses.management_fee_rate,
            0.0,
        )
        .noi;
        assert_relative_eq!(noi / initial.annual_debt_service, 1.2, max_relative = 1e-9);
        assert_relative_eq!(
            initial.total_cash_required,
            initial.cost_basis - initial.loan_amount,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_negative_noi_means_no_loan() {
        let a = DcfAssumptions {
            vacancy_rate: 0.95,
            ..assumptions()
        };
        let initial = compute_initial_numbers(&mixed_use(), &a, &FinancingPolicy::default()).unwrap();
        assert!(initial.dscr_capped);
        assert_eq!(initial.loan_amount, 0.0);
        assert_eq!(initial.annual_debt_service, 0.0);
        assert_relative_eq!(initial.total_cash_required, initial.cost_basis);
    }

    #[test]
    fn test_no_coverage_requirement_keeps_full_loan() {
        let property = PropertyDescription::new(2_000_000.0, "DEFAULT").with_residential(10, 1_000.0);
        let financing = FinancingPolicy {
            min_dscr: 0.0,
            ..FinancingPolicy::default()
        };
        let initial = compute_initial_numbers(&property, &assumptions(), &financing).unwrap();
        assert!(!initial.dscr_capped);
        assert_relative_eq!(initial.loan_amount, 1_500_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_full_financing_rejected() {
        let property = mixed_use().with_appraisal(8_000_000.0);
        let a = DcfAssumptions {
            loan_to_value: 1.0,
            ..assumptions()
        };
        let financing = FinancingPolicy {
            min_dscr: 0.0,
            ..FinancingPolicy::default()
        };
        assert!(matches!(
            compute_initial_numbers(&property, &a, &financing),
            Err(DcfError::InvalidAssumptions { ref field, .. }) if field == "total_cash_required"
        ));
    }
}
