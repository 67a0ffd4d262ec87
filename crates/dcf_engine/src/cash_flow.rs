//! Year-by-year cash-flow projection.
//!
//! Rents and fixed expenses grow recursively from the year-0 baseline.
//! Renovation downtime only affects year 1, vacancy is charged on gross
//! income and the management fee is a share of effective gross income.
//! Negative years are recorded as they are; nothing is clamped.

use crate::policy::MAX_HORIZON_YEARS;
use dcf_core::types::{CashFlowYear, DcfAssumptions, EquityStructure, InitialNumbers};
use dcf_core::DcfError;

/// Operating line items of one year, before financing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingYear {
    /// Gross potential rent
    pub gross_potential_rent: f64,
    /// Renovation loss
    pub renovation_loss: f64,
    /// Gross income
    pub gross_income: f64,
    /// Vacancy loss
    pub vacancy_loss: f64,
    /// Effective gross income
    pub effective_gross_income: f64,
    /// Management fee
    pub management_fee: f64,
    /// Fixed expenses plus management fee
    pub operating_expenses: f64,
    /// Net operating income
    pub noi: f64,
}

/// Rents and fixed expenses carried from one year to the next.
#[derive(Debug, Clone, Copy)]
struct Baseline {
    residential_rent: f64,
    commercial_rent: f64,
    fixed_expenses: f64,
}

impl Baseline {
    fn grow(self, a: &DcfAssumptions) -> Self {
        Self {
            residential_rent: self.residential_rent * (1.0 + a.rent_growth),
            commercial_rent: self.commercial_rent * (1.0 + a.rent_growth),
            fixed_expenses: self.fixed_expenses * (1.0 + a.expense_growth),
        }
    }
}

fn operating(
    a: &DcfAssumptions,
    current: Baseline,
    management_fee_rate: f64,
    downtime_fraction: f64,
    year: u32,
) -> OperatingYear {
    let gross_potential_rent = current.residential_rent + current.commercial_rent;
    let renovation_loss = if year == 1 {
        current.residential_rent * downtime_fraction
    } else {
        0.0
    };
    let gross_income = gross_potential_rent - renovation_loss;
    let vacancy_loss = gross_income * a.vacancy_rate;
    let effective_gross_income = gross_income - vacancy_loss;
    let management_fee = management_fee_rate * effective_gross_income;
    let operating_expenses = current.fixed_expenses + management_fee;
    OperatingYear {
        gross_potential_rent,
        renovation_loss,
        gross_income,
        vacancy_loss,
        effective_gross_income,
        management_fee,
        operating_expenses,
        noi: effective_gross_income - operating_expenses,
    }
}

/// Year-1 operating figures from baseline inputs, used to size the loan.
pub fn first_year_operations(
    a: &DcfAssumptions,
    residential_rent: f64,
    commercial_rent: f64,
    fixed_expenses: f64,
    management_fee_rate: f64,
    downtime_fraction: f64,
) -> OperatingYear {
    let year0 = Baseline {
        residential_rent,
        commercial_rent,
        fixed_expenses,
    };
    operating(a, year0.grow(a), management_fee_rate, downtime_fraction, 1)
}

/// Split a year's net cash flow between investor and operator.
///
/// The operator's preferred return on its own capital comes first, capped
/// at the cash available; the remainder is split by equity share. Returns
/// `(investor, operator)`; a non-positive year distributes nothing.
pub fn distribute(
    net_cash_flow: f64,
    operator_capital: f64,
    equity: &EquityStructure,
) -> (f64, f64) {
    if net_cash_flow <= 0.0 {
        return (0.0, 0.0);
    }
    let preferred = (operator_capital * equity.preferred_return).clamp(0.0, net_cash_flow);
    let remainder = net_cash_flow - preferred;
    let investor = remainder * equity.investor_equity_share;
    (investor, preferred + remainder - investor)
}

/// Project `horizon_years` of cash flows.
///
/// # Errors
///
/// `DcfError::Configuration` when the horizon is outside `1..=30`.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{MarketRegime, MarketScenario, PropertyDescription};
/// use dcf_engine::assumptions::map_assumptions;
/// use dcf_engine::cash_flow::project_cash_flows;
/// use dcf_engine::initial::compute_initial_numbers;
/// use dcf_engine::policy::{FinancingPolicy, MappingPolicy};
///
/// let property = PropertyDescription::new(1_000_000.0, "DEFAULT").with_residential(8, 1_600.0);
/// let scenario = MarketScenario::from_parameters(
///     0,
///     [0.06, 0.065, 0.05, 0.03, 0.025, 0.03, 0.70, 0.03, 0.01],
///     MarketRegime::Neutral,
///     0.5,
///     0.4,
/// );
/// let a = map_assumptions(&property, &scenario, &MappingPolicy::default()).unwrap();
/// let initial = compute_initial_numbers(&property, &a, &FinancingPolicy::default()).unwrap();
/// let years = project_cash_flows(&a, &initial, 5, &property.equity).unwrap();
///
/// assert_eq!(years.len(), 5);
/// assert!(years[4].gross_potential_rent > years[0].gross_potential_rent);
/// ```
pub fn project_cash_flows(
    assumptions: &DcfAssumptions,
    initial: &InitialNumbers,
    horizon_years: u32,
    equity: &EquityStructure,
) -> Result<Vec<CashFlowYear>, DcfError> {
    if horizon_years == 0 || horizon_years > MAX_HORIZON_YEARS {
        return Err(DcfError::configuration(format!(
            "horizon_years must be in 1..={} (got {})",
            MAX_HORIZON_YEARS, horizon_years
        )));
    }

    let mut current = Baseline {
        residential_rent: initial.baseline_residential_rent,
        commercial_rent: initial.baseline_commercial_rent,
        fixed_expenses: initial.baseline_expenses.fixed_total(),
    };
    let mut property_value = initial.after_repair_value;
    let mut cumulative = 0.0;
    let mut years = Vec::with_capacity(horizon_years as usize);

    for year in 1..=horizon_years {
        current = current.grow(assumptions);
        property_value *= 1.0 + assumptions.property_growth;

        let ops = operating(
            assumptions,
            current,
            initial.baseline_expenses.management_fee_rate,
            initial.renovation_downtime_fraction,
            year,
        );
        let debt_service = initial.debt_service_in_year(year);
        let net_cash_flow = ops.noi - debt_service;
        cumulative += net_cash_flow;
        let (investor, operator) = distribute(net_cash_flow, initial.operator_cash_required, equity);

        years.push(CashFlowYear {
            year,
            gross_potential_rent: ops.gross_potential_rent,
            renovation_loss: ops.renovation_loss,
            gross_income: ops.gross_income,
            vacancy_loss: ops.vacancy_loss,
            effective_gross_income: ops.effective_gross_income,
            operating_expenses: ops.operating_expenses,
            management_fee: ops.management_fee,
            noi: ops.noi,
            debt_service,
            net_cash_flow,
            cumulative_cash_flow: cumulative,
            dscr: (debt_service > 0.0).then(|| ops.noi / debt_service),
            property_value,
            investor_distribution: investor,
            operator_distribution: operator,
        });
    }

    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initial::compute_initial_numbers;
    use crate::policy::FinancingPolicy;
    use approx::assert_relative_eq;
    use dcf_core::types::{MarketRegime, PropertyDescription};

    fn assumptions() -> DcfAssumptions {
        DcfAssumptions {
            scenario_id: 0,
            regime: MarketRegime::Neutral,
            risk_score: 0.3,
            interest_rate: 0.06,
            cap_rate: 0.065,
            exit_cap_rate: 0.065,
            vacancy_rate: 0.05,
            rent_growth: 0.03,
            expense_growth: 0.02,
            property_growth: 0.03,
            loan_to_value: 0.70,
            closing_cost_pct: 0.03,
            reserve_pct: 0.01,
        }
    }

    fn property() -> PropertyDescription {
        PropertyDescription::new(1_000_000.0, "DEFAULT")
            .with_residential(8, 1_600.0)
            .with_renovation(80_000.0, 6.0)
    }

    fn projection(horizon: u32) -> (InitialNumbers, Vec<CashFlowYear>) {
        let p = property();
        let a = assumptions();
        let initial = compute_initial_numbers(&p, &a, &FinancingPolicy::default()).unwrap();
        let years = project_cash_flows(&a, &initial, horizon, &p.equity).unwrap();
        (initial, years)
    }

    #[test]
    fn test_rent_grows_from_baseline() {
        let (initial, years) = projection(5);
        let mut expected = initial.baseline_gross_rent();
        for y in &years {
            expected *= 1.03;
            assert_relative_eq!(y.gross_potential_rent, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_renovation_loss_only_in_first_year() {
        let (initial, years) = projection(3);
        assert_relative_eq!(initial.renovation_downtime_fraction, 0.5);
        assert_relative_eq!(
            years[0].renovation_loss,
            years[0].gross_potential_rent * 0.5,
            max_relative = 1e-12
        );
        assert_eq!(years[1].renovation_loss, 0.0);
        assert_eq!(years[2].renovation_loss, 0.0);
    }

    #[test]
    fn test_line_items_reconcile() {
        let (_, years) = projection(5);
        for y in &years {
            assert_relative_eq!(
                y.gross_income,
                y.gross_potential_rent - y.renovation_loss,
                max_relative = 1e-12
            );
            assert_relative_eq!(y.vacancy_loss, y.gross_income * 0.05, max_relative = 1e-12);
            assert_relative_eq!(
                y.noi,
                y.effective_gross_income - y.operating_expenses,
                max_relative = 1e-12
            );
            assert_relative_eq!(y.net_cash_flow, y.noi - y.debt_service, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cumulative_recurrence() {
        let (_, years) = projection(10);
        let mut running = 0.0;
        for y in &years {
            running += y.net_cash_flow;
            assert_relative_eq!(y.cumulative_cash_flow, running, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_property_value_compounds() {
        let (initial, years) = projection(5);
        assert_relative_eq!(
            years[4].property_value,
            initial.after_repair_value * 1.03f64.powi(5),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_distribution_waterfall() {
        let equity = EquityStructure {
            investor_equity_share: 0.8,
            self_cash_pct: 0.1,
            preferred_return: 0.08,
        };
        // pref due 8_000 on 100_000 operator capital
        let (investor, operator) = distribute(50_000.0, 100_000.0, &equity);
        assert_relative_eq!(operator, 8_000.0 + 0.2 * 42_000.0, max_relative = 1e-12);
        assert_relative_eq!(investor, 0.8 * 42_000.0, max_relative = 1e-12);

        let (investor, operator) = distribute(5_000.0, 100_000.0, &equity);
        assert_eq!(investor, 0.0);
        assert_eq!(operator, 5_000.0);

        assert_eq!(distribute(-1_000.0, 100_000.0, &equity), (0.0, 0.0));
        assert_eq!(distribute(0.0, 100_000.0, &equity), (0.0, 0.0));
    }

    #[test]
    fn test_negative_noi_flows_through() {
        let a = DcfAssumptions {
            vacancy_rate: 0.95,
            ..assumptions()
        };
        let p = property();
        let initial = compute_initial_numbers(&p, &a, &FinancingPolicy::default()).unwrap();
        let years = project_cash_flows(&a, &initial, 3, &p.equity).unwrap();
        for y in &years {
            assert!(y.noi < 0.0);
            assert!(y.net_cash_flow < 0.0);
            assert_eq!(y.total_distribution(), 0.0);
        }
    }

    #[test]
    fn test_horizon_bounds() {
        let p = property();
        let a = assumptions();
        let initial = compute_initial_numbers(&p, &a, &FinancingPolicy::default()).unwrap();
        assert!(project_cash_flows(&a, &initial, 0, &p.equity).is_err());
        assert!(project_cash_flows(&a, &initial, 31, &p.equity).is_err());
        assert_eq!(project_cash_flows(&a, &initial, 30, &p.equity).unwrap().len(), 30);
    }

    #[test]
    fn test_debt_service_stops_after_amortisation() {
        let p = property();
        let a = assumptions();
        let financing = FinancingPolicy {
            amortization_years: 3,
            min_dscr: 0.0,
        };
        let initial = compute_initial_numbers(&p, &a, &financing).unwrap();
        let years = project_cash_flows(&a, &initial, 5, &p.equity).unwrap();
        assert!(years[2].debt_service > 0.0);
        assert_eq!(years[3].debt_service, 0.0);
        assert_eq!(years[3].dscr, None);
    }
}
