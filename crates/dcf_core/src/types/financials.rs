//! Acquisition, financing and per-year cash-flow records.

use serde::{Deserialize, Serialize};

/// Year-0 operating-expense line items.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OperatingExpenseBaseline {
    /// Annual property tax
    pub property_tax: f64,
    /// Annual insurance
    pub insurance: f64,
    /// Annual maintenance
    pub maintenance: f64,
    /// Annual owner-paid utilities
    pub utilities: f64,
    /// Management fee as a share of effective gross income
    pub management_fee_rate: f64,
}

impl OperatingExpenseBaseline {
    /// Sum of the fixed line items (everything except the management fee).
    #[inline]
    pub fn fixed_total(&self) -> f64 {
        self.property_tax + self.insurance + self.maintenance + self.utilities
    }
}

/// Acquisition cost, financing structure and year-0 baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialNumbers {
    /// Purchase price
    pub purchase_price: f64,
    /// Closing costs
    pub closing_costs: f64,
    /// Renovation capex
    pub renovation_capex: f64,
    /// Purchase price plus renovation capex plus closing costs
    pub acquisition_cost: f64,
    /// Capital reserve funded at closing
    pub reserve_amount: f64,
    /// Acquisition cost plus reserve
    pub cost_basis: f64,
    /// After-repair value
    pub after_repair_value: f64,
    /// LTV × after-repair value before any coverage cap
    pub uncapped_loan_amount: f64,
    /// Loan actually drawn
    pub loan_amount: f64,
    /// Whether the minimum debt-service coverage reduced the loan
    pub dscr_capped: bool,
    /// Amortisation term in years
    pub amortization_years: u32,
    /// Level annual debt service while the loan amortises
    pub annual_debt_service: f64,
    /// Interest portion of the first year's debt service
    pub annual_interest_expense: f64,
    /// Cost basis minus loan
    pub total_cash_required: f64,
    /// Investor share of required cash
    pub investor_cash_required: f64,
    /// Operator share of required cash
    pub operator_cash_required: f64,
    /// Year-0 annual residential rent
    pub baseline_residential_rent: f64,
    /// Year-0 annual commercial rent
    pub baseline_commercial_rent: f64,
    /// Year-0 operating-expense line items
    pub baseline_expenses: OperatingExpenseBaseline,
    /// Share of year-1 residential rent lost to renovation downtime
    pub renovation_downtime_fraction: f64,
}

impl InitialNumbers {
    /// Year-0 gross potential rent.
    #[inline]
    pub fn baseline_gross_rent(&self) -> f64 {
        self.baseline_residential_rent + self.baseline_commercial_rent
    }

    /// Debt service due in `year` (zero once the loan is repaid).
    #[inline]
    pub fn debt_service_in_year(&self, year: u32) -> f64 {
        if year <= self.amortization_years {
            self.annual_debt_service
        } else {
            0.0
        }
    }

    /// Loan drawn as a share of after-repair value.
    pub fn effective_ltv(&self) -> f64 {
        if self.after_repair_value > 0.0 {
            self.loan_amount / self.after_repair_value
        } else {
            0.0
        }
    }
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    /// Year index, starting at 1
    pub year: u32,
    /// Gross potential rent before any loss
    pub gross_potential_rent: f64,
    /// Rent lost to renovation downtime
    pub renovation_loss: f64,
    /// Potential rent minus renovation loss
    pub gross_income: f64,
    /// Vacancy loss on gross income
    pub vacancy_loss: f64,
    /// Effective gross income
    pub effective_gross_income: f64,
    /// Fixed expenses plus management fee
    pub operating_expenses: f64,
    /// Management fee component of operating expenses
    pub management_fee: f64,
    /// Net operating income
    pub noi: f64,
    /// Debt service
    pub debt_service: f64,
    /// NOI minus debt service
    pub net_cash_flow: f64,
    /// Running sum of net cash flow
    pub cumulative_cash_flow: f64,
    /// NOI / debt service; `None` for unlevered years
    pub dscr: Option<f64>,
    /// Projected property value at year end
    pub property_value: f64,
    /// Distribution to the investor
    pub investor_distribution: f64,
    /// Distribution to the operator
    pub operator_distribution: f64,
}

impl CashFlowYear {
    /// Total distributed this year.
    #[inline]
    pub fn total_distribution(&self) -> f64 {
        self.investor_distribution + self.operator_distribution
    }
}
