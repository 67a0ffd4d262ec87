//! Investment metrics, risk label and recommendation for one projection.

use crate::irr::solve_irr;
use crate::policy::{ExitValuation, MetricsPolicy, RecommendationPolicy};
use dcf_core::math::finance::{npv, remaining_balance};
use dcf_core::types::{CashFlowYear, DcfAssumptions, FinancialMetrics, InitialNumbers};
use dcf_core::DcfError;

/// Net proceeds from selling at the end of the horizon.
///
/// Gross sale value less the outstanding loan and sale costs, plus the
/// reserve released at closing. A negative exit NOI values the building
/// at zero under direct capitalisation.
pub fn terminal_value(
    exit_year: &CashFlowYear,
    assumptions: &DcfAssumptions,
    initial: &InitialNumbers,
    policy: &MetricsPolicy,
) -> f64 {
    let gross_sale = match policy.exit_valuation {
        ExitValuation::DirectCapitalisation => exit_year.noi.max(0.0) / assumptions.exit_cap_rate,
        ExitValuation::Appreciation => exit_year.property_value.max(0.0),
    };
    let outstanding = remaining_balance(
        initial.loan_amount,
        assumptions.interest_rate,
        initial.amortization_years,
        exit_year.year,
    );
    gross_sale - outstanding - gross_sale * policy.sale_cost_pct + initial.reserve_amount
}

/// Equity cash flows: the investment at `t = 0`, annual net cash flow, and
/// the terminal value added to the final year.
pub fn equity_flows(cash_flows: &[CashFlowYear], cash_invested: f64, terminal: f64) -> Vec<f64> {
    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-cash_invested);
    flows.extend(cash_flows.iter().map(|y| y.net_cash_flow));
    if let Some(last) = flows.last_mut().filter(|_| !cash_flows.is_empty()) {
        *last += terminal;
    }
    flows
}

/// Compute the metrics for a projection.
///
/// # Errors
///
/// `DcfError::Configuration` for an empty projection or a non-finite
/// discount rate.
pub fn calculate_metrics(
    cash_flows: &[CashFlowYear],
    assumptions: &DcfAssumptions,
    initial: &InitialNumbers,
    discount_rate: f64,
    policy: &MetricsPolicy,
    recommendation: &RecommendationPolicy,
) -> Result<FinancialMetrics, DcfError> {
    let exit_year = cash_flows
        .last()
        .ok_or_else(|| DcfError::configuration("cannot compute metrics for an empty projection"))?;
    if !discount_rate.is_finite() || discount_rate <= -1.0 {
        return Err(DcfError::configuration(format!(
            "discount_rate must exceed -1 (got {})",
            discount_rate
        )));
    }

    let cash = initial.total_cash_required;
    let terminal = terminal_value(exit_year, assumptions, initial, policy);
    let flows = equity_flows(cash_flows, cash, terminal);
    let npv = npv(discount_rate, &flows);
    let irr = solve_irr(&flows, policy);

    let horizon = cash_flows.len() as f64;
    let total_net: f64 = cash_flows.iter().map(|y| y.net_cash_flow).sum();
    let total_distributions: f64 = cash_flows.iter().map(CashFlowYear::total_distribution).sum();

    let payback_year = cash_flows
        .iter()
        .find(|y| {
            let recovered = if y.year == exit_year.year {
                y.cumulative_cash_flow + terminal
            } else {
                y.cumulative_cash_flow
            };
            recovered - cash >= 0.0
        })
        .map(|y| y.year);

    let min_dscr = cash_flows
        .iter()
        .filter_map(|y| y.dscr)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))));

    let risk_level = recommendation.risk_level(assumptions.risk_score);
    let npv_ratio = npv / cash;

    Ok(FinancialMetrics {
        scenario_id: assumptions.scenario_id,
        npv,
        irr,
        terminal_value: terminal,
        equity_multiple: ((total_distributions + terminal.max(0.0)) / cash).max(0.0),
        total_return: (total_net + terminal) / cash - 1.0,
        payback_year,
        average_cash_on_cash: total_net / horizon / cash,
        min_dscr,
        total_distributions,
        cash_invested: cash,
        recommendation: recommendation.recommend(npv_ratio, &irr, risk_level),
        risk_level,
    })
}
