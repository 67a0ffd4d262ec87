//! Scenario → property-specific assumptions.

use crate::policy::MappingPolicy;
use dcf_core::types::{DcfAssumptions, MarketScenario, PropertyDescription};
use dcf_core::DcfError;

/// Resolve the assumptions for `property` under `scenario`.
///
/// Commercial space carries cap-rate and vacancy premiums, blended by the
/// commercial share of baseline rent; location spreads apply on top and the
/// exit cap rate is the entry cap rate plus `exit_cap_spread`.
///
/// # Errors
///
/// - `DcfError::InvalidProperty` when the property fails validation
/// - `DcfError::InvalidAssumptions` when a resolved rate breaks an invariant
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{MarketRegime, MarketScenario, PropertyDescription};
/// use dcf_engine::assumptions::map_assumptions;
/// use dcf_engine::policy::MappingPolicy;
///
/// let property = PropertyDescription::new(1_000_000.0, "DEFAULT").with_commercial(2, 5_000.0);
/// let scenario = MarketScenario::from_parameters(
///     1,
///     [0.065, 0.06, 0.05, 0.03, 0.025, 0.03, 0.75, 0.05, 0.02],
///     MarketRegime::Neutral,
///     0.5,
///     0.3,
/// );
/// let a = map_assumptions(&property, &scenario, &MappingPolicy::default()).unwrap();
/// assert!((a.cap_rate - 0.0675).abs() < 1e-12);
/// assert!((a.vacancy_rate - 0.07).abs() < 1e-12);
/// ```
pub fn map_assumptions(
    property: &PropertyDescription,
    scenario: &MarketScenario,
    policy: &MappingPolicy,
) -> Result<DcfAssumptions, DcfError> {
    property.validate()?;

    let commercial_share = property.commercial_rent_share();
    let location = policy.location(&property.location_code);

    let cap_rate = scenario.cap_rate
        + commercial_share * policy.commercial_cap_premium
        + location.cap_rate_spread;
    let vacancy_rate = scenario.vacancy_rate
        + commercial_share * policy.commercial_vacancy_premium
        + location.vacancy_spread;

    let assumptions = DcfAssumptions {
        scenario_id: scenario.scenario_id,
        regime: scenario.regime,
        risk_score: scenario.risk_score,
        interest_rate: scenario.interest_rate,
        cap_rate,
        exit_cap_rate: cap_rate + policy.exit_cap_spread,
        vacancy_rate,
        rent_growth: scenario.rent_growth + location.rent_growth_spread,
        expense_growth: scenario.expense_growth,
        property_growth: scenario.property_growth,
        loan_to_value: scenario.loan_to_value,
        closing_cost_pct: scenario.closing_cost_pct,
        reserve_pct: scenario.reserve_pct,
    };
    assumptions.validate()?;
    Ok(assumptions)
}
