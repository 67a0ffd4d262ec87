//! Internal rate of return.

use crate::policy::MetricsPolicy;
use dcf_core::math::finance::npv;
use dcf_core::math::solvers::{BrentSolver, SolverConfig};
use dcf_core::types::{IrrFailure, IrrOutcome};
use dcf_core::SolverError;

/// Solve for the rate at which the NPV of `flows` is zero.
///
/// `flows[0]` is the (negative) initial investment. The solver works on NPV
/// divided by `|flows[0]|` so the tolerance is relative to the cheque size.
/// The search range is scanned for a sign change first; the first bracket
/// found is refined with Brent's method.
///
/// Never fails: flows without a sign change, or a search that exhausts its
/// budget, produce [`IrrOutcome::Undefined`].
///
/// # Examples
///
/// ```rust
/// use dcf_engine::irr::solve_irr;
/// use dcf_engine::policy::MetricsPolicy;
///
/// let irr = solve_irr(&[-100.0, 10.0, 110.0], &MetricsPolicy::default());
/// assert!((irr.rate().unwrap() - 0.10).abs() < 1e-8);
/// ```
pub fn solve_irr(flows: &[f64], policy: &MetricsPolicy) -> IrrOutcome {
    let has_positive = flows.iter().any(|&f| f > 0.0);
    let has_negative = flows.iter().any(|&f| f < 0.0);
    if !(has_positive && has_negative) {
        return IrrOutcome::Undefined(IrrFailure::NoSignChange);
    }

    let scale = flows.first().map_or(1.0, |f| f.abs());
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let objective = |rate: f64| npv(rate, flows) / scale;

    let solver = BrentSolver::new(SolverConfig {
        tolerance: policy.irr_tolerance,
        max_iterations: policy.irr_max_iterations,
    });
    match solver.solve_in_range(
        objective,
        policy.irr_lower_bound,
        policy.irr_upper_bound,
        policy.irr_scan_steps,
    ) {
        Ok(root) => IrrOutcome::Converged(root.value),
        Err(SolverError::NoBracket { .. }) => IrrOutcome::Undefined(IrrFailure::NoSignChange),
        Err(err) => {
            tracing::debug!(error = %err, "IRR search did not converge");
            IrrOutcome::Undefined(IrrFailure::NonConvergence)
        }
    }
}
