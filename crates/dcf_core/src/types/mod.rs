//! Pipeline records and error types.
//!
//! This module provides:
//! - `property`: the immutable property description supplied per request
//! - `scenario`: market parameters, regimes and the scenario record
//! - `assumptions`: resolved, property-specific DCF assumptions
//! - `financials`: initial numbers and per-year cash-flow records
//! - `metrics`: financial metrics, recommendation and risk enums
//! - `error`: the `DcfError` and `SolverError` taxonomies
//!
//! # Re-exports
//!
//! Every record is re-exported at this module level.

pub mod assumptions;
pub mod error;
pub mod financials;
pub mod metrics;
pub mod property;
pub mod scenario;

pub use assumptions::DcfAssumptions;
pub use error::{DcfError, SolverError};
pub use financials::{CashFlowYear, InitialNumbers, OperatingExpenseBaseline};
pub use metrics::{FinancialMetrics, IrrFailure, IrrOutcome, Recommendation, RiskLevel};
pub use property::{
    EquityStructure, OperatingExpenseInputs, PropertyDescription, PropertyType, RenovationPlan,
    UnitMix,
};
pub use scenario::{MarketParameter, MarketRegime, MarketScenario};
