//! # dcf_core: Shared Foundation for the DCF Simulation Engine
//!
//! ## Foundation Role
//!
//! dcf_core is the bottom layer of the workspace, providing:
//! - Immutable pipeline records: `PropertyDescription`, `MarketScenario`,
//!   `DcfAssumptions`, `InitialNumbers`, `CashFlowYear`, `FinancialMetrics` (`types`)
//! - Closed enums for regimes, recommendations and risk levels (`types`)
//! - The error taxonomy: `DcfError`, `SolverError` (`types::error`)
//! - Bracketing root finder used for IRR (`math::solvers`)
//! - Loan, discounting and distribution-statistics helpers (`math`)
//!
//! ## Dependency Principle
//!
//! This crate depends on no other `dcf_*` crate and keeps external
//! dependencies minimal:
//! - num-traits: generic floating point for the solvers
//! - thiserror: error derivation
//! - serde: every record crosses the persistence / presentation boundary
//!
//! ## Usage Example
//!
//! ```rust
//! use dcf_core::math::finance::{annuity_payment, remaining_balance};
//! use dcf_core::types::PropertyDescription;
//!
//! let property = PropertyDescription::new(3_500_000.0, "DEFAULT")
//!     .with_residential(24, 1_250.0)
//!     .with_commercial(3, 2_500.0);
//! assert!(property.validate().is_ok());
//! assert_eq!(property.total_units(), 27);
//!
//! let payment = annuity_payment(1_000_000.0, 0.06, 30);
//! let balance = remaining_balance(1_000_000.0, 0.06, 30, 30);
//! assert!(payment > 60_000.0);
//! assert!(balance.abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;

pub use types::error::{DcfError, SolverError};
