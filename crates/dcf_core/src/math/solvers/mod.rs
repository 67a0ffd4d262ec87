//! Root-finding solvers.
//!
//! ## Available Solvers
//!
//! - [`BrentSolver`]: bracketing method without derivative requirement,
//!   with a grid scan to locate a bracket inside a search range
//!
//! ## Configuration
//!
//! [`SolverConfig`] controls:
//! - `tolerance`: convergence tolerance (default: 1e-10)
//! - `max_iterations`: iteration budget (default: 100)
//!
//! ## Examples
//!
//! ```
//! use dcf_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! // Rate at which -100 today and 121 in two years break even
//! let solver = BrentSolver::new(SolverConfig::default());
//! let f = |r: f64| -100.0 + 121.0 / ((1.0 + r) * (1.0 + r));
//!
//! let root = solver.solve_in_range(f, -0.99, 10.0, 200).unwrap();
//! assert!((root.value - 0.10).abs() < 1e-9);
//! ```

mod brent;
mod config;

pub use brent::{BrentSolver, Root};
pub use config::SolverConfig;
