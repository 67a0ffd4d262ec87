//! # dcf_scenarios: Correlated Market Scenario Generation
//!
//! ## Role
//!
//! dcf_scenarios produces the market conditions every analysis runs under:
//! - Marginal statistics per parameter, optionally seeded from a forecast (`statistics`, `forecast`)
//! - Driver → dependent correlation rules validated into a draw plan (`correlation`)
//! - Reproducible per-scenario random streams (`rng`)
//! - Growth / risk scores and regime labels (`regime`)
//! - The generator tying them together (`generator`)
//!
//! ## Usage Example
//!
//! ```rust
//! use dcf_scenarios::generator::{GeneratorConfig, ScenarioGenerator};
//!
//! let generator = ScenarioGenerator::standard(GeneratorConfig::with_seed(2024)).unwrap();
//! let scenarios: Vec<_> = generator
//!     .generate(500)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! assert_eq!(scenarios.len(), 500);
//! ```

#![deny(missing_docs)]

pub mod correlation;
pub mod forecast;
pub mod generator;
pub mod regime;
pub mod rng;
pub mod statistics;

pub use correlation::{CorrelationConfig, CorrelationPlan, CorrelationRule};
pub use forecast::{ForecastProvider, ParameterForecast, StaticForecastProvider};
pub use generator::{GeneratorConfig, ScenarioGenerator};
pub use regime::RegimeThresholds;
pub use statistics::{MarketStatistics, ParameterStatistics};
