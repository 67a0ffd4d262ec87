//! Error types for structured error handling.
//!
//! This module provides:
//! - `DcfError`: the analysis error taxonomy shared by every pipeline stage
//! - `SolverError`: failures of the bracketing root finder
//!
//! `DcfError` separates request-fatal problems (bad configuration, an
//! unavailable forecast) from failures that only end the current scenario.
//! Batch runners use [`DcfError::is_request_fatal`] to decide between
//! aborting the run and recording the failure in a tally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categorised analysis errors.
///
/// # Variants
/// - `Configuration`: correlation rules or statistics are missing or invalid
/// - `Forecast`: the forecasting collaborator could not supply a parameter
/// - `ScenarioGeneration`: a parameter kept landing outside its bounds
/// - `InvalidAssumptions`: a resolved DCF assumption violates a domain rule
/// - `InvalidProperty`: the property description violates a domain rule
///
/// # Examples
/// ```
/// use dcf_core::DcfError;
///
/// let err = DcfError::invalid_assumption("cap_rate", -0.01, "must be strictly positive");
/// assert_eq!(
///     err.to_string(),
///     "Invalid assumption cap_rate = -0.01: must be strictly positive"
/// );
/// assert!(!err.is_request_fatal());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DcfError {
    /// Invalid or incomplete configuration (fatal for the whole request).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The forecasting collaborator failed to provide data.
    #[error("Forecast unavailable: {0}")]
    Forecast(String),

    /// Repeated resampling could not bring a parameter inside its range.
    #[error(
        "Scenario {scenario_id}: {parameter} stayed outside its range after {attempts} resamples"
    )]
    ScenarioGeneration {
        /// Scenario that was abandoned
        scenario_id: u64,
        /// Name of the offending market parameter
        parameter: String,
        /// Number of resample attempts made
        attempts: u32,
    },

    /// A resolved assumption violates a domain rule.
    #[error("Invalid assumption {field} = {value}: {reason}")]
    InvalidAssumptions {
        /// Offending field
        field: String,
        /// Offending value
        value: f64,
        /// Rule that was violated
        reason: String,
    },

    /// The property description violates a domain rule.
    #[error("Invalid property {field} = {value}: {reason}")]
    InvalidProperty {
        /// Offending field
        field: String,
        /// Offending value
        value: f64,
        /// Rule that was violated
        reason: String,
    },
}

impl DcfError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid-assumption error.
    pub fn invalid_assumption(
        field: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAssumptions {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an invalid-property error.
    pub fn invalid_property(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Whether this error must abort an entire request rather than one scenario.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Forecast(_))
    }
}

/// Root-finding solver errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: the iteration budget ran out
/// - `NoBracket`: no sign change was found for the function
/// - `NumericalInstability`: the function produced a non-finite value
///
/// # Examples
/// ```
/// use dcf_core::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(err.to_string().contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Non-finite function value during the search.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fatal_classification() {
        assert!(DcfError::configuration("missing stats").is_request_fatal());
        assert!(DcfError::Forecast("timeout".to_string()).is_request_fatal());
        assert!(!DcfError::invalid_property("purchase_price", 0.0, "must be positive")
            .is_request_fatal());
        assert!(!DcfError::ScenarioGeneration {
            scenario_id: 3,
            parameter: "vacancy_rate".to_string(),
            attempts: 8,
        }
        .is_request_fatal());
    }

    #[test]
    fn test_scenario_generation_display() {
        let err = DcfError::ScenarioGeneration {
            scenario_id: 42,
            parameter: "vacancy_rate".to_string(),
            attempts: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("Scenario 42"));
        assert!(msg.contains("vacancy_rate"));
        assert!(msg.contains("8 resamples"));
    }

    #[test]
    fn test_error_serialises_with_kind_tag() {
        let err = DcfError::invalid_property("residential_units", 0.0, "no units");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"invalid_property\""));
        let back: DcfError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_solver_error_display() {
        let err = SolverError::NoBracket { a: -0.99, b: 10.0 };
        assert!(err.to_string().contains("same sign"));
    }
}
