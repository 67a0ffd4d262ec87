//! Forecasting collaborator interface.
//!
//! The time-series model that produces parameter trends lives outside this
//! workspace. The generator only needs a [`ForecastProvider`] to seed its
//! marginal statistics; [`StaticForecastProvider`] is an in-memory
//! implementation for tests and the command line.

use dcf_core::types::MarketParameter;
use dcf_core::DcfError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Forecast path for one parameter with its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterForecast {
    /// Point forecast per year
    pub values: Vec<f64>,
    /// Lower band per year
    pub lower_bounds: Vec<f64>,
    /// Upper band per year
    pub upper_bounds: Vec<f64>,
}

impl ParameterForecast {
    /// Flat forecast repeating `value` for `horizon_years` with a symmetric band.
    pub fn flat(value: f64, band: f64, horizon_years: u32) -> Self {
        let n = horizon_years.max(1) as usize;
        Self {
            values: vec![value; n],
            lower_bounds: vec![value - band; n],
            upper_bounds: vec![value + band; n],
        }
    }

    /// Number of forecast points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the forecast has no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check the forecast is usable.
    ///
    /// # Errors
    ///
    /// `DcfError::Forecast` for an empty path, mismatched lengths, non-finite
    /// points or an inverted band.
    pub fn validate(&self, parameter: MarketParameter) -> Result<(), DcfError> {
        if self.values.is_empty() {
            return Err(DcfError::Forecast(format!("{}: empty forecast", parameter)));
        }
        if self.lower_bounds.len() != self.values.len()
            || self.upper_bounds.len() != self.values.len()
        {
            return Err(DcfError::Forecast(format!(
                "{}: band lengths {}/{} do not match {} values",
                parameter,
                self.lower_bounds.len(),
                self.upper_bounds.len(),
                self.values.len()
            )));
        }
        for ((value, lower), upper) in self
            .values
            .iter()
            .zip(&self.lower_bounds)
            .zip(&self.upper_bounds)
        {
            if !(value.is_finite() && lower.is_finite() && upper.is_finite()) {
                return Err(DcfError::Forecast(format!("{}: non-finite point", parameter)));
            }
            if lower > upper {
                return Err(DcfError::Forecast(format!(
                    "{}: lower bound {} above upper bound {}",
                    parameter, lower, upper
                )));
            }
        }
        Ok(())
    }

    fn truncated(&self, horizon_years: u32) -> Self {
        let n = (horizon_years.max(1) as usize).min(self.values.len());
        Self {
            values: self.values[..n].to_vec(),
            lower_bounds: self.lower_bounds[..n].to_vec(),
            upper_bounds: self.upper_bounds[..n].to_vec(),
        }
    }
}

/// Source of parameter forecasts.
pub trait ForecastProvider: Send + Sync {
    /// Forecast `parameter` at `location` for up to `horizon_years` years.
    ///
    /// # Errors
    ///
    /// `DcfError::Forecast` when the collaborator cannot supply the series.
    fn get_parameter_forecast(
        &self,
        parameter: MarketParameter,
        location: &str,
        horizon_years: u32,
    ) -> Result<ParameterForecast, DcfError>;
}

/// In-memory forecasts keyed by parameter, with optional per-location overrides.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::MarketParameter;
/// use dcf_scenarios::forecast::{ForecastProvider, ParameterForecast, StaticForecastProvider};
///
/// let provider = StaticForecastProvider::new()
///     .with_forecast(MarketParameter::CapRate, ParameterForecast::flat(0.06, 0.01, 5))
///     .with_location_forecast("NYC", MarketParameter::CapRate, ParameterForecast::flat(0.05, 0.01, 5));
///
/// let nyc = provider.get_parameter_forecast(MarketParameter::CapRate, "NYC", 5).unwrap();
/// let other = provider.get_parameter_forecast(MarketParameter::CapRate, "LA", 3).unwrap();
/// assert_eq!(nyc.values[0], 0.05);
/// assert_eq!(other.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticForecastProvider {
    defaults: HashMap<MarketParameter, ParameterForecast>,
    by_location: HashMap<(String, MarketParameter), ParameterForecast>,
}

impl StaticForecastProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a forecast used for every location without an override.
    pub fn with_forecast(mut self, parameter: MarketParameter, forecast: ParameterForecast) -> Self {
        self.defaults.insert(parameter, forecast);
        self
    }

    /// Register a forecast for one location.
    pub fn with_location_forecast(
        mut self,
        location: impl Into<String>,
        parameter: MarketParameter,
        forecast: ParameterForecast,
    ) -> Self {
        self.by_location.insert((location.into(), parameter), forecast);
        self
    }
}

impl ForecastProvider for StaticForecastProvider {
    fn get_parameter_forecast(
        &self,
        parameter: MarketParameter,
        location: &str,
        horizon_years: u32,
    ) -> Result<ParameterForecast, DcfError> {
        let forecast = self
            .by_location
            .get(&(location.to_string(), parameter))
            .or_else(|| self.defaults.get(&parameter))
            .ok_or_else(|| {
                DcfError::Forecast(format!("no forecast for {} at '{}'", parameter, location))
            })?;
        forecast.validate(parameter)?;
        Ok(forecast.truncated(horizon_years))
    }
}
