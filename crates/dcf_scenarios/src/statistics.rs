//! Marginal statistics for each market parameter.

use crate::forecast::ForecastProvider;
use dcf_core::math::statistics::{mean, std_dev};
use dcf_core::types::MarketParameter;
use dcf_core::DcfError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two-sided 95% normal quantile, used to read a forecast band as a deviation.
const BAND_Z: f64 = 1.959_963_984_540_054;

/// Marginal distribution of one parameter with hard realistic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterStatistics {
    /// Mean
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Hard lower bound
    pub min: f64,
    /// Hard upper bound
    pub max: f64,
}

impl ParameterStatistics {
    /// Create statistics.
    pub const fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Standardised deviation of `value`; zero for a degenerate marginal.
    #[inline]
    pub fn standardise(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }

    /// Whether `value` lies inside the hard bounds.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check the statistics are usable.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` for non-finite fields, a negative deviation,
    /// inverted bounds or a mean outside the bounds.
    pub fn validate(&self, parameter: MarketParameter) -> Result<(), DcfError> {
        if ![self.mean, self.std_dev, self.min, self.max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(DcfError::configuration(format!(
                "{}: statistics must be finite",
                parameter
            )));
        }
        if self.std_dev < 0.0 {
            return Err(DcfError::configuration(format!(
                "{}: std_dev {} is negative",
                parameter, self.std_dev
            )));
        }
        if self.min > self.max {
            return Err(DcfError::configuration(format!(
                "{}: min {} exceeds max {}",
                parameter, self.min, self.max
            )));
        }
        if !self.contains(self.mean) {
            return Err(DcfError::configuration(format!(
                "{}: mean {} outside [{}, {}]",
                parameter, self.mean, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Statistics for every market parameter.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::MarketParameter;
/// use dcf_scenarios::statistics::MarketStatistics;
///
/// let stats = MarketStatistics::standard();
/// assert!(stats.validate().is_ok());
/// assert_eq!(stats.get(MarketParameter::LoanToValue).unwrap().mean, 0.75);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketStatistics {
    parameters: BTreeMap<MarketParameter, ParameterStatistics>,
}

impl MarketStatistics {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Long-run US multifamily / mixed-use statistics.
    pub fn standard() -> Self {
        use MarketParameter::*;
        let entries = [
            (InterestRate, ParameterStatistics::new(0.065, 0.010, 0.020, 0.120)),
            (CapRate, ParameterStatistics::new(0.060, 0.0075, 0.030, 0.100)),
            (VacancyRate, ParameterStatistics::new(0.060, 0.020, 0.000, 0.250)),
            (RentGrowth, ParameterStatistics::new(0.030, 0.015, -0.050, 0.100)),
            (ExpenseGrowth, ParameterStatistics::new(0.030, 0.010, -0.020, 0.080)),
            (PropertyGrowth, ParameterStatistics::new(0.035, 0.020, -0.100, 0.120)),
            (LoanToValue, ParameterStatistics::new(0.750, 0.030, 0.500, 0.850)),
            (ClosingCostPct, ParameterStatistics::new(0.050, 0.005, 0.020, 0.080)),
            (ReservePct, ParameterStatistics::new(0.020, 0.005, 0.000, 0.050)),
        ];
        Self {
            parameters: entries.into_iter().collect(),
        }
    }

    /// Seed statistics from the forecasting collaborator.
    ///
    /// The mean is the mean forecast point. The deviation combines the spread
    /// of the path with the average 95% band read as ±1.96σ. Hard bounds come
    /// from [`MarketStatistics::standard`].
    ///
    /// # Errors
    ///
    /// `DcfError::Forecast` when the provider fails or returns a mean outside
    /// the hard bounds.
    pub fn from_forecasts(
        provider: &dyn ForecastProvider,
        location: &str,
        horizon_years: u32,
    ) -> Result<Self, DcfError> {
        let bounds = Self::standard();
        let mut parameters = BTreeMap::new();
        for parameter in MarketParameter::ALL {
            let forecast = provider.get_parameter_forecast(parameter, location, horizon_years)?;
            forecast.validate(parameter)?;

            let centre = mean(&forecast.values)
                .ok_or_else(|| DcfError::Forecast(format!("{}: empty forecast", parameter)))?;
            let path_sd = std_dev(&forecast.values).unwrap_or(0.0);
            let band_sd = forecast
                .lower_bounds
                .iter()
                .zip(&forecast.upper_bounds)
                .map(|(lower, upper)| (upper - lower) / (2.0 * BAND_Z))
                .sum::<f64>()
                / forecast.len() as f64;
            let sd = (path_sd * path_sd + band_sd * band_sd).sqrt();

            let hard = bounds.require(parameter)?;
            if !hard.contains(centre) {
                return Err(DcfError::Forecast(format!(
                    "{} forecast mean {} outside [{}, {}]",
                    parameter, centre, hard.min, hard.max
                )));
            }
            parameters.insert(
                parameter,
                ParameterStatistics::new(centre, sd, hard.min, hard.max),
            );
        }
        Ok(Self { parameters })
    }

    /// Insert or replace one parameter's statistics.
    pub fn insert(&mut self, parameter: MarketParameter, statistics: ParameterStatistics) {
        self.parameters.insert(parameter, statistics);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, parameter: MarketParameter, statistics: ParameterStatistics) -> Self {
        self.insert(parameter, statistics);
        self
    }

    /// Statistics for `parameter`, if present.
    pub fn get(&self, parameter: MarketParameter) -> Option<&ParameterStatistics> {
        self.parameters.get(&parameter)
    }

    /// Statistics for `parameter`.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` when the parameter has no statistics.
    pub fn require(&self, parameter: MarketParameter) -> Result<&ParameterStatistics, DcfError> {
        self.get(parameter).ok_or_else(|| {
            DcfError::configuration(format!("no statistics for parameter {}", parameter))
        })
    }

    /// Parameters with statistics, in canonical order.
    pub fn parameters(&self) -> impl Iterator<Item = MarketParameter> + '_ {
        self.parameters.keys().copied()
    }

    /// Check every parameter is present and usable.
    ///
    /// # Errors
    ///
    /// `DcfError::Configuration` listing the missing parameters, or the first
    /// invalid entry.
    pub fn validate(&self) -> Result<(), DcfError> {
        let missing: Vec<&str> = MarketParameter::ALL
            .iter()
            .filter(|p| !self.parameters.contains_key(*p))
            .map(|p| p.name())
            .collect();
        if !missing.is_empty() {
            return Err(DcfError::configuration(format!(
                "missing statistics for: {}",
                missing.join(", ")
            )));
        }
        for (parameter, stats) in &self.parameters {
            stats.validate(*parameter)?;
        }
        Ok(())
    }
}
