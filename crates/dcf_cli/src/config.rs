//! CLI configuration management
//!
//! Loads settings from a TOML file, applies `DCF_*` environment overrides
//! and validates the result.

use dcf_core::types::MarketParameter;
use dcf_engine::batch::BatchConfig;
use dcf_engine::policy::{
    AnalysisConfig, FinancingPolicy, MappingPolicy, MetricsPolicy, RecommendationPolicy,
};
use dcf_scenarios::{
    CorrelationConfig, CorrelationRule, GeneratorConfig, MarketStatistics, ParameterStatistics,
    RegimeThresholds,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable {name}: cannot parse '{value}'")]
    EnvError { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Tracing filter directive
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// `[analysis]` section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Projection horizon in years
    pub horizon_years: u32,
    /// NPV discount rate
    pub discount_rate: f64,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            horizon_years: defaults.horizon_years,
            discount_rate: defaults.discount_rate,
        }
    }
}

/// `[batch]` section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    /// Scenarios per simulation
    pub scenario_count: usize,
    /// Base seed
    pub seed: u64,
    /// Worker threads; unset uses every core
    pub num_threads: Option<usize>,
    /// Smallest batch run in parallel
    pub min_parallel_batch: usize,
    /// Wall-clock limit in seconds
    pub time_limit_secs: Option<u64>,
    /// Resamples per parameter before a scenario is abandoned
    pub max_resample_attempts: u32,
}

impl Default for BatchSection {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            scenario_count: 1_000,
            seed: generator.base_seed,
            num_threads: None,
            min_parallel_batch: BatchConfig::default().min_parallel_batch,
            time_limit_secs: None,
            max_resample_attempts: generator.max_resample_attempts,
        }
    }
}

/// Full CLI configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Log level
    pub log_level: LogLevel,
    /// Horizon and discounting
    pub analysis: AnalysisSection,
    /// Batch execution
    pub batch: BatchSection,
    /// Loan sizing
    pub financing: FinancingPolicy,
    /// Exit valuation and IRR search
    pub metrics: MetricsPolicy,
    /// Recommendation rules
    pub recommendation: RecommendationPolicy,
    /// Scenario → assumption adjustments
    pub mapping: MappingPolicy,
    /// Regime thresholds
    pub regime: RegimeThresholds,
    /// Overrides of the standard marginal statistics
    pub market: BTreeMap<MarketParameter, ParameterStatistics>,
    /// Correlation rules; the standard set when absent
    pub correlation: Option<Vec<CorrelationRule>>,
}

impl DcfConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Load a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `DCF_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
            let parsed = value.trim().parse().ok();
            parsed.ok_or_else(|| ConfigError::EnvError {
                name: name.to_string(),
                value,
            })
        }

        if let Some(level) = lookup("DCF_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(v) = lookup("DCF_SCENARIO_COUNT") {
            self.batch.scenario_count = parse("DCF_SCENARIO_COUNT", v)?;
        }
        if let Some(v) = lookup("DCF_SEED") {
            self.batch.seed = parse("DCF_SEED", v)?;
        }
        if let Some(v) = lookup("DCF_THREADS") {
            self.batch.num_threads = Some(parse("DCF_THREADS", v)?);
        }
        if let Some(v) = lookup("DCF_HORIZON_YEARS") {
            self.analysis.horizon_years = parse("DCF_HORIZON_YEARS", v)?;
        }
        if let Some(v) = lookup("DCF_DISCOUNT_RATE") {
            self.analysis.discount_rate = parse("DCF_DISCOUNT_RATE", v)?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if let Err(e) = self.analysis_config().validate() {
            problems.push(e.to_string());
        }
        if self.batch.scenario_count == 0 {
            problems.push("batch.scenario_count must be positive".to_string());
        }
        if self.batch.num_threads == Some(0) {
            problems.push("batch.num_threads must be positive when set".to_string());
        }
        if !self.regime.is_valid() {
            problems.push(format!(
                "regime thresholds require 0 <= low < high <= 1 (low = {}, high = {})",
                self.regime.low, self.regime.high
            ));
        }
        let statistics = self.statistics();
        match statistics.validate() {
            Ok(()) => {
                if let Err(e) = self.correlation().validate(&statistics) {
                    problems.push(e.to_string());
                }
            }
            Err(e) => problems.push(e.to_string()),
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    /// Pipeline configuration
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            horizon_years: self.analysis.horizon_years,
            discount_rate: self.analysis.discount_rate,
            mapping: self.mapping.clone(),
            financing: self.financing,
            metrics: self.metrics,
            recommendation: self.recommendation,
        }
    }

    /// Generator settings
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            base_seed: self.batch.seed,
            max_resample_attempts: self.batch.max_resample_attempts,
            thresholds: self.regime,
        }
    }

    /// Batch execution settings
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            num_threads: self.batch.num_threads,
            min_parallel_batch: self.batch.min_parallel_batch,
            time_limit_secs: self.batch.time_limit_secs,
        }
    }

    /// Standard statistics with the `[market]` overrides applied
    pub fn statistics(&self) -> MarketStatistics {
        self.market
            .iter()
            .fold(MarketStatistics::standard(), |stats, (p, s)| stats.with(*p, *s))
    }

    /// Configured correlation rules
    pub fn correlation(&self) -> CorrelationConfig {
        self.correlation
            .clone()
            .map_or_else(CorrelationConfig::standard, CorrelationConfig::new)
    }
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Environment variables
/// 2. Config file (skipped when the default path does not exist)
/// 3. Default values
pub fn build_config(path: &Path, explicit: bool) -> Result<DcfConfig, ConfigError> {
    let mut config = if path.exists() {
        DcfConfig::from_file(path)?
    } else if explicit {
        return Err(ConfigError::FileError(format!(
            "{} does not exist",
            path.display()
        )));
    } else {
        DcfConfig::default()
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = DcfConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.analysis.horizon_years, 5);
        assert_eq!(config.batch.seed, 42);
        assert_eq!(config.correlation(), CorrelationConfig::standard());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_parse_toml_sections() {
        let config = DcfConfig::from_toml_str(
            r#"
            log_level = "debug"

            [analysis]
            horizon_years = 7
            discount_rate = 0.09

            [batch]
            scenario_count = 250
            seed = 7
            num_threads = 2

            [financing]
            min_dscr = 1.25

            [metrics]
            exit_valuation = "appreciation"

            [mapping.locations.NYC]
            cap_rate_spread = -0.005

            [market.cap_rate]
            mean = 0.055
            std_dev = 0.006
            min = 0.03
            max = 0.09

            [[correlation]]
            driver = "interest_rate"
            dependent = "cap_rate"
            strength = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.analysis.horizon_years, 7);
        assert_eq!(config.batch.scenario_count, 250);
        assert_eq!(config.batch_config().num_threads, Some(2));
        assert_eq!(config.financing.min_dscr, 1.25);
        assert_eq!(config.financing.amortization_years, 30);
        assert_eq!(config.mapping.location("NYC").cap_rate_spread, -0.005);
        assert_eq!(
            config.statistics().get(MarketParameter::CapRate).unwrap().mean,
            0.055
        );
        assert_eq!(config.correlation().rules().len(), 1);
        assert_eq!(config.generator_config().base_seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DCF_LOG_LEVEL", "warn"),
            ("DCF_SCENARIO_COUNT", "64"),
            ("DCF_SEED", "99"),
            ("DCF_THREADS", "3"),
            ("DCF_HORIZON_YEARS", "10"),
            ("DCF_DISCOUNT_RATE", "0.08"),
        ]
        .into_iter()
        .collect();
        let mut config = DcfConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.batch.scenario_count, 64);
        assert_eq!(config.batch.seed, 99);
        assert_eq!(config.batch.num_threads, Some(3));
        assert_eq!(config.analysis.horizon_years, 10);
        assert_eq!(config.analysis.discount_rate, 0.08);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = DcfConfig::default();
        let err = config
            .apply_overrides(|name| (name == "DCF_SEED").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { ref name, .. } if name == "DCF_SEED"));
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut config = DcfConfig::default();
        config.analysis.horizon_years = 0;
        config.batch.scenario_count = 0;
        config.correlation = Some(vec![CorrelationRule::new(
            MarketParameter::CapRate,
            MarketParameter::CapRate,
            0.5,
        )]);
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => {
                assert!(msg.contains("horizon_years"));
                assert!(msg.contains("scenario_count"));
                assert!(msg.contains("cap_rate"));
            }
            other => panic!("expected invalid configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = Path::new("definitely-missing-dcf-config.toml");
        assert!(build_config(path, true).is_err());
    }

    #[test]
    fn test_sample_configuration_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/dcf.toml");
        let config = DcfConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.scenario_count, 1_000);
        assert_eq!(config.statistics().get(MarketParameter::InterestRate).unwrap().mean, 0.07);
        assert_eq!(
            config.analysis_config().mapping.location("COASTAL").cap_rate_spread,
            -0.005
        );
    }
}
