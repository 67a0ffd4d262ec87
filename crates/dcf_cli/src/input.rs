//! Property and scenario input files (TOML or JSON, chosen by extension).

use crate::{CliError, Result};
use dcf_core::types::{MarketScenario, PropertyDescription};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Toml,
    Json,
}

impl InputFormat {
    /// Encoding implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(InputFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(InputFormat::Json),
            _ => Err(CliError::InvalidArgument(format!(
                "{}: expected a .toml or .json file",
                path.display()
            ))),
        }
    }
}

/// Decode `content` in `format`.
pub fn parse<T: DeserializeOwned>(content: &str, format: InputFormat, origin: &str) -> Result<T> {
    let parsed = match format {
        InputFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        InputFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| CliError::Parse {
        path: origin.to_string(),
        message,
    })
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse(&content, format, &path.display().to_string())
}

/// Load and validate a property description.
pub fn load_property(path: &Path) -> Result<PropertyDescription> {
    let property: PropertyDescription = load(path)?;
    property.validate()?;
    tracing::debug!(
        id = property.id.as_deref().unwrap_or("-"),
        units = property.total_units(),
        property_type = ?property.property_type(),
        "property loaded"
    );
    Ok(property)
}

/// Load a market scenario.
pub fn load_scenario(path: &Path) -> Result<MarketScenario> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::types::MarketRegime;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.toml")).unwrap(), InputFormat::Toml);
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")).unwrap(), InputFormat::Json);
        assert!(InputFormat::from_path(Path::new("a.csv")).is_err());
    }

    #[test]
    fn test_parse_property_toml() {
        let property: PropertyDescription = parse(
            r#"
            id = "elm-street"
            location_code = "DEFAULT"
            purchase_price = 3500000.0
            appraised_value = 4080000.0

            [residential]
            units = 24
            monthly_rent = 1250.0

            [commercial]
            units = 3
            monthly_rent = 2500.0

            [renovation]
            capex = 400000.0
            "#,
            InputFormat::Toml,
            "inline",
        )
        .unwrap();
        assert_eq!(property.total_units(), 27);
        assert_eq!(property.renovation.duration_months, 0.0);
        assert!(property.validate().is_ok());
    }

    #[test]
    fn test_parse_scenario_json() {
        let scenario: MarketScenario = parse(
            r#"{
                "scenario_id": 3,
                "interest_rate": 0.065, "cap_rate": 0.06, "vacancy_rate": 0.05,
                "rent_growth": 0.03, "expense_growth": 0.025, "property_growth": 0.03,
                "loan_to_value": 0.75, "closing_cost_pct": 0.05, "reserve_pct": 0.0,
                "regime": "neutral", "growth_score": 0.5, "risk_score": 0.2
            }"#,
            InputFormat::Json,
            "inline",
        )
        .unwrap();
        assert_eq!(scenario.scenario_id, 3);
        assert_eq!(scenario.regime, MarketRegime::Neutral);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = parse::<MarketScenario>("{", InputFormat::Json, "broken.json").unwrap_err();
        assert!(matches!(err, CliError::Parse { ref path, .. } if path == "broken.json"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_property(Path::new("no-such-property.toml")),
            Err(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_sample_inputs_load() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let property = load_property(&data.join("property.toml")).unwrap();
        assert_eq!(property.id.as_deref(), Some("elm-street-mixed-use"));
        assert_eq!(property.total_units(), 27);
        let scenario = load_scenario(&data.join("scenario.json")).unwrap();
        assert_eq!(scenario.cap_rate, 0.06);
    }
}
