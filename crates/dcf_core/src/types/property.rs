//! Property description supplied with every analysis request.
//!
//! A [`PropertyDescription`] is created once per request and never mutated.
//! Every pipeline stage borrows it; none of them changes it.

use super::error::DcfError;
use serde::{Deserialize, Serialize};

/// Months per year, used to annualise monthly rents.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Use classification derived from the unit mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Residential units only
    Residential,
    /// Commercial units only
    Commercial,
    /// Both residential and commercial units
    MixedUse,
}

impl PropertyType {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::Residential => "Residential",
            PropertyType::Commercial => "Commercial",
            PropertyType::MixedUse => "Mixed-use",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unit count and in-place monthly rent for one use.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitMix {
    /// Number of units
    pub units: u32,
    /// Monthly rent per unit
    pub monthly_rent: f64,
}

impl UnitMix {
    /// Create a unit mix.
    pub fn new(units: u32, monthly_rent: f64) -> Self {
        Self {
            units,
            monthly_rent,
        }
    }

    /// Annual rent for all units.
    #[inline]
    pub fn annual_rent(&self) -> f64 {
        f64::from(self.units) * self.monthly_rent * MONTHS_PER_YEAR
    }
}

/// Renovation capex and downtime.
///
/// Residential units under renovation earn no rent for `duration_months`
/// of the first year. `units_offline` defaults to every residential unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenovationPlan {
    /// Renovation capital expenditure
    pub capex: f64,
    /// Downtime in months (only the first year is affected)
    pub duration_months: f64,
    /// Residential units taken offline; `None` means all of them
    pub units_offline: Option<u32>,
}

/// Equity split between the investor and the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityStructure {
    /// Investor share of distributions after the operator's preferred return
    pub investor_equity_share: f64,
    /// Share of required cash the operator contributes itself
    pub self_cash_pct: f64,
    /// Annual preferred return on operator capital
    pub preferred_return: f64,
}

impl Default for EquityStructure {
    fn default() -> Self {
        Self {
            investor_equity_share: 0.80,
            self_cash_pct: 0.10,
            preferred_return: 0.08,
        }
    }
}

impl EquityStructure {
    /// Operator share of distributions after the preferred return.
    #[inline]
    pub fn operator_equity_share(&self) -> f64 {
        1.0 - self.investor_equity_share
    }
}

/// Operating-expense inputs for the baseline year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingExpenseInputs {
    /// Annual property tax as a share of purchase price
    pub property_tax_rate: f64,
    /// Annual insurance per unit
    pub insurance_per_unit: f64,
    /// Annual maintenance per unit
    pub maintenance_per_unit: f64,
    /// Annual owner-paid utilities per unit
    pub utilities_per_unit: f64,
    /// Management fee as a share of effective gross income
    pub management_fee_rate: f64,
}

impl Default for OperatingExpenseInputs {
    fn default() -> Self {
        Self {
            property_tax_rate: 0.012,
            insurance_per_unit: 600.0,
            maintenance_per_unit: 900.0,
            utilities_per_unit: 300.0,
            management_fee_rate: 0.04,
        }
    }
}

/// Immutable description of the property under analysis.
///
/// # Examples
///
/// ```
/// use dcf_core::types::{PropertyDescription, PropertyType};
///
/// let property = PropertyDescription::new(2_000_000.0, "NYC-10001")
///     .with_residential(12, 2_100.0)
///     .with_renovation(150_000.0, 3.0);
///
/// assert_eq!(property.property_type(), PropertyType::Residential);
/// assert_eq!(property.baseline_gross_rent(), 12.0 * 2_100.0 * 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescription {
    /// Opaque identifier assigned by the persistence layer
    #[serde(default)]
    pub id: Option<String>,
    /// Location code used for market statistics and adjustments
    pub location_code: String,
    /// Purchase price
    pub purchase_price: f64,
    /// Explicit appraised after-repair value, preferred when present
    #[serde(default)]
    pub appraised_value: Option<f64>,
    /// Residential units
    #[serde(default)]
    pub residential: UnitMix,
    /// Commercial units
    #[serde(default)]
    pub commercial: UnitMix,
    /// Renovation plan
    #[serde(default)]
    pub renovation: RenovationPlan,
    /// Equity structure
    #[serde(default)]
    pub equity: EquityStructure,
    /// Operating-expense inputs
    #[serde(default)]
    pub expenses: OperatingExpenseInputs,
}

impl PropertyDescription {
    /// Create a property with no units and default equity / expense inputs.
    pub fn new(purchase_price: f64, location_code: impl Into<String>) -> Self {
        Self {
            id: None,
            location_code: location_code.into(),
            purchase_price,
            appraised_value: None,
            residential: UnitMix::default(),
            commercial: UnitMix::default(),
            renovation: RenovationPlan::default(),
            equity: EquityStructure::default(),
            expenses: OperatingExpenseInputs::default(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the residential unit mix.
    pub fn with_residential(mut self, units: u32, monthly_rent: f64) -> Self {
        self.residential = UnitMix::new(units, monthly_rent);
        self
    }

    /// Set the commercial unit mix.
    pub fn with_commercial(mut self, units: u32, monthly_rent: f64) -> Self {
        self.commercial = UnitMix::new(units, monthly_rent);
        self
    }

    /// Set renovation capex and downtime for all residential units.
    pub fn with_renovation(mut self, capex: f64, duration_months: f64) -> Self {
        self.renovation = RenovationPlan {
            capex,
            duration_months,
            units_offline: None,
        };
        self
    }

    /// Set the full renovation plan.
    pub fn with_renovation_plan(mut self, plan: RenovationPlan) -> Self {
        self.renovation = plan;
        self
    }

    /// Set an explicit appraised after-repair value.
    pub fn with_appraisal(mut self, value: f64) -> Self {
        self.appraised_value = Some(value);
        self
    }

    /// Set the equity structure.
    pub fn with_equity(mut self, equity: EquityStructure) -> Self {
        self.equity = equity;
        self
    }

    /// Set the operating-expense inputs.
    pub fn with_expenses(mut self, expenses: OperatingExpenseInputs) -> Self {
        self.expenses = expenses;
        self
    }

    /// Total unit count, widened so any two unit counts fit.
    #[inline]
    pub fn total_units(&self) -> u64 {
        u64::from(self.residential.units) + u64::from(self.commercial.units)
    }

    /// Use classification, `None` when the property has no units.
    pub fn try_property_type(&self) -> Option<PropertyType> {
        match (self.residential.units > 0, self.commercial.units > 0) {
            (true, true) => Some(PropertyType::MixedUse),
            (true, false) => Some(PropertyType::Residential),
            (false, true) => Some(PropertyType::Commercial),
            (false, false) => None,
        }
    }

    /// Use classification. A property without units reports `Residential`;
    /// [`validate`](Self::validate) rejects such properties.
    pub fn property_type(&self) -> PropertyType {
        self.try_property_type()
            .unwrap_or(PropertyType::Residential)
    }

    /// Annual year-0 residential rent.
    #[inline]
    pub fn baseline_residential_rent(&self) -> f64 {
        self.residential.annual_rent()
    }

    /// Annual year-0 commercial rent.
    #[inline]
    pub fn baseline_commercial_rent(&self) -> f64 {
        self.commercial.annual_rent()
    }

    /// Annual year-0 gross potential rent.
    #[inline]
    pub fn baseline_gross_rent(&self) -> f64 {
        self.baseline_residential_rent() + self.baseline_commercial_rent()
    }

    /// Commercial share of baseline gross rent (0 when there is no rent).
    ///
    /// Falls back to the commercial share of units when rents are zero.
    pub fn commercial_rent_share(&self) -> f64 {
        let gross = self.baseline_gross_rent();
        if gross > 0.0 {
            return self.baseline_commercial_rent() / gross;
        }
        let units = self.total_units();
        if units == 0 {
            0.0
        } else {
            f64::from(self.commercial.units) / units as f64
        }
    }

    /// Residential units under renovation.
    pub fn renovated_units(&self) -> u32 {
        self.renovation
            .units_offline
            .unwrap_or(self.residential.units)
    }

    /// Check every domain rule on the description.
    ///
    /// # Errors
    ///
    /// Returns `DcfError::InvalidProperty` naming the first offending field.
    pub fn validate(&self) -> Result<(), DcfError> {
        if self.total_units() == 0 {
            return Err(DcfError::invalid_property(
                "total_units",
                0.0,
                "property needs at least one residential or commercial unit",
            ));
        }
        if !self.purchase_price.is_finite() || self.purchase_price <= 0.0 {
            return Err(DcfError::invalid_property(
                "purchase_price",
                self.purchase_price,
                "must be finite and strictly positive",
            ));
        }
        if let Some(value) = self.appraised_value {
            if !value.is_finite() || value <= 0.0 {
                return Err(DcfError::invalid_property(
                    "appraised_value",
                    value,
                    "must be finite and strictly positive",
                ));
            }
        }

        let non_negative = [
            ("residential.monthly_rent", self.residential.monthly_rent),
            ("commercial.monthly_rent", self.commercial.monthly_rent),
            ("renovation.capex", self.renovation.capex),
            ("renovation.duration_months", self.renovation.duration_months),
            ("expenses.insurance_per_unit", self.expenses.insurance_per_unit),
            ("expenses.maintenance_per_unit", self.expenses.maintenance_per_unit),
            ("expenses.utilities_per_unit", self.expenses.utilities_per_unit),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DcfError::invalid_property(
                    field,
                    value,
                    "must be finite and non-negative",
                ));
            }
        }

        let fractions = [
            ("equity.investor_equity_share", self.equity.investor_equity_share),
            ("equity.self_cash_pct", self.equity.self_cash_pct),
            ("equity.preferred_return", self.equity.preferred_return),
            ("expenses.property_tax_rate", self.expenses.property_tax_rate),
            ("expenses.management_fee_rate", self.expenses.management_fee_rate),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(DcfError::invalid_property(field, value, "must lie in [0, 1]"));
            }
        }

        let offline = self.renovated_units();
        if offline > self.residential.units {
            return Err(DcfError::invalid_property(
                "renovation.units_offline",
                f64::from(offline),
                "cannot exceed the residential unit count",
            ));
        }

        Ok(())
    }
}
