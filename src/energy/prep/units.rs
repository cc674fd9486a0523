//! Conversion of source units into petajoules.

use crate::energy::prep::taxonomy::normalize_label;

/// Energy units the sources report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyUnit {
    Petajoule,
    Terajoule,
    Exajoule,
    GigawattHour,
    TerawattHour,
}

impl EnergyUnit {
    /// Parses the unit codes used by the UN export and the balance files.
    pub fn parse(code: &str) -> Option<Self> {
        match normalize_label(code).as_str() {
            "pj" => Some(EnergyUnit::Petajoule),
            "tj" => Some(EnergyUnit::Terajoule),
            "ej" => Some(EnergyUnit::Exajoule),
            "gwhr" | "gwh" => Some(EnergyUnit::GigawattHour),
            "twhr" | "twh" => Some(EnergyUnit::TerawattHour),
            _ => None,
        }
    }

    pub fn factor_to_pj(self) -> f64 {
        match self {
            EnergyUnit::Petajoule => 1.0,
            EnergyUnit::Terajoule => 0.001,
            EnergyUnit::Exajoule => 1000.0,
            EnergyUnit::GigawattHour => 0.0036,
            EnergyUnit::TerawattHour => 3.6,
        }
    }

    pub fn to_pj(self, value: f64) -> f64 {
        value * self.factor_to_pj()
    }
}

/// Physical quantity units that need a calorific value to become energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalUnit {
    Tonne,
    CubicMetre,
}

impl PhysicalUnit {
    pub fn parse(code: &str) -> Option<Self> {
        match normalize_label(code).as_str() {
            "tn" | "t" => Some(PhysicalUnit::Tonne),
            "m3" => Some(PhysicalUnit::CubicMetre),
            _ => None,
        }
    }
}

/// GJ per tonne by UN commodity code.
const GJ_PER_TONNE: &[(&str, f64)] = &[
    ("0100", 25.8),
    ("0110", 27.0),
    ("0121", 28.0),
    ("0129", 25.0),
    ("0200", 10.0),
];

/// GJ per cubic metre by UN commodity code.
const GJ_PER_CUBIC_METRE: &[(&str, f64)] = &[("2300", 0.038)];

/// Typical calorific value of a commodity in GJ per physical unit.
pub fn calorific_value(unit: PhysicalUnit, commodity_code: &str) -> Option<f64> {
    let table = match unit {
        PhysicalUnit::Tonne => GJ_PER_TONNE,
        PhysicalUnit::CubicMetre => GJ_PER_CUBIC_METRE,
    };
    let code = commodity_code.trim();
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, gj)| *gj)
}

/// Converts a quantity measured in gigajoules-per-unit terms into petajoules.
pub fn gj_to_pj(quantity: f64, gj_per_unit: f64) -> f64 {
    quantity * gj_per_unit / 1_000_000.0
}
