//! Metric derivation.
//!
//! Each metric is an ordered list of [`Rule`]s; the first rule that applies to
//! a profile's sectors wins. Rules are plain functions so they can be tested
//! one by one, and the validator reuses the same lists on the raw sectors.

use crate::energy::prep::model::{FuelMap, Metrics, Sector, SectorMap, fuel_values};

/// One fallback step of a metric.
#[derive(Clone, Copy)]
pub struct Rule<T> {
    pub name: &'static str,
    pub apply: fn(&SectorMap, bool) -> Option<T>,
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

pub const TPES_RULES: &[Rule<f64>] = &[
    Rule {
        name: "production",
        apply: production_total,
    },
    Rule {
        name: "total_primary_supply",
        apply: primary_supply_total,
    },
];

pub const TFC_RULES: &[Rule<f64>] = &[
    Rule {
        name: "end_use_sectors",
        apply: end_use_total,
    },
    Rule {
        name: "total_final_consumption",
        apply: final_consumption_total,
    },
];

pub const ELEC_GEN_RULES: &[Rule<f64>] = &[Rule {
    name: "electricity_generation",
    apply: electricity_total,
}];

pub const NET_IMPORT_RULES: &[Rule<FuelMap>] = &[
    Rule {
        name: "imports_and_exports",
        apply: trade_balance,
    },
    Rule {
        name: "reported_net_imports",
        apply: reported_net_imports,
    },
];

/// Runs rules in order and returns the first result with its rule name.
pub fn evaluate<T>(
    rules: &[Rule<T>],
    sectors: &SectorMap,
    exports_negative: bool,
) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(sectors, exports_negative).map(|value| (rule.name, value)))
}

/// Names of the rules that produced each metric; `None` means no rule applied
/// and the metric defaulted to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleTrace {
    pub tpes: Option<&'static str>,
    pub tfc: Option<&'static str>,
    pub elec_gen: Option<&'static str>,
    pub net_imports: Option<&'static str>,
}

/// Derives the summary metrics of a finished sector table.
pub fn derive_metrics(sectors: &SectorMap, exports_negative: bool) -> Metrics {
    derive_with_trace(sectors, exports_negative).0
}

pub fn derive_with_trace(sectors: &SectorMap, exports_negative: bool) -> (Metrics, RuleTrace) {
    let tpes = evaluate(TPES_RULES, sectors, exports_negative);
    let tfc = evaluate(TFC_RULES, sectors, exports_negative);
    let elec_gen = evaluate(ELEC_GEN_RULES, sectors, exports_negative);
    let net_imports = evaluate(NET_IMPORT_RULES, sectors, exports_negative);

    let trace = RuleTrace {
        tpes: tpes.map(|(name, _)| name),
        tfc: tfc.map(|(name, _)| name),
        elec_gen: elec_gen.map(|(name, _)| name),
        net_imports: net_imports.as_ref().map(|(name, _)| *name),
    };

    let by_fuel = net_imports.map(|(_, fuels)| fuels).unwrap_or_default();
    let metrics = Metrics {
        tpes: tpes.map(|(_, value)| value).unwrap_or(0.0),
        tfc: tfc.map(|(_, value)| value).unwrap_or(0.0),
        elec_gen: elec_gen.map(|(_, value)| value).unwrap_or(0.0),
        net_imports: by_fuel.values().sum(),
        net_imports_by_fuel: fuel_values(&by_fuel),
    };
    (metrics, trace)
}

/// Applies the source's export sign convention: exports already stored as
/// negative flows are added, positive magnitudes are subtracted.
pub fn signed_export(value: f64, exports_negative: bool) -> f64 {
    if exports_negative { value } else { -value }
}

pub fn production_total(sectors: &SectorMap, _: bool) -> Option<f64> {
    sectors
        .get(Sector::Production)
        .filter(|fuels| !fuels.is_empty())
        .map(|fuels| fuels.values().sum())
}

pub fn primary_supply_total(sectors: &SectorMap, _: bool) -> Option<f64> {
    sectors.sector_total(Sector::TotalPrimarySupply)
}

pub fn end_use_total(sectors: &SectorMap, _: bool) -> Option<f64> {
    let totals: Vec<f64> = Sector::END_USE
        .iter()
        .filter_map(|sector| sectors.sector_total(*sector))
        .collect();
    if totals.is_empty() {
        None
    } else {
        Some(totals.iter().sum())
    }
}

pub fn final_consumption_total(sectors: &SectorMap, _: bool) -> Option<f64> {
    sectors.sector_total(Sector::TotalFinalConsumption)
}

pub fn electricity_total(sectors: &SectorMap, _: bool) -> Option<f64> {
    sectors.sector_total(Sector::ElectricityGeneration)
}

/// Net imports per fuel from explicit import and export sectors, present even
/// when they only hold zeros.
pub fn trade_balance(sectors: &SectorMap, exports_negative: bool) -> Option<FuelMap> {
    let imports = sectors.get(Sector::Imports);
    let exports = sectors.get(Sector::Exports);
    if imports.is_none() && exports.is_none() {
        return None;
    }

    let mut net = FuelMap::new();
    for (fuel, value) in imports.into_iter().flatten() {
        *net.entry(*fuel).or_insert(0.0) += value;
    }
    for (fuel, value) in exports.into_iter().flatten() {
        *net.entry(*fuel).or_insert(0.0) += signed_export(*value, exports_negative);
    }
    Some(net)
}

/// A reported net-imports sector, used as-is.
pub fn reported_net_imports(sectors: &SectorMap, _: bool) -> Option<FuelMap> {
    sectors.get(Sector::NetImports).cloned()
}
