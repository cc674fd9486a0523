use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Stable identifier of an economy. APEC economies keep their canonical code
/// (`01_AUS`); other sources namespace theirs (`UN_36`, `EI_BRAZIL`).
pub type EconomyCode = String;

/// Energy values per canonical fuel, always in petajoules.
pub type FuelMap = BTreeMap<Fuel, f64>;

/// Canonical fuel buckets every source label resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    Coal,
    Oil,
    Gas,
    Nuclear,
    Hydro,
    Geothermal,
    Solar,
    Wind,
    Tide,
    Thermal,
    WindSolar,
    RenewablesAndOthers,
    Electricity,
    /// Catch-all for open vocabularies.
    Other,
    // End-use pseudo-fuels, only present in the final-consumption-by-sector view.
    Industry,
    Transport,
    Buildings,
    NonEnergyUse,
    Others,
}

impl Fuel {
    /// Key used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Fuel::Coal => "coal",
            Fuel::Oil => "oil",
            Fuel::Gas => "gas",
            Fuel::Nuclear => "nuclear",
            Fuel::Hydro => "hydro",
            Fuel::Geothermal => "geothermal",
            Fuel::Solar => "solar",
            Fuel::Wind => "wind",
            Fuel::Tide => "tide",
            Fuel::Thermal => "thermal",
            Fuel::WindSolar => "wind_solar",
            Fuel::RenewablesAndOthers => "renewables_and_others",
            Fuel::Electricity => "electricity",
            Fuel::Other => "other",
            Fuel::Industry => "industry",
            Fuel::Transport => "transport",
            Fuel::Buildings => "buildings",
            Fuel::NonEnergyUse => "non_energy_use",
            Fuel::Others => "others",
        }
    }

    /// Collapses the granular generation buckets into the coarse supply-side
    /// vocabulary: fossil fuels, nuclear and electricity stay, everything else
    /// becomes `renewables_and_others`.
    pub fn supply_bucket(self) -> Fuel {
        match self {
            Fuel::Hydro
            | Fuel::Geothermal
            | Fuel::Solar
            | Fuel::Wind
            | Fuel::Tide
            | Fuel::Thermal
            | Fuel::WindSolar => Fuel::RenewablesAndOthers,
            other => other,
        }
    }
}

impl Ord for Fuel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Fuel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical sectors of an energy balance. The serialized names follow the
/// generic balance vocabulary so the presentation layer reads every source
/// the same way.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Sector {
    #[serde(rename = "01_production", alias = "production")]
    Production,
    #[serde(rename = "02_imports", alias = "imports")]
    Imports,
    #[serde(rename = "03_exports", alias = "exports")]
    Exports,
    #[serde(rename = "07_total_primary_energy_supply", alias = "total_primary_supply")]
    TotalPrimarySupply,
    #[serde(rename = "09_total_transformation_sector", alias = "transformation")]
    Transformation,
    #[serde(rename = "12_total_final_consumption", alias = "total_final_consumption")]
    TotalFinalConsumption,
    #[serde(rename = "14_industry_sector", alias = "industry")]
    Industry,
    #[serde(rename = "15_transport_sector", alias = "transport")]
    Transport,
    #[serde(rename = "16_01_buildings", alias = "buildings")]
    Buildings,
    #[serde(rename = "16_other_sector", alias = "other")]
    Other,
    #[serde(rename = "17_nonenergy_use", alias = "non_energy_use")]
    NonEnergyUse,
    #[serde(rename = "18_electricity_output_in_gwh", alias = "electricity_generation")]
    ElectricityGeneration,
    #[serde(rename = "net_imports")]
    NetImports,
}

impl Sector {
    /// End-use sectors whose totals make up final consumption.
    pub const END_USE: [Sector; 5] = [
        Sector::Industry,
        Sector::Transport,
        Sector::Buildings,
        Sector::Other,
        Sector::NonEnergyUse,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Sector::Production => "01_production",
            Sector::Imports => "02_imports",
            Sector::Exports => "03_exports",
            Sector::TotalPrimarySupply => "07_total_primary_energy_supply",
            Sector::Transformation => "09_total_transformation_sector",
            Sector::TotalFinalConsumption => "12_total_final_consumption",
            Sector::Industry => "14_industry_sector",
            Sector::Transport => "15_transport_sector",
            Sector::Buildings => "16_01_buildings",
            Sector::Other => "16_other_sector",
            Sector::NonEnergyUse => "17_nonenergy_use",
            Sector::ElectricityGeneration => "18_electricity_output_in_gwh",
            Sector::NetImports => "net_imports",
        }
    }

    /// Pseudo-fuel key of an end-use sector inside the final-consumption view.
    pub fn end_use_fuel(self) -> Option<Fuel> {
        match self {
            Sector::Industry => Some(Fuel::Industry),
            Sector::Transport => Some(Fuel::Transport),
            Sector::Buildings => Some(Fuel::Buildings),
            Sector::Other => Some(Fuel::Others),
            Sector::NonEnergyUse => Some(Fuel::NonEnergyUse),
            _ => None,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One `{fuel, value}` entry as it appears in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelValue {
    pub fuel: Fuel,
    pub value: f64,
}

/// Converts a fuel map into its sorted list representation.
pub fn fuel_values(fuels: &FuelMap) -> Vec<FuelValue> {
    fuels
        .iter()
        .map(|(fuel, value)| FuelValue {
            fuel: *fuel,
            value: *value,
        })
        .collect()
}

/// Sector → fuel → value table of one economy and year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorMap(BTreeMap<Sector, FuelMap>);

impl SectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sector: Sector) -> Option<&FuelMap> {
        self.0.get(&sector)
    }

    pub fn contains(&self, sector: Sector) -> bool {
        self.0.contains_key(&sector)
    }

    /// Replaces the fuels recorded for a sector.
    pub fn insert(&mut self, sector: Sector, fuels: FuelMap) {
        self.0.insert(sector, fuels);
    }

    pub fn remove(&mut self, sector: Sector) -> Option<FuelMap> {
        self.0.remove(&sector)
    }

    /// Adds a value to the running total of a sector/fuel cell, creating the
    /// sector when needed.
    pub fn add(&mut self, sector: Sector, fuel: Fuel, value: f64) {
        *self.0.entry(sector).or_default().entry(fuel).or_insert(0.0) += value;
    }

    /// Sum of every fuel in a sector, `None` when the sector is absent.
    pub fn sector_total(&self, sector: Sector) -> Option<f64> {
        self.0.get(&sector).map(|fuels| fuels.values().sum())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sector, &FuelMap)> {
        self.0.iter().map(|(sector, fuels)| (*sector, fuels))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Sector, FuelMap)> for SectorMap {
    fn from_iter<T: IntoIterator<Item = (Sector, FuelMap)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for SectorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (sector, fuels) in &self.0 {
            map.serialize_entry(sector, &fuel_values(fuels))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectorMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Sector, Vec<FuelValue>>::deserialize(deserializer)?;
        let mut sectors = SectorMap::new();
        for (sector, entries) in raw {
            let fuels = sectors.0.entry(sector).or_default();
            for entry in entries {
                *fuels.entry(entry.fuel).or_insert(0.0) += entry.value;
            }
        }
        Ok(sectors)
    }
}

/// Provenance tag attached to every economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "APEC")]
    Apec,
    #[serde(rename = "UN")]
    Un,
    #[serde(rename = "EI")]
    Ei,
    #[serde(rename = "UN+EI", alias = "UN+EI (elec 2023)")]
    UnEi,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::Apec => "APEC",
            Source::Un => "UN",
            Source::Ei => "EI",
            Source::UnEi => "UN+EI",
        };
        f.write_str(label)
    }
}

/// A reporting entity as seen by one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Economy {
    pub code: EconomyCode,
    pub name: String,
    pub source: Source,
}

impl Economy {
    pub fn new(code: impl Into<EconomyCode>, name: impl Into<String>, source: Source) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            source,
        }
    }
}

/// Summary figures derived from a profile's final sector data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub tpes: f64,
    pub tfc: f64,
    pub elec_gen: f64,
    pub net_imports: f64,
    pub net_imports_by_fuel: Vec<FuelValue>,
}

/// One economy in one year.
///
/// Profiles are only built by [`crate::profile`], which attaches metrics once
/// the sector data is final; there is no way to edit sectors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "economy")]
    code: EconomyCode,
    name: String,
    source: Source,
    sectors: SectorMap,
    metrics: Metrics,
}

impl Profile {
    pub(crate) fn from_parts(economy: Economy, sectors: SectorMap, metrics: Metrics) -> Self {
        Self {
            code: economy.code,
            name: economy.name,
            source: economy.source,
            sectors,
            metrics,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn sectors(&self) -> &SectorMap {
        &self.sectors
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn economy(&self) -> Economy {
        Economy::new(self.code.clone(), self.name.clone(), self.source)
    }
}

/// All profiles of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearDataset {
    pub year: i32,
    pub scenario: String,
    pub profiles: Vec<Profile>,
}

/// Multi-year dataset consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub years: Vec<i32>,
    #[serde(rename = "defaultYear")]
    pub default_year: i32,
    pub scenario: String,
    pub datasets: BTreeMap<i32, YearDataset>,
}

impl Dataset {
    pub fn profile_count(&self) -> usize {
        self.datasets.values().map(|year| year.profiles.len()).sum()
    }
}

/// One economy group written to its own shard file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardGroup {
    pub id: String,
    pub file: String,
    pub economies: Vec<EconomyCode>,
}

/// Describes how a dataset was partitioned into shard files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardIndex {
    pub years: Vec<i32>,
    #[serde(rename = "defaultYear")]
    pub default_year: i32,
    pub scenario: String,
    pub year_groups: BTreeMap<i32, Vec<ShardGroup>>,
}
