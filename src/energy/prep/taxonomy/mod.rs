//! Classification of source-specific labels into the canonical vocabulary.
//!
//! All tables live in a [`Taxonomy`] value that callers pass into every
//! extractor, so a test or a run can substitute its own tables without
//! touching process-wide state. The built-in tables come from [`defaults`];
//! [`Taxonomy::from_path`] loads a JSON override where each omitted section
//! keeps its built-in value.

pub mod defaults;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::de::Deserializer;
use serde::Deserialize;

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::model::{EconomyCode, Fuel, Sector};

/// Normalizes a label for lookups: trims whitespace and lowercases.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Label → value table with case-insensitive, whitespace-tolerant keys.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<T>(HashMap<String, T>);

impl<T> Default for LabelMap<T> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<T> LabelMap<T> {
    pub fn get(&self, raw: &str) -> Option<&T> {
        self.0.get(&normalize_label(raw))
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.0.contains_key(&normalize_label(raw))
    }

    pub fn insert(&mut self, raw: &str, value: T) {
        self.0.insert(normalize_label(raw), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, T> FromIterator<(K, T)> for LabelMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (normalize_label(key.as_ref()), value))
                .collect(),
        )
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for LabelMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = HashMap::<String, T>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

/// Set of labels with the same normalization as [`LabelMap`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet(HashSet<String>);

impl LabelSet {
    pub fn contains(&self, raw: &str) -> bool {
        self.0.contains(&normalize_label(raw))
    }
}

impl<K: AsRef<str>> FromIterator<K> for LabelSet {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|key| normalize_label(key.as_ref()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

/// The label vocabularies the classifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Fuel codes of the generic balance, supply side.
    Balance,
    /// Fuel codes of the generic balance inside electricity generation.
    BalanceElectricity,
    /// UN commodity and transaction labels.
    Un,
    /// Column labels of the EI supply sheet.
    EiSupply,
    /// Column labels of the EI electricity sheet.
    EiElectricity,
}

impl Vocabulary {
    pub fn name(self) -> &'static str {
        match self {
            Vocabulary::Balance => "balance fuel",
            Vocabulary::BalanceElectricity => "balance electricity fuel",
            Vocabulary::Un => "UN commodity",
            Vocabulary::EiSupply => "EI supply column",
            Vocabulary::EiElectricity => "EI electricity column",
        }
    }

    /// Closed vocabularies must map every label; open ones fall back to
    /// [`Fuel::Other`].
    pub fn is_closed(self) -> bool {
        !matches!(self, Vocabulary::Balance | Vocabulary::BalanceElectricity)
    }
}

/// Outcome of the production keep/drop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionPolicy {
    Keep,
    Drop,
}

/// Tables of the generic multi-sector balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalanceVocabulary {
    pub fuels: LabelMap<Fuel>,
    pub electricity_fuels: LabelMap<Fuel>,
    pub sectors: LabelMap<Sector>,
    pub buildings_subsectors: LabelSet,
    pub other_subsectors: LabelSet,
}

/// Tables of the UN long-format export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnVocabulary {
    pub fuels: LabelMap<Fuel>,
    pub production_drop: LabelSet,
    pub electricity_labels: LabelSet,
    pub electricity_aggregates: LabelSet,
    pub transactions: LabelMap<Sector>,
}

/// Tables of the Energy Institute workbook.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EiVocabulary {
    pub supply_fuels: LabelMap<Fuel>,
    pub electricity_fuels: LabelMap<Fuel>,
    pub aggregate_prefixes: Vec<String>,
    pub name_aliases: LabelMap<String>,
}

/// Canonical economy codes and the names that resolve to them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EconomyRegistry {
    pub names: BTreeMap<EconomyCode, String>,
    pub un_areas: LabelMap<EconomyCode>,
}

/// Immutable classification configuration shared by every extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub balance: BalanceVocabulary,
    pub un: UnVocabulary,
    pub ei: EiVocabulary,
    pub economies: EconomyRegistry,
}

impl Taxonomy {
    /// Loads a JSON taxonomy override; sections absent from the file keep the
    /// built-in tables.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let taxonomy: Taxonomy = serde_json::from_str(&data)?;
        taxonomy.check()?;
        Ok(taxonomy)
    }

    fn check(&self) -> Result<()> {
        if self.un.fuels.is_empty() {
            return Err(PrepError::InvalidTaxonomy(
                "the UN fuel table must not be empty".into(),
            ));
        }
        if self.ei.supply_fuels.is_empty() || self.ei.electricity_fuels.is_empty() {
            return Err(PrepError::InvalidTaxonomy(
                "the EI fuel tables must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolves a raw fuel label. Closed vocabularies fail on unknown labels,
    /// open ones return [`Fuel::Other`].
    pub fn classify_fuel(&self, raw: &str, vocabulary: Vocabulary) -> Result<Fuel> {
        let table = match vocabulary {
            Vocabulary::Balance => &self.balance.fuels,
            Vocabulary::BalanceElectricity => &self.balance.electricity_fuels,
            Vocabulary::Un => &self.un.fuels,
            Vocabulary::EiSupply => &self.ei.supply_fuels,
            Vocabulary::EiElectricity => &self.ei.electricity_fuels,
        };
        match table.get(raw) {
            Some(fuel) => Ok(*fuel),
            None if vocabulary.is_closed() => Err(PrepError::UnmappedLabel {
                vocabulary: vocabulary.name().to_string(),
                label: raw.trim().to_string(),
            }),
            None => Ok(Fuel::Other),
        }
    }

    /// Resolves a raw sector label; `None` means the row is out of interest.
    pub fn classify_sector(&self, raw: &str, vocabulary: Vocabulary) -> Option<Sector> {
        match vocabulary {
            Vocabulary::Balance | Vocabulary::BalanceElectricity => {
                self.balance.sectors.get(raw).copied()
            }
            Vocabulary::Un => self.un.transactions.get(raw).copied(),
            Vocabulary::EiSupply | Vocabulary::EiElectricity => None,
        }
    }

    /// Balance sector resolution including the buildings split of the other
    /// sector, which is only visible through the sub-sector column.
    ///
    /// When the sub-sector column is present, other-sector rows count only
    /// for a buildings or listed other sub-sector. Anything else, including
    /// the sector's own total row, is out of interest.
    pub fn classify_balance_sector(&self, sector: &str, sub_sector: Option<&str>) -> Option<Sector> {
        let resolved = self.classify_sector(sector, Vocabulary::Balance)?;
        match (resolved, sub_sector) {
            (Sector::Other, Some(sub)) if self.balance.buildings_subsectors.contains(sub) => {
                Some(Sector::Buildings)
            }
            (Sector::Other, Some(sub)) if self.balance.other_subsectors.contains(sub) => {
                Some(Sector::Other)
            }
            (Sector::Other, Some(_)) => None,
            (resolved, _) => Some(resolved),
        }
    }

    /// Decides whether a UN commodity counts towards primary production.
    pub fn production_policy(&self, label: &str) -> Result<ProductionPolicy> {
        if self.un.production_drop.contains(label) {
            Ok(ProductionPolicy::Drop)
        } else if self.un.fuels.contains(label) {
            Ok(ProductionPolicy::Keep)
        } else {
            Err(PrepError::UnclassifiedProductionLabel(label.trim().to_string()))
        }
    }

    /// Granular generation bucket of a UN electricity commodity, `None` for
    /// non-electricity commodities and for the aggregate totals.
    pub fn un_electricity_fuel(&self, label: &str) -> Result<Option<Fuel>> {
        if !self.un.electricity_labels.contains(label)
            || self.un.electricity_aggregates.contains(label)
        {
            return Ok(None);
        }
        self.classify_fuel(label, Vocabulary::Un).map(Some)
    }

    /// Whether an EI row label names an aggregate or region rather than an
    /// economy.
    pub fn is_ei_aggregate(&self, label: &str) -> bool {
        let label = label.trim_start();
        self.ei
            .aggregate_prefixes
            .iter()
            .any(|prefix| label.starts_with(prefix.as_str()))
    }

    /// Alias target of an EI economy name, if any.
    pub fn ei_alias(&self, name: &str) -> Option<&str> {
        self.ei.name_aliases.get(name).map(String::as_str)
    }

    /// Fixed display name of a canonical economy code.
    pub fn economy_name(&self, code: &str) -> Option<&str> {
        self.economies.names.get(code.trim()).map(String::as_str)
    }

    pub fn is_known_economy(&self, code: &str) -> bool {
        self.economies.names.contains_key(code.trim())
    }

    /// Code of a UN reference area: the canonical code when the area name is
    /// registered, otherwise a `UN_`-namespaced code.
    pub fn un_economy_code(&self, ref_area: &str, ref_area_label: &str) -> EconomyCode {
        self.economies
            .un_areas
            .get(ref_area_label)
            .cloned()
            .unwrap_or_else(|| format!("UN_{}", ref_area.trim()))
    }
}
