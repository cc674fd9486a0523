//! Replaces the electricity generation of an assembled dataset with the
//! values of a second, single-year source keyed by economy name.
//!
//! Economies the overlay does not cover are dropped from every year.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::energy::prep::assemble::assemble;
use crate::energy::prep::error::Result;
use crate::energy::prep::extract::ei::ElectricityOverlay;
use crate::energy::prep::model::{Dataset, EconomyCode, FuelMap, Sector, Source};
use crate::energy::prep::profile::{ProfileContext, rebuild};
use crate::energy::prep::taxonomy::{Taxonomy, normalize_label};
use crate::energy::prep::validate::ConsistencyWarning;

/// Upper bound on chained alias lookups; the alias table may contain cycles.
const MAX_ALIAS_HOPS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Scenario of the combined dataset; derived from the inputs when unset.
    pub scenario: Option<String>,
    pub exports_negative: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            exports_negative: true,
        }
    }
}

/// Result of an overlay pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlaid {
    pub dataset: Dataset,
    /// Economy codes that received overlay values.
    pub matched: Vec<EconomyCode>,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Lowercased economy name to code, over every year of the dataset. The first
/// occurrence of a name wins; registered area names of codes present in the
/// dataset are added after the dataset's own names.
pub fn name_lookup(dataset: &Dataset, taxonomy: &Taxonomy) -> HashMap<String, EconomyCode> {
    let mut lookup = HashMap::new();
    for year in dataset.datasets.values() {
        for profile in &year.profiles {
            let name = normalize_label(profile.name());
            if name.is_empty() || profile.code().is_empty() {
                continue;
            }
            lookup
                .entry(name)
                .or_insert_with(|| profile.code().to_string());
        }
    }

    let present: Vec<EconomyCode> = lookup.values().cloned().collect();
    let areas = &taxonomy.economies.un_areas;
    for name in areas.keys() {
        if let Some(code) = areas.get(name).filter(|code| present.contains(code)) {
            lookup.entry(name.to_string()).or_insert_with(|| code.clone());
        }
    }
    lookup
}

/// Resolves an overlay economy name to a code, following aliases.
pub fn resolve_name<'a>(
    lookup: &'a HashMap<String, EconomyCode>,
    name: &str,
    taxonomy: &Taxonomy,
) -> Option<&'a EconomyCode> {
    let mut current = normalize_label(name);
    for _ in 0..=MAX_ALIAS_HOPS {
        if let Some(code) = lookup.get(&current) {
            return Some(code);
        }
        current = normalize_label(taxonomy.ei_alias(&current)?);
    }
    None
}

fn scenario_label(base: &Dataset, overlay: &ElectricityOverlay) -> String {
    let years: Vec<String> = base.years.iter().map(i32::to_string).collect();
    format!(
        "UN ({}) + EI electricity ({})",
        years.join("/"),
        overlay.year
    )
}

/// Builds the combined dataset. Every kept profile is rebuilt with the
/// overlay's electricity sector and freshly derived metrics.
pub fn overlay_electricity(
    base: &Dataset,
    overlay: &ElectricityOverlay,
    taxonomy: &Taxonomy,
    options: &OverlayOptions,
) -> Result<Overlaid> {
    let lookup = name_lookup(base, taxonomy);
    let mut electricity: BTreeMap<EconomyCode, &FuelMap> = BTreeMap::new();
    for (name, fuels) in &overlay.rows {
        if fuels.is_empty() {
            continue;
        }
        match resolve_name(&lookup, name, taxonomy) {
            Some(code) => {
                electricity.entry(code.clone()).or_insert(fuels);
            }
            None => debug!(name = %name, "overlay economy not found in base dataset"),
        }
    }

    let mut warnings = Vec::new();
    let mut per_year = BTreeMap::new();
    for (year, year_data) in &base.datasets {
        let context = ProfileContext::new(*year, options.exports_negative);
        let mut profiles = Vec::new();
        for profile in &year_data.profiles {
            let Some(fuels) = electricity.get(profile.code()) else {
                continue;
            };
            let mut sectors = profile.sectors().clone();
            sectors.insert(Sector::ElectricityGeneration, (*fuels).clone());
            let mut economy = profile.economy();
            economy.source = Source::UnEi;
            let (rebuilt, profile_warnings) = rebuild(economy, sectors, &context);
            profiles.push(rebuilt);
            warnings.extend(profile_warnings);
        }
        per_year.insert(*year, profiles);
    }

    let scenario = options
        .scenario
        .clone()
        .unwrap_or_else(|| scenario_label(base, overlay));
    let dataset = assemble(per_year, Some(base.default_year), &scenario, "overlay")?;
    info!(
        matched = electricity.len(),
        profiles = dataset.profile_count(),
        "applied electricity overlay"
    );
    Ok(Overlaid {
        dataset,
        matched: electricity.into_keys().collect(),
        warnings,
    })
}
