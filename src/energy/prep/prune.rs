//! Sector pruning and aggregation.

use crate::energy::prep::error::Result;
use crate::energy::prep::model::{Fuel, FuelMap, Sector, SectorMap};

/// Fraction of a sector's largest absolute entry below which an entry is
/// treated as noise.
pub const NOISE_THRESHOLD: f64 = 0.01;

/// Sums raw labelled entries into canonical buckets, adding duplicates.
pub fn aggregate_entries<'a, I, F>(entries: I, mut classify: F) -> Result<FuelMap>
where
    I: IntoIterator<Item = (&'a str, f64)>,
    F: FnMut(&str) -> Result<Fuel>,
{
    let mut fuels = FuelMap::new();
    for (label, value) in entries {
        let fuel = classify(label)?;
        *fuels.entry(fuel).or_insert(0.0) += value;
    }
    Ok(fuels)
}

/// Drops entries whose magnitude is below `threshold` times the largest
/// magnitude in the map. An all-zero map is returned unchanged.
pub fn prune_fuels(fuels: &FuelMap, threshold: f64) -> FuelMap {
    let largest = fuels
        .values()
        .fold(0.0_f64, |largest, value| largest.max(value.abs()));
    if largest == 0.0 {
        return fuels.clone();
    }

    let cutoff = largest * threshold;
    fuels
        .iter()
        .filter(|(_, value)| value.abs() >= cutoff)
        .map(|(fuel, value)| (*fuel, *value))
        .collect()
}

/// Total of every end-use sector present, keyed by its pseudo-fuel.
pub fn final_consumption_by_sector(sectors: &SectorMap) -> Option<FuelMap> {
    let view: FuelMap = Sector::END_USE
        .iter()
        .filter_map(|sector| {
            let total = sectors.sector_total(*sector)?;
            Some((sector.end_use_fuel()?, total))
        })
        .collect();

    if view.is_empty() { None } else { Some(view) }
}

/// Prunes every sector and, when end-use sectors are present, replaces the
/// final-consumption sector with the by-sector view.
pub fn prune_sectors(raw: &SectorMap, threshold: f64) -> SectorMap {
    let mut pruned: SectorMap = raw
        .iter()
        .map(|(sector, fuels)| (sector, prune_fuels(fuels, threshold)))
        .collect();

    if let Some(view) = final_consumption_by_sector(&pruned) {
        pruned.insert(Sector::TotalFinalConsumption, view);
    }
    pruned
}
