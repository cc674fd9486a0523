//! Merges per-year profile sets into one multi-year dataset.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::model::{Dataset, Profile, YearDataset};
use crate::energy::prep::profile::Finalized;

/// Picks the requested year when it is available, else the latest one.
pub fn choose_default_year(years: &[i32], requested: Option<i32>) -> Option<i32> {
    match requested {
        Some(year) if years.contains(&year) => Some(year),
        _ => years.iter().copied().max(),
    }
}

/// Builds a dataset from per-year profiles.
///
/// Profiles are ordered by economy code and duplicate codes within a year
/// keep their first occurrence. Fails when no year holds a profile.
pub fn assemble(
    per_year: BTreeMap<i32, Vec<Profile>>,
    requested_default: Option<i32>,
    scenario: &str,
    source_name: &str,
) -> Result<Dataset> {
    let mut datasets = BTreeMap::new();
    for (year, mut profiles) in per_year {
        profiles.sort_by(|left, right| left.code().cmp(right.code()));
        let before = profiles.len();
        profiles.dedup_by(|later, first| later.code() == first.code());
        if profiles.len() != before {
            warn!(
                year,
                dropped = before - profiles.len(),
                "dropped profiles with duplicate economy codes"
            );
        }
        datasets.insert(
            year,
            YearDataset {
                year,
                scenario: scenario.to_string(),
                profiles,
            },
        );
    }

    let years: Vec<i32> = datasets.keys().copied().collect();
    let total: usize = datasets.values().map(|year| year.profiles.len()).sum();
    let default_year = match choose_default_year(&years, requested_default) {
        Some(year) if total > 0 => year,
        _ => {
            return Err(PrepError::EmptyDataset {
                source_name: source_name.to_string(),
            });
        }
    };
    info!(?years, default_year, profiles = total, "assembled dataset");

    Ok(Dataset {
        years,
        default_year,
        scenario: scenario.to_string(),
        datasets,
    })
}

/// Drops the warnings of finalized years, keeping their profiles.
pub fn profiles_by_year(finalized: BTreeMap<i32, Finalized>) -> BTreeMap<i32, Vec<Profile>> {
    finalized
        .into_iter()
        .map(|(year, finalized)| (year, finalized.profiles))
        .collect()
}
