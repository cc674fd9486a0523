//! Turns frozen sector tables into finished profiles.

use tracing::debug;

use crate::energy::prep::accumulate::FrozenTable;
use crate::energy::prep::derive::{derive_metrics, derive_with_trace};
use crate::energy::prep::model::{Economy, Profile, SectorMap};
use crate::energy::prep::prune::{NOISE_THRESHOLD, prune_sectors};
use crate::energy::prep::validate::{ConsistencyWarning, check_metrics};

/// Per-year settings shared by every profile of a source run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileContext {
    pub year: i32,
    pub exports_negative: bool,
    pub noise_threshold: f64,
}

impl ProfileContext {
    pub fn new(year: i32, exports_negative: bool) -> Self {
        Self {
            year,
            exports_negative,
            noise_threshold: NOISE_THRESHOLD,
        }
    }
}

/// Profiles of one year together with the consistency warnings raised while
/// building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finalized {
    pub profiles: Vec<Profile>,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Prunes the raw sectors, derives metrics from the result and validates them
/// against the raw sums.
pub fn finalize(
    economy: Economy,
    raw: SectorMap,
    context: &ProfileContext,
) -> (Profile, Vec<ConsistencyWarning>) {
    let sectors = prune_sectors(&raw, context.noise_threshold);
    let (metrics, trace) = derive_with_trace(&sectors, context.exports_negative);
    debug!(
        economy = %economy.code,
        year = context.year,
        tpes_rule = trace.tpes.unwrap_or("none"),
        tfc_rule = trace.tfc.unwrap_or("none"),
        net_imports_rule = trace.net_imports.unwrap_or("none"),
        "derived metrics"
    );
    let warnings = check_metrics(
        &economy.code,
        context.year,
        &raw,
        &metrics,
        context.exports_negative,
    );
    (Profile::from_parts(economy, sectors, metrics), warnings)
}

/// Builds a fresh profile from sector data that is already final, such as a
/// published profile with one sector replaced. Metrics are derived from
/// scratch and validated against the given sectors.
pub fn rebuild(
    economy: Economy,
    sectors: SectorMap,
    context: &ProfileContext,
) -> (Profile, Vec<ConsistencyWarning>) {
    let metrics = derive_metrics(&sectors, context.exports_negative);
    let warnings = check_metrics(
        &economy.code,
        context.year,
        &sectors,
        &metrics,
        context.exports_negative,
    );
    (Profile::from_parts(economy, sectors, metrics), warnings)
}

/// Finalizes every economy of a frozen table, in code order.
pub fn finalize_table(table: FrozenTable, context: &ProfileContext) -> Finalized {
    let mut finalized = Finalized::default();
    for (economy, raw) in table.into_economies() {
        let (profile, warnings) = finalize(economy, raw, context);
        finalized.profiles.push(profile);
        finalized.warnings.extend(warnings);
    }
    finalized
}
