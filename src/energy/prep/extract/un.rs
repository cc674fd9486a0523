//! Extractor for the UN energy-statistics long-format export.
//!
//! Every row carries one observation: an area, a commodity, a transaction and
//! a value in the unit named by `UNIT_MEASURE`. Rows are decoded into
//! [`UnRecord`] at the boundary and converted to petajoules before they reach
//! the accumulator.

use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info};

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::extract::{Extraction, parse_value, parse_year};
use crate::energy::prep::io::table::{DEFAULT_CHUNK_SIZE, TableReader};
use crate::energy::prep::model::{Economy, Sector, Source};
use crate::energy::prep::taxonomy::{ProductionPolicy, Taxonomy, Vocabulary};
use crate::energy::prep::units::{EnergyUnit, PhysicalUnit, calorific_value, gj_to_pj};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "REF_AREA",
    "REF_AREA_LABEL",
    "COMMODITY_LABEL",
    "TRANSACTION_LABEL",
    "UNIT_MEASURE",
    "TIME_PERIOD",
    "OBS_VALUE_SCALED",
];

#[derive(Debug, Clone)]
pub struct UnOptions {
    pub years: Vec<i32>,
    pub scenario: String,
    pub chunk_size: usize,
    pub exports_negative: bool,
}

impl Default for UnOptions {
    fn default() -> Self {
        Self {
            years: vec![2010, 2020],
            scenario: "historical".into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            exports_negative: true,
        }
    }
}

/// One observation of the UN export.
#[derive(Debug, Clone, Deserialize)]
pub struct UnRecord {
    #[serde(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "REF_AREA_LABEL")]
    pub ref_area_label: String,
    #[serde(rename = "COMMODITY_LABEL")]
    pub commodity_label: String,
    #[serde(rename = "TRANSACTION_LABEL")]
    pub transaction_label: String,
    #[serde(rename = "UNIT_MEASURE")]
    pub unit_measure: String,
    #[serde(rename = "TIME_PERIOD")]
    pub time_period: String,
    #[serde(rename = "OBS_VALUE_SCALED", default)]
    pub obs_value_scaled: Option<String>,
    #[serde(rename = "VALUE_PJ", default)]
    pub value_pj: Option<String>,
    /// Gigajoules per physical unit.
    #[serde(rename = "CONVERSION_FACTOR", default)]
    pub conversion_factor: Option<String>,
    #[serde(rename = "COMMODITY", default)]
    pub commodity: Option<String>,
}

impl UnRecord {
    /// Observation value in petajoules, or `None` when the row cannot be
    /// converted.
    ///
    /// A numeric `VALUE_PJ` wins. Otherwise energy units are scaled directly
    /// and physical units go through the row's conversion factor or the
    /// built-in calorific table.
    pub fn value_in_pj(&self) -> Option<f64> {
        if let Some(value) = self.value_pj.as_deref().and_then(parse_value) {
            return Some(value);
        }
        let quantity = self.obs_value_scaled.as_deref().and_then(parse_value)?;
        if let Some(unit) = EnergyUnit::parse(&self.unit_measure) {
            return Some(unit.to_pj(quantity));
        }
        if let Some(factor) = self.conversion_factor.as_deref().and_then(parse_value) {
            return Some(gj_to_pj(quantity, factor));
        }
        let unit = PhysicalUnit::parse(&self.unit_measure)?;
        let gj_per_unit = calorific_value(unit, self.commodity.as_deref()?)?;
        Some(gj_to_pj(quantity, gj_per_unit))
    }
}

/// Reads a UN export into per-year accumulation tables.
pub fn extract_un(path: &Path, taxonomy: &Taxonomy, options: &UnOptions) -> Result<Extraction> {
    let source_name = format!("UN {}", path.display());
    let mut reader = TableReader::open(path)?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| reader.column(column).is_none())
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PrepError::MissingColumns {
            source_name,
            columns: missing,
        });
    }
    if options.years.is_empty() {
        return Err(PrepError::NoYears { source_name });
    }
    info!(years = ?options.years, "reading UN export");

    let headers = StringRecord::from(reader.headers().to_vec());
    let mut extraction = Extraction::new(
        Source::Un,
        options.scenario.clone(),
        options.exports_negative,
        &options.years,
    );
    let mut rows = 0usize;
    let mut undecodable = 0usize;
    loop {
        let chunk = reader.next_chunk(options.chunk_size)?;
        if chunk.is_empty() {
            break;
        }
        rows += chunk.len();
        for cells in chunk {
            let record: UnRecord = match StringRecord::from(cells).deserialize(Some(&headers)) {
                Ok(record) => record,
                Err(error) => {
                    undecodable += 1;
                    debug!(%error, "skipping undecodable UN row");
                    continue;
                }
            };
            ingest_record(&mut extraction, &record, taxonomy)?;
        }
        debug!(rows, "UN chunk consumed");
    }
    info!(
        rows,
        undecodable,
        skipped = reader.skipped_records(),
        "UN export consumed"
    );
    Ok(extraction)
}

/// Folds one observation into the table of its year.
pub fn ingest_record(
    extraction: &mut Extraction,
    record: &UnRecord,
    taxonomy: &Taxonomy,
) -> Result<()> {
    let Some(year) = parse_year(&record.time_period) else {
        return Ok(());
    };
    if extraction.year(year).is_none() {
        return Ok(());
    }
    let Some(sector) = taxonomy.classify_sector(&record.transaction_label, Vocabulary::Un) else {
        return Ok(());
    };
    let Some(value) = record.value_in_pj() else {
        return Ok(());
    };

    let commodity = record.commodity_label.as_str();
    let code = taxonomy.un_economy_code(&record.ref_area, &record.ref_area_label);
    let mut entries = Vec::with_capacity(2);
    if sector == Sector::Production {
        if let Some(fuel) = taxonomy.un_electricity_fuel(commodity)? {
            entries.push((Sector::ElectricityGeneration, fuel));
        }
        if taxonomy.production_policy(commodity)? == ProductionPolicy::Keep {
            let fuel = taxonomy.classify_fuel(commodity, Vocabulary::Un)?;
            entries.push((Sector::Production, fuel.supply_bucket()));
        }
    } else {
        let fuel = taxonomy.classify_fuel(commodity, Vocabulary::Un)?;
        entries.push((sector, fuel.supply_bucket()));
    }
    if entries.is_empty() {
        return Ok(());
    }

    if let Some(accumulator) = extraction.year_mut(year) {
        let label = Some(record.ref_area_label.trim()).filter(|label| !label.is_empty());
        let name = taxonomy
            .economy_name(&code)
            .or(label)
            .unwrap_or(code.as_str());
        accumulator.register(Economy::new(code.as_str(), name, Source::Un));
        for (sector, fuel) in entries {
            accumulator.add(&code, sector, fuel, value);
        }
    }
    Ok(())
}
