//! Extractor for the Energy Institute statistical review workbook.
//!
//! The "by fuel" sheets share one layout: a title row, a header row naming
//! the fuels at a fixed offset, then one row per economy or region. The fuel
//! columns appear once per published year; the first block is the base year.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use calamine::{DataType, Range};
use tracing::{debug, info};

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::extract::Extraction;
use crate::energy::prep::io::excel_read::{self, cell_to_f64, cell_to_string};
use crate::energy::prep::model::{Economy, Fuel, FuelMap, Sector, Source};
use crate::energy::prep::prune::aggregate_entries;
use crate::energy::prep::taxonomy::{LabelMap, Taxonomy, Vocabulary, normalize_label};
use crate::energy::prep::units::EnergyUnit;

pub const SUPPLY_SHEET: &str = "TES by fuel";
pub const ELECTRICITY_SHEET: &str = "Elec generation by fuel";

#[derive(Debug, Clone)]
pub struct EiOptions {
    pub supply_sheet: String,
    pub electricity_sheet: String,
    /// Zero-based row holding the fuel headers.
    pub header_row: usize,
    /// Years of the successive fuel-column blocks, base year first.
    pub years: Vec<i32>,
    pub scenario: String,
}

impl Default for EiOptions {
    fn default() -> Self {
        Self {
            supply_sheet: SUPPLY_SHEET.into(),
            electricity_sheet: ELECTRICITY_SHEET.into(),
            header_row: 2,
            years: vec![2023, 2024],
            scenario: "historical".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FuelColumn {
    position: usize,
    label: String,
    year: i32,
}

/// One economy row of a "by fuel" sheet, in petajoules per year.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub label: String,
    pub values: BTreeMap<i32, FuelMap>,
}

/// Stable code for a free-text EI economy name.
pub fn ei_code(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_uppercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("EI_{}", slug.trim_matches('_'))
}

fn fuel_table(taxonomy: &Taxonomy, vocabulary: Vocabulary) -> &LabelMap<Fuel> {
    match vocabulary {
        Vocabulary::EiElectricity => &taxonomy.ei.electricity_fuels,
        _ => &taxonomy.ei.supply_fuels,
    }
}

// Headers are sometimes wrapped inside the cell ("Renew-\nables").
fn clean_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a `.N` suffix added by tools that de-duplicate repeated headers.
fn split_suffix<'a>(header: &'a str, table: &LabelMap<Fuel>) -> (&'a str, Option<usize>) {
    if let Some((stem, digits)) = header.rsplit_once('.') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && table.contains(stem)
        {
            return (stem, digits.parse().ok());
        }
    }
    (header, None)
}

fn fuel_columns(
    headers: &[String],
    sheet: &str,
    vocabulary: Vocabulary,
    years: &[i32],
    taxonomy: &Taxonomy,
) -> Result<Vec<FuelColumn>> {
    let table = fuel_table(taxonomy, vocabulary);
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();
    for (position, header) in headers.iter().enumerate().skip(1) {
        let (label, suffix) = split_suffix(header, table);
        if !table.contains(label) {
            continue;
        }
        let key = normalize_label(label);
        let seen = occurrences.entry(key).or_insert(0);
        let block = suffix.unwrap_or(*seen);
        *seen += 1;
        if let Some(year) = years.get(block) {
            columns.push(FuelColumn {
                position,
                label: label.to_string(),
                year: *year,
            });
        }
    }

    let mut missing: Vec<String> = table
        .keys()
        .filter(|key| !occurrences.contains_key(*key))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(PrepError::MissingColumns {
            source_name: format!("EI sheet '{sheet}'"),
            columns: missing,
        });
    }
    Ok(columns)
}

/// Parses a "by fuel" sheet into per-economy, per-year fuel maps.
///
/// Aggregate and region rows are skipped, as are rows without a single
/// numeric fuel value for a year.
pub fn read_by_fuel_sheet(
    range: &Range<DataType>,
    sheet: &str,
    vocabulary: Vocabulary,
    unit: EnergyUnit,
    options: &EiOptions,
    taxonomy: &Taxonomy,
) -> Result<Vec<SheetRow>> {
    // The range starts at the first used row, which may sit below row 0.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows().skip(options.header_row.saturating_sub(first_row));
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| PrepError::InvalidWorkbook(format!("sheet '{sheet}' has no header row")))?
        .iter()
        .map(|cell| clean_header(&cell_to_string(Some(cell))))
        .collect();
    let columns = fuel_columns(&headers, sheet, vocabulary, &options.years, taxonomy)?;

    let mut parsed = Vec::new();
    for row in rows {
        let label = cell_to_string(row.first()).trim().to_string();
        if label.is_empty() || taxonomy.is_ei_aggregate(&label) {
            continue;
        }
        let mut values = BTreeMap::new();
        for year in &options.years {
            let entries: Vec<(&str, f64)> = columns
                .iter()
                .filter(|column| column.year == *year)
                .filter_map(|column| {
                    let value = cell_to_f64(row.get(column.position))?;
                    Some((column.label.as_str(), unit.to_pj(value)))
                })
                .collect();
            if entries.is_empty() {
                continue;
            }
            let fuels =
                aggregate_entries(entries, |label| taxonomy.classify_fuel(label, vocabulary))?;
            values.insert(*year, fuels);
        }
        if !values.is_empty() {
            parsed.push(SheetRow { label, values });
        }
    }
    debug!(sheet, rows = parsed.len(), "parsed EI sheet");
    Ok(parsed)
}

/// Reads total energy supply and electricity generation by fuel into
/// per-year accumulation tables.
pub fn extract_ei(path: &Path, taxonomy: &Taxonomy, options: &EiOptions) -> Result<Extraction> {
    if options.years.is_empty() {
        return Err(PrepError::NoYears {
            source_name: format!("EI {}", path.display()),
        });
    }
    let mut workbook = excel_read::open(path)?;
    let supply_range = excel_read::read_required_sheet(&mut workbook, &options.supply_sheet)?;
    let electricity_range =
        excel_read::read_required_sheet(&mut workbook, &options.electricity_sheet)?;
    let supply = read_by_fuel_sheet(
        &supply_range,
        &options.supply_sheet,
        Vocabulary::EiSupply,
        EnergyUnit::Exajoule,
        options,
        taxonomy,
    )?;
    let electricity = read_by_fuel_sheet(
        &electricity_range,
        &options.electricity_sheet,
        Vocabulary::EiElectricity,
        EnergyUnit::TerawattHour,
        options,
        taxonomy,
    )?;

    let mut extraction =
        Extraction::new(Source::Ei, options.scenario.clone(), false, &options.years);
    for (sector, rows) in [
        (Sector::TotalPrimarySupply, supply),
        (Sector::ElectricityGeneration, electricity),
    ] {
        for row in rows {
            let code = ei_code(&row.label);
            for (year, fuels) in row.values {
                let Some(accumulator) = extraction.year_mut(year) else {
                    continue;
                };
                accumulator.register(Economy::new(code.as_str(), row.label.as_str(), Source::Ei));
                for (fuel, value) in fuels {
                    accumulator.add(&code, sector, fuel, value);
                }
            }
        }
    }
    info!(years = ?options.years, "EI workbook consumed");
    Ok(extraction)
}

/// Base-year electricity generation by fuel, keyed by the workbook's economy
/// names.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricityOverlay {
    pub year: i32,
    pub rows: Vec<(String, FuelMap)>,
}

/// Reads the base-year block of the electricity sheet for the overlay pass.
pub fn read_electricity_overlay(
    path: &Path,
    taxonomy: &Taxonomy,
    options: &EiOptions,
) -> Result<ElectricityOverlay> {
    let year = *options.years.first().ok_or_else(|| PrepError::NoYears {
        source_name: format!("EI {}", path.display()),
    })?;
    let mut workbook = excel_read::open(path)?;
    let range = excel_read::read_required_sheet(&mut workbook, &options.electricity_sheet)?;
    let base_only = EiOptions {
        years: vec![year],
        ..options.clone()
    };
    let rows = read_by_fuel_sheet(
        &range,
        &options.electricity_sheet,
        Vocabulary::EiElectricity,
        EnergyUnit::TerawattHour,
        &base_only,
        taxonomy,
    )?
    .into_iter()
    .filter_map(|mut row| {
        let fuels = row.values.remove(&year)?;
        Some((row.label, fuels))
    })
    .collect();
    Ok(ElectricityOverlay { year, rows })
}
