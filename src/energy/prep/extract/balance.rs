//! Extractor for the generic multi-sector balance table (one column per year).

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::extract::{Extraction, parse_flag, parse_value};
use crate::energy::prep::io::table::{DEFAULT_CHUNK_SIZE, TableReader};
use crate::energy::prep::model::{Economy, Sector, Source};
use crate::energy::prep::taxonomy::{Taxonomy, Vocabulary, normalize_label};
use crate::energy::prep::units::EnergyUnit;

/// Sectors charted when the caller does not ask for specific ones.
pub const DEFAULT_SECTORS: [&str; 3] = [
    "07_total_primary_energy_supply",
    "12_total_final_consumption",
    "09_total_transformation_sector",
];

/// Sectors read for metric derivation whatever the caller asked for.
pub const STATS_SECTORS: [&str; 4] = [
    "18_electricity_output_in_gwh",
    "02_imports",
    "03_exports",
    "net_imports",
];

/// End-use sectors feeding the final-consumption-by-sector view.
pub const TFC_PARTS: [&str; 4] = [
    "14_industry_sector",
    "15_transport_sector",
    "16_other_sector",
    "17_nonenergy_use",
];

const SUBTOTAL_LAYOUT_COLUMN: &str = "subtotal_layout";
const SUBTOTAL_RESULTS_COLUMN: &str = "subtotal_results";

#[derive(Debug, Clone)]
pub struct BalanceOptions {
    pub scenario: String,
    /// Year columns to read; empty means every year column divisible by 5.
    pub years: Vec<i32>,
    pub sectors: Vec<String>,
    pub economy_column: String,
    pub sector_column: String,
    pub sub_sector_column: String,
    pub scenario_column: String,
    pub fuel_column: String,
    pub label_column: String,
    pub chunk_size: usize,
    /// Last year whose subtotals are flagged by `subtotal_layout`; later years
    /// use `subtotal_results`.
    pub subtotal_boundary_year: i32,
    /// Restrict output to the registered economies and pad missing ones with
    /// empty profiles.
    pub known_economies_only: bool,
    pub exports_negative: bool,
}

impl Default for BalanceOptions {
    fn default() -> Self {
        Self {
            scenario: "reference".into(),
            years: Vec::new(),
            sectors: DEFAULT_SECTORS.iter().map(|sector| sector.to_string()).collect(),
            economy_column: "economy".into(),
            sector_column: "sectors".into(),
            sub_sector_column: "sub1sectors".into(),
            scenario_column: "scenarios".into(),
            fuel_column: "fuels".into(),
            label_column: "economy_name".into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            subtotal_boundary_year: 2022,
            known_economies_only: false,
            exports_negative: true,
        }
    }
}

/// Column positions resolved once from the header row.
#[derive(Debug, Clone)]
struct BalanceColumns {
    economy: usize,
    sector: usize,
    scenario: usize,
    fuel: usize,
    sub_sector: Option<usize>,
    label: Option<usize>,
    subtotal_layout: Option<usize>,
    subtotal_results: Option<usize>,
    years: Vec<(i32, usize)>,
}

impl BalanceColumns {
    fn resolve(reader: &TableReader, options: &BalanceOptions, source_name: &str) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |name: &str| {
            let position = reader.column(name);
            if position.is_none() {
                missing.push(name.to_string());
            }
            position.unwrap_or_default()
        };
        let economy = required(&options.economy_column);
        let sector = required(&options.sector_column);
        let scenario = required(&options.scenario_column);
        let fuel = required(&options.fuel_column);

        let years = select_years(reader.headers(), &options.years);
        let mut year_columns = Vec::with_capacity(years.len());
        for year in years {
            match reader.column(&year.to_string()) {
                Some(position) => year_columns.push((year, position)),
                None => missing.push(year.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(PrepError::MissingColumns {
                source_name: source_name.to_string(),
                columns: missing,
            });
        }
        if year_columns.is_empty() {
            return Err(PrepError::NoYears {
                source_name: source_name.to_string(),
            });
        }

        let label = reader.column(&options.label_column);
        if label.is_none() && !options.label_column.is_empty() {
            warn!(
                column = %options.label_column,
                "label column not found; using economy codes for names"
            );
        }

        Ok(Self {
            economy,
            sector,
            scenario,
            fuel,
            sub_sector: reader.column(&options.sub_sector_column),
            label,
            subtotal_layout: reader.column(SUBTOTAL_LAYOUT_COLUMN),
            subtotal_results: reader.column(SUBTOTAL_RESULTS_COLUMN),
            years: year_columns,
        })
    }
}

/// Year columns to read: the explicit list when given, else every numeric
/// header divisible by 5.
pub fn select_years(headers: &[String], explicit: &[i32]) -> Vec<i32> {
    if !explicit.is_empty() {
        return explicit.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    }
    headers
        .iter()
        .filter(|header| !header.is_empty() && header.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|header| header.parse::<i32>().ok())
        .filter(|year| year % 5 == 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One balance row, borrowed from the raw cells.
struct BalanceRow<'a> {
    economy: &'a str,
    sector: &'a str,
    sub_sector: Option<&'a str>,
    scenario: &'a str,
    fuel: &'a str,
    label: Option<&'a str>,
    subtotal_layout: Option<&'a str>,
    subtotal_results: Option<&'a str>,
}

impl<'a> BalanceRow<'a> {
    fn from_cells(cells: &'a [String], columns: &BalanceColumns) -> Self {
        let cell = |index: usize| cells.get(index).map(|value| value.trim()).unwrap_or("");
        let optional = |index: Option<usize>| index.map(cell);
        Self {
            economy: cell(columns.economy),
            sector: cell(columns.sector),
            sub_sector: optional(columns.sub_sector),
            scenario: cell(columns.scenario),
            fuel: cell(columns.fuel),
            label: optional(columns.label).filter(|label| !label.is_empty()),
            subtotal_layout: optional(columns.subtotal_layout),
            subtotal_results: optional(columns.subtotal_results),
        }
    }

    /// Subtotal rows repeat their children; the flag column that marks them
    /// changes after the boundary year. Rows are kept only when the flag reads
    /// as false.
    fn is_subtotal(&self, year: i32, boundary_year: i32) -> bool {
        let flag = if year <= boundary_year {
            self.subtotal_layout
        } else {
            self.subtotal_results
        };
        match flag {
            Some(flag) => parse_flag(flag) != Some(false),
            None => false,
        }
    }
}

/// Reads a balance table (CSV or first workbook sheet) into per-year
/// accumulation tables.
pub fn extract_balance(
    path: &Path,
    taxonomy: &Taxonomy,
    options: &BalanceOptions,
) -> Result<Extraction> {
    let source_name = format!("balance {}", path.display());
    let mut reader = TableReader::open(path)?;
    let columns = BalanceColumns::resolve(&reader, options, &source_name)?;
    let years: Vec<i32> = columns.years.iter().map(|(year, _)| *year).collect();
    info!(?years, scenario = %options.scenario, "reading balance table");

    let scenario = normalize_label(&options.scenario);
    let sector_filter: HashSet<String> = options
        .sectors
        .iter()
        .map(String::as_str)
        .chain(STATS_SECTORS)
        .chain(TFC_PARTS)
        .map(normalize_label)
        .collect();

    let mut extraction = Extraction::new(
        Source::Apec,
        options.scenario.clone(),
        options.exports_negative,
        &years,
    );
    let mut rows = 0usize;
    loop {
        let chunk = reader.next_chunk(options.chunk_size)?;
        if chunk.is_empty() {
            break;
        }
        rows += chunk.len();
        for cells in &chunk {
            let row = BalanceRow::from_cells(cells, &columns);
            if normalize_label(row.scenario) != scenario
                || !sector_filter.contains(&normalize_label(row.sector))
            {
                continue;
            }
            ingest_row(&mut extraction, &row, cells, &columns, taxonomy, options)?;
        }
        debug!(rows, "balance chunk consumed");
    }

    if options.known_economies_only {
        for year in &years {
            if let Some(accumulator) = extraction.year_mut(*year) {
                for (code, name) in &taxonomy.economies.names {
                    accumulator.register(Economy::new(code.clone(), name.clone(), Source::Apec));
                }
            }
        }
    }
    info!(
        rows,
        skipped = reader.skipped_records(),
        "balance table consumed"
    );
    Ok(extraction)
}

fn ingest_row(
    extraction: &mut Extraction,
    row: &BalanceRow<'_>,
    cells: &[String],
    columns: &BalanceColumns,
    taxonomy: &Taxonomy,
    options: &BalanceOptions,
) -> Result<()> {
    if row.economy.is_empty() {
        return Ok(());
    }
    if options.known_economies_only && !taxonomy.is_known_economy(row.economy) {
        return Ok(());
    }
    let Some(sector) = taxonomy.classify_balance_sector(row.sector, row.sub_sector) else {
        return Ok(());
    };
    let fuel = match sector {
        Sector::ElectricityGeneration => {
            taxonomy.classify_fuel(row.fuel, Vocabulary::BalanceElectricity)?
        }
        _ => taxonomy.classify_fuel(row.fuel, Vocabulary::Balance)?,
    };
    let name = taxonomy
        .economy_name(row.economy)
        .or(row.label)
        .unwrap_or(row.economy);

    for (year, position) in &columns.years {
        if row.is_subtotal(*year, options.subtotal_boundary_year) {
            continue;
        }
        let Some(value) = cells.get(*position).and_then(|cell| parse_value(cell)) else {
            continue;
        };
        let value = match sector {
            Sector::ElectricityGeneration => EnergyUnit::GigawattHour.to_pj(value),
            _ => value,
        };
        if let Some(accumulator) = extraction.year_mut(*year) {
            accumulator.register(Economy::new(row.economy, name, Source::Apec));
            accumulator.add(row.economy, sector, fuel, value);
        }
    }
    Ok(())
}
