//! End-to-end runs: extract a source, assemble its dataset and publish the
//! dataset file, its shards and index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::energy::prep::assemble::{assemble, profiles_by_year};
use crate::energy::prep::chart_meta::write_chart_meta;
use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::extract::Extraction;
use crate::energy::prep::extract::balance::{BalanceOptions, extract_balance};
use crate::energy::prep::extract::ei::{EiOptions, extract_ei, read_electricity_overlay};
use crate::energy::prep::extract::un::{UnOptions, extract_un};
use crate::energy::prep::io::json::{read_dataset, write_json};
use crate::energy::prep::model::Dataset;
use crate::energy::prep::overlay::{OverlayOptions, overlay_electricity};
use crate::energy::prep::shard::{ShardOptions, remove_dataset_outputs, write_shards};
use crate::energy::prep::taxonomy::Taxonomy;

/// Finalizes an extraction and writes the dataset, shards and index.
pub fn publish(
    extraction: Extraction,
    requested_default: Option<i32>,
    output: &Path,
    shards: &ShardOptions,
    source_name: &str,
) -> Result<Dataset> {
    let scenario = extraction.scenario.clone();
    let finalized = extraction.finish();
    let warning_count: usize = finalized.values().map(|year| year.warnings.len()).sum();
    if warning_count > 0 {
        warn!(
            source = source_name,
            warnings = warning_count,
            "metrics disagree with their sector sums"
        );
    }
    let dataset = assemble(
        profiles_by_year(finalized),
        requested_default,
        &scenario,
        source_name,
    )?;
    write_dataset(&dataset, output, shards)?;
    Ok(dataset)
}

/// Writes an assembled dataset with its shards and index.
pub fn write_dataset(dataset: &Dataset, output: &Path, shards: &ShardOptions) -> Result<()> {
    write_json(output, dataset)?;
    let index = write_shards(dataset, output, shards)?;
    info!(
        profiles = dataset.profile_count(),
        years = index.years.len(),
        "wrote dataset"
    );
    Ok(())
}

/// Builds the dataset of a generic balance table.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn run_balance(
    input: &Path,
    output: &Path,
    taxonomy: &Taxonomy,
    options: &BalanceOptions,
    default_year: i32,
    shards: &ShardOptions,
) -> Result<Dataset> {
    let extraction = extract_balance(input, taxonomy, options)?;
    publish(extraction, Some(default_year), output, shards, "balance")
}

/// Builds the dataset of a UN export.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn run_un(
    input: &Path,
    output: &Path,
    taxonomy: &Taxonomy,
    options: &UnOptions,
    shards: &ShardOptions,
) -> Result<Dataset> {
    let extraction = extract_un(input, taxonomy, options)?;
    let default_year = options.years.iter().copied().max();
    publish(extraction, default_year, output, shards, "UN")
}

/// Builds the dataset of an Energy Institute workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn run_ei(
    input: &Path,
    output: &Path,
    taxonomy: &Taxonomy,
    options: &EiOptions,
    shards: &ShardOptions,
) -> Result<Dataset> {
    let extraction = extract_ei(input, taxonomy, options)?;
    publish(extraction, None, output, shards, "EI")
}

/// Overlays workbook electricity generation onto a published dataset.
#[instrument(
    level = "info",
    skip_all,
    fields(base = %base.display(), workbook = %workbook.display(), output = %output.display())
)]
pub fn run_overlay(
    base: &Path,
    workbook: &Path,
    output: &Path,
    taxonomy: &Taxonomy,
    ei: &EiOptions,
    options: &OverlayOptions,
    shards: &ShardOptions,
) -> Result<Dataset> {
    let base_dataset = read_dataset(base)?;
    let electricity = read_electricity_overlay(workbook, taxonomy, ei)?;
    info!(
        rows = electricity.rows.len(),
        year = electricity.year,
        "read overlay electricity"
    );
    let overlaid = overlay_electricity(&base_dataset, &electricity, taxonomy, options)?;
    if !overlaid.warnings.is_empty() {
        warn!(
            warnings = overlaid.warnings.len(),
            "overlaid metrics disagree with their sector sums"
        );
    }
    write_dataset(&overlaid.dataset, output, shards)?;
    Ok(overlaid.dataset)
}

/// Inputs, outputs and per-source settings of a full preparation run.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub balance_input: PathBuf,
    pub balance_output: PathBuf,
    pub un_input: PathBuf,
    pub un_output: PathBuf,
    pub ei_workbook: PathBuf,
    pub un_ei_output: PathBuf,
    pub chart_meta_output: PathBuf,
    pub skip_chart_meta: bool,
    /// Keep the UN-only dataset after a successful overlay.
    pub keep_un_output: bool,
    pub default_year: i32,
    pub balance: BalanceOptions,
    pub un: UnOptions,
    pub ei: EiOptions,
    pub overlay: OverlayOptions,
    pub shards: ShardOptions,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            balance_input: PathBuf::from("data/apec_energy.csv"),
            balance_output: PathBuf::from("public/data/energy-profiles-apec.json"),
            un_input: PathBuf::from("data/energy_obs_labeled.csv"),
            un_output: PathBuf::from("public/data/energy-profiles-un.json"),
            ei_workbook: PathBuf::from("EI-Stats-Review-ALL-data.xlsx"),
            un_ei_output: PathBuf::from("public/data/energy-profiles-un-ei.json"),
            chart_meta_output: PathBuf::from("public/data/chart-meta.json"),
            skip_chart_meta: false,
            keep_un_output: false,
            default_year: 2020,
            balance: BalanceOptions::default(),
            un: UnOptions::default(),
            ei: EiOptions::default(),
            overlay: OverlayOptions::default(),
            shards: ShardOptions::default(),
        }
    }
}

/// Profile counts of the datasets a preparation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepSummary {
    pub produced: BTreeMap<&'static str, usize>,
    pub failures: Vec<String>,
}

impl PrepSummary {
    fn record(&mut self, name: &'static str, outcome: Result<Dataset>) -> bool {
        match outcome {
            Ok(dataset) => {
                self.produced.insert(name, dataset.profile_count());
                true
            }
            Err(error) => {
                warn!(source = name, %error, "source failed; continuing");
                self.failures.push(format!("{name}: {error}"));
                false
            }
        }
    }
}

/// Runs the balance and UN sources, then the UN+EI overlay.
///
/// A failing source is logged and skipped, and so is a failure to write the
/// chart metadata. The run fails only when no dataset was produced at all.
#[instrument(level = "info", skip_all)]
pub fn run_prep(taxonomy: &Taxonomy, options: &WorkflowOptions) -> Result<PrepSummary> {
    let mut summary = PrepSummary::default();

    let balance = run_balance(
        &options.balance_input,
        &options.balance_output,
        taxonomy,
        &options.balance,
        options.default_year,
        &options.shards,
    );
    summary.record("balance", balance);

    let un = run_un(
        &options.un_input,
        &options.un_output,
        taxonomy,
        &options.un,
        &options.shards,
    );
    if summary.record("UN", un) {
        let overlay = run_overlay(
            &options.un_output,
            &options.ei_workbook,
            &options.un_ei_output,
            taxonomy,
            &options.ei,
            &options.overlay,
            &options.shards,
        );
        if summary.record("UN+EI", overlay) && !options.keep_un_output {
            match remove_dataset_outputs(&options.un_output) {
                Ok(removed) => info!(removed, "removed UN-only outputs"),
                Err(error) => warn!(%error, "failed to remove UN-only outputs"),
            }
        }
    }

    if summary.produced.is_empty() {
        return Err(PrepError::NoDatasetProduced(summary.failures));
    }
    if !options.skip_chart_meta {
        if let Err(error) = write_chart_meta(&options.chart_meta_output) {
            warn!(%error, "failed to write chart metadata");
            summary.failures.push(format!("chart meta: {error}"));
        }
    }
    info!(produced = ?summary.produced, failures = summary.failures.len(), "preparation finished");
    Ok(summary)
}
