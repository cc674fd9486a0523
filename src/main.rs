use std::path::PathBuf;

use clap::{Parser, Subcommand};
use energy_prep::chart_meta::write_chart_meta;
use energy_prep::extract::balance::{BalanceOptions, DEFAULT_SECTORS};
use energy_prep::extract::ei::EiOptions;
use energy_prep::extract::un::UnOptions;
use energy_prep::io::table::DEFAULT_CHUNK_SIZE;
use energy_prep::overlay::OverlayOptions;
use energy_prep::shard::{DEFAULT_GROUP_SIZE, ShardOptions};
use energy_prep::taxonomy::Taxonomy;
use energy_prep::workflow::{self, WorkflowOptions};
use energy_prep::{PrepError, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| PrepError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let taxonomy = match &cli.taxonomy {
        Some(path) => Taxonomy::from_path(path)?,
        None => Taxonomy::default(),
    };

    match cli.command {
        Command::Balance(args) => {
            let options = args.balance_options();
            workflow::run_balance(
                &args.input,
                &args.output,
                &taxonomy,
                &options,
                args.year,
                &args.publish.shard_options(),
            )?;
            args.publish.write_chart_meta();
            Ok(())
        }
        Command::Un(args) => {
            let options = args.un_options();
            workflow::run_un(
                &args.input,
                &args.output,
                &taxonomy,
                &options,
                &args.publish.shard_options(),
            )?;
            args.publish.write_chart_meta();
            Ok(())
        }
        Command::Ei(args) => {
            workflow::run_ei(
                &args.input,
                &args.output,
                &taxonomy,
                &EiOptions::default(),
                &args.publish.shard_options(),
            )?;
            args.publish.write_chart_meta();
            Ok(())
        }
        Command::Overlay(args) => {
            let options = OverlayOptions {
                scenario: args.scenario_label,
                ..OverlayOptions::default()
            };
            workflow::run_overlay(
                &args.base,
                &args.workbook,
                &args.output,
                &taxonomy,
                &EiOptions::default(),
                &options,
                &args.publish.shard_options(),
            )?;
            args.publish.write_chart_meta();
            Ok(())
        }
        Command::Prep(args) => {
            let options = args.workflow_options();
            workflow::run_prep(&taxonomy, &options).map(|_| ())
        }
        Command::ChartMeta(args) => write_chart_meta(&args.output),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize energy balances into multi-year profile datasets."
)]
struct Cli {
    /// JSON file replacing the built-in classification tables.
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a dataset from a generic balance table (CSV or .xlsx).
    Balance(BalanceArgs),
    /// Build a dataset from a UN energy-statistics export.
    Un(UnArgs),
    /// Build a dataset from an Energy Institute workbook.
    Ei(EiArgs),
    /// Replace electricity generation of a dataset with workbook values.
    Overlay(OverlayArgs),
    /// Run the balance, UN and UN+EI preparation in one go.
    Prep(PrepArgs),
    /// Write the static chart metadata file.
    ChartMeta(ChartMetaArgs),
}

#[derive(clap::Args)]
struct PublishArgs {
    /// Number of economies per shard file.
    #[arg(long, default_value_t = DEFAULT_GROUP_SIZE)]
    group_size: usize,

    /// Where to write the chart metadata file.
    #[arg(long, default_value = "public/data/chart-meta.json")]
    chart_meta: PathBuf,

    /// Do not write the chart metadata file.
    #[arg(long)]
    skip_chart_meta: bool,
}

impl PublishArgs {
    fn shard_options(&self) -> ShardOptions {
        ShardOptions {
            group_size: self.group_size,
        }
    }

    /// Writes the chart metadata unless skipped. A failure is logged and
    /// reported as `false`.
    fn write_chart_meta(&self) -> bool {
        if self.skip_chart_meta {
            return false;
        }
        match write_chart_meta(&self.chart_meta) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    path = %self.chart_meta.display(),
                    %error,
                    "failed to write chart metadata"
                );
                false
            }
        }
    }
}

#[derive(clap::Args)]
struct BalanceArgs {
    /// Balance table path.
    #[arg(long)]
    input: PathBuf,

    /// Output dataset path.
    #[arg(long, default_value = "public/data/energy-profiles-apec.json")]
    output: PathBuf,

    /// Scenario to keep.
    #[arg(long, default_value = "reference")]
    scenario: String,

    /// Year columns to read; defaults to every fifth year present.
    #[arg(long, num_args = 1..)]
    years: Vec<i32>,

    /// Preferred default year of the dataset.
    #[arg(long, default_value_t = 2020)]
    year: i32,

    /// Sectors to keep in addition to the statistics sectors.
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_SECTORS.map(String::from))]
    sectors: Vec<String>,

    #[arg(long, default_value = "economy")]
    economy_column: String,

    #[arg(long, default_value = "sectors")]
    sector_column: String,

    #[arg(long, default_value = "sub1sectors")]
    sub_sector_column: String,

    #[arg(long, default_value = "scenarios")]
    scenario_column: String,

    #[arg(long, default_value = "fuels")]
    fuel_column: String,

    /// Column holding readable economy names.
    #[arg(long, default_value = "economy_name")]
    label_column: String,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Only keep registered economies and emit empty profiles for missing ones.
    #[arg(long)]
    known_economies_only: bool,

    #[command(flatten)]
    publish: PublishArgs,
}

impl BalanceArgs {
    fn balance_options(&self) -> BalanceOptions {
        BalanceOptions {
            scenario: self.scenario.clone(),
            years: self.years.clone(),
            sectors: self.sectors.clone(),
            economy_column: self.economy_column.clone(),
            sector_column: self.sector_column.clone(),
            sub_sector_column: self.sub_sector_column.clone(),
            scenario_column: self.scenario_column.clone(),
            fuel_column: self.fuel_column.clone(),
            label_column: self.label_column.clone(),
            chunk_size: self.chunk_size,
            known_economies_only: self.known_economies_only,
            ..BalanceOptions::default()
        }
    }
}

#[derive(clap::Args)]
struct UnArgs {
    /// UN export path (CSV or .xlsx).
    #[arg(long)]
    input: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-un.json")]
    output: PathBuf,

    #[arg(long, num_args = 1.., default_values_t = [2010, 2020])]
    years: Vec<i32>,

    /// Scenario label stored in the dataset.
    #[arg(long, default_value = "historical")]
    scenario: String,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[command(flatten)]
    publish: PublishArgs,
}

impl UnArgs {
    fn un_options(&self) -> UnOptions {
        UnOptions {
            years: self.years.clone(),
            scenario: self.scenario.clone(),
            chunk_size: self.chunk_size,
            ..UnOptions::default()
        }
    }
}

#[derive(clap::Args)]
struct EiArgs {
    /// Energy Institute workbook path.
    #[arg(long)]
    input: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-ei.json")]
    output: PathBuf,

    #[command(flatten)]
    publish: PublishArgs,
}

#[derive(clap::Args)]
struct OverlayArgs {
    /// Published dataset to overlay.
    #[arg(long, default_value = "public/data/energy-profiles-un.json")]
    base: PathBuf,

    /// Energy Institute workbook providing electricity generation.
    #[arg(long, default_value = "EI-Stats-Review-ALL-data.xlsx")]
    workbook: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-un-ei.json")]
    output: PathBuf,

    /// Scenario label of the combined dataset.
    #[arg(long)]
    scenario_label: Option<String>,

    #[command(flatten)]
    publish: PublishArgs,
}

#[derive(clap::Args)]
struct PrepArgs {
    #[arg(long, default_value = "data/apec_energy.csv")]
    balance_input: PathBuf,

    #[arg(long, default_value = "data/energy_obs_labeled.csv")]
    un_input: PathBuf,

    #[arg(long, default_value = "EI-Stats-Review-ALL-data.xlsx")]
    ei_workbook: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-apec.json")]
    output: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-un.json")]
    un_output: PathBuf,

    #[arg(long, default_value = "public/data/energy-profiles-un-ei.json")]
    un_ei_output: PathBuf,

    #[arg(long, default_value = "reference")]
    scenario: String,

    /// Preferred default year of the balance dataset.
    #[arg(long, default_value_t = 2020)]
    year: i32,

    /// Balance year columns to read; defaults to every fifth year present.
    #[arg(long, num_args = 1..)]
    years: Vec<i32>,

    #[arg(long, num_args = 1.., default_values_t = [2010, 2020])]
    un_years: Vec<i32>,

    /// Scenario label of the UN dataset.
    #[arg(long, default_value = "historical")]
    un_scenario: String,

    /// Keep the UN-only dataset after the UN+EI overlay succeeds.
    #[arg(long)]
    keep_un_output: bool,

    #[command(flatten)]
    publish: PublishArgs,
}

impl PrepArgs {
    fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            balance_input: self.balance_input.clone(),
            balance_output: self.output.clone(),
            un_input: self.un_input.clone(),
            un_output: self.un_output.clone(),
            ei_workbook: self.ei_workbook.clone(),
            un_ei_output: self.un_ei_output.clone(),
            chart_meta_output: self.publish.chart_meta.clone(),
            skip_chart_meta: self.publish.skip_chart_meta,
            keep_un_output: self.keep_un_output,
            default_year: self.year,
            balance: BalanceOptions {
                scenario: self.scenario.clone(),
                years: self.years.clone(),
                ..BalanceOptions::default()
            },
            un: UnOptions {
                years: self.un_years.clone(),
                scenario: self.un_scenario.clone(),
                ..UnOptions::default()
            },
            shards: self.publish.shard_options(),
            ..WorkflowOptions::default()
        }
    }
}

#[derive(clap::Args)]
struct ChartMetaArgs {
    #[arg(long, default_value = "public/data/chart-meta.json")]
    output: PathBuf,
}
