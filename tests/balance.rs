use std::fs;
use std::path::Path;

use energy_prep::PrepError;
use energy_prep::assemble::{assemble, profiles_by_year};
use energy_prep::extract::balance::{BalanceOptions, extract_balance, select_years};
use energy_prep::io::table::TableReader;
use energy_prep::model::{Dataset, Fuel, Profile, Sector, Source};
use energy_prep::shard::{ShardOptions, index_path};
use energy_prep::taxonomy::Taxonomy;
use energy_prep::workflow;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("fixture written");
}

fn build(path: &Path, options: &BalanceOptions) -> Dataset {
    let extraction =
        extract_balance(path, &Taxonomy::default(), options).expect("balance extracted");
    assemble(
        profiles_by_year(extraction.finish()),
        Some(2020),
        &options.scenario,
        "balance",
    )
    .expect("dataset assembled")
}

fn profile<'a>(dataset: &'a Dataset, year: i32, code: &str) -> &'a Profile {
    dataset.datasets[&year]
        .profiles
        .iter()
        .find(|profile| profile.code() == code)
        .expect("profile present")
}

fn value(profile: &Profile, sector: Sector, fuel: Fuel) -> Option<f64> {
    profile.sectors().get(sector)?.get(&fuel).copied()
}

#[test]
fn two_row_balance_produces_one_profile() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,sectors,scenarios,fuels,2020\n\
         E1,07_total_primary_energy_supply,reference,coal,50\n\
         E1,12_total_final_consumption,reference,coal,30\n",
    );

    let dataset = build(&input, &BalanceOptions::default());

    assert_eq!(dataset.years, vec![2020]);
    assert_eq!(dataset.default_year, 2020);
    assert_eq!(dataset.datasets[&2020].profiles.len(), 1);
    let e1 = profile(&dataset, 2020, "E1");
    assert_eq!(e1.name(), "E1");
    assert_eq!(e1.source(), Source::Apec);
    assert_eq!(e1.metrics().tpes, 50.0);
    assert_eq!(e1.metrics().tfc, 30.0);
    assert_eq!(e1.metrics().net_imports, 0.0);
}

#[test]
fn balance_rows_are_filtered_converted_and_routed() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,economy_name,scenarios,sectors,sub1sectors,fuels,subtotal_layout,subtotal_results,2020,2025\n\
         01_AUS,Aussie,reference,07_total_primary_energy_supply,x,01_coal,False,False,100,110\n\
         01_AUS,Aussie,Reference,07_total_primary_energy_supply,x,08_gas,False,True,20,25\n\
         01_AUS,Aussie,reference,07_total_primary_energy_supply,x,19_total,True,True,500,600\n\
         01_AUS,Aussie,target,07_total_primary_energy_supply,x,01_coal,False,False,999,999\n\
         01_AUS,Aussie,reference,14_industry_sector,x,01_coal,False,False,30,n/a\n\
         01_AUS,Aussie,reference,16_other_sector,16_01_buildings,08_gas,False,False,20,22\n\
         01_AUS,Aussie,reference,18_electricity_output_in_gwh,x,12_solar,False,False,1000,2000\n\
         01_AUS,Aussie,reference,02_imports,x,06_crude_oil_and_ngl,False,False,40,40\n\
         01_AUS,Aussie,reference,03_exports,x,06_crude_oil_and_ngl,False,False,-15,-10\n\
         01_AUS,Aussie,reference,10_losses_and_own_use,x,01_coal,False,False,7,7\n",
    );

    let dataset = build(&input, &BalanceOptions::default());
    assert_eq!(dataset.years, vec![2020, 2025]);

    let aus = profile(&dataset, 2020, "01_AUS");
    assert_eq!(aus.name(), "Australia");
    assert_eq!(aus.metrics().tpes, 120.0);
    assert_eq!(aus.metrics().tfc, 50.0);
    assert!((aus.metrics().elec_gen - 3.6).abs() < 1e-9);
    assert_eq!(aus.metrics().net_imports, 25.0);
    assert_eq!(value(aus, Sector::Buildings, Fuel::Gas), Some(20.0));
    assert_eq!(
        value(aus, Sector::TotalFinalConsumption, Fuel::Industry),
        Some(30.0)
    );
    assert_eq!(
        value(aus, Sector::TotalFinalConsumption, Fuel::Buildings),
        Some(20.0)
    );
    assert!(value(aus, Sector::ElectricityGeneration, Fuel::WindSolar).is_some());
    assert!(!aus.sectors().contains(Sector::Other));

    let later = profile(&dataset, 2025, "01_AUS");
    assert_eq!(later.metrics().tpes, 110.0);
    assert_eq!(value(later, Sector::Industry, Fuel::Coal), None);
    assert_eq!(later.metrics().tfc, 22.0);
}

#[test]
fn other_sector_counts_listed_sub_sectors_only() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,scenarios,sectors,sub1sectors,fuels,2020\n\
         01_AUS,reference,16_other_sector,x,08_gas,99\n\
         01_AUS,reference,16_other_sector,16_01_buildings,08_gas,20\n\
         01_AUS,reference,16_other_sector,16_02_agriculture_and_fishing,08_gas,4\n\
         01_AUS,reference,16_other_sector,16_05_nonspecified_others,08_gas,1\n\
         01_AUS,reference,16_other_sector,16_03_unlisted,08_gas,50\n",
    );

    let dataset = build(&input, &BalanceOptions::default());
    let aus = profile(&dataset, 2020, "01_AUS");

    assert_eq!(value(aus, Sector::Buildings, Fuel::Gas), Some(20.0));
    assert_eq!(value(aus, Sector::Other, Fuel::Gas), Some(5.0));
    assert_eq!(aus.metrics().tfc, 25.0);
}

#[test]
fn every_fifth_year_is_read_by_default() {
    let headers: Vec<String> = ["economy", "2019", "2020", "2021", "2025", "total"]
        .iter()
        .map(|header| header.to_string())
        .collect();
    assert_eq!(select_years(&headers, &[]), vec![2020, 2025]);
    assert_eq!(select_years(&headers, &[2021, 2019, 2021]), vec![2019, 2021]);
}

#[test]
fn missing_columns_are_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,sectors,scenarios,2020\nE1,07_total_primary_energy_supply,reference,1\n",
    );

    let error = extract_balance(&input, &Taxonomy::default(), &BalanceOptions::default())
        .expect_err("fuel column is required");
    match error {
        PrepError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["fuels"]),
        other => panic!("unexpected error: {other}"),
    }

    let no_years = temp_dir.path().join("no_years.csv");
    write_file(&no_years, "economy,sectors,scenarios,fuels,2021\n");
    assert!(matches!(
        extract_balance(&no_years, &Taxonomy::default(), &BalanceOptions::default()),
        Err(PrepError::NoYears { .. })
    ));
}

#[test]
fn known_economies_only_pads_missing_economies() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,sectors,scenarios,fuels,2020\n\
         08_JPN,07_total_primary_energy_supply,reference,01_coal,10\n\
         E1,07_total_primary_energy_supply,reference,01_coal,50\n",
    );
    let options = BalanceOptions {
        known_economies_only: true,
        ..BalanceOptions::default()
    };

    let dataset = build(&input, &options);
    let taxonomy = Taxonomy::default();
    let profiles = &dataset.datasets[&2020].profiles;

    assert_eq!(profiles.len(), taxonomy.economies.names.len());
    assert!(profiles.iter().all(|profile| profile.code() != "E1"));
    assert_eq!(profile(&dataset, 2020, "08_JPN").metrics().tpes, 10.0);
    assert!(profile(&dataset, 2020, "01_AUS").sectors().is_empty());
}

fn write_balance_workbook(path: &Path, rows: &[(&str, &str, f64)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in ["economy", "sectors", "scenarios", "fuels", "2020"]
        .iter()
        .enumerate()
    {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }
    for (index, (economy, sector, amount)) in rows.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_string(row, 0, *economy).expect("cell written");
        worksheet.write_string(row, 1, *sector).expect("cell written");
        worksheet.write_string(row, 2, "reference").expect("cell written");
        worksheet.write_string(row, 3, "01_coal").expect("cell written");
        worksheet.write_number(row, 4, *amount).expect("cell written");
    }
    workbook.save(path).expect("workbook saved");
}

#[test]
fn balance_workbook_matches_csv_input() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("balance.xlsx");
    write_balance_workbook(
        &xlsx_path,
        &[
            ("E1", "07_total_primary_energy_supply", 50.0),
            ("E1", "12_total_final_consumption", 30.0),
        ],
    );

    let dataset = build(&xlsx_path, &BalanceOptions::default());
    let e1 = profile(&dataset, 2020, "E1");
    assert_eq!(e1.metrics().tpes, 50.0);
    assert_eq!(e1.metrics().tfc, 30.0);
}

#[test]
fn workbook_rows_arrive_in_bounded_chunks() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("balance.xlsx");
    write_balance_workbook(
        &xlsx_path,
        &[
            ("E1", "07_total_primary_energy_supply", 50.0),
            ("E2", "07_total_primary_energy_supply", 20.0),
            ("E1", "07_total_primary_energy_supply", 5.5),
        ],
    );

    let mut reader = TableReader::open(&xlsx_path).expect("workbook opened");
    assert_eq!(reader.headers(), ["economy", "sectors", "scenarios", "fuels", "2020"]);
    let first = reader.next_chunk(2).expect("first chunk");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0][0], "E1");
    assert_eq!(first[1][4], "20");
    let second = reader.next_chunk(2).expect("second chunk");
    assert_eq!(
        second,
        vec![vec!["E1", "07_total_primary_energy_supply", "reference", "01_coal", "5.5"]]
    );
    assert!(reader.next_chunk(2).expect("exhausted").is_empty());

    let options = BalanceOptions {
        chunk_size: 1,
        ..BalanceOptions::default()
    };
    let dataset = build(&xlsx_path, &options);
    assert_eq!(profile(&dataset, 2020, "E1").metrics().tpes, 55.5);
    assert_eq!(profile(&dataset, 2020, "E2").metrics().tpes, 20.0);
}

#[test]
fn balance_run_writes_dataset_and_shards() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("balance.csv");
    write_file(
        &input,
        "economy,sectors,scenarios,fuels,2015,2020\n\
         E1,07_total_primary_energy_supply,reference,01_coal,40,50\n\
         E2,07_total_primary_energy_supply,reference,08_gas,5,6\n",
    );
    let output = temp_dir.path().join("out").join("profiles.json");

    let dataset = workflow::run_balance(
        &input,
        &output,
        &Taxonomy::default(),
        &BalanceOptions::default(),
        2030,
        &ShardOptions::default(),
    )
    .expect("balance run succeeded");

    assert_eq!(dataset.default_year, 2020);
    let written: Dataset =
        serde_json::from_str(&fs::read_to_string(&output).expect("dataset readable"))
            .expect("dataset parsed");
    assert_eq!(written, dataset);
    assert!(index_path(&output).is_file());
    assert!(output.with_file_name("profiles-2015-g1.json").is_file());
    assert!(output.with_file_name("profiles-2020-g1.json").is_file());
}
