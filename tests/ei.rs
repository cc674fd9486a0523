use std::collections::BTreeMap;
use std::path::Path;

use energy_prep::PrepError;
use energy_prep::assemble::assemble;
use energy_prep::extract::ei::{
    ELECTRICITY_SHEET, EiOptions, SUPPLY_SHEET, ei_code, extract_ei, read_electricity_overlay,
};
use energy_prep::model::{Dataset, Economy, Fuel, Profile, Sector, SectorMap, Source};
use energy_prep::overlay::{OverlayOptions, name_lookup, overlay_electricity, resolve_name};
use energy_prep::profile::{Finalized, ProfileContext, finalize};
use energy_prep::taxonomy::Taxonomy;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const SUPPLY_HEADERS: [&str; 6] = [
    "Oil",
    "Natural Gas",
    "Coal",
    "Nuclear energy",
    "Hydro electric",
    "Renew-\nables",
];

const ELECTRICITY_HEADERS: [&str; 7] = [
    "Oil",
    "Natural Gas",
    "Coal",
    "Nuclear energy",
    "Hydro electric",
    "Renewables",
    "Other#",
];

type SheetRows<'a> = &'a [(&'a str, &'a [f64])];

fn write_sheet(workbook: &mut Workbook, name: &str, headers: &[&str], rows: SheetRows<'_>) {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).expect("sheet named");
    worksheet
        .write_string(0, 0, "Statistical review by fuel")
        .expect("title written");
    worksheet.write_string(2, 0, "Units").expect("header written");
    for block in 0..2 {
        for (index, header) in headers.iter().enumerate() {
            let col = (1 + block * headers.len() + index) as u16;
            worksheet
                .write_string(2, col, *header)
                .expect("header written");
        }
    }
    for (offset, (label, values)) in rows.iter().enumerate() {
        let row = (3 + offset) as u32;
        worksheet.write_string(row, 0, *label).expect("label written");
        for (index, value) in values.iter().enumerate() {
            worksheet
                .write_number(row, (1 + index) as u16, *value)
                .expect("value written");
        }
    }
}

fn write_review(path: &Path, electricity_headers: &[&str]) {
    let supply: SheetRows<'_> = &[
        (
            "US",
            &[35.0, 32.0, 8.0, 8.0, 2.0, 5.0, 36.0, 31.0, 7.0, 8.0, 2.0, 6.0],
        ),
        ("Brazil", &[4.5, 1.5, 0.7, 0.1, 3.8, 2.6]),
        ("Other Europe", &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
        (
            "Total World",
            &[190.0, 140.0, 160.0, 25.0, 40.0, 45.0, 195.0, 141.0, 165.0, 26.0, 41.0, 50.0],
        ),
        ("", &[1.0]),
    ];
    let electricity: SheetRows<'_> = &[
        (
            "US",
            &[
                100.0, 1800.0, 600.0, 770.0, 240.0, 700.0, 30.0, 90.0, 1850.0, 580.0, 780.0,
                250.0, 760.0, 30.0,
            ],
        ),
        ("Brazil", &[5.0, 90.0, 20.0, 14.0, 420.0, 160.0, 10.0]),
        ("Atlantis", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
        ("Total World", &[700.0, 6600.0, 10400.0, 2700.0, 4200.0, 4700.0, 300.0]),
    ];

    let mut workbook = Workbook::new();
    write_sheet(&mut workbook, SUPPLY_SHEET, &SUPPLY_HEADERS, supply);
    write_sheet(&mut workbook, ELECTRICITY_SHEET, electricity_headers, electricity);
    workbook.save(path).expect("workbook saved");
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn find<'a>(profiles: &'a [Profile], code: &str) -> &'a Profile {
    profiles
        .iter()
        .find(|profile| profile.code() == code)
        .expect("profile present")
}

#[test]
fn economy_names_become_stable_codes() {
    assert_eq!(ei_code("US"), "EI_US");
    assert_eq!(ei_code("Trinidad & Tobago"), "EI_TRINIDAD_TOBAGO");
    assert_eq!(ei_code(" China Hong Kong SAR "), "EI_CHINA_HONG_KONG_SAR");
}

#[test]
fn review_workbook_yields_supply_and_generation() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("review.xlsx");
    write_review(&path, &ELECTRICITY_HEADERS);

    let extraction =
        extract_ei(&path, &Taxonomy::default(), &EiOptions::default()).expect("EI extracted");
    assert_eq!(extraction.years().collect::<Vec<_>>(), vec![2023, 2024]);
    let finished: BTreeMap<i32, Finalized> = extraction.finish();

    let base = &finished[&2023].profiles;
    let codes: Vec<&str> = base.iter().map(Profile::code).collect();
    assert_eq!(codes, vec!["EI_ATLANTIS", "EI_BRAZIL", "EI_US"]);

    let us = find(base, "EI_US");
    assert_eq!(us.name(), "US");
    assert_eq!(us.source(), Source::Ei);
    assert_close(us.metrics().tpes, 90_000.0);
    assert_close(us.metrics().elec_gen, 4_240.0 * 3.6);
    let generation = us
        .sectors()
        .get(Sector::ElectricityGeneration)
        .expect("generation sector");
    assert_close(generation[&Fuel::RenewablesAndOthers], 730.0 * 3.6);
    let supply = us
        .sectors()
        .get(Sector::TotalPrimarySupply)
        .expect("supply sector");
    assert_close(supply[&Fuel::RenewablesAndOthers], 5_000.0);

    let brazil = find(base, "EI_BRAZIL");
    assert_close(brazil.metrics().tpes, 13_200.0);

    let latest = &finished[&2024].profiles;
    assert_eq!(latest.len(), 1);
    assert_close(find(latest, "EI_US").metrics().tpes, 90_000.0);
}

#[test]
fn missing_fuel_header_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("review.xlsx");
    write_review(&path, &ELECTRICITY_HEADERS[..6]);

    match extract_ei(&path, &Taxonomy::default(), &EiOptions::default()) {
        Err(PrepError::MissingColumns { columns, .. }) => assert_eq!(columns, vec!["other#"]),
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn missing_sheet_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("review.xlsx");
    write_review(&path, &ELECTRICITY_HEADERS);
    let options = EiOptions {
        supply_sheet: "Primary energy".into(),
        ..EiOptions::default()
    };

    assert!(matches!(
        extract_ei(&path, &Taxonomy::default(), &options),
        Err(PrepError::InvalidWorkbook(_))
    ));
}

fn base_profile(code: &str, name: &str, sectors: SectorMap, year: i32) -> Profile {
    let (profile, _) = finalize(
        Economy::new(code, name, Source::Un),
        sectors,
        &ProfileContext::new(year, true),
    );
    profile
}

fn base_dataset() -> Dataset {
    let mut per_year = BTreeMap::new();
    for year in [2010, 2020] {
        let mut usa = SectorMap::new();
        usa.add(Sector::Production, Fuel::Coal, 500.0);
        usa.add(Sector::ElectricityGeneration, Fuel::Coal, 10.0);
        let mut brazil = SectorMap::new();
        brazil.add(Sector::Production, Fuel::Oil, 100.0);
        let mut australia = SectorMap::new();
        australia.add(Sector::Production, Fuel::Coal, 50.0);
        per_year.insert(
            year,
            vec![
                base_profile("20_USA", "USA", usa, year),
                base_profile("UN_76", "Brazil", brazil, year),
                base_profile("01_AUS", "Australia", australia, year),
            ],
        );
    }
    assemble(per_year, Some(2020), "historical", "UN").expect("base assembled")
}

#[test]
fn overlay_names_follow_aliases() {
    let taxonomy = Taxonomy::default();
    let dataset = base_dataset();
    let lookup = name_lookup(&dataset, &taxonomy);

    assert_eq!(
        resolve_name(&lookup, "US", &taxonomy).map(String::as_str),
        Some("20_USA")
    );
    assert_eq!(
        resolve_name(&lookup, "United States of America", &taxonomy).map(String::as_str),
        Some("20_USA")
    );
    assert_eq!(
        resolve_name(&lookup, " brazil ", &taxonomy).map(String::as_str),
        Some("UN_76")
    );
    assert_eq!(resolve_name(&lookup, "Atlantis", &taxonomy), None);
}

#[test]
fn overlay_replaces_generation_and_drops_uncovered_economies() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("review.xlsx");
    write_review(&path, &ELECTRICITY_HEADERS);
    let taxonomy = Taxonomy::default();

    let electricity = read_electricity_overlay(&path, &taxonomy, &EiOptions::default())
        .expect("overlay rows read");
    assert_eq!(electricity.year, 2023);
    let names: Vec<&str> = electricity.rows.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["US", "Brazil", "Atlantis"]);

    let base = base_dataset();
    let overlaid = overlay_electricity(&base, &electricity, &taxonomy, &OverlayOptions::default())
        .expect("overlay applied");

    assert_eq!(overlaid.matched, vec!["20_USA", "UN_76"]);
    let dataset = &overlaid.dataset;
    assert_eq!(dataset.years, vec![2010, 2020]);
    assert_eq!(dataset.default_year, 2020);
    assert_eq!(dataset.scenario, "UN (2010/2020) + EI electricity (2023)");

    for year in &dataset.years {
        let profiles = &dataset.datasets[year].profiles;
        let codes: Vec<&str> = profiles.iter().map(Profile::code).collect();
        assert_eq!(codes, vec!["20_USA", "UN_76"]);

        let usa = find(profiles, "20_USA");
        assert_eq!(usa.source(), Source::UnEi);
        assert_eq!(usa.name(), "USA");
        assert_close(usa.metrics().elec_gen, 4_240.0 * 3.6);
        assert_close(usa.metrics().tpes, 500.0);
        let generation = usa
            .sectors()
            .get(Sector::ElectricityGeneration)
            .expect("generation sector");
        assert_close(generation[&Fuel::Coal], 600.0 * 3.6);

        let brazil = find(profiles, "UN_76");
        assert_close(brazil.metrics().elec_gen, 719.0 * 3.6);
        assert_close(brazil.metrics().tpes, 100.0);
    }
}

#[test]
fn overlay_scenario_can_be_named() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("review.xlsx");
    write_review(&path, &ELECTRICITY_HEADERS);
    let taxonomy = Taxonomy::default();
    let electricity = read_electricity_overlay(&path, &taxonomy, &EiOptions::default())
        .expect("overlay rows read");
    let options = OverlayOptions {
        scenario: Some("combined".into()),
        ..OverlayOptions::default()
    };

    let overlaid = overlay_electricity(&base_dataset(), &electricity, &taxonomy, &options)
        .expect("overlay applied");
    assert_eq!(overlaid.dataset.scenario, "combined");
}
