use energy_prep::accumulate::Accumulator;
use energy_prep::derive::{self, TPES_RULES, derive_metrics, derive_with_trace, evaluate};
use energy_prep::model::{Economy, Fuel, FuelMap, FuelValue, Sector, SectorMap, Source};
use energy_prep::profile::{ProfileContext, finalize};
use energy_prep::prune::{NOISE_THRESHOLD, aggregate_entries, prune_fuels, prune_sectors};
use energy_prep::taxonomy::{ProductionPolicy, Taxonomy, Vocabulary};
use energy_prep::validate::{MetricKind, check_metrics, tolerance};
use energy_prep::PrepError;

fn fuels(entries: &[(Fuel, f64)]) -> FuelMap {
    entries.iter().copied().collect()
}

#[test]
fn net_imports_agree_across_export_sign_conventions() {
    let mut magnitudes = SectorMap::new();
    magnitudes.add(Sector::Imports, Fuel::Oil, 10.0);
    magnitudes.add(Sector::Exports, Fuel::Oil, 4.0);

    let mut negatives = SectorMap::new();
    negatives.add(Sector::Imports, Fuel::Oil, 10.0);
    negatives.add(Sector::Exports, Fuel::Oil, -4.0);

    let from_magnitudes = derive_metrics(&magnitudes, false);
    let from_negatives = derive_metrics(&negatives, true);

    assert_eq!(from_magnitudes.net_imports, 6.0);
    assert_eq!(from_negatives.net_imports, 6.0);
    assert_eq!(
        from_magnitudes.net_imports_by_fuel,
        vec![FuelValue {
            fuel: Fuel::Oil,
            value: 6.0
        }]
    );
    assert_eq!(
        from_magnitudes.net_imports_by_fuel,
        from_negatives.net_imports_by_fuel
    );
}

#[test]
fn zero_trade_rows_take_precedence_over_reported_net_imports() {
    let mut sectors = SectorMap::new();
    sectors.add(Sector::Imports, Fuel::Gas, 0.0);
    sectors.add(Sector::NetImports, Fuel::Gas, 42.0);

    let (metrics, trace) = derive_with_trace(&sectors, false);
    assert_eq!(trace.net_imports, Some("imports_and_exports"));
    assert_eq!(metrics.net_imports, 0.0);

    sectors.remove(Sector::Imports);
    let (metrics, trace) = derive_with_trace(&sectors, false);
    assert_eq!(trace.net_imports, Some("reported_net_imports"));
    assert_eq!(metrics.net_imports, 42.0);
}

#[test]
fn production_takes_precedence_over_primary_supply() {
    let mut sectors = SectorMap::new();
    sectors.add(Sector::Production, Fuel::Coal, 60.0);
    sectors.add(Sector::Production, Fuel::Gas, 40.0);
    sectors.add(Sector::TotalPrimarySupply, Fuel::Coal, 120.0);

    assert_eq!(derive_metrics(&sectors, false).tpes, 100.0);
    assert_eq!(
        evaluate(TPES_RULES, &sectors, false).map(|(name, _)| name),
        Some("production")
    );

    sectors.insert(Sector::Production, FuelMap::new());
    assert_eq!(derive_metrics(&sectors, false).tpes, 120.0);
}

#[test]
fn final_consumption_prefers_end_use_sectors() {
    let mut sectors = SectorMap::new();
    sectors.add(Sector::TotalFinalConsumption, Fuel::Oil, 99.0);
    assert_eq!(derive_metrics(&sectors, false).tfc, 99.0);

    sectors.add(Sector::Industry, Fuel::Coal, 30.0);
    sectors.add(Sector::Transport, Fuel::Oil, 50.0);
    assert_eq!(derive_metrics(&sectors, false).tfc, 80.0);
    assert_eq!(derive::end_use_total(&sectors, false), Some(80.0));
}

#[test]
fn pruning_drops_entries_below_one_percent_of_the_largest() {
    let pruned = prune_fuels(&fuels(&[(Fuel::Coal, 100.0), (Fuel::Oil, 0.5)]), NOISE_THRESHOLD);
    assert_eq!(pruned, fuels(&[(Fuel::Coal, 100.0)]));

    let negative = prune_fuels(
        &fuels(&[(Fuel::Coal, -100.0), (Fuel::Oil, 1.0), (Fuel::Gas, 0.2)]),
        NOISE_THRESHOLD,
    );
    assert_eq!(negative, fuels(&[(Fuel::Coal, -100.0), (Fuel::Oil, 1.0)]));

    let zeros = fuels(&[(Fuel::Coal, 0.0), (Fuel::Oil, 0.0)]);
    assert_eq!(prune_fuels(&zeros, NOISE_THRESHOLD), zeros);
}

#[test]
fn pruned_final_consumption_is_the_end_use_view() {
    let mut raw = SectorMap::new();
    raw.add(Sector::TotalFinalConsumption, Fuel::Oil, 80.0);
    raw.add(Sector::Industry, Fuel::Coal, 30.0);
    raw.add(Sector::Industry, Fuel::Oil, 10.0);
    raw.add(Sector::Buildings, Fuel::Gas, 25.0);
    raw.add(Sector::Other, Fuel::Oil, 5.0);

    let pruned = prune_sectors(&raw, NOISE_THRESHOLD);
    assert_eq!(
        pruned.get(Sector::TotalFinalConsumption),
        Some(&fuels(&[
            (Fuel::Industry, 40.0),
            (Fuel::Buildings, 25.0),
            (Fuel::Others, 5.0),
        ]))
    );
}

#[test]
fn aggregation_sums_labels_sharing_a_bucket() {
    let taxonomy = Taxonomy::default();
    let entries = [("Renewables", 10.0), ("Other#", 2.5), ("Coal", 7.0)];
    let aggregated = aggregate_entries(entries, |label| {
        taxonomy.classify_fuel(label, Vocabulary::EiElectricity)
    })
    .expect("labels classified");

    assert_eq!(
        aggregated,
        fuels(&[(Fuel::Coal, 7.0), (Fuel::RenewablesAndOthers, 12.5)])
    );
}

#[test]
fn closed_vocabulary_rejects_unknown_fuels() {
    let taxonomy = Taxonomy::default();
    let error = taxonomy
        .classify_fuel("Unobtainium", Vocabulary::Un)
        .expect_err("unknown UN label must fail");
    match error {
        PrepError::UnmappedLabel { label, .. } => assert_eq!(label, "Unobtainium"),
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(
        taxonomy
            .classify_fuel("  Hard Coal ", Vocabulary::Un)
            .expect("case and whitespace are ignored"),
        Fuel::Coal
    );
}

#[test]
fn open_vocabulary_falls_back_to_other() {
    let taxonomy = Taxonomy::default();
    assert_eq!(
        taxonomy
            .classify_fuel("99_mystery_fuel", Vocabulary::Balance)
            .expect("open vocabulary never fails"),
        Fuel::Other
    );
    assert_eq!(
        taxonomy
            .classify_fuel("01_coal", Vocabulary::Balance)
            .expect("known balance fuel"),
        Fuel::Coal
    );
}

#[test]
fn production_policy_is_strict() {
    let taxonomy = Taxonomy::default();
    assert_eq!(
        taxonomy.production_policy("Motor Gasoline").expect("classified"),
        ProductionPolicy::Drop
    );
    assert_eq!(
        taxonomy.production_policy("hard coal").expect("classified"),
        ProductionPolicy::Keep
    );
    assert!(matches!(
        taxonomy.production_policy("brand new product"),
        Err(PrepError::UnclassifiedProductionLabel(_))
    ));
}

#[test]
fn unknown_sector_labels_are_out_of_interest() {
    let taxonomy = Taxonomy::default();
    assert_eq!(
        taxonomy.classify_sector("Stock changes (unknown)", Vocabulary::Un),
        None
    );
    assert_eq!(
        taxonomy.classify_sector("Imports", Vocabulary::Un),
        Some(Sector::Imports)
    );
    assert_eq!(
        taxonomy.classify_balance_sector("16_other_sector", Some("16_01_buildings")),
        Some(Sector::Buildings)
    );
    assert_eq!(
        taxonomy.classify_balance_sector("16_other_sector", Some("16_02_agriculture_and_fishing")),
        Some(Sector::Other)
    );
    assert_eq!(
        taxonomy.classify_balance_sector("16_other_sector", Some("16_05_nonspecified_others")),
        Some(Sector::Other)
    );
    assert_eq!(taxonomy.classify_balance_sector("16_other_sector", Some("x")), None);
    assert_eq!(
        taxonomy.classify_balance_sector("16_other_sector", Some("16_03_fishing")),
        None
    );
    assert_eq!(
        taxonomy.classify_balance_sector("16_other_sector", None),
        Some(Sector::Other)
    );
    assert_eq!(
        taxonomy.classify_balance_sector("14_industry_sector", Some("x")),
        Some(Sector::Industry)
    );
}

#[test]
fn accumulation_is_independent_of_row_order() {
    let rows = [
        ("E1", Sector::TotalPrimarySupply, Fuel::Coal, 12.5),
        ("E2", Sector::Imports, Fuel::Oil, 3.0),
        ("E1", Sector::TotalPrimarySupply, Fuel::Coal, 7.5),
        ("E1", Sector::Exports, Fuel::Gas, -1.25),
        ("E2", Sector::Imports, Fuel::Oil, 4.0),
        ("E1", Sector::TotalPrimarySupply, Fuel::Gas, 0.5),
    ];

    let mut forward = Accumulator::new(Source::Apec);
    for (economy, sector, fuel, value) in rows {
        forward.add(economy, sector, fuel, value);
    }

    let mut first_half = Accumulator::new(Source::Apec);
    let mut second_half = Accumulator::new(Source::Apec);
    for (index, (economy, sector, fuel, value)) in rows.iter().rev().enumerate() {
        let target = if index % 2 == 0 {
            &mut first_half
        } else {
            &mut second_half
        };
        target.add(economy, *sector, *fuel, *value);
    }
    second_half.merge(first_half);

    assert_eq!(forward.value("E1", Sector::TotalPrimarySupply, Fuel::Coal), Some(20.0));
    assert_eq!(second_half.value("E2", Sector::Imports, Fuel::Oil), Some(7.0));
    assert_eq!(second_half.value("E2", Sector::Exports, Fuel::Oil), None);

    let frozen = second_half.freeze();
    assert_eq!(frozen.len(), 2);
    assert!(!frozen.is_empty());
    let e1 = frozen.get("E1").expect("E1 table");
    assert_eq!(e1.sector_total(Sector::TotalPrimarySupply), Some(20.5));
    assert!(frozen.get("E3").is_none());
    assert_eq!(forward.freeze(), frozen);
    assert!(Accumulator::new(Source::Apec).freeze().is_empty());
}

#[test]
fn first_registration_keeps_the_name() {
    let mut accumulator = Accumulator::new(Source::Un);
    accumulator.register(Economy::new("UN_4", "Afghanistan", Source::Un));
    accumulator.register(Economy::new("UN_4", "Other name", Source::Un));
    accumulator.add("UN_8", Sector::Imports, Fuel::Oil, 1.0);

    let economies: Vec<Economy> = accumulator
        .freeze()
        .into_economies()
        .map(|(economy, _)| economy)
        .collect();
    assert_eq!(
        economies,
        vec![
            Economy::new("UN_4", "Afghanistan", Source::Un),
            Economy::new("UN_8", "UN_8", Source::Un),
        ]
    );
}

#[test]
fn validator_reports_material_mismatches_only() {
    assert_eq!(tolerance(50.0), 1.0);
    assert_eq!(tolerance(500.0), 5.0);

    let mut raw = SectorMap::new();
    raw.add(Sector::TotalPrimarySupply, Fuel::Coal, 100.0);
    raw.add(Sector::TotalPrimarySupply, Fuel::Oil, 0.5);
    raw.add(Sector::TotalFinalConsumption, Fuel::Coal, 90.0);
    raw.add(Sector::Industry, Fuel::Coal, 40.0);

    let (profile, warnings) = finalize(
        Economy::new("E1", "E1", Source::Apec),
        raw.clone(),
        &ProfileContext::new(2020, true),
    );
    assert_eq!(profile.metrics().tpes, 100.0);
    assert_eq!(profile.metrics().tfc, 40.0);

    let kinds: Vec<MetricKind> = warnings.iter().map(|warning| warning.metric).collect();
    assert_eq!(kinds, vec![MetricKind::EndUse]);
    assert_eq!(warnings[0].derived, 40.0);
    assert_eq!(warnings[0].recomputed, 90.0);

    let rechecked = check_metrics("E1", 2020, &raw, profile.metrics(), true);
    assert_eq!(rechecked, warnings);
}
