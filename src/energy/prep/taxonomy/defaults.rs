//! Built-in classification tables.

use std::collections::BTreeMap;

use crate::energy::prep::model::{Fuel, Sector};
use crate::energy::prep::taxonomy::{
    BalanceVocabulary, EconomyRegistry, EiVocabulary, LabelMap, UnVocabulary,
};

/// APEC economy codes with their fixed display names.
pub const APEC_ECONOMIES: &[(&str, &str)] = &[
    ("01_AUS", "Australia"),
    ("02_BD", "Brunei Darussalam"),
    ("03_CDA", "Canada"),
    ("04_CHL", "Chile"),
    ("05_PRC", "China"),
    ("06_HKC", "Hong Kong"),
    ("07_INA", "Indonesia"),
    ("08_JPN", "Japan"),
    ("09_ROK", "Korea"),
    ("10_MAS", "Malaysia"),
    ("11_MEX", "Mexico"),
    ("12_NZ", "New Zealand"),
    ("13_PNG", "Papua New Guinea"),
    ("14_PE", "Peru"),
    ("15_PHL", "Philippines"),
    ("16_RUS", "Russia"),
    ("17_SGP", "Singapore"),
    ("18_CT", "Chinese Taipei"),
    ("19_THA", "Thailand"),
    ("20_USA", "USA"),
    ("21_VN", "Viet Nam"),
];

/// UN reference-area names that belong to an APEC economy.
pub const UN_AREA_CODES: &[(&str, &str)] = &[
    ("australia", "01_AUS"),
    ("brunei darussalam", "02_BD"),
    ("canada", "03_CDA"),
    ("chile", "04_CHL"),
    ("china", "05_PRC"),
    ("china, hong kong sar", "06_HKC"),
    ("china, hong kong special administrative region", "06_HKC"),
    ("indonesia", "07_INA"),
    ("japan", "08_JPN"),
    ("korea, republic of", "09_ROK"),
    ("republic of korea", "09_ROK"),
    ("malaysia", "10_MAS"),
    ("mexico", "11_MEX"),
    ("new zealand", "12_NZ"),
    ("papua new guinea", "13_PNG"),
    ("peru", "14_PE"),
    ("philippines", "15_PHL"),
    ("russian federation", "16_RUS"),
    ("singapore", "17_SGP"),
    ("thailand", "19_THA"),
    ("united states", "20_USA"),
    ("united states of america", "20_USA"),
    ("viet nam", "21_VN"),
];

const BALANCE_FUELS: &[(&str, Fuel)] = &[
    ("01_coal", Fuel::Coal),
    ("02_coal_products", Fuel::Coal),
    ("03_peat", Fuel::Coal),
    ("04_peat_products", Fuel::Coal),
    ("05_oil_shale_and_oil_sands", Fuel::Coal),
    ("06_crude_oil_and_ngl", Fuel::Oil),
    ("07_petroleum_products", Fuel::Oil),
    ("08_gas", Fuel::Gas),
    ("09_nuclear", Fuel::Nuclear),
    ("10_hydro", Fuel::RenewablesAndOthers),
    ("11_geothermal", Fuel::RenewablesAndOthers),
    ("12_solar", Fuel::RenewablesAndOthers),
    ("13_tide_wave_ocean", Fuel::RenewablesAndOthers),
    ("14_wind", Fuel::RenewablesAndOthers),
    ("15_solid_biomass", Fuel::RenewablesAndOthers),
    ("16_others", Fuel::RenewablesAndOthers),
    ("17_electricity", Fuel::Electricity),
    ("17_x_green_electricity", Fuel::RenewablesAndOthers),
    ("18_heat", Fuel::RenewablesAndOthers),
];

const BALANCE_ELECTRICITY_FUELS: &[(&str, Fuel)] = &[
    ("01_coal", Fuel::Coal),
    ("02_coal_products", Fuel::Coal),
    ("03_peat", Fuel::Coal),
    ("04_peat_products", Fuel::Coal),
    ("05_oil_shale_and_oil_sands", Fuel::Coal),
    ("06_crude_oil_and_ngl", Fuel::Oil),
    ("07_petroleum_products", Fuel::Oil),
    ("08_gas", Fuel::Gas),
    ("09_nuclear", Fuel::Nuclear),
    ("10_hydro", Fuel::Hydro),
    ("11_geothermal", Fuel::Geothermal),
    ("12_solar", Fuel::WindSolar),
    ("13_tide_wave_ocean", Fuel::Tide),
    ("14_wind", Fuel::WindSolar),
    ("15_solid_biomass", Fuel::RenewablesAndOthers),
    ("16_others", Fuel::RenewablesAndOthers),
    ("17_electricity", Fuel::Electricity),
    ("17_x_green_electricity", Fuel::RenewablesAndOthers),
    ("18_heat", Fuel::RenewablesAndOthers),
];

const BALANCE_SECTORS: &[(&str, Sector)] = &[
    ("01_production", Sector::Production),
    ("02_imports", Sector::Imports),
    ("03_exports", Sector::Exports),
    ("07_total_primary_energy_supply", Sector::TotalPrimarySupply),
    ("09_total_transformation_sector", Sector::Transformation),
    ("12_total_final_consumption", Sector::TotalFinalConsumption),
    ("14_industry_sector", Sector::Industry),
    ("15_transport_sector", Sector::Transport),
    ("16_other_sector", Sector::Other),
    ("17_nonenergy_use", Sector::NonEnergyUse),
    ("18_electricity_output_in_gwh", Sector::ElectricityGeneration),
    ("net_imports", Sector::NetImports),
];

const UN_FUELS: &[(&str, Fuel)] = &[
    // Oil and refined products
    ("additives and oxygenates", Fuel::Oil),
    ("aviation gasoline", Fuel::Oil),
    ("bio jet kerosene", Fuel::RenewablesAndOthers),
    ("biodiesel", Fuel::RenewablesAndOthers),
    ("biogasoline", Fuel::RenewablesAndOthers),
    ("bitumen", Fuel::Oil),
    ("fuel oil", Fuel::Oil),
    ("gas oil/ diesel oil", Fuel::Oil),
    ("gasoline-type jet fuel", Fuel::Oil),
    ("kerosene-type jet fuel", Fuel::Oil),
    ("liquified petroleum gas", Fuel::Oil),
    ("lubricants", Fuel::Oil),
    ("motor gasoline", Fuel::Oil),
    ("naphtha", Fuel::Oil),
    ("natural gas liquids", Fuel::Gas),
    ("oil shale / oil sands", Fuel::Oil),
    ("other kerosene", Fuel::Oil),
    ("other liquid biofuels", Fuel::RenewablesAndOthers),
    ("other oil products n.e.c.", Fuel::Oil),
    ("other hydrocarbons", Fuel::Oil),
    ("paraffin waxes", Fuel::Oil),
    ("petroleum coke", Fuel::Oil),
    ("refinery feedstocks", Fuel::Oil),
    ("refinery gas", Fuel::Gas),
    ("total refinery output", Fuel::Oil),
    (
        "white spirit and special boiling point industrial spirits",
        Fuel::Oil,
    ),
    ("conventional crude oil", Fuel::Oil),
    // Coal and coal products
    ("anthracite", Fuel::Coal),
    ("brown coal", Fuel::Coal),
    ("brown coal briquettes", Fuel::Coal),
    ("coking coal", Fuel::Coal),
    ("hard coal", Fuel::Coal),
    ("lignite", Fuel::Coal),
    ("other bituminous coal", Fuel::Coal),
    ("other coal products", Fuel::Coal),
    ("peat", Fuel::Coal),
    ("peat products", Fuel::Coal),
    ("patent fuel", Fuel::Coal),
    ("coal tar", Fuel::Coal),
    ("coke oven coke", Fuel::Coal),
    ("gas coke", Fuel::Coal),
    ("sub-bituminous coal", Fuel::Coal),
    // Gases
    ("blast furnace gas", Fuel::Gas),
    ("coke oven gas", Fuel::Gas),
    ("gasworks gas", Fuel::Gas),
    ("other recovered gases", Fuel::Gas),
    ("natural gas (including lng)", Fuel::Gas),
    ("ethane", Fuel::Gas),
    // Electricity and generation technologies
    ("thermal electricity", Fuel::Thermal),
    ("total electricity", Fuel::Electricity),
    (
        "total capacity: main activity producers and autoproducers",
        Fuel::Electricity,
    ),
    ("total capacity, main activity producers", Fuel::Electricity),
    ("nuclear electricity", Fuel::Nuclear),
    ("hydro, main activity producers", Fuel::Hydro),
    ("hydro, total", Fuel::Hydro),
    ("hydro", Fuel::Hydro),
    ("wind electricity", Fuel::Wind),
    ("solar electricity", Fuel::Solar),
    ("tide, wave and ocean electricity", Fuel::Tide),
    ("geothermal electricity", Fuel::Geothermal),
    // Renewables and biomass
    ("animal waste", Fuel::RenewablesAndOthers),
    ("bagasse", Fuel::RenewablesAndOthers),
    ("biogases", Fuel::RenewablesAndOthers),
    ("black liquor", Fuel::RenewablesAndOthers),
    ("charcoal", Fuel::RenewablesAndOthers),
    ("combustible renewables, total", Fuel::RenewablesAndOthers),
    ("direct use of geothermal heat", Fuel::Geothermal),
    ("direct use of solar thermal heat", Fuel::RenewablesAndOthers),
    ("falling water", Fuel::Hydro),
    ("fuelwood", Fuel::RenewablesAndOthers),
    ("geothermal", Fuel::Geothermal),
    ("heat", Fuel::RenewablesAndOthers),
    ("heat from combustible fuels", Fuel::RenewablesAndOthers),
    ("industrial waste", Fuel::RenewablesAndOthers),
    ("municipal wastes", Fuel::RenewablesAndOthers),
    ("of which: bio jet kerosene", Fuel::RenewablesAndOthers),
    ("of which: biodiesel", Fuel::RenewablesAndOthers),
    ("of which: biogasoline", Fuel::RenewablesAndOthers),
    ("other vegetal material and residues", Fuel::RenewablesAndOthers),
    ("uranium", Fuel::RenewablesAndOthers),
    // Aggregates
    (
        "combustible fuels, main activity producers",
        Fuel::RenewablesAndOthers,
    ),
    ("combustible fuels, total", Fuel::RenewablesAndOthers),
];

/// Secondary, refined and aggregate products excluded from primary production.
const UN_PRODUCTION_DROP: &[&str] = &[
    "additives and oxygenates",
    "aviation gasoline",
    "bio jet kerosene",
    "biodiesel",
    "biogasoline",
    "bitumen",
    "blast furnace gas",
    "brown coal briquettes",
    "coal tar",
    "coke oven coke",
    "coke oven gas",
    "combustible fuels, main activity producers",
    "combustible fuels, total",
    "electricity, net installed capacity of electric power plants",
    "fuel oil",
    "gas coke",
    "gas oil/ diesel oil",
    "gasoline-type jet fuel",
    "heat",
    "heat from combustible fuels",
    "kerosene-type jet fuel",
    "liquified petroleum gas",
    "lubricants",
    "motor gasoline",
    "naphtha",
    "natural gas liquids",
    "nuclear electricity",
    "of which: bio jet kerosene",
    "of which: biodiesel",
    "of which: biogasoline",
    "other kerosene",
    "other liquid biofuels",
    "other oil products n.e.c.",
    "paraffin waxes",
    "petroleum coke",
    "refinery feedstocks",
    "refinery gas",
    "total refinery output",
    "total electricity",
    "total capacity: main activity producers and autoproducers",
    "total capacity, main activity producers",
    "white spirit and special boiling point industrial spirits",
    "other recovered gases",
    "thermal electricity",
];

const UN_ELECTRICITY_LABELS: &[&str] = &[
    "total electricity",
    "nuclear electricity",
    "solar electricity",
    "wind electricity",
    "tide, wave and ocean electricity",
    "thermal electricity",
    "hydro",
    "hydro, total",
    "hydro, main activity producers",
    "geothermal electricity",
];

/// Electricity commodities that restate the sum of the others.
const UN_ELECTRICITY_AGGREGATES: &[&str] = &["total electricity", "hydro, main activity producers"];

const UN_TRANSACTIONS: &[(&str, Sector)] = &[
    ("primary production", Sector::Production),
    ("production", Sector::Production),
    ("gross production", Sector::Production),
    ("imports", Sector::Imports),
    ("exports", Sector::Exports),
    ("total energy supply", Sector::TotalPrimarySupply),
    ("gross demand", Sector::TotalPrimarySupply),
    ("transformation", Sector::Transformation),
    ("total transformation sector", Sector::Transformation),
    ("final consumption", Sector::TotalFinalConsumption),
    ("final energy consumption", Sector::TotalFinalConsumption),
    (
        "consumption by manufacturing, construction and non-fuel mining industry",
        Sector::Industry,
    ),
    ("consumption by industry", Sector::Industry),
    ("consumption by transport", Sector::Transport),
    ("consumption by households", Sector::Buildings),
    (
        "consumption by commerce and public services",
        Sector::Buildings,
    ),
    (
        "consumption by agriculture, forestry and fishing",
        Sector::Other,
    ),
    ("consumption not elsewhere specified (other)", Sector::Other),
    ("consumption by other", Sector::Other),
    ("non-energy uses", Sector::NonEnergyUse),
    ("net imports", Sector::NetImports),
];

const EI_SUPPLY_FUELS: &[(&str, Fuel)] = &[
    ("Oil", Fuel::Oil),
    ("Natural Gas", Fuel::Gas),
    ("Coal", Fuel::Coal),
    ("Nuclear energy", Fuel::Nuclear),
    ("Hydro electric", Fuel::Hydro),
    ("Renew- ables", Fuel::RenewablesAndOthers),
];

const EI_ELECTRICITY_FUELS: &[(&str, Fuel)] = &[
    ("Oil", Fuel::Oil),
    ("Natural Gas", Fuel::Gas),
    ("Coal", Fuel::Coal),
    ("Nuclear energy", Fuel::Nuclear),
    ("Hydro electric", Fuel::Hydro),
    ("Renewables", Fuel::RenewablesAndOthers),
    ("Other#", Fuel::RenewablesAndOthers),
];

const EI_AGGREGATE_PREFIXES: &[&str] = &["Total ", "Other ", "Spot ", "Net ", "Imports", "Exports"];

/// EI spellings that differ from the names used by the base datasets.
const EI_NAME_ALIASES: &[(&str, &str)] = &[
    ("us", "united states"),
    ("u.s.", "united states"),
    ("usa", "united states"),
    ("united states", "united states of america"),
    ("viet nam", "vietnam"),
    ("vietnam", "viet nam"),
    ("uae", "united arab emirates"),
    ("south korea", "republic of korea"),
    ("russian federation", "russia"),
];

impl Default for BalanceVocabulary {
    fn default() -> Self {
        Self {
            fuels: BALANCE_FUELS.iter().copied().collect(),
            electricity_fuels: BALANCE_ELECTRICITY_FUELS.iter().copied().collect(),
            sectors: BALANCE_SECTORS.iter().copied().collect(),
            buildings_subsectors: ["16_01_buildings"].into_iter().collect(),
            other_subsectors: ["16_02_agriculture_and_fishing", "16_05_nonspecified_others"]
                .into_iter()
                .collect(),
        }
    }
}

impl Default for UnVocabulary {
    fn default() -> Self {
        Self {
            fuels: UN_FUELS.iter().copied().collect(),
            production_drop: UN_PRODUCTION_DROP.iter().collect(),
            electricity_labels: UN_ELECTRICITY_LABELS.iter().collect(),
            electricity_aggregates: UN_ELECTRICITY_AGGREGATES.iter().collect(),
            transactions: UN_TRANSACTIONS.iter().copied().collect(),
        }
    }
}

impl Default for EiVocabulary {
    fn default() -> Self {
        Self {
            supply_fuels: EI_SUPPLY_FUELS.iter().copied().collect(),
            electricity_fuels: EI_ELECTRICITY_FUELS.iter().copied().collect(),
            aggregate_prefixes: EI_AGGREGATE_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            name_aliases: EI_NAME_ALIASES
                .iter()
                .map(|(from, to)| (*from, to.to_string()))
                .collect::<LabelMap<String>>(),
        }
    }
}

impl Default for EconomyRegistry {
    fn default() -> Self {
        Self {
            names: APEC_ECONOMIES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect::<BTreeMap<_, _>>(),
            un_areas: UN_AREA_CODES
                .iter()
                .map(|(name, code)| (*name, code.to_string()))
                .collect(),
        }
    }
}
