//! Static fuel palette shared with the presentation layer.

use std::path::Path;

use serde::Serialize;

use crate::energy::prep::error::Result;
use crate::energy::prep::io::json::write_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FuelStyle {
    pub key: &'static str,
    pub color: &'static str,
    pub order: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hide_in_elec_gen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartMeta {
    pub fuels: &'static [FuelStyle],
}

const fn style(key: &'static str, color: &'static str, order: u32) -> FuelStyle {
    FuelStyle {
        key,
        color,
        order,
        hide_in_elec_gen: false,
    }
}

pub const FUEL_STYLES: &[FuelStyle] = &[
    style("coal", "#1f2933", 0),
    style("oil", "#b05b1d", 1),
    style("gas", "#1c7ed6", 2),
    style("thermal", "#7c4dff", 3),
    style("hydro", "#0ea5e9", 4),
    style("solar", "#f59e0b", 5),
    style("wind", "#22c55e", 6),
    style("tide", "#10b981", 7),
    style("nuclear", "#8b5cf6", 8),
    style("geothermal", "#14b8a6", 9),
    style("wind_solar", "#22c55e", 10),
    style("renewables_and_others", "#2e8b57", 11),
    FuelStyle {
        hide_in_elec_gen: true,
        ..style("electricity", "#7b1fa2", 99)
    },
    style("net_imports", "#0d9488", 100),
    style("industry", "#4b5563", 101),
    style("transport", "#f97316", 102),
    style("buildings", "#eab308", 103),
    style("non_energy_use", "#db2777", 104),
    style("others", "#94a3b8", 105),
];

pub const CHART_META: ChartMeta = ChartMeta {
    fuels: FUEL_STYLES,
};

pub fn write_chart_meta(path: &Path) -> Result<()> {
    write_json(path, &CHART_META)
}
