//! Per-source extractors.
//!
//! Each extractor reads its own raw row shape and folds the rows into an
//! [`Extraction`]: one accumulation table per requested year, all in the
//! canonical `(economy, sector, fuel) -> PJ` shape.

pub mod balance;
pub mod ei;
pub mod un;

use std::collections::BTreeMap;

use tracing::debug;

use crate::energy::prep::accumulate::Accumulator;
use crate::energy::prep::model::Source;
use crate::energy::prep::profile::{Finalized, ProfileContext, finalize_table};

/// Accumulation tables of one source run.
#[derive(Debug)]
pub struct Extraction {
    pub source: Source,
    pub scenario: String,
    /// Export sign convention of the source, see [`crate::derive::signed_export`].
    pub exports_negative: bool,
    years: BTreeMap<i32, Accumulator>,
}

impl Extraction {
    pub fn new(
        source: Source,
        scenario: impl Into<String>,
        exports_negative: bool,
        years: &[i32],
    ) -> Self {
        Self {
            source,
            scenario: scenario.into(),
            exports_negative,
            years: years
                .iter()
                .map(|year| (*year, Accumulator::new(source)))
                .collect(),
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn year(&self, year: i32) -> Option<&Accumulator> {
        self.years.get(&year)
    }

    /// Accumulator of a requested year; `None` for years that were not asked
    /// for.
    pub fn year_mut(&mut self, year: i32) -> Option<&mut Accumulator> {
        self.years.get_mut(&year)
    }

    /// Freezes every year and turns the tables into profiles.
    pub fn finish(self) -> BTreeMap<i32, Finalized> {
        let exports_negative = self.exports_negative;
        self.years
            .into_iter()
            .map(|(year, accumulator)| {
                debug!(year, cells = accumulator.cell_count(), "freezing accumulation table");
                let context = ProfileContext::new(year, exports_negative);
                (year, finalize_table(accumulator.freeze(), &context))
            })
            .collect()
    }
}

/// Parses a numeric cell. Blank, non-numeric and non-finite values yield
/// `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a year cell such as `2020` or `2020.0`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = trimmed.parse::<f64>().ok()?;
    (value.fract() == 0.0 && value.abs() < i32::MAX as f64).then_some(value as i32)
}

/// Parses a boolean flag cell as written by spreadsheet and dataframe tools.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "false" | "0" | "0.0" | "no" => Some(false),
        "true" | "1" | "1.0" | "yes" => Some(true),
        _ => None,
    }
}
