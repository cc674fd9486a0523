//! Additive accumulation of extracted rows.
//!
//! Every extractor folds its rows into one [`Accumulator`] per year. Cells are
//! keyed by `(economy, sector, fuel)` and only ever summed, so the order in
//! which rows or chunks arrive does not change the totals.

use std::collections::{BTreeMap, HashMap};

use crate::energy::prep::model::{Economy, EconomyCode, Fuel, Sector, SectorMap, Source};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellKey {
    economy: EconomyCode,
    sector: Sector,
    fuel: Fuel,
}

/// Mutable accumulation table of one source run and year.
#[derive(Debug, Clone)]
pub struct Accumulator {
    source: Source,
    cells: HashMap<CellKey, f64>,
    economies: BTreeMap<EconomyCode, Economy>,
}

impl Accumulator {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            cells: HashMap::new(),
            economies: BTreeMap::new(),
        }
    }

    /// Records an economy. The first registration of a code keeps its name.
    pub fn register(&mut self, economy: Economy) {
        self.economies.entry(economy.code.clone()).or_insert(economy);
    }

    /// Adds a value to a cell, creating it at zero when needed.
    pub fn add(&mut self, economy: &str, sector: Sector, fuel: Fuel, value: f64) {
        let key = CellKey {
            economy: economy.to_string(),
            sector,
            fuel,
        };
        *self.cells.entry(key).or_insert(0.0) += value;
    }

    pub fn value(&self, economy: &str, sector: Sector, fuel: Fuel) -> Option<f64> {
        let key = CellKey {
            economy: economy.to_string(),
            sector,
            fuel,
        };
        self.cells.get(&key).copied()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Merges another accumulator of the same source into this one.
    pub fn merge(&mut self, other: Accumulator) {
        for (code, economy) in other.economies {
            self.economies.entry(code).or_insert(economy);
        }
        for (key, value) in other.cells {
            *self.cells.entry(key).or_insert(0.0) += value;
        }
    }

    /// Ends accumulation and groups the cells per economy.
    pub fn freeze(self) -> FrozenTable {
        let mut economies: BTreeMap<EconomyCode, (Economy, SectorMap)> = self
            .economies
            .into_iter()
            .map(|(code, economy)| (code, (economy, SectorMap::new())))
            .collect();

        for (key, value) in self.cells {
            let source = self.source;
            let (_, sectors) = economies
                .entry(key.economy.clone())
                .or_insert_with(|| {
                    (
                        Economy::new(key.economy.clone(), key.economy.clone(), source),
                        SectorMap::new(),
                    )
                });
            sectors.add(key.sector, key.fuel, value);
        }

        FrozenTable { economies }
    }
}

/// Read-only per-economy sector tables of one year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrozenTable {
    economies: BTreeMap<EconomyCode, (Economy, SectorMap)>,
}

impl FrozenTable {
    pub fn get(&self, code: &str) -> Option<&SectorMap> {
        self.economies.get(code).map(|(_, sectors)| sectors)
    }

    pub fn len(&self) -> usize {
        self.economies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.economies.is_empty()
    }

    /// Consumes the table, yielding economies in code order.
    pub fn into_economies(self) -> impl Iterator<Item = (Economy, SectorMap)> {
        self.economies.into_values()
    }
}
