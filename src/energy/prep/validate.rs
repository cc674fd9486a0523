//! Consistency checks between derived metrics and the raw sector sums.
//!
//! Mismatches are diagnostics: they are logged and returned, never raised.

use std::fmt;

use tracing::warn;

use crate::energy::prep::derive::{
    ELEC_GEN_RULES, NET_IMPORT_RULES, TFC_RULES, TPES_RULES, end_use_total, evaluate,
    final_consumption_total,
};
use crate::energy::prep::model::{Metrics, SectorMap};

/// Which figure disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Tpes,
    Tfc,
    ElecGen,
    NetImports,
    /// Reported final consumption against the sum of its end-use sectors.
    EndUse,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Tpes => "tpes",
            MetricKind::Tfc => "tfc",
            MetricKind::ElecGen => "elec_gen",
            MetricKind::NetImports => "net_imports",
            MetricKind::EndUse => "tfc_end_use",
        };
        f.write_str(name)
    }
}

/// A material mismatch between a metric and its recomputed sector sum.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyWarning {
    pub economy: String,
    pub year: i32,
    pub metric: MetricKind,
    pub derived: f64,
    pub recomputed: f64,
}

/// Largest difference tolerated for a metric: 1% of it, at least 1 PJ.
pub fn tolerance(metric: f64) -> f64 {
    (metric.abs() * 0.01).max(1.0)
}

/// Recomputes every metric from the raw (pre-pruning) sectors and reports
/// those that differ by more than [`tolerance`].
pub fn check_metrics(
    economy: &str,
    year: i32,
    raw: &SectorMap,
    metrics: &Metrics,
    exports_negative: bool,
) -> Vec<ConsistencyWarning> {
    let recomputed = [
        (
            MetricKind::Tpes,
            metrics.tpes,
            evaluate(TPES_RULES, raw, exports_negative).map(|(_, value)| value),
        ),
        (
            MetricKind::Tfc,
            metrics.tfc,
            evaluate(TFC_RULES, raw, exports_negative).map(|(_, value)| value),
        ),
        (
            MetricKind::ElecGen,
            metrics.elec_gen,
            evaluate(ELEC_GEN_RULES, raw, exports_negative).map(|(_, value)| value),
        ),
        (
            MetricKind::NetImports,
            metrics.net_imports,
            evaluate(NET_IMPORT_RULES, raw, exports_negative)
                .map(|(_, fuels)| fuels.values().sum::<f64>()),
        ),
        (
            MetricKind::EndUse,
            end_use_total(raw, exports_negative).unwrap_or(0.0),
            end_use_total(raw, exports_negative)
                .and(final_consumption_total(raw, exports_negative)),
        ),
    ];

    let mut warnings = Vec::new();
    for (metric, derived, recomputed) in recomputed {
        let Some(recomputed) = recomputed else {
            continue;
        };
        if (derived - recomputed).abs() > tolerance(derived) {
            warn!(
                economy,
                year,
                metric = %metric,
                derived,
                recomputed,
                "metric does not match its sector sum"
            );
            warnings.push(ConsistencyWarning {
                economy: economy.to_string(),
                year,
                metric,
                derived,
                recomputed,
            });
        }
    }
    warnings
}
