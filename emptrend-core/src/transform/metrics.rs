//! Metric calculator.
//!
//! Records from every sector come in together; each sector is split out,
//! sorted by date, enriched with its own window metrics, and the groups are
//! concatenated back in sector-name order. No value ever mixes observations
//! from two sectors.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::parser::round2;
use super::window::{diff, pct_change, RollingMean};
use crate::domain::{EnrichedRecord, GrowthStatus, NormalizedRecord};

/// Lag for month-over-month metrics.
pub const MOM_LAG: usize = 1;
/// Lag for year-over-year metrics.
pub const YOY_LAG: usize = 12;

/// Short average: up to three months, emitted from the first row.
pub fn short_average() -> RollingMean {
    RollingMean::shrinking(3)
}

/// Long average: exactly twelve months, nothing before the twelfth row.
pub fn long_average() -> RollingMean {
    RollingMean::strict(12)
}

/// Derive per-sector metrics for all records.
pub fn compute(records: &[NormalizedRecord]) -> Vec<EnrichedRecord> {
    let mut by_sector: BTreeMap<&str, Vec<&NormalizedRecord>> = BTreeMap::new();
    for record in records {
        by_sector.entry(record.sector.as_str()).or_default().push(record);
    }

    let mut out = Vec::with_capacity(records.len());
    for (sector, mut group) in by_sector {
        group.sort_by_key(|r| r.date);
        debug!(sector, rows = group.len(), "computing sector metrics");
        out.extend(enrich_sector(&group));
    }

    info!(rows = out.len(), "metrics calculated");
    out
}

/// Enrich one sector's rows, which must already be date-ascending.
fn enrich_sector(group: &[&NormalizedRecord]) -> Vec<EnrichedRecord> {
    let values: Vec<f64> = group.iter().map(|r| r.employment_thousands).collect();

    let mom_change = diff(&values, MOM_LAG);
    let mom_percent = pct_change(&values, MOM_LAG);
    let yoy_change = diff(&values, YOY_LAG);
    let yoy_percent = pct_change(&values, YOY_LAG);
    let ma_3month = short_average().compute(&values);
    let ma_12month = long_average().compute(&values);

    group
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut row = EnrichedRecord::from_normalized((*record).clone());
            row.employment_thousands = round2(row.employment_thousands);
            row.employment_millions = round2(row.employment_millions);
            row.mom_change = mom_change[i].map(round2);
            row.mom_percent = mom_percent[i].map(round2);
            row.yoy_change = yoy_change[i].map(round2);
            row.yoy_percent = yoy_percent[i].map(round2);
            row.ma_3month = ma_3month[i].map(round2);
            row.ma_12month = ma_12month[i].map(round2);
            row.growth_status = yoy_percent[i].and_then(GrowthStatus::classify);
            row
        })
        .collect()
}
