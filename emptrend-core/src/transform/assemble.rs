//! Dataset assembly: raw points per sector → validated, enriched table.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

use super::metrics;
use super::parser;
use super::validate::{self, ValidationReport};
use crate::domain::{EnrichedTable, NormalizedRecord, RawPoint};

/// Errors from the transformation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no sector produced any valid monthly record ({sectors} sector(s) supplied)")]
    EmptyDataset { sectors: usize },

    #[error(transparent)]
    Persist(#[from] crate::io::PersistError),
}

/// The enriched table together with its data-quality report.
#[derive(Debug, Clone)]
pub struct AssembledDataset {
    pub table: EnrichedTable,
    pub report: ValidationReport,
    /// Sectors that contributed at least one row, in input order.
    pub sectors_used: Vec<String>,
    /// Sectors that were supplied but produced no valid rows.
    pub sectors_empty: Vec<String>,
}

/// Parse every sector, derive metrics across the union, and validate.
///
/// Sectors without valid monthly points are skipped. Validation is
/// diagnostic only; the table is returned whatever the report says.
pub fn assemble(raw_by_sector: &BTreeMap<String, Vec<RawPoint>>) -> Result<AssembledDataset, PipelineError> {
    info!(sectors = raw_by_sector.len(), "cleaning and transforming data");

    let mut combined: Vec<NormalizedRecord> = Vec::new();
    let mut sectors_used = Vec::new();
    let mut sectors_empty = Vec::new();

    for (sector, points) in raw_by_sector {
        let records = parser::parse(points, sector);
        if records.is_empty() {
            sectors_empty.push(sector.clone());
            continue;
        }
        info!(sector = %sector, months = records.len(), "processed sector");
        sectors_used.push(sector.clone());
        combined.extend(records);
    }

    if combined.is_empty() {
        warn!("no data to process");
        return Err(PipelineError::EmptyDataset {
            sectors: raw_by_sector.len(),
        });
    }

    let table = EnrichedTable::new(metrics::compute(&combined));
    let report = validate::validate(&table.records);

    Ok(AssembledDataset {
        table,
        report,
        sectors_used,
        sectors_empty,
    })
}
