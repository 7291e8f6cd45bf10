//! End-to-end transformation: raw points → persisted table.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::RawPoint;
use crate::io::{self, OutputOptions, PersistedPaths};
use crate::transform::{assemble, AssembledDataset, PipelineError};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub dataset: AssembledDataset,
    pub paths: PersistedPaths,
}

/// Assemble the table and write it out.
///
/// An empty dataset is an error and nothing is written. Validation issues
/// are logged by the validator and recorded in the manifest. They never fail
/// the run.
pub fn run(
    raw_by_sector: &BTreeMap<String, Vec<RawPoint>>,
    opts: &OutputOptions,
) -> Result<RunOutcome, PipelineError> {
    let dataset = assemble(raw_by_sector)?;

    let paths = io::persist(&dataset.table, &dataset.report, opts)?;
    info!(
        rows = dataset.table.len(),
        sectors = dataset.sectors_used.len(),
        csv = %paths.csv.display(),
        "pipeline complete"
    );

    Ok(RunOutcome { dataset, paths })
}
