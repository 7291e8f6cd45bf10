//! Persistence of the cleaned table.
//!
//! Layout: `{output_dir}/cleaned_employment_{YYYYmmdd_HHMMSS}.{csv,parquet,meta.json}`
//!
//! - CSV is always written; Parquet is optional
//! - Writes are atomic (write to .tmp, rename into place)
//! - A run never overwrites an earlier run's files: a clashing stamp gets a
//!   numeric suffix

pub mod delimited;
pub mod manifest;
pub mod parquet;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::info;

use crate::domain::EnrichedTable;
use crate::transform::ValidationReport;

pub use delimited::{read_table, to_csv_bytes};
pub use manifest::{read_manifest, RunManifest};

/// File-name prefix for cleaned tables.
pub const OUTPUT_PREFIX: &str = "cleaned_employment";

/// Timestamp format embedded in every generated file name.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} does not match the table schema: {}", path.display(), errors.join("; "))]
    Schema { path: PathBuf, errors: Vec<String> },
}

impl PersistError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where and how to write a run's output.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    pub write_parquet: bool,
}

impl OutputOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_parquet: false,
        }
    }

    pub fn with_parquet(mut self, write_parquet: bool) -> Self {
        self.write_parquet = write_parquet;
        self
    }
}

/// Files produced by one persisted run.
#[derive(Debug, Clone)]
pub struct PersistedPaths {
    pub csv: PathBuf,
    pub parquet: Option<PathBuf>,
    pub manifest: PathBuf,
}

/// Format a generation time the way it appears in file names.
pub fn run_stamp(at: NaiveDateTime) -> String {
    at.format(STAMP_FORMAT).to_string()
}

/// Write the table (and its sidecar) stamped with the current local time.
pub fn persist(
    table: &EnrichedTable,
    report: &ValidationReport,
    opts: &OutputOptions,
) -> Result<PersistedPaths, PersistError> {
    persist_at(table, report, opts, chrono::Local::now().naive_local())
}

/// Write the table stamped with `generated_at`.
pub fn persist_at(
    table: &EnrichedTable,
    report: &ValidationReport,
    opts: &OutputOptions,
    generated_at: NaiveDateTime,
) -> Result<PersistedPaths, PersistError> {
    fs::create_dir_all(&opts.output_dir).map_err(|e| PersistError::io(&opts.output_dir, e))?;

    let stem = unique_stem(&opts.output_dir, &format!("{OUTPUT_PREFIX}_{}", run_stamp(generated_at)));
    let csv_path = opts.output_dir.join(format!("{stem}.csv"));
    let manifest_path = opts.output_dir.join(format!("{stem}.meta.json"));

    let csv_bytes = to_csv_bytes(&table.records)?;
    atomic_write(&csv_path, &csv_bytes)?;
    info!(path = %csv_path.display(), rows = table.len(), "saved cleaned data");

    let parquet_path = if opts.write_parquet {
        let path = opts.output_dir.join(format!("{stem}.parquet"));
        let tmp = path.with_extension("parquet.tmp");
        parquet::write_parquet(&tmp, &table.records)?;
        rename_into_place(&tmp, &path)?;
        info!(path = %path.display(), "saved parquet copy");
        Some(path)
    } else {
        None
    };

    let manifest = RunManifest::new(
        generated_at,
        table,
        &csv_path,
        &csv_bytes,
        parquet_path.as_deref(),
        report,
    );
    manifest::write_manifest(&manifest_path, &manifest)?;

    Ok(PersistedPaths {
        csv: csv_path,
        parquet: parquet_path,
        manifest: manifest_path,
    })
}

/// First of `stem`, `stem_1`, `stem_2`, ... with no existing output files.
fn unique_stem(dir: &Path, stem: &str) -> String {
    let taken = |candidate: &str| {
        ["csv", "parquet", "meta.json"]
            .iter()
            .any(|ext| dir.join(format!("{candidate}.{ext}")).exists())
    };

    if !taken(stem) {
        return stem.to_string();
    }
    (1..)
        .map(|n| format!("{stem}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| stem.to_string())
}

/// Write to `{path}.tmp` then rename over `path`.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).map_err(|e| PersistError::io(&tmp, e))?;
    rename_into_place(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn rename_into_place(tmp: &Path, path: &Path) -> Result<(), PersistError> {
    fs::rename(tmp, path).map_err(|e| {
        let _ = fs::remove_file(tmp);
        PersistError::io(path, e)
    })
}
