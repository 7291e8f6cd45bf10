//! Run manifest sidecar (JSON) written next to each cleaned table.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::EnrichedTable;
use crate::io::PersistError;
use crate::transform::ValidationReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: NaiveDateTime,
    pub rows: usize,
    pub sectors: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub csv_file: String,
    /// BLAKE3 digest of the CSV bytes as written.
    pub csv_blake3: String,
    pub parquet_file: Option<String>,
    pub validation: ValidationReport,
}

impl RunManifest {
    pub fn new(
        generated_at: NaiveDateTime,
        table: &EnrichedTable,
        csv_file: &Path,
        csv_bytes: &[u8],
        parquet_file: Option<&Path>,
        validation: &ValidationReport,
    ) -> Self {
        let range = table.date_range();
        Self {
            generated_at,
            rows: table.len(),
            sectors: table.sectors().into_iter().map(String::from).collect(),
            start_date: range.map(|(s, _)| s),
            end_date: range.map(|(_, e)| e),
            csv_file: file_name(csv_file),
            csv_blake3: blake3::hash(csv_bytes).to_hex().to_string(),
            parquet_file: parquet_file.map(file_name),
            validation: validation.clone(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(manifest)?;
    super::atomic_write(path, json.as_bytes())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest, PersistError> {
    let content = std::fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::validate;

    fn manifest(rows: usize) -> RunManifest {
        let generated_at = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut m = RunManifest::new(
            generated_at,
            &EnrichedTable::default(),
            Path::new("data/cleaned_employment_20250301_080000.csv"),
            b"",
            None,
            &validate(&[]),
        );
        m.rows = rows;
        m
    }

    #[test]
    fn rewrite_replaces_sidecar_without_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.meta.json");

        write_manifest(&path, &manifest(1)).unwrap();
        write_manifest(&path, &manifest(2)).unwrap();

        assert_eq!(read_manifest(&path).unwrap(), manifest(2));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("run.meta.json")]);
    }
}
