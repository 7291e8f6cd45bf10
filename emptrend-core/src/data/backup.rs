//! Raw response backups.
//!
//! Layout: `{dir}/raw_{Sector_Name}_{YYYYmmdd_HHMMSS}.json`
//!
//! Each file holds one sector's fetch exactly as the API returned it,
//! `{"<series_id>": [<points>]}`, pretty-printed. Files are written atomically
//! and one per sector, so an interrupted fetch still leaves every completed
//! sector on disk. `load_latest` turns the newest file per sector back into
//! parser input.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::decode_points;
use crate::domain::RawPoint;

const PREFIX: &str = "raw_";
const EXTENSION: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed backup {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no raw backups found in {}", dir.display())]
    NoBackups { dir: PathBuf },
}

impl BackupError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A backup file located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub sector: String,
    pub taken_at: NaiveDateTime,
    pub path: PathBuf,
}

/// Directory of raw backups.
#[derive(Debug, Clone)]
pub struct RawBackupStore {
    dir: PathBuf,
}

impl RawBackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, sector: &str, taken_at: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{PREFIX}{sector}_{}{EXTENSION}",
            taken_at.format(STAMP_FORMAT)
        ))
    }

    /// Write one sector's untouched points.
    pub fn save(
        &self,
        sector: &str,
        series_id: &str,
        points: &[serde_json::Value],
        taken_at: NaiveDateTime,
    ) -> Result<PathBuf, BackupError> {
        fs::create_dir_all(&self.dir).map_err(|e| BackupError::io(&self.dir, e))?;

        let path = self.file_path(sector, taken_at);
        let mut body = serde_json::Map::new();
        body.insert(series_id.to_string(), serde_json::Value::from(points.to_vec()));
        let json = serde_json::to_string_pretty(&body).map_err(|e| BackupError::Json {
            path: path.clone(),
            source: e,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| BackupError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            BackupError::io(&path, e)
        })?;

        info!(path = %path.display(), points = points.len(), "saved raw backup");
        Ok(path)
    }

    /// Newest backup file per sector.
    pub fn latest_files(&self) -> Result<BTreeMap<String, BackupFile>, BackupError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| BackupError::io(&self.dir, e))?;

        let mut latest: BTreeMap<String, BackupFile> = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackupError::io(&self.dir, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((sector, taken_at)) = parse_file_name(name) else {
                continue;
            };

            let newer = latest
                .get(&sector)
                .map_or(true, |existing| taken_at > existing.taken_at);
            if newer {
                latest.insert(
                    sector.clone(),
                    BackupFile {
                        sector,
                        taken_at,
                        path,
                    },
                );
            }
        }
        Ok(latest)
    }

    /// Read the newest backup of every sector into parser input.
    pub fn load_latest(&self) -> Result<BTreeMap<String, Vec<RawPoint>>, BackupError> {
        let files = self.latest_files()?;
        if files.is_empty() {
            return Err(BackupError::NoBackups {
                dir: self.dir.clone(),
            });
        }

        let mut out = BTreeMap::new();
        for (sector, file) in files {
            let points = read_backup(&file.path)?;
            debug!(sector = %sector, points = points.len(), path = %file.path.display(), "loaded backup");
            out.insert(sector, points);
        }
        Ok(out)
    }
}

/// Load a single backup file; all series in it are concatenated.
pub fn read_backup(path: &Path) -> Result<Vec<RawPoint>, BackupError> {
    let content = fs::read_to_string(path).map_err(|e| BackupError::io(path, e))?;
    let by_series: BTreeMap<String, Vec<serde_json::Value>> =
        serde_json::from_str(&content).map_err(|e| BackupError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    if by_series.len() > 1 {
        warn!(path = %path.display(), series = by_series.len(), "backup holds several series, merging");
    }

    Ok(by_series
        .iter()
        .flat_map(|(series_id, values)| decode_points(series_id, values))
        .collect())
}

/// `raw_{sector}_{YYYYmmdd}_{HHMMSS}.json` → `(sector, timestamp)`.
fn parse_file_name(name: &str) -> Option<(String, NaiveDateTime)> {
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next()?;
    let date = parts.next()?;
    let sector = parts.next()?;
    if sector.is_empty() {
        return None;
    }
    let taken_at = NaiveDateTime::parse_from_str(&format!("{date}_{time}"), STAMP_FORMAT).ok()?;
    Some((sector.to_string(), taken_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn sample() -> Vec<serde_json::Value> {
        vec![
            json!({"year": "2024", "period": "M12", "periodName": "December", "value": "2956", "footnotes": [{}]}),
            json!({"year": "2024", "period": "M11", "periodName": "November", "value": "2950", "footnotes": [{}]}),
        ]
    }

    #[test]
    fn file_name_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = RawBackupStore::new(dir.path());
        let path = store
            .save("Leisure_Hospitality", "CES7000000001", &sample(), at(9, 5, 7))
            .unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            "raw_Leisure_Hospitality_20250314_090507.json"
        );
    }

    #[test]
    fn content_is_untouched_points_by_series() {
        let dir = tempfile::tempdir().unwrap();
        let store = RawBackupStore::new(dir.path());
        let path = store
            .save("Information", "CES5000000001", &sample(), at(9, 0, 0))
            .unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(content, json!({"CES5000000001": sample()}));
    }

    #[test]
    fn parses_sector_with_underscores() {
        let (sector, ts) = parse_file_name("raw_Trade_Transport_Utilities_20250314_101112.json").unwrap();
        assert_eq!(sector, "Trade_Transport_Utilities");
        assert_eq!(ts, at(10, 11, 12));
    }

    #[test]
    fn ignores_unrelated_files() {
        assert!(parse_file_name("cleaned_employment_20250314_101112.csv").is_none());
        assert!(parse_file_name("raw_Information_notadate.json").is_none());
        assert!(parse_file_name("raw__20250314_101112.json").is_none());
    }

    #[test]
    fn load_latest_picks_newest_per_sector() {
        let dir = tempfile::tempdir().unwrap();
        let store = RawBackupStore::new(dir.path());
        let old = vec![json!({"year": "2023", "period": "M01", "value": "1"})];
        store.save("Information", "CES5000000001", &old, at(8, 0, 0)).unwrap();
        store.save("Information", "CES5000000001", &sample(), at(9, 0, 0)).unwrap();
        store.save("Government", "CES9000000001", &sample(), at(8, 30, 0)).unwrap();

        let loaded = store.load_latest().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["Information"].len(), 2);
        assert_eq!(loaded["Information"][0], RawPoint::new(2024, "M12", "2956"));
    }

    #[test]
    fn empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawBackupStore::new(dir.path()).load_latest().unwrap_err();
        assert!(matches!(err, BackupError::NoBackups { .. }));
    }
}
