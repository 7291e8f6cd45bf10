//! Delimited-text (CSV) form of the enriched table.
//!
//! Empty fields mean "no value"; they are read back as `None`.

use std::path::Path;

use crate::domain::{EnrichedRecord, EnrichedTable};
use crate::io::PersistError;
use crate::schema::{column_names, validate_header};

/// Serialize the table to CSV bytes, header first.
pub fn to_csv_bytes(records: &[EnrichedRecord]) -> Result<Vec<u8>, PersistError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(column_names())?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| PersistError::Csv(e.into_error().into()))
}

/// Load a table previously written by [`to_csv_bytes`].
pub fn read_table(path: &Path) -> Result<EnrichedTable, PersistError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let header: Vec<&str> = headers.iter().collect();
    let check = validate_header(&header);
    if !check.is_valid {
        return Err(PersistError::Schema {
            path: path.to_path_buf(),
            errors: check.errors,
        });
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<EnrichedRecord>() {
        records.push(row?);
    }

    Ok(EnrichedTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GrowthStatus;
    use chrono::NaiveDate;

    fn row() -> EnrichedRecord {
        EnrichedRecord {
            sector: "Education Health".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            year: 2024,
            month: 6,
            month_name: "June".into(),
            employment_thousands: 26012.3,
            employment_millions: 26.01,
            period_code: "M06".into(),
            mom_change: Some(54.1),
            mom_percent: Some(0.21),
            yoy_change: None,
            yoy_percent: None,
            ma_3month: Some(25990.5),
            ma_12month: None,
            growth_status: Some(GrowthStatus::SlightDecline),
            quarter: 2,
            is_year_end: false,
            is_summer: true,
        }
    }

    #[test]
    fn header_and_empty_fields() {
        let bytes = to_csv_bytes(&[row()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), column_names().join(","));
        let data = lines.next().unwrap();
        assert!(data.starts_with("Education Health,2024-06-01,2024,6,June,26012.3,26.01,M06,54.1,0.21,,,"));
        assert!(data.contains("Slight Decline"));
        assert!(data.ends_with(",2,false,true"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let bytes = to_csv_bytes(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_end(), column_names().join(","));
    }

    #[test]
    fn read_back_restores_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, to_csv_bytes(&[row()]).unwrap()).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.records, vec![row()]);
    }

    #[test]
    fn foreign_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "date,open,close\n2024-01-02,1,2\n").unwrap();
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, PersistError::Schema { .. }));
    }
}
