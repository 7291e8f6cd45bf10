//! Columnar (Parquet) copy of the enriched table.

use std::fs::File;
use std::path::Path;

use chrono::Datelike;
use polars::prelude::*;

use crate::domain::EnrichedRecord;
use crate::io::PersistError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Build a DataFrame with the table's columns.
pub fn to_dataframe(records: &[EnrichedRecord]) -> Result<DataFrame, PersistError> {
    let map_err = |e: PolarsError| PersistError::Parquet(format!("dataframe creation: {e}"));

    let dates: Vec<i32> = records
        .iter()
        .map(|r| r.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let opt = |f: fn(&EnrichedRecord) -> Option<f64>| records.iter().map(f).collect::<Vec<_>>();

    DataFrame::new(vec![
        Column::new(
            "sector".into(),
            records.iter().map(|r| r.sector.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(map_err)?,
        Column::new("year".into(), records.iter().map(|r| r.year).collect::<Vec<_>>()),
        Column::new("month".into(), records.iter().map(|r| r.month).collect::<Vec<_>>()),
        Column::new(
            "month_name".into(),
            records.iter().map(|r| r.month_name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "employment_thousands".into(),
            records.iter().map(|r| r.employment_thousands).collect::<Vec<_>>(),
        ),
        Column::new(
            "employment_millions".into(),
            records.iter().map(|r| r.employment_millions).collect::<Vec<_>>(),
        ),
        Column::new(
            "period_code".into(),
            records.iter().map(|r| r.period_code.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("mom_change".into(), opt(|r| r.mom_change)),
        Column::new("mom_percent".into(), opt(|r| r.mom_percent)),
        Column::new("yoy_change".into(), opt(|r| r.yoy_change)),
        Column::new("yoy_percent".into(), opt(|r| r.yoy_percent)),
        Column::new("ma_3month".into(), opt(|r| r.ma_3month)),
        Column::new("ma_12month".into(), opt(|r| r.ma_12month)),
        Column::new(
            "growth_status".into(),
            records
                .iter()
                .map(|r| r.growth_status.map(|g| g.label()))
                .collect::<Vec<_>>(),
        ),
        Column::new("quarter".into(), records.iter().map(|r| r.quarter).collect::<Vec<_>>()),
        Column::new(
            "is_year_end".into(),
            records.iter().map(|r| r.is_year_end).collect::<Vec<_>>(),
        ),
        Column::new(
            "is_summer".into(),
            records.iter().map(|r| r.is_summer).collect::<Vec<_>>(),
        ),
    ])
    .map_err(map_err)
}

/// Write the table to a Parquet file.
pub fn write_parquet(path: &Path, records: &[EnrichedRecord]) -> Result<(), PersistError> {
    let mut df = to_dataframe(records)?;
    let mut file = File::create(path).map_err(|e| PersistError::io(path, e))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .map_err(|e| PersistError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}
