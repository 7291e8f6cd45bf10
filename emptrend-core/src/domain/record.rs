//! Row types flowing through the pipeline.
//!
//! `RawPoint` is what the BLS API hands back for one observation.
//! `NormalizedRecord` is one calendar month of one sector after parsing.
//! `EnrichedRecord` adds the per-sector derived metrics and is the row type
//! of the persisted table.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One observation as returned by the API: `{year, period, value}`.
///
/// BLS encodes `year` and `value` as JSON strings; numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(deserialize_with = "year_from_str_or_int")]
    pub year: i32,
    pub period: String,
    #[serde(deserialize_with = "value_from_str_or_number")]
    pub value: String,
}

impl RawPoint {
    pub fn new(year: i32, period: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            year,
            period: period.into(),
            value: value.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrInt {
    Str(String),
    Int(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNumber {
    Str(String),
    Number(f64),
}

fn year_from_str_or_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match StrOrInt::deserialize(deserializer)? {
        StrOrInt::Str(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid year '{s}': {e}"))),
        StrOrInt::Int(n) => {
            i32::try_from(n).map_err(|_| serde::de::Error::custom(format!("year out of range: {n}")))
        }
    }
}

fn value_from_str_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StrOrNumber::deserialize(deserializer)? {
        StrOrNumber::Str(s) => s,
        StrOrNumber::Number(n) => n.to_string(),
    })
}

/// One sector, one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub sector: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub employment_thousands: f64,
    pub employment_millions: f64,
    pub period_code: String,
}

/// Year-over-year growth bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrowthStatus {
    #[serde(rename = "Declining")]
    Declining,
    #[serde(rename = "Slight Decline")]
    SlightDecline,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Growing")]
    Growing,
    #[serde(rename = "Rapid Growth")]
    RapidGrowth,
}

impl GrowthStatus {
    /// Bucket a year-over-year percent change.
    ///
    /// `(-inf,-2]` Declining, `(-2,0)` Slight Decline, `[0,2]` Stable,
    /// `(2,5]` Growing, `(5,inf)` Rapid Growth. Zero change counts as Stable.
    pub fn classify(yoy_percent: f64) -> Option<Self> {
        if !yoy_percent.is_finite() {
            return None;
        }
        let status = if yoy_percent <= -2.0 {
            GrowthStatus::Declining
        } else if yoy_percent < 0.0 {
            GrowthStatus::SlightDecline
        } else if yoy_percent <= 2.0 {
            GrowthStatus::Stable
        } else if yoy_percent <= 5.0 {
            GrowthStatus::Growing
        } else {
            GrowthStatus::RapidGrowth
        };
        Some(status)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GrowthStatus::Declining => "Declining",
            GrowthStatus::SlightDecline => "Slight Decline",
            GrowthStatus::Stable => "Stable",
            GrowthStatus::Growing => "Growing",
            GrowthStatus::RapidGrowth => "Rapid Growth",
        }
    }
}

impl fmt::Display for GrowthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized record plus the metrics derived from its sector's history.
///
/// Field order is the column order of the persisted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub sector: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub employment_thousands: f64,
    pub employment_millions: f64,
    pub period_code: String,
    pub mom_change: Option<f64>,
    pub mom_percent: Option<f64>,
    pub yoy_change: Option<f64>,
    pub yoy_percent: Option<f64>,
    pub ma_3month: Option<f64>,
    pub ma_12month: Option<f64>,
    pub growth_status: Option<GrowthStatus>,
    pub quarter: u32,
    pub is_year_end: bool,
    pub is_summer: bool,
}

impl EnrichedRecord {
    /// Start an enriched row from a normalized one; window metrics are left empty.
    pub fn from_normalized(record: NormalizedRecord) -> Self {
        let month = record.month;
        Self {
            sector: record.sector,
            date: record.date,
            year: record.year,
            month,
            month_name: record.month_name,
            employment_thousands: record.employment_thousands,
            employment_millions: record.employment_millions,
            period_code: record.period_code,
            mom_change: None,
            mom_percent: None,
            yoy_change: None,
            yoy_percent: None,
            ma_3month: None,
            ma_12month: None,
            growth_status: None,
            quarter: month.div_ceil(3),
            is_year_end: matches!(month, 11 | 12 | 1),
            is_summer: matches!(month, 6..=8),
        }
    }
}

/// The terminal in-memory table: rows grouped by sector, date-ascending within a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    pub records: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    pub fn new(records: Vec<EnrichedRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct sector names, sorted.
    pub fn sectors(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.sector.as_str()).collect();
        set.into_iter().collect()
    }

    /// Earliest and latest month in the table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Up to the first `n` rows.
    pub fn head(&self, n: usize) -> &[EnrichedRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// `(sector, date)` keys in row order.
    pub fn keys(&self) -> Vec<(&str, NaiveDate)> {
        self.records
            .iter()
            .map(|r| (r.sector.as_str(), r.date))
            .collect()
    }

}

impl From<Vec<EnrichedRecord>> for EnrichedTable {
    fn from(records: Vec<EnrichedRecord>) -> Self {
        Self::new(records)
    }
}
