//! Data-quality checks over the enriched table.
//!
//! Every check runs; the report lists all issues found. Validation never
//! mutates or drops rows, and a failing report does not stop persistence.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::metrics::{long_average, short_average, MOM_LAG, YOY_LAG};
use crate::domain::EnrichedRecord;

/// Employment figures are in thousands; a million thousand is a billion jobs.
pub const MAX_PLAUSIBLE_THOUSANDS: f64 = 1_000_000.0;

/// Consecutive monthly observations are at most 31 days apart.
pub const MAX_GAP_DAYS: i64 = 35;

/// A single data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingValues { columns: BTreeMap<String, usize> },
    DuplicateKeys { count: usize },
    NegativeEmployment { count: usize },
    UnrealisticEmployment { count: usize },
    DateGap { sector: String, max_gap_days: i64 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingValues { columns } => {
                let parts: Vec<String> = columns.iter().map(|(c, n)| format!("{c}: {n}")).collect();
                write!(f, "Missing values found: {{{}}}", parts.join(", "))
            }
            ValidationIssue::DuplicateKeys { count } => {
                write!(f, "Duplicate (sector, date) records found: {count}")
            }
            ValidationIssue::NegativeEmployment { count } => {
                write!(f, "Negative employment values found ({count} rows)")
            }
            ValidationIssue::UnrealisticEmployment { count } => write!(
                f,
                "Unrealistic employment values above {MAX_PLAUSIBLE_THOUSANDS} thousand ({count} rows)"
            ),
            ValidationIssue::DateGap {
                sector,
                max_gap_days,
            } => write!(
                f,
                "Date gaps found in {sector} data (largest gap {max_gap_days} days)"
            ),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Rows sharing a `(sector, date)` key with an earlier row. Always counted.
    pub duplicate_count: usize,
    pub rows_checked: usize,
}

impl ValidationReport {
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// `(is_valid, issue messages)`.
    pub fn into_parts(self) -> (bool, Vec<String>) {
        let messages = self.messages();
        (self.is_valid, messages)
    }
}

/// Run every check over `records` and report what was found.
pub fn validate(records: &[EnrichedRecord]) -> ValidationReport {
    info!(rows = records.len(), "running data validation checks");

    let mut issues = Vec::new();

    let missing = missing_values(records);
    if !missing.is_empty() {
        issues.push(ValidationIssue::MissingValues { columns: missing });
    }

    let duplicate_count = count_duplicates(records);
    if duplicate_count > 0 {
        issues.push(ValidationIssue::DuplicateKeys {
            count: duplicate_count,
        });
    }

    let negative = records
        .iter()
        .filter(|r| r.employment_thousands < 0.0)
        .count();
    if negative > 0 {
        issues.push(ValidationIssue::NegativeEmployment { count: negative });
    }

    let unrealistic = records
        .iter()
        .filter(|r| r.employment_thousands > MAX_PLAUSIBLE_THOUSANDS)
        .count();
    if unrealistic > 0 {
        issues.push(ValidationIssue::UnrealisticEmployment { count: unrealistic });
    }

    for (sector, dates) in sorted_dates_by_sector(records) {
        let max_gap = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .max()
            .unwrap_or(0);
        if max_gap > MAX_GAP_DAYS {
            issues.push(ValidationIssue::DateGap {
                sector: sector.to_string(),
                max_gap_days: max_gap,
            });
        }
    }

    if issues.is_empty() {
        info!("all validation checks passed");
    } else {
        for issue in &issues {
            warn!("data quality issue: {issue}");
        }
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        duplicate_count,
        rows_checked: records.len(),
    }
}

/// Count empty required fields, and derived fields that are empty even
/// though the row has enough sector history for them to exist.
fn missing_values(records: &[EnrichedRecord]) -> BTreeMap<String, usize> {
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    let mut bump = |column: &str| *missing.entry(column.to_string()).or_insert(0) += 1;

    // Position of each row within its sector's date-sorted sequence.
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        (records[a].sector.as_str(), records[a].date).cmp(&(records[b].sector.as_str(), records[b].date))
    });
    let mut position = vec![0usize; records.len()];
    let mut prev_sector: Option<&str> = None;
    let mut pos = 0usize;
    for &idx in &order {
        let sector = records[idx].sector.as_str();
        if prev_sector == Some(sector) {
            pos += 1;
        } else {
            pos = 0;
            prev_sector = Some(sector);
        }
        position[idx] = pos;
    }

    for (idx, r) in records.iter().enumerate() {
        if r.sector.trim().is_empty() {
            bump("sector");
        }
        if r.month_name.trim().is_empty() {
            bump("month_name");
        }
        if r.period_code.trim().is_empty() {
            bump("period_code");
        }
        if !r.employment_thousands.is_finite() {
            bump("employment_thousands");
        }
        if !r.employment_millions.is_finite() {
            bump("employment_millions");
        }

        let pos = position[idx];
        let expect = |lookback: usize, value: Option<f64>| {
            pos >= lookback && !value.is_some_and(f64::is_finite)
        };
        if expect(MOM_LAG, r.mom_change) {
            bump("mom_change");
        }
        if expect(MOM_LAG, r.mom_percent) {
            bump("mom_percent");
        }
        if expect(YOY_LAG, r.yoy_change) {
            bump("yoy_change");
        }
        if expect(YOY_LAG, r.yoy_percent) {
            bump("yoy_percent");
        }
        if pos >= YOY_LAG && r.growth_status.is_none() {
            bump("growth_status");
        }
        if expect(short_average().lookback(), r.ma_3month) {
            bump("ma_3month");
        }
        if expect(long_average().lookback(), r.ma_12month) {
            bump("ma_12month");
        }
    }

    missing
}

fn count_duplicates(records: &[EnrichedRecord]) -> usize {
    let mut seen: HashSet<(&str, NaiveDate)> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|r| !seen.insert((r.sector.as_str(), r.date)))
        .count()
}

fn sorted_dates_by_sector(records: &[EnrichedRecord]) -> BTreeMap<&str, Vec<NaiveDate>> {
    let mut by_sector: BTreeMap<&str, Vec<NaiveDate>> = BTreeMap::new();
    for r in records {
        by_sector.entry(r.sector.as_str()).or_default().push(r.date);
    }
    for dates in by_sector.values_mut() {
        dates.sort();
    }
    by_sector
}
