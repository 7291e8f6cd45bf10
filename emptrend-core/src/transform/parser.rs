//! Raw record parser: one sector's API points → normalized monthly rows.
//!
//! Points that do not describe a calendar month (annual averages, quarterly
//! codes, unparseable values) are skipped, never fatal. A sector with no
//! usable points yields an empty vector.

use chrono::{Month, NaiveDate};
use tracing::{debug, warn};

use crate::domain::{NormalizedRecord, PeriodCode, RawPoint};

/// Parse one sector's raw points into normalized rows, in input order.
pub fn parse(raw_points: &[RawPoint], sector_name: &str) -> Vec<NormalizedRecord> {
    let sector = display_name(sector_name);
    let mut records = Vec::with_capacity(raw_points.len());
    let mut skipped = 0usize;

    for point in raw_points {
        match parse_point(point, &sector) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if records.is_empty() {
        warn!(sector = %sector, points = raw_points.len(), "no valid monthly points");
    } else {
        debug!(sector = %sector, months = records.len(), skipped, "parsed sector");
    }

    records
}

/// Sector keys use underscores (`Trade_Transport_Utilities`); rows carry spaces.
pub fn display_name(sector_name: &str) -> String {
    sector_name.replace('_', " ")
}

fn parse_point(point: &RawPoint, sector: &str) -> Option<NormalizedRecord> {
    let month = PeriodCode::parse(&point.period).month()?;

    let value = match parse_value(&point.value) {
        Some(v) => v,
        None => {
            warn!(
                sector,
                year = point.year,
                period = %point.period,
                value = %point.value,
                "skipping point with unparseable value"
            );
            return None;
        }
    };

    let date = NaiveDate::from_ymd_opt(point.year, month, 1)?;
    let month_name = Month::try_from(month as u8)
        .map(|m| m.name().to_string())
        .ok()?;

    Some(NormalizedRecord {
        sector: sector.to_string(),
        date,
        year: point.year,
        month,
        month_name,
        employment_thousands: value,
        employment_millions: round2(value / 1000.0),
        period_code: point.period.clone(),
    })
}

/// BLS marks unavailable values with `-` or footnote letters; those are not numbers.
fn parse_value(raw: &str) -> Option<f64> {
    let v = raw.trim().replace(',', "").parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
