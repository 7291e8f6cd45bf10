//! Property tests for parser and metric invariants.
//!
//! Uses proptest to verify:
//! 1. Month codes M01..M12 yield exactly one record with that month; others yield none
//! 2. MoM is defined for N-1 rows, YoY for max(0, N-12) rows
//! 3. The 3-month average is always defined, the 12-month one from row 12
//! 4. Computing metrics twice gives identical output
//! 5. Metrics never mix sectors, whatever the input interleaving

use chrono::{Datelike, Months, NaiveDate};
use emptrend_core::domain::{NormalizedRecord, RawPoint};
use emptrend_core::transform::{metrics, parser};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = f64> {
    (100.0..200_000.0_f64).prop_map(|v| (v * 10.0).round() / 10.0)
}

fn arb_year() -> impl Strategy<Value = i32> {
    1990..2030_i32
}

/// Period codes that are not calendar months.
fn arb_non_month_code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("M13".to_string()),
        Just("M00".to_string()),
        (1..5u32).prop_map(|q| format!("Q0{q}")),
        (1..3u32).prop_map(|s| format!("S0{s}")),
        Just("A01".to_string()),
        Just("".to_string()),
    ]
}

fn series(sector: &str, start: NaiveDate, values: &[f64]) -> Vec<NormalizedRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let date = start + Months::new(i as u32);
            let points = [RawPoint::new(
                date.year(),
                format!("M{:02}", date.month()),
                format!("{v:.1}"),
            )];
            parser::parse(&points, sector).remove(0)
        })
        .collect()
}

fn jan(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

// ── 1. Parser ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn month_code_yields_one_record(year in arb_year(), month in 1..=12u32, value in arb_value()) {
        let points = [RawPoint::new(year, format!("M{month:02}"), format!("{value}"))];
        let records = parser::parse(&points, "Construction");
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].month, month);
        prop_assert_eq!(records[0].year, year);
        prop_assert_eq!(records[0].employment_thousands, value);
    }

    #[test]
    fn non_month_code_yields_nothing(year in arb_year(), code in arb_non_month_code(), value in arb_value()) {
        let points = [RawPoint::new(year, code, format!("{value}"))];
        prop_assert!(parser::parse(&points, "Construction").is_empty());
    }
}

// ── 2-4. Metric Calculator ───────────────────────────────────────────

proptest! {
    #[test]
    fn definition_counts(values in prop::collection::vec(arb_value(), 1..40), year in arb_year()) {
        let n = values.len();
        let rows = metrics::compute(&series("Information", jan(year), &values));
        prop_assert_eq!(rows.len(), n);

        let mom = rows.iter().filter(|r| r.mom_change.is_some()).count();
        let yoy = rows.iter().filter(|r| r.yoy_change.is_some()).count();
        prop_assert_eq!(mom, n - 1);
        prop_assert_eq!(yoy, n.saturating_sub(12));
        prop_assert!(rows[0].mom_change.is_none());
    }

    #[test]
    fn moving_average_windows(values in prop::collection::vec(arb_value(), 1..40)) {
        let rows = metrics::compute(&series("Government", jan(2000), &values));
        for (i, row) in rows.iter().enumerate() {
            prop_assert!(row.ma_3month.is_some(), "row {} lacks ma_3month", i);
            prop_assert_eq!(row.ma_12month.is_some(), i >= 11, "row {}", i);
        }
    }

    #[test]
    fn compute_is_idempotent(values in prop::collection::vec(arb_value(), 1..30)) {
        let input = series("Financial", jan(2010), &values);
        prop_assert_eq!(metrics::compute(&input), metrics::compute(&input));
    }

    #[test]
    fn sectors_never_mix(
        a in prop::collection::vec(arb_value(), 13..25),
        b in prop::collection::vec(arb_value(), 13..25),
    ) {
        let alone_a = metrics::compute(&series("Construction", jan(2015), &a));
        let alone_b = metrics::compute(&series("Manufacturing", jan(2015), &b));

        // Interleave the two sectors row by row.
        let sa = series("Construction", jan(2015), &a);
        let sb = series("Manufacturing", jan(2015), &b);
        let mut mixed = Vec::new();
        for i in 0..sa.len().max(sb.len()) {
            if let Some(r) = sb.get(i) { mixed.push(r.clone()); }
            if let Some(r) = sa.get(i) { mixed.push(r.clone()); }
        }

        let together = metrics::compute(&mixed);
        let (got_a, got_b): (Vec<_>, Vec<_>) =
            together.into_iter().partition(|r| r.sector == "Construction");
        prop_assert_eq!(got_a, alone_a);
        prop_assert_eq!(got_b, alone_b);
    }
}
