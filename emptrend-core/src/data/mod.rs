pub mod backup;
pub mod bls;
pub mod budget;
pub mod catalog;
pub mod extract;
pub mod provider;

pub use backup::{BackupError, RawBackupStore};
pub use bls::BlsProvider;
pub use budget::RequestBudget;
pub use catalog::SectorCatalog;
pub use extract::{Extraction, Extractor, SectorOutcome};
pub use provider::{DataError, FetchProgress, SeriesProvider, StdoutProgress, YearRange};

use serde::Deserialize;
use tracing::warn;

use crate::domain::RawPoint;

/// Decode untouched API points; points that are not `{year, period, value}`
/// are dropped with a warning.
pub fn decode_points(source: &str, values: &[serde_json::Value]) -> Vec<RawPoint> {
    values
        .iter()
        .filter_map(|v| match RawPoint::deserialize(v) {
            Ok(point) => Some(point),
            Err(e) => {
                warn!(source, error = %e, "skipping malformed raw point");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_api_points_and_drops_malformed() {
        let values = vec![
            json!({"year": "2024", "period": "M03", "periodName": "March", "value": "1,234.5", "footnotes": [{}]}),
            json!({"year": 2024, "period": "M02", "value": 1200.0}),
            json!({"period": "M01", "value": "1"}),
            json!("garbage"),
        ];
        let points = decode_points("Information", &values);
        assert_eq!(
            points,
            vec![
                RawPoint::new(2024, "M03", "1,234.5"),
                RawPoint::new(2024, "M02", "1200"),
            ]
        );
    }
}
