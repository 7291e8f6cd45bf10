//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over the source of raw observations so
//! the extractor can be driven by the live BLS API or by a mock in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::extract::SectorOutcome;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("request limit reached ({used} of {max} requests used)")]
    LimitReached { used: u32, max: u32 },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for series {series_id}")]
    Http { status: u16, series_id: String },

    #[error("API rejected request: {0}")]
    Api(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("invalid year range {start}-{end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("data error: {0}")]
    Other(String),
}

/// Inclusive span of calendar years to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, DataError> {
        if start > end {
            return Err(DataError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `current_year - years_back ..= current_year`.
    pub fn trailing(current_year: i32, years_back: i32) -> Self {
        Self {
            start: current_year - years_back.max(0),
            end: current_year,
        }
    }

    /// `end - start`.
    pub fn span(&self) -> i32 {
        self.end - self.start
    }
}

/// Source of raw time-series observations.
///
/// Implementations return the untouched JSON points for one series. The
/// request budget and pacing live in the extractor, above this trait.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch all observations for one series over a year range.
    fn fetch_series(
        &self,
        series_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<serde_json::Value>, DataError>;
}

/// Progress callback for multi-sector extraction.
pub trait FetchProgress: Send {
    /// Called before a sector is requested.
    fn on_start(&self, sector: &str, index: usize, total: usize);

    /// Called once a sector has an outcome.
    fn on_complete(&self, sector: &str, index: usize, total: usize, outcome: &SectorOutcome);

    /// Called when every sector has been handled.
    fn on_batch_complete(&self, fetched: usize, total: usize, requests_used: u32, max_requests: u32);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, sector: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {sector}...", index + 1, total);
    }

    fn on_complete(&self, sector: &str, _index: usize, _total: usize, outcome: &SectorOutcome) {
        match outcome {
            SectorOutcome::Fetched(n) => println!("  OK: {sector} ({n} data points)"),
            SectorOutcome::NoData(reason) => println!("  FAIL: {sector}: {reason}"),
            SectorOutcome::Skipped => println!("  SKIP: {sector} (request limit reached)"),
        }
    }

    fn on_batch_complete(&self, fetched: usize, total: usize, requests_used: u32, max_requests: u32) {
        println!("\nFetched {fetched}/{total} sectors");
        println!("Requests used: {requests_used} of {max_requests} daily limit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_range() {
        let r = YearRange::trailing(2025, 3);
        assert_eq!(r, YearRange { start: 2022, end: 2025 });
        assert_eq!(r.span(), 3);
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(matches!(
            YearRange::new(2025, 2020),
            Err(DataError::InvalidRange { start: 2025, end: 2020 })
        ));
        assert!(YearRange::new(2020, 2020).is_ok());
    }

    #[test]
    fn limit_error_message() {
        let e = DataError::LimitReached { used: 25, max: 25 };
        assert_eq!(e.to_string(), "request limit reached (25 of 25 requests used)");
    }
}
