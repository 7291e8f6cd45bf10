//! Extraction orchestrator: fetches every catalog sector under a request
//! budget, paces successive calls, and archives raw responses.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::backup::RawBackupStore;
use super::budget::RequestBudget;
use super::catalog::SectorCatalog;
use super::decode_points;
use super::provider::{DataError, FetchProgress, SeriesProvider, YearRange};
use crate::domain::RawPoint;

/// Minimum delay between two requests.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// What happened to one sector during a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorOutcome {
    /// Data points received.
    Fetched(usize),
    /// The request was made but yielded nothing usable.
    NoData(String),
    /// Not requested because the budget was already spent.
    Skipped,
}

/// Result of a multi-sector fetch.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Untouched points per sector, only for sectors that returned data.
    pub raw: BTreeMap<String, Vec<serde_json::Value>>,
    /// Outcome per sector, in the order they were handled.
    pub outcomes: Vec<(String, SectorOutcome)>,
    pub backups: Vec<PathBuf>,
    pub requests_used: u32,
    pub max_requests: u32,
}

impl Extraction {
    pub fn fetched_count(&self) -> usize {
        self.count(|o| matches!(o, SectorOutcome::Fetched(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, SectorOutcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, SectorOutcome::NoData(_)))
    }

    fn count(&self, pred: impl Fn(&SectorOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    /// Decode the raw JSON into parser input, dropping malformed points.
    pub fn raw_points(&self) -> BTreeMap<String, Vec<RawPoint>> {
        self.raw
            .iter()
            .map(|(sector, values)| (sector.clone(), decode_points(sector, values)))
            .collect()
    }
}

pub struct Extractor {
    provider: Box<dyn SeriesProvider>,
    budget: RequestBudget,
    pacing: Duration,
    backups: Option<RawBackupStore>,
    last_request: Option<Instant>,
}

impl Extractor {
    pub fn new(provider: Box<dyn SeriesProvider>, budget: RequestBudget) -> Self {
        Self {
            provider,
            budget,
            pacing: DEFAULT_PACING,
            backups: None,
            last_request: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_backups(mut self, store: RawBackupStore) -> Self {
        self.backups = Some(store);
        self
    }

    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// One budgeted, paced request.
    pub fn fetch_series(
        &mut self,
        series_id: &str,
        years: YearRange,
    ) -> Result<Vec<serde_json::Value>, DataError> {
        self.budget.try_acquire()?;
        self.wait_for_pacing();

        info!(
            series_id,
            start = years.start,
            end = years.end,
            request = self.budget.used(),
            max = self.budget.max_requests(),
            "fetching series"
        );
        let result = self.provider.fetch_series(series_id, years.start, years.end);
        self.last_request = Some(Instant::now());
        result
    }

    fn wait_for_pacing(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.pacing {
                std::thread::sleep(self.pacing - elapsed);
            }
        }
    }

    /// Fetch every sector of the catalog.
    ///
    /// A failing sector is logged and the run moves on. Once the budget is
    /// spent the remaining sectors are marked skipped and no further
    /// requests are made.
    pub fn fetch_all(
        &mut self,
        catalog: &SectorCatalog,
        years: YearRange,
        progress: &dyn FetchProgress,
    ) -> Extraction {
        let total = catalog.len();
        let mut extraction = Extraction {
            max_requests: self.budget.max_requests(),
            ..Extraction::default()
        };

        info!(sectors = total, start = years.start, end = years.end, "fetching employment data");

        for (i, (sector, series_id)) in catalog.iter().enumerate() {
            progress.on_start(sector, i, total);

            let outcome = match self.fetch_series(series_id, years) {
                Ok(points) if points.is_empty() => {
                    warn!(sector, series_id, "no data points returned");
                    SectorOutcome::NoData("no data points returned".into())
                }
                Ok(points) => {
                    let n = points.len();
                    if let Some(store) = &self.backups {
                        let now = chrono::Local::now().naive_local();
                        match store.save(sector, series_id, &points, now) {
                            Ok(path) => extraction.backups.push(path),
                            Err(e) => warn!(sector, error = %e, "failed to save raw backup"),
                        }
                    }
                    extraction.raw.insert(sector.to_string(), points);
                    SectorOutcome::Fetched(n)
                }
                Err(e @ DataError::LimitReached { .. }) => {
                    warn!(sector, error = %e, "skipping sector");
                    SectorOutcome::Skipped
                }
                Err(e) => {
                    warn!(sector, series_id, error = %e, "sector fetch failed");
                    SectorOutcome::NoData(e.to_string())
                }
            };

            progress.on_complete(sector, i, total, &outcome);
            extraction.outcomes.push((sector.to_string(), outcome));
        }

        extraction.requests_used = self.budget.used();
        progress.on_batch_complete(
            extraction.fetched_count(),
            total,
            extraction.requests_used,
            extraction.max_requests,
        );
        info!(
            fetched = extraction.fetched_count(),
            skipped = extraction.skipped_count(),
            requests_used = extraction.requests_used,
            "fetch complete"
        );

        extraction
    }
}
