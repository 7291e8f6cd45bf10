//! Domain types: raw observations, normalized and enriched rows, period codes.

pub mod period;
pub mod record;

pub use period::PeriodCode;
pub use record::{EnrichedRecord, EnrichedTable, GrowthStatus, NormalizedRecord, RawPoint};
