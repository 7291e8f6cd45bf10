//! EmpTrend core: BLS employment extraction, cleaning, and persistence.
//!
//! Modules:
//! - domain: raw observations, normalized and enriched rows
//! - transform: parser, metric calculator, validator, assembler
//! - io: CSV/Parquet persistence and the run manifest
//! - data: BLS provider, request budget, extractor, raw backups
//! - config: TOML pipeline configuration
//! - pipeline: assemble then persist

pub mod config;
pub mod data;
pub mod domain;
pub mod io;
pub mod pipeline;
pub mod schema;
pub mod transform;
