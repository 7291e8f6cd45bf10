//! Transformation stages: parse → metrics → validate → assemble.

pub mod assemble;
pub mod metrics;
pub mod parser;
pub mod validate;
pub mod window;

pub use assemble::{assemble, AssembledDataset, PipelineError};
pub use validate::{validate, ValidationIssue, ValidationReport};
