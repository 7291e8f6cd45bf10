//! Column contract for the persisted employment table.
//!
//! Both the delimited and the Parquet writers emit exactly these columns, in
//! this order. Readers check incoming headers against it.

use serde::{Deserialize, Serialize};

/// Logical column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    Utf8,
    Date,
    Int32,
    UInt32,
    Float64,
    Boolean,
}

/// One column of the table.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub dtype: SchemaType,
    /// Derived window metrics are empty until enough history exists.
    pub nullable: bool,
}

const fn field(name: &'static str, dtype: SchemaType, nullable: bool) -> SchemaField {
    SchemaField {
        name,
        dtype,
        nullable,
    }
}

/// The enriched table, column by column.
pub const TABLE_SCHEMA: &[SchemaField] = &[
    field("sector", SchemaType::Utf8, false),
    field("date", SchemaType::Date, false),
    field("year", SchemaType::Int32, false),
    field("month", SchemaType::UInt32, false),
    field("month_name", SchemaType::Utf8, false),
    field("employment_thousands", SchemaType::Float64, false),
    field("employment_millions", SchemaType::Float64, false),
    field("period_code", SchemaType::Utf8, false),
    field("mom_change", SchemaType::Float64, true),
    field("mom_percent", SchemaType::Float64, true),
    field("yoy_change", SchemaType::Float64, true),
    field("yoy_percent", SchemaType::Float64, true),
    field("ma_3month", SchemaType::Float64, true),
    field("ma_12month", SchemaType::Float64, true),
    field("growth_status", SchemaType::Utf8, true),
    field("quarter", SchemaType::UInt32, false),
    field("is_year_end", SchemaType::Boolean, false),
    field("is_summer", SchemaType::Boolean, false),
];

/// Column names in table order.
pub fn column_names() -> Vec<&'static str> {
    TABLE_SCHEMA.iter().map(|f| f.name).collect()
}

/// Result of checking a header row against the contract.
#[derive(Debug, Clone)]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check that a header carries every table column and nothing else.
pub fn validate_header(header: &[&str]) -> SchemaValidation {
    let mut errors = Vec::new();

    for expected in TABLE_SCHEMA {
        if !header.contains(&expected.name) {
            errors.push(format!("missing required column '{}'", expected.name));
        }
    }

    for name in header {
        if !TABLE_SCHEMA.iter().any(|f| f.name == *name) {
            errors.push(format!("unexpected column '{name}' (not in schema)"));
        }
    }

    SchemaValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
