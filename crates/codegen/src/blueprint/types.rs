//! Scalar type table
//!
//! Maps the open-ended scalar type vocabulary of authored schemas onto
//! concrete column storage methods. Unknown names degrade to a string
//! column; file-like types live outside the table and get no column.

use super::model::{ColumnArgs, ColumnMethod};

/// Default `(precision, scale)` for decimals declared without them
pub const DEFAULT_DECIMAL: (u32, u32) = (8, 2);

/// Outcome of looking a scalar type up in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarMapping {
    Column(ColumnMethod, ColumnArgs),
    /// Stored outside the table (uploads); produces no column
    External,
}

/// Size hints declared next to the type name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeHints {
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

/// Resolve a scalar type name (case-insensitive)
pub fn map_scalar(type_name: &str, hints: TypeHints, default_string_length: u32) -> ScalarMapping {
    let normalized = type_name.trim().to_ascii_lowercase();
    let string = |length: Option<u32>| ColumnArgs {
        length: Some(length.unwrap_or(default_string_length)),
        ..Default::default()
    };

    let (method, args) = match normalized.as_str() {
        "file" | "files" | "image" | "images" => return ScalarMapping::External,

        "string" | "varchar" | "email" | "url" | "password" | "slug" | "phone" | "color" => {
            (ColumnMethod::String, string(hints.length))
        }
        "char" => (ColumnMethod::Char, string(hints.length)),
        "text" => (ColumnMethod::Text, ColumnArgs::default()),
        "mediumtext" | "medium_text" => (ColumnMethod::MediumText, ColumnArgs::default()),
        "longtext" | "long_text" => (ColumnMethod::LongText, ColumnArgs::default()),

        "int8" | "tinyint" | "tiny_integer" => (ColumnMethod::TinyInteger, ColumnArgs::default()),
        "int16" | "smallint" | "small_integer" => {
            (ColumnMethod::SmallInteger, ColumnArgs::default())
        }
        "int" | "int32" | "integer" => (ColumnMethod::Integer, ColumnArgs::default()),
        "int64" | "bigint" | "big_integer" => (ColumnMethod::BigInteger, ColumnArgs::default()),

        "float" | "float32" => (ColumnMethod::Float, ColumnArgs::default()),
        "double" | "float64" => (ColumnMethod::Double, ColumnArgs::default()),
        "decimal" | "numeric" => (
            ColumnMethod::Decimal,
            ColumnArgs {
                precision: Some(hints.precision.unwrap_or(DEFAULT_DECIMAL.0)),
                scale: Some(hints.scale.unwrap_or(DEFAULT_DECIMAL.1)),
                ..Default::default()
            },
        ),

        "bool" | "boolean" => (ColumnMethod::Boolean, ColumnArgs::default()),

        "date" => (ColumnMethod::Date, ColumnArgs::default()),
        "datetime" => (ColumnMethod::DateTime, ColumnArgs::default()),
        "datetimetz" | "datetime_tz" => (ColumnMethod::DateTimeTz, ColumnArgs::default()),
        "time" => (ColumnMethod::Time, ColumnArgs::default()),
        "timestamp" => (ColumnMethod::Timestamp, ColumnArgs::default()),
        "timestamptz" | "timestamp_tz" => (ColumnMethod::TimestampTz, ColumnArgs::default()),
        "year" => (ColumnMethod::Year, ColumnArgs::default()),

        "json" | "array" | "object" => (ColumnMethod::Json, ColumnArgs::default()),
        "jsonb" => (ColumnMethod::Jsonb, ColumnArgs::default()),

        "uuid" => (ColumnMethod::Uuid, ColumnArgs::default()),
        "binary" | "blob" | "bytes" => (ColumnMethod::Binary, ColumnArgs::default()),

        other => {
            tracing::debug!(type_name = other, "unknown scalar type, using string column");
            (ColumnMethod::String, string(hints.length))
        }
    };

    ScalarMapping::Column(method, args)
}

// ============================================================================
// Tests
// ============================================================================
