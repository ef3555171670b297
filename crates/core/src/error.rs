//! Error types for Migrata
//!
//! The compiler itself recovers locally from malformed schema input, so the
//! variants here are raised by the surrounding layer: loading schema and
//! change files, parsing configuration, and parsing caller-supplied
//! timestamps. Validation variants are reported as warnings by the generator.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Migrata
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity validation failed
    #[error("Entity validation failed for '{entity}': {message}")]
    EntityValidation { entity: String, message: String },

    /// Property validation failed
    #[error("Property validation failed for '{entity}.{property}': {message}")]
    PropertyValidation {
        entity: String,
        property: String,
        message: String,
    },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Schema file or directory not found
    #[error("Schema not found at path: {0}")]
    SchemaNotFound(PathBuf),

    // ========================================================================
    // Duplicate Errors
    // ========================================================================
    /// Duplicate entity name
    #[error("Duplicate entity name: '{0}' already exists")]
    DuplicateEntity(String),

    /// Two entities resolve to the same physical table
    #[error("Duplicate table name '{table}' (entities '{first}' and '{second}')")]
    DuplicateTable {
        table: String,
        first: String,
        second: String,
    },

    // ========================================================================
    // Timestamp Errors
    // ========================================================================
    /// Migration timestamp could not be parsed
    #[error("Invalid migration timestamp '{value}': expected YYYY_MM_DD_HHMMSS")]
    InvalidTimestamp { value: String },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid schema file format
    #[error("Invalid schema format in '{path}': {message}")]
    InvalidSchemaFormat { path: PathBuf, message: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Context
    // ========================================================================
    /// Error wrapped with the operation that raised it
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create an entity validation error
    pub fn entity_validation(entity: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::EntityValidation {
            entity: entity.into(),
            message: msg.into(),
        }
    }

    /// Create a property validation error
    pub fn property_validation(
        entity: impl Into<String>,
        property: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::PropertyValidation {
            entity: entity.into(),
            property: property.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        EngineError::InvalidTimestamp {
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::EntityValidation { .. }
                | EngineError::PropertyValidation { .. }
                | EngineError::DuplicateEntity(_)
                | EngineError::DuplicateTable { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::SchemaNotFound(_))
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, EngineError::Io(_) | EngineError::FileRead { .. })
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
