//! Core traits for Migrata
//!
//! Validation of authored schema input and resolution of localizable
//! display text into a single string.

use crate::error::EngineResult;
use crate::types::LocalizedText;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid. The generator
/// treats findings as warnings and still produces output.
///
/// # Example
///
/// ```rust,ignore
/// use migrata_core::{Validatable, EngineResult, EngineError};
///
/// struct Column {
///     name: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> EngineResult<()> {
///         if self.name.is_empty() {
///             return Err(EngineError::validation("Column name cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the first problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Locale Resolution
// ============================================================================

/// Turns a display-name value into one human-readable string
pub trait LocaleResolver {
    fn resolve(&self, text: &LocalizedText) -> String;
}

/// Resolver that tries the requested locale, then the fallback locale,
/// then the first entry of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackLocaleResolver {
    pub locale: String,
    pub fallback: String,
}

impl FallbackLocaleResolver {
    pub fn new(locale: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback: fallback.into(),
        }
    }
}

impl Default for FallbackLocaleResolver {
    fn default() -> Self {
        Self::new("en", "en")
    }
}

impl LocaleResolver for FallbackLocaleResolver {
    fn resolve(&self, text: &LocalizedText) -> String {
        match text {
            LocalizedText::Plain(s) => s.clone(),
            LocalizedText::Localized(map) => map
                .get(&self.locale)
                .or_else(|| map.get(&self.fallback))
                .or_else(|| map.values().next())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
