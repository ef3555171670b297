//! # Migrata Core
//!
//! Core types, traits, and error handling for Migrata.
//!
//! This crate provides the foundational building blocks used throughout
//! the Migrata workspace, including:
//!
//! - **Types**: Primary-key strategies, relation kinds, referential actions,
//!   column defaults and localizable text
//! - **Traits**: `Validatable` and `LocaleResolver`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::{FallbackLocaleResolver, LocaleResolver, Validatable};
pub use types::{
    DefaultValue, KeyType, LocalizedText, PrimaryKeyStrategy, ReferentialAction, RelationKind,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
