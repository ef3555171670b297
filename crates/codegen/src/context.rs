//! # Build Context
//!
//! The `BuildContext` bundles everything the engines read while compiling
//! one schema: the entity collection, the generator configuration and the
//! locale resolver used for column comments. It is built once per run and
//! shared by reference with the blueprint builder, the relationship
//! extractor and the diff engine.

use migrata_core::{FallbackLocaleResolver, LocaleResolver, LocalizedText};
use migrata_ir::{PropertyDefinition, Schema};

use crate::GeneratorConfig;

// ============================================================================
// BuildContext
// ============================================================================

/// Read-only inputs shared by every engine during one run
pub struct BuildContext<'a> {
    /// The full entity collection
    pub schema: &'a Schema,

    /// Generator configuration (locale, string length, flags)
    pub config: &'a GeneratorConfig,

    resolver: Box<dyn LocaleResolver + 'a>,
}

impl<'a> BuildContext<'a> {
    /// Context with a fallback resolver built from the configured locales
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig) -> Self {
        let resolver = FallbackLocaleResolver::new(&config.locale, &config.fallback_locale);
        Self {
            schema,
            config,
            resolver: Box::new(resolver),
        }
    }

    /// Replace the locale resolver
    pub fn with_resolver(mut self, resolver: impl LocaleResolver + 'a) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn resolve(&self, text: &LocalizedText) -> String {
        self.resolver.resolve(text)
    }

    /// Column comment for a property, if comments are enabled and the
    /// display name resolves to something non-empty
    pub fn comment_for(&self, property: &PropertyDefinition) -> Option<String> {
        if !self.config.include_comments {
            return None;
        }
        property
            .display_name()
            .map(|text| self.resolve(text))
            .filter(|s| !s.is_empty())
    }

    pub fn default_string_length(&self) -> u32 {
        self.config.default_string_length
    }
}

impl std::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("entities", &self.schema.entity_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use migrata_ir::ScalarProperty;

    fn localized_title() -> PropertyDefinition {
        let mut names = IndexMap::new();
        names.insert("en".to_string(), "Title".to_string());
        names.insert("ja".to_string(), "タイトル".to_string());
        ScalarProperty::new("string")
            .with_display_name(LocalizedText::Localized(names))
            .into()
    }

    #[test]
    fn test_comment_uses_configured_locale() {
        let schema = Schema::new();
        let config = GeneratorConfig::new().with_locale("ja");
        let ctx = BuildContext::new(&schema, &config);
        assert_eq!(ctx.comment_for(&localized_title()), Some("タイトル".to_string()));
    }

    #[test]
    fn test_comments_disabled() {
        let schema = Schema::new();
        let config = GeneratorConfig::new().without_comments();
        let ctx = BuildContext::new(&schema, &config);
        assert_eq!(ctx.comment_for(&localized_title()), None);
    }

    struct Upper;

    impl LocaleResolver for Upper {
        fn resolve(&self, text: &LocalizedText) -> String {
            match text {
                LocalizedText::Plain(s) => s.to_uppercase(),
                LocalizedText::Localized(_) => "LOCALIZED".to_string(),
            }
        }
    }

    #[test]
    fn test_custom_resolver() {
        let schema = Schema::new();
        let config = GeneratorConfig::default();
        let ctx = BuildContext::new(&schema, &config).with_resolver(Upper);
        let prop: PropertyDefinition = ScalarProperty::new("string")
            .with_display_name("name")
            .into();
        assert_eq!(ctx.comment_for(&prop), Some("NAME".to_string()));
    }
}
