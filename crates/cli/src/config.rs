//! CLI configuration handling.

use anyhow::Context;
use migrata_codegen::GeneratorConfig;
use migrata_core::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::GeneratorArgs;

/// Default config file name (lives in the working directory)
pub const CONFIG_FILE_NAME: &str = "migrata.toml";

/// Migrata CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generator configuration
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config '{}'", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.generator.validate()?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise `./migrata.toml` is used when present
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "Using local config");
            return Self::load(local);
        }
        Ok(Self::default())
    }

    /// Generator configuration with command-line flags applied on top
    pub fn generator_config(&self, args: &GeneratorArgs) -> GeneratorConfig {
        let mut config = self.generator.clone();
        if let Some(locale) = &args.locale {
            config = config.with_locale(locale.clone());
        }
        if let Some(timestamp) = args.base_timestamp {
            config = config.with_base_timestamp(timestamp);
        }
        config
    }
}
