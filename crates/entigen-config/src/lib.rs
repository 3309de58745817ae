//! # entigen-config
//!
//! Layered configuration loading for entigen using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ENTIGEN_*` prefix, `__` as separator)
//! 2. Project-level `.entigen/config.toml`
//! 3. User-level `~/.config/entigen/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ENTIGEN_FORMAT__INDENT_SIZE` -> `format.indent_size`,
//! `ENTIGEN_ANNOTATIONS__PACKAGE` -> `annotations.package`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use entigen_config::EntigenConfig;
//!
//! let config = EntigenConfig::load().expect("config");
//! println!("indent: {}", config.format.indent_size);
//! ```

mod annotations;
mod error;
mod format;
mod parser;

pub use annotations::AnnotationConfig;
pub use error::ConfigError;
pub use format::{FormatterConfig, IndentChar, detect_style};
pub use parser::ParserConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntigenConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub format: FormatterConfig,
    #[serde(default)]
    pub annotations: AnnotationConfig,
}

impl EntigenConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit project config file in place of `.entigen/config.toml`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::base_figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ENTIGEN_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Self::base_figment();

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".entigen/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ENTIGEN_").split("__"))
    }

    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        figment
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("entigen").join("config.toml"))
    }

    /// Reject values that would make generated code unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.format.validate()?;
        self.annotations.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EntigenConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.parser.tolerate_syntax_errors);
        assert_eq!(config.format.indent_size, 4);
        assert_eq!(config.annotations.package, "io.objectbox.annotation");
    }

    #[test]
    fn figment_builds_without_files() {
        let config: EntigenConfig = EntigenConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.parser.default_schema, "default");
    }
}
