//! Configuration for definition loading and element binding
//!
//! Every value has a default, so an empty TOML file (or none at all) yields
//! the stock setup: definitions at `/reedstyle.components.yaml` with a JSON
//! fallback, applied to `<r-s as="...">` elements.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where definitions are fetched from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Structured-text definitions, tried first
    pub primary: String,
    /// Pre-flattened JSON definitions, tried when the primary source fails
    pub fallback: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary: "/reedstyle.components.yaml".to_string(),
            fallback: "/reedstyle.components.json".to_string(),
        }
    }
}

/// How the structured-text definitions are read
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Name of the top-level section holding the presets
    pub section: String,
    /// Columns per nesting level
    pub indent_unit: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            section: "components".to_string(),
            indent_unit: 2,
        }
    }
}

/// Which elements receive presets and how they are marked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ElementBinding {
    /// Tag name of target elements
    pub tag: String,
    /// Attribute naming the preset to apply
    pub selector: String,
    /// Attribute recording the preset that was applied
    pub marker: String,
}

impl Default for ElementBinding {
    fn default() -> Self {
        Self {
            tag: "r-s".to_string(),
            selector: "as".to_string(),
            marker: "data-component".to_string(),
        }
    }
}

/// Complete configuration of the component system
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SystemConfig {
    pub sources: SourceConfig,
    pub parser: ParserConfig,
    pub binding: ElementBinding,
    /// Tag of the element observed for insertions
    pub watch_root: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sources: SourceConfig::default(),
            parser: ParserConfig::default(),
            binding: ElementBinding::default(),
            watch_root: "body".to_string(),
        }
    }
}

impl SystemConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the definition sources
    pub fn with_sources(mut self, sources: SourceConfig) -> Self {
        self.sources = sources;
        self
    }

    /// Set the parser configuration
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Set the element binding
    pub fn with_binding(mut self, binding: ElementBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Set the tag of the observed root element
    pub fn with_watch_root(mut self, tag: impl Into<String>) -> Self {
        self.watch_root = tag.into();
        self
    }
}
