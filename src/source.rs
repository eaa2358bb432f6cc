//! Definition sources and the primary → fallback loading chain

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ParserConfig, SourceConfig};
use crate::registry::PresetRegistry;

/// Errors that can occur when fetching or decoding definitions
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("definitions not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON definitions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected '{section}' to hold an object of presets, found {found}")]
    InvalidShape { section: String, found: String },
}

/// Something definitions text can be fetched from
pub trait DefinitionSource {
    fn fetch(&self, path: &str) -> Result<String, SourceError>;
}

/// Fetches definitions from files below a root directory
///
/// Absolute request paths such as `/reedstyle.components.yaml` are taken
/// relative to the root, the way a web server maps them to its document root.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DefinitionSource for FileSource {
    fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let full_path = self.resolve_path(path);
        std::fs::read_to_string(&full_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound {
                path: full_path.display().to_string(),
            },
            _ => SourceError::Io {
                path: full_path.display().to_string(),
                source: e,
            },
        })
    }
}

/// Serves definitions from memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` at `path`
    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents.insert(path.into(), content.into());
        self
    }
}

impl DefinitionSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<String, SourceError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Which source the definitions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionOrigin {
    Primary,
    Fallback,
    /// Neither source was usable
    Empty,
}

/// Result of [`load_definitions`]
#[derive(Debug)]
pub struct LoadedDefinitions {
    pub registry: PresetRegistry,
    pub origin: DefinitionOrigin,
    /// Failures that were recovered from, in the order they happened
    pub errors: Vec<SourceError>,
}

/// Load definitions from the primary source, falling back to the JSON source
///
/// Never fails: when neither source is usable the registry is empty and the
/// errors are returned alongside it.
pub fn load_definitions(
    source: &dyn DefinitionSource,
    sources: &SourceConfig,
    parser: &ParserConfig,
) -> LoadedDefinitions {
    let mut errors = Vec::new();

    match source.fetch(&sources.primary) {
        Ok(raw) => {
            return LoadedDefinitions {
                registry: PresetRegistry::from_definitions(&raw, parser),
                origin: DefinitionOrigin::Primary,
                errors,
            }
        }
        Err(err) => {
            log::warn!("primary definitions unavailable, trying fallback: {}", err);
            errors.push(err);
        }
    }

    match source
        .fetch(&sources.fallback)
        .and_then(|raw| PresetRegistry::from_json(&raw, &parser.section))
    {
        Ok(registry) => LoadedDefinitions {
            registry,
            origin: DefinitionOrigin::Fallback,
            errors,
        },
        Err(err) => {
            log::warn!("no component definitions found: {}", err);
            errors.push(err);
            LoadedDefinitions {
                registry: PresetRegistry::new(),
                origin: DefinitionOrigin::Empty,
                errors,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "components:\n  card:\n    face: from-yaml\n";
    const JSON: &str = r#"{"components": {"card": {"face": "from-json"}}}"#;

    fn load(source: &MemorySource) -> LoadedDefinitions {
        load_definitions(source, &SourceConfig::default(), &ParserConfig::default())
    }

    fn face(loaded: &LoadedDefinitions) -> Option<String> {
        loaded
            .registry
            .get("card")
            .and_then(|p| p.attributes.get("face").cloned())
    }

    #[test]
    fn test_primary_source_wins() {
        let source = MemorySource::new()
            .with("/reedstyle.components.yaml", YAML)
            .with("/reedstyle.components.json", JSON);
        let loaded = load(&source);
        assert_eq!(loaded.origin, DefinitionOrigin::Primary);
        assert_eq!(face(&loaded).as_deref(), Some("from-yaml"));
        assert!(loaded.errors.is_empty());
    }

    #[test]
    fn test_fallback_when_primary_missing() {
        let source = MemorySource::new().with("/reedstyle.components.json", JSON);
        let loaded = load(&source);
        assert_eq!(loaded.origin, DefinitionOrigin::Fallback);
        assert_eq!(face(&loaded).as_deref(), Some("from-json"));
        assert_eq!(loaded.errors.len(), 1);
        assert!(matches!(loaded.errors[0], SourceError::NotFound { .. }));
    }

    #[test]
    fn test_empty_when_both_fail() {
        let source = MemorySource::new().with("/reedstyle.components.json", "{ broken");
        let loaded = load(&source);
        assert_eq!(loaded.origin, DefinitionOrigin::Empty);
        assert!(loaded.registry.is_empty());
        assert_eq!(loaded.errors.len(), 2);
        assert!(matches!(loaded.errors[1], SourceError::Json(_)));
    }

    #[test]
    fn test_primary_without_section_is_still_primary() {
        let source = MemorySource::new()
            .with("/reedstyle.components.yaml", "version: 1\n")
            .with("/reedstyle.components.json", JSON);
        let loaded = load(&source);
        assert_eq!(loaded.origin, DefinitionOrigin::Primary);
        assert!(loaded.registry.is_empty());
    }

    #[test]
    fn test_file_source_maps_absolute_paths_under_root() {
        let source = FileSource::new("/srv/site");
        assert_eq!(
            source.resolve_path("/reedstyle.components.yaml"),
            PathBuf::from("/srv/site/reedstyle.components.yaml")
        );
    }

    #[test]
    fn test_file_source_missing_file_is_not_found() {
        let source = FileSource::new(std::env::temp_dir().join("reedstyle-components-missing"));
        let result = source.fetch("/reedstyle.components.yaml");
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }
}
