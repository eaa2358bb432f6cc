//! One-time initialization of the component system
//!
//! [`ComponentSystem::initialize`] loads definitions, sweeps the document and
//! starts the watcher. Every step is best-effort: failures are logged and
//! reported in the returned [`InitStatus`], never propagated to the host.

use std::sync::Arc;

use thiserror::Error;

use crate::applicator::{sweep, ApplyReport};
use crate::config::SystemConfig;
use crate::dom::{Document, DomError};
use crate::registry::PresetRegistry;
use crate::source::{load_definitions, DefinitionOrigin, DefinitionSource, SourceError};
use crate::watcher::ChangeWatcher;

/// Errors that stop initialization before the watcher runs
///
/// Loading and the initial sweep never stop initialization; their failures
/// are collected in the [`InitReport`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("no <{tag}> element to observe")]
    MissingRoot { tag: String },

    #[error("could not start watching: {0}")]
    Watch(#[from] DomError),
}

/// What a successful initialization did
#[derive(Debug)]
pub struct InitReport {
    pub origin: DefinitionOrigin,
    pub presets: usize,
    /// Source failures recovered from while loading
    pub load_errors: Vec<SourceError>,
    /// Result of the initial sweep
    pub sweep: ApplyReport,
}

/// Outcome of [`ComponentSystem::initialize`]
#[derive(Debug)]
pub enum InitStatus {
    /// `initialize` already ran; nothing was done
    AlreadyInitialized,
    /// Every step succeeded
    Ready(InitReport),
    /// Definitions were loaded and swept, but the watcher could not start
    Degraded(InitError),
}

/// Owns the registry and the watcher for one document
#[derive(Debug)]
pub struct ComponentSystem {
    config: SystemConfig,
    initialized: bool,
    registry: Arc<PresetRegistry>,
    watcher: Option<ChangeWatcher>,
}

impl ComponentSystem {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            initialized: false,
            registry: Arc::new(PresetRegistry::new()),
            watcher: None,
        }
    }

    /// Load definitions, apply them to the document and start watching
    ///
    /// Runs at most once. The ready flag is set before any step runs, so a
    /// failed initialization is not retried by later calls.
    pub fn initialize(&mut self, doc: &mut Document, source: &dyn DefinitionSource) -> InitStatus {
        if self.initialized {
            return InitStatus::AlreadyInitialized;
        }
        self.initialized = true;

        match self.run(doc, source) {
            Ok(report) => {
                log::info!(
                    "component system initialized: {} presets from {:?} source, {} elements styled",
                    report.presets,
                    report.origin,
                    report.sweep.applied.len()
                );
                InitStatus::Ready(report)
            }
            Err(error) => {
                log::warn!("component system initialization failed: {}", error);
                InitStatus::Degraded(error)
            }
        }
    }

    fn run(
        &mut self,
        doc: &mut Document,
        source: &dyn DefinitionSource,
    ) -> Result<InitReport, InitError> {
        let loaded = load_definitions(source, &self.config.sources, &self.config.parser);
        self.registry = Arc::new(loaded.registry);

        let report = sweep(doc, &self.registry, &self.config.binding);

        let root = doc
            .find_first(doc.root(), &self.config.watch_root)
            .ok_or_else(|| InitError::MissingRoot {
                tag: self.config.watch_root.clone(),
            })?;
        let mut watcher = ChangeWatcher::new(self.registry.clone(), self.config.binding.clone());
        watcher.start(doc, root)?;
        self.watcher = Some(watcher);

        Ok(InitReport {
            origin: loaded.origin,
            presets: self.registry.len(),
            load_errors: loaded.errors,
            sweep: report,
        })
    }

    /// Deliver queued document changes to the watcher
    pub fn pump(&self, doc: &mut Document) -> ApplyReport {
        match &self.watcher {
            Some(watcher) => watcher.pump(doc),
            None => ApplyReport::default(),
        }
    }

    /// Stop watching the document
    ///
    /// Dropping the system has the same effect on the document.
    pub fn shutdown(&mut self, doc: &mut Document) {
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.stop(doc);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(|w| w.is_watching())
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new().with(
            "/reedstyle.components.yaml",
            "components:\n  A:\n    face: f1\n  B:\n    extends: A\n    text: t1\n",
        )
    }

    #[test]
    fn test_initialize_runs_once() {
        let mut doc = Document::new();
        let mut system = ComponentSystem::new(SystemConfig::default());
        assert!(matches!(
            system.initialize(&mut doc, &source()),
            InitStatus::Ready(_)
        ));
        assert!(matches!(
            system.initialize(&mut doc, &source()),
            InitStatus::AlreadyInitialized
        ));
    }

    #[test]
    fn test_missing_watch_root_degrades_after_sweep() {
        let mut doc = Document::empty();
        let el = doc.create_element("r-s");
        doc.set_attribute(el, "as", "B").unwrap();
        doc.append_child(doc.root(), el).unwrap();

        let mut system = ComponentSystem::new(SystemConfig::default());
        match system.initialize(&mut doc, &source()) {
            InitStatus::Degraded(error) => {
                assert_eq!(
                    error,
                    InitError::MissingRoot {
                        tag: "body".to_string()
                    }
                );
            }
            other => panic!("expected degraded init, got {:?}", other),
        }
        assert_eq!(doc.get_attribute(el, "face"), Some("f1"));
        assert!(!system.is_watching());
        assert!(system.is_initialized());
        assert!(matches!(
            system.initialize(&mut doc, &source()),
            InitStatus::AlreadyInitialized
        ));
    }

    #[test]
    fn test_no_sources_means_empty_registry() {
        let mut doc = Document::new();
        let mut system = ComponentSystem::new(SystemConfig::default());
        match system.initialize(&mut doc, &MemorySource::new()) {
            InitStatus::Ready(report) => {
                assert_eq!(report.origin, DefinitionOrigin::Empty);
                assert_eq!(report.presets, 0);
                assert_eq!(report.load_errors.len(), 2);
            }
            other => panic!("expected ready, got {:?}", other),
        }
        assert!(system.registry().is_empty());
        assert!(system.is_watching());
    }

    #[test]
    fn test_shutdown_stops_watching() {
        let mut doc = Document::new();
        let mut system = ComponentSystem::new(SystemConfig::default());
        system.initialize(&mut doc, &source());
        system.shutdown(&mut doc);
        assert!(!system.is_watching());

        let body = doc.body().unwrap();
        let el = doc.create_element("r-s");
        doc.set_attribute(el, "as", "A").unwrap();
        doc.append_child(body, el).unwrap();
        assert!(system.pump(&mut doc).is_empty());
    }

    #[test]
    fn test_dropped_system_releases_its_observer() {
        let mut doc = Document::new();
        {
            let mut system = ComponentSystem::new(SystemConfig::default());
            system.initialize(&mut doc, &source());
            assert_eq!(doc.observer_count(), 1);
        }
        assert_eq!(doc.observer_count(), 0);

        let body = doc.body().unwrap();
        for _ in 0..10 {
            let el = doc.create_element("div");
            doc.append_child(body, el).unwrap();
        }
        assert_eq!(doc.observer_count(), 0);
    }
}
