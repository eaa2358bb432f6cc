//! ReedSTYLE components - preset defaults for `<r-s>` elements
//!
//! Components are named presets of attribute defaults (`box`, `face`, `text`,
//! `layout`, `device`, `fx`) declared in a definitions file. Presets may extend
//! one other preset. Elements opt in with `<r-s as="name">`; the preset's
//! values are written onto the element only where the author has not set the
//! attribute, and newly inserted elements are picked up by a watcher.
//!
//! # Example
//!
//! ```rust
//! use reedstyle_components::{ComponentSystem, Document, InitStatus, MemorySource, SystemConfig};
//!
//! let source = MemorySource::new().with(
//!     "/reedstyle.components.yaml",
//!     "components:\n  card:\n    face: \"bg:base-50\"\n  \
//!      hero:\n    extends: card\n    text: \"size:xl\"\n",
//! );
//!
//! let mut doc = Document::new();
//! let body = doc.body().unwrap();
//! let mut system = ComponentSystem::new(SystemConfig::default());
//! assert!(matches!(system.initialize(&mut doc, &source), InitStatus::Ready(_)));
//!
//! // Elements inserted later are styled on the next batch of changes.
//! let hero = doc.create_element("r-s");
//! doc.set_attribute(hero, "as", "hero").unwrap();
//! doc.append_child(body, hero).unwrap();
//! system.pump(&mut doc);
//!
//! assert_eq!(doc.get_attribute(hero, "face"), Some("bg:base-50"));
//! assert_eq!(doc.get_attribute(hero, "text"), Some("size:xl"));
//! assert_eq!(doc.get_attribute(hero, "data-component"), Some("hero"));
//! ```

pub mod applicator;
pub mod config;
pub mod dom;
pub mod error;
pub mod lifecycle;
pub mod lint;
pub mod parser;
pub mod preset;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod watcher;

pub use applicator::{apply, apply_named, sweep, ApplyOutcome, ApplyReport};
pub use config::{ConfigError, ElementBinding, ParserConfig, SourceConfig, SystemConfig};
pub use dom::{Document, DomError, MutationRecord, NodeId};
pub use error::{ApplyError, ResolveError};
pub use lifecycle::{ComponentSystem, InitError, InitReport, InitStatus};
pub use lint::{LintCategory, LintWarning};
pub use parser::{parse, parse_with_config};
pub use preset::{Namespace, Preset, PresetMap, ResolvedPreset};
pub use registry::PresetRegistry;
pub use resolver::resolve;
pub use source::{
    load_definitions, DefinitionOrigin, DefinitionSource, FileSource, LoadedDefinitions,
    MemorySource, SourceError,
};
pub use watcher::ChangeWatcher;
