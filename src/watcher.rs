//! Applying presets to elements inserted after the initial sweep

use std::sync::Arc;

use crate::applicator::{apply_named, ApplyReport};
use crate::config::ElementBinding;
use crate::dom::{Document, DomError, MutationRecord, NodeId, ObserverId};
use crate::registry::PresetRegistry;

/// Watches a subtree for inserted target elements
#[derive(Debug)]
pub struct ChangeWatcher {
    registry: Arc<PresetRegistry>,
    binding: ElementBinding,
    observer: Option<ObserverId>,
}

impl ChangeWatcher {
    pub fn new(registry: Arc<PresetRegistry>, binding: ElementBinding) -> Self {
        Self {
            registry,
            binding,
            observer: None,
        }
    }

    /// Begin observing insertions at or below `root`
    ///
    /// Starting an already running watcher moves it to the new root.
    pub fn start(&mut self, doc: &mut Document, root: NodeId) -> Result<(), DomError> {
        let observer = doc.observe(root)?;
        if let Some(previous) = self.observer.replace(observer) {
            doc.disconnect(previous);
        }
        Ok(())
    }

    /// Stop observing; pending changes are discarded
    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.observer.is_some()
    }

    /// Process the batch of changes queued since the last call
    pub fn pump(&self, doc: &mut Document) -> ApplyReport {
        let Some(observer) = self.observer.as_ref() else {
            return ApplyReport::default();
        };
        let records = doc.take_records(observer);
        self.handle_batch(doc, &records)
    }

    /// Apply presets to every target element added by `records`
    ///
    /// An added element is checked itself and, independently, searched for
    /// target descendants. Added text and comment nodes are skipped.
    pub fn handle_batch(&self, doc: &mut Document, records: &[MutationRecord]) -> ApplyReport {
        let mut report = ApplyReport::default();
        let binding = &self.binding;

        for node in records.iter().flat_map(|r| r.added_nodes.iter().copied()) {
            if !doc.is_element(node) {
                continue;
            }

            if doc.matches(node, &binding.tag, &binding.selector) {
                self.apply_if_known(doc, node, &mut report);
            }

            for child in doc.select_all(node, &binding.tag, &binding.selector) {
                self.apply_if_known(doc, child, &mut report);
            }
        }

        report
    }

    fn apply_if_known(&self, doc: &mut Document, element: NodeId, report: &mut ApplyReport) {
        let known = doc
            .get_attribute(element, &self.binding.selector)
            .is_some_and(|name| self.registry.contains(name));
        if known {
            let result = apply_named(doc, &self.registry, element, &self.binding);
            report.record(element, result);
        }
    }
}
