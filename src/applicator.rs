//! Writing resolved presets onto elements
//!
//! Presets supply defaults, never overrides: an attribute already present on
//! an element is left alone whatever its value.

use crate::config::ElementBinding;
use crate::dom::{Document, NodeId};
use crate::error::ApplyError;
use crate::preset::{Namespace, ResolvedPreset};
use crate::registry::PresetRegistry;

/// Attributes written by one application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub written: Vec<Namespace>,
}

/// Tally of a pass over several elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Elements that received a preset
    pub applied: Vec<NodeId>,
    /// Elements naming a preset that is not registered
    pub unknown: Vec<NodeId>,
    /// Elements whose preset could not be applied
    pub failed: Vec<(NodeId, ApplyError)>,
}

impl ApplyReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.unknown.is_empty() && self.failed.is_empty()
    }

    /// Fold one element's result into the report
    pub fn record(&mut self, element: NodeId, result: Result<Option<ApplyOutcome>, ApplyError>) {
        match result {
            Ok(Some(_)) => self.applied.push(element),
            Ok(None) => self.unknown.push(element),
            Err(err) => {
                log::warn!("could not apply preset to element {}: {}", element, err);
                self.failed.push((element, err));
            }
        }
    }

    pub fn merge(&mut self, other: ApplyReport) {
        self.applied.extend(other.applied);
        self.unknown.extend(other.unknown);
        self.failed.extend(other.failed);
    }
}

/// Apply a resolved preset to an element
///
/// Each transferable namespace with a non-empty value is written unless the
/// element already carries that attribute. The marker attribute is then set
/// to the preset name unconditionally.
pub fn apply(
    doc: &mut Document,
    element: NodeId,
    preset: &ResolvedPreset,
    binding: &ElementBinding,
) -> Result<ApplyOutcome, ApplyError> {
    let mut outcome = ApplyOutcome::default();

    for namespace in Namespace::ALL {
        let Some(value) = preset.get(namespace).filter(|v| !v.is_empty()) else {
            continue;
        };
        let attribute = namespace.attribute_name();
        if doc.has_attribute(element, attribute) {
            continue;
        }
        doc.set_attribute(element, attribute, value)?;
        outcome.written.push(namespace);
    }

    doc.set_attribute(element, &binding.marker, &preset.name)?;
    Ok(outcome)
}

/// Apply the preset named by an element's selector attribute
///
/// Returns `Ok(None)` and leaves the element untouched when it has no
/// selector or names a preset that is not registered.
pub fn apply_named(
    doc: &mut Document,
    registry: &PresetRegistry,
    element: NodeId,
    binding: &ElementBinding,
) -> Result<Option<ApplyOutcome>, ApplyError> {
    let Some(name) = doc.get_attribute(element, &binding.selector).map(str::to_string) else {
        return Ok(None);
    };

    if !registry.contains(&name) {
        log::debug!("element {} names unknown preset '{}'", element, name);
        return Ok(None);
    }

    match registry.resolve(&name)? {
        Some(resolved) => apply(doc, element, &resolved, binding).map(Some),
        None => Ok(None),
    }
}

/// Apply presets to every target element in the document
pub fn sweep(
    doc: &mut Document,
    registry: &PresetRegistry,
    binding: &ElementBinding,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for element in doc.select_all(doc.root(), &binding.tag, &binding.selector) {
        let result = apply_named(doc, registry, element, binding);
        report.record(element, result);
    }
    report
}
