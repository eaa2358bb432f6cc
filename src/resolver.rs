//! Inheritance resolution - flattens a preset with its ancestors

use std::collections::BTreeMap;

use crate::error::ResolveError;
use crate::preset::{AttributeMap, ResolvedPreset};
use crate::registry::PresetRegistry;

/// Context for resolving one inheritance chain
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// Presets currently being resolved, outermost first (for cycle detection)
    chain: Vec<String>,
}

impl ResolutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a preset is currently being resolved
    pub fn is_resolving(&self, name: &str) -> bool {
        self.chain.iter().any(|n| n == name)
    }

    /// Mark a preset as being resolved
    pub fn start_resolving(&mut self, name: &str) {
        self.chain.push(name.to_string());
    }

    /// Mark a preset as done resolving
    pub fn done_resolving(&mut self, name: &str) {
        if let Some(pos) = self.chain.iter().rposition(|n| n == name) {
            self.chain.remove(pos);
        }
    }

    fn cycle_error(&self, name: &str) -> ResolveError {
        let mut chain = self.chain.clone();
        chain.push(name.to_string());
        ResolveError::CyclicInheritance { chain }
    }
}

/// Resolve a preset by name
///
/// Returns `Ok(None)` when the preset does not exist. A parent that does not
/// exist is dropped and the preset's own attributes are used as they are.
pub fn resolve(
    registry: &PresetRegistry,
    name: &str,
) -> Result<Option<ResolvedPreset>, ResolveError> {
    let mut ctx = ResolutionContext::new();
    Ok(resolve_attributes(registry, name, &mut ctx)?.map(|attributes| ResolvedPreset {
        name: name.to_string(),
        attributes,
    }))
}

/// Resolve every preset in the registry
pub fn resolve_all(
    registry: &PresetRegistry,
) -> BTreeMap<String, Result<ResolvedPreset, ResolveError>> {
    registry
        .names()
        .filter_map(|name| {
            resolve(registry, name)
                .transpose()
                .map(|result| (name.to_string(), result))
        })
        .collect()
}

fn resolve_attributes(
    registry: &PresetRegistry,
    name: &str,
    ctx: &mut ResolutionContext,
) -> Result<Option<AttributeMap>, ResolveError> {
    let Some(preset) = registry.get(name) else {
        return Ok(None);
    };

    if ctx.is_resolving(name) {
        return Err(ctx.cycle_error(name));
    }

    let Some(parent) = preset.parent.as_deref() else {
        return Ok(Some(preset.attributes.clone()));
    };

    ctx.start_resolving(name);
    let base = resolve_attributes(registry, parent, ctx);
    ctx.done_resolving(name);

    match base? {
        Some(mut attributes) => {
            attributes.extend(
                preset
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            Ok(Some(attributes))
        }
        None => {
            log::debug!(
                "preset '{}' extends unknown preset '{}'; using its own attributes",
                name,
                parent
            );
            Ok(Some(preset.attributes.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{Preset, PresetMap};
    use pretty_assertions::assert_eq;

    fn registry(presets: Vec<Preset>) -> PresetRegistry {
        let map: PresetMap = presets.into_iter().map(|p| (p.name.clone(), p)).collect();
        PresetRegistry::from_presets(map)
    }

    fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_preset_is_absent() {
        let reg = registry(vec![]);
        assert_eq!(resolve(&reg, "missing"), Ok(None));
    }

    #[test]
    fn test_preset_without_parent_is_unchanged() {
        let reg = registry(vec![Preset::new("a").with_attribute("face", "f1")]);
        let resolved = resolve(&reg, "a").unwrap().unwrap();
        assert_eq!(resolved.attributes, attrs(&[("face", "f1")]));
    }

    #[test]
    fn test_child_inherits_and_overrides() {
        let reg = registry(vec![
            Preset::new("a")
                .with_attribute("face", "f1")
                .with_attribute("text", "t0"),
            Preset::new("b").with_parent("a").with_attribute("text", "t1"),
        ]);
        let resolved = resolve(&reg, "b").unwrap().unwrap();
        assert_eq!(resolved.attributes, attrs(&[("face", "f1"), ("text", "t1")]));
    }

    #[test]
    fn test_multi_level_chain() {
        let reg = registry(vec![
            Preset::new("base").with_attribute("box", "padding:2"),
            Preset::new("card").with_parent("base").with_attribute("face", "bg:1"),
            Preset::new("hero").with_parent("card").with_attribute("box", "padding:8"),
        ]);
        let resolved = resolve(&reg, "hero").unwrap().unwrap();
        assert_eq!(resolved.attributes, attrs(&[("box_", "padding:8"), ("face", "bg:1")]));
    }

    #[test]
    fn test_missing_parent_falls_back_to_own_attributes() {
        let reg = registry(vec![Preset::new("b")
            .with_parent("ghost")
            .with_attribute("text", "t1")]);
        let resolved = resolve(&reg, "b").unwrap().unwrap();
        assert_eq!(resolved.attributes, attrs(&[("text", "t1")]));
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let reg = registry(vec![Preset::new("a").with_parent("a")]);
        assert_eq!(
            resolve(&reg, "a"),
            Err(ResolveError::CyclicInheritance {
                chain: vec!["a".to_string(), "a".to_string()]
            })
        );
    }

    #[test]
    fn test_indirect_cycle_reports_chain() {
        let reg = registry(vec![
            Preset::new("a").with_parent("b"),
            Preset::new("b").with_parent("c"),
            Preset::new("c").with_parent("a"),
            Preset::new("d").with_parent("a"),
        ]);
        assert_eq!(
            resolve(&reg, "d"),
            Err(ResolveError::CyclicInheritance {
                chain: ["d", "a", "b", "c", "a"].iter().map(|s| s.to_string()).collect()
            })
        );
    }

    #[test]
    fn test_shared_ancestor_is_not_a_cycle() {
        let reg = registry(vec![
            Preset::new("base").with_attribute("face", "f"),
            Preset::new("left").with_parent("base"),
            Preset::new("right").with_parent("base"),
        ]);
        let all = resolve_all(&reg);
        assert_eq!(all.len(), 3);
        assert!(all.values().all(|r| r.is_ok()));
    }

    #[test]
    fn test_resolve_all_keeps_failures_per_preset() {
        let reg = registry(vec![
            Preset::new("loop").with_parent("loop"),
            Preset::new("fine").with_attribute("fx", "shadow"),
        ]);
        let all = resolve_all(&reg);
        assert!(all["loop"].is_err());
        assert_eq!(all["fine"].as_ref().map(|r| r.attributes.len()), Ok(1));
    }
}
