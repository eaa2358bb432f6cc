//! End-to-end scenarios: definitions text in, styled elements out

use pretty_assertions::assert_eq;

use reedstyle_components::{
    parse, ComponentSystem, Document, ElementBinding, InitStatus, MemorySource, NodeId,
    PresetRegistry, SystemConfig,
};

const DEFINITIONS: &str =
    "components:\n  A:\n    face: \"f1\"\n  B:\n    extends: A\n    text: \"t1\"\n";

fn source() -> MemorySource {
    MemorySource::new().with("/reedstyle.components.yaml", DEFINITIONS)
}

fn target(doc: &mut Document, preset: &str) -> NodeId {
    let el = doc.create_element("r-s");
    doc.set_attribute(el, "as", preset).unwrap();
    el
}

fn attributes(doc: &Document, el: NodeId) -> Vec<(String, String)> {
    doc.element(el)
        .map(|e| {
            e.attributes()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn initialized(doc: &mut Document) -> ComponentSystem {
    let mut system = ComponentSystem::new(SystemConfig::default());
    let status = system.initialize(doc, &source());
    assert!(matches!(status, InitStatus::Ready(_)), "got {:?}", status);
    system
}

#[test]
fn test_child_preset_resolves_through_parent() {
    let registry = PresetRegistry::from_presets(parse(DEFINITIONS));
    let resolved = registry.resolve("B").unwrap().unwrap();
    assert_eq!(
        resolved.public_attributes().into_iter().collect::<Vec<_>>(),
        vec![("face", "f1"), ("text", "t1")]
    );
}

#[test]
fn test_existing_element_gets_defaults_and_marker() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let el = target(&mut doc, "B");
    doc.append_child(body, el).unwrap();

    initialized(&mut doc);

    assert_eq!(
        attributes(&doc, el),
        pairs(&[("as", "B"), ("data-component", "B"), ("face", "f1"), ("text", "t1")])
    );
}

#[test]
fn test_author_attribute_wins_over_preset() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let el = target(&mut doc, "B");
    doc.set_attribute(el, "face", "custom").unwrap();
    doc.append_child(body, el).unwrap();

    initialized(&mut doc);

    assert_eq!(doc.get_attribute(el, "face"), Some("custom"));
    assert_eq!(doc.get_attribute(el, "text"), Some("t1"));
}

#[test]
fn test_unknown_preset_reference_is_left_alone() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let el = target(&mut doc, "Unknown");
    doc.append_child(body, el).unwrap();

    initialized(&mut doc);

    assert_eq!(attributes(&doc, el), pairs(&[("as", "Unknown")]));
}

#[test]
fn test_element_inserted_after_sweep_is_styled() {
    let mut doc = Document::new();
    let system = initialized(&mut doc);

    let body = doc.body().unwrap();
    let el = target(&mut doc, "B");
    doc.append_child(body, el).unwrap();
    let report = system.pump(&mut doc);

    assert_eq!(report.applied, vec![el]);
    assert_eq!(
        attributes(&doc, el),
        pairs(&[("as", "B"), ("data-component", "B"), ("face", "f1"), ("text", "t1")])
    );
}

#[test]
fn test_box_round_trips_to_element() {
    let raw = "components:\n  boxed:\n    box: \"padding:4\"\n";
    let registry = PresetRegistry::from_presets(parse(raw));
    let resolved = registry.resolve("boxed").unwrap().unwrap();

    let mut doc = Document::new();
    let el = target(&mut doc, "boxed");
    reedstyle_components::apply(&mut doc, el, &resolved, &ElementBinding::default()).unwrap();

    assert_eq!(doc.get_attribute(el, "box"), Some("padding:4"));
}

#[test]
fn test_reapplying_is_idempotent() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let el = target(&mut doc, "B");
    doc.append_child(body, el).unwrap();
    let system = initialized(&mut doc);
    let before = attributes(&doc, el);

    // Moving the element re-inserts it under the watched root.
    let wrapper = doc.create_element("div");
    doc.append_child(wrapper, el).unwrap();
    doc.append_child(body, wrapper).unwrap();
    let report = system.pump(&mut doc);

    assert_eq!(report.applied, vec![el]);
    assert_eq!(attributes(&doc, el), before);
}
