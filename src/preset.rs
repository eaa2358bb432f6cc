//! Preset data model
//!
//! A preset is a named bundle of attribute defaults. Presets may inherit from
//! one parent preset; resolving a preset flattens that chain into a
//! [`ResolvedPreset`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Byte range in definition source text
pub type Span = std::ops::Range<usize>;

/// Key under which the public `box` attribute is stored inside a preset.
///
/// `box` collides with a structural keyword of the attribute vocabulary, so
/// it is kept under this key until it is written back onto an element.
pub const BOX_STORAGE_KEY: &str = "box_";

/// Property naming the parent preset
pub const PARENT_KEY: &str = "extends";

/// Property naming the tag a component renders as; kept but never applied
pub const ELEMENT_KEY: &str = "element";

/// Flat mapping from storage key to attribute value
pub type AttributeMap = BTreeMap<String, String>;

/// Mapping from preset name to preset
pub type PresetMap = BTreeMap<String, Preset>;

/// The attribute namespaces a preset can transfer onto an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Box,
    Face,
    Text,
    Layout,
    Device,
    Fx,
}

impl Namespace {
    /// Every transferable namespace, in application order
    pub const ALL: [Namespace; 6] = [
        Namespace::Box,
        Namespace::Face,
        Namespace::Text,
        Namespace::Layout,
        Namespace::Device,
        Namespace::Fx,
    ];

    /// Name of the attribute as it appears on elements
    pub fn attribute_name(self) -> &'static str {
        match self {
            Namespace::Box => "box",
            Namespace::Face => "face",
            Namespace::Text => "text",
            Namespace::Layout => "layout",
            Namespace::Device => "device",
            Namespace::Fx => "fx",
        }
    }

    /// Key under which the namespace is stored inside a preset
    pub fn storage_key(self) -> &'static str {
        match self {
            Namespace::Box => BOX_STORAGE_KEY,
            other => other.attribute_name(),
        }
    }

    /// Look up a namespace by its public attribute name or its storage key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.attribute_name() == key || ns.storage_key() == key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// Map a key as written by an author to the key it is stored under.
pub fn storage_key(key: &str) -> &str {
    if key == Namespace::Box.attribute_name() {
        BOX_STORAGE_KEY
    } else {
        key
    }
}

/// Map a storage key back to the public attribute name.
pub fn public_key(key: &str) -> &str {
    if key == BOX_STORAGE_KEY {
        Namespace::Box.attribute_name()
    } else {
        key
    }
}

/// A named preset as written in the definitions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preset {
    /// Unique preset name
    pub name: String,
    /// Name of the preset this one extends
    pub parent: Option<String>,
    /// Own attributes, keyed by storage key
    pub attributes: AttributeMap,
    /// Location of the preset header in the source text
    pub span: Option<Span>,
    /// Location of the parent reference in the source text
    pub parent_span: Option<Span>,
}

impl Preset {
    /// Create an empty preset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the parent preset
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add an attribute, translating the key to its storage form
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes
            .insert(storage_key(key).to_string(), value.into());
        self
    }

    /// Value stored for a namespace
    pub fn get(&self, namespace: Namespace) -> Option<&str> {
        self.attributes
            .get(namespace.storage_key())
            .map(|s| s.as_str())
    }
}

/// A preset flattened with all of its ancestors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPreset {
    pub name: String,
    pub attributes: AttributeMap,
}

impl ResolvedPreset {
    /// Value for a namespace, if defined
    pub fn get(&self, namespace: Namespace) -> Option<&str> {
        self.attributes
            .get(namespace.storage_key())
            .map(|s| s.as_str())
    }

    /// Attributes keyed by their public names
    pub fn public_attributes(&self) -> BTreeMap<&str, &str> {
        self.attributes
            .iter()
            .map(|(k, v)| (public_key(k), v.as_str()))
            .collect()
    }
}

impl fmt::Display for ResolvedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (key, value) in self.public_attributes() {
            writeln!(f, "  {key}=\"{value}\"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_round_trips_through_storage_key() {
        assert_eq!(storage_key("box"), "box_");
        assert_eq!(public_key("box_"), "box");
        assert_eq!(storage_key("face"), "face");
        assert_eq!(public_key("face"), "face");
    }

    #[test]
    fn test_namespace_lookup_accepts_both_forms() {
        assert_eq!(Namespace::from_key("box"), Some(Namespace::Box));
        assert_eq!(Namespace::from_key("box_"), Some(Namespace::Box));
        assert_eq!(Namespace::from_key("fx"), Some(Namespace::Fx));
        assert_eq!(Namespace::from_key("element"), None);
    }

    #[test]
    fn test_preset_builder_stores_box_internally() {
        let preset = Preset::new("card").with_attribute("box", "padding:4");
        assert!(preset.attributes.contains_key("box_"));
        assert_eq!(preset.get(Namespace::Box), Some("padding:4"));
    }

    #[test]
    fn test_resolved_display_uses_public_names() {
        let resolved = ResolvedPreset {
            name: "card".to_string(),
            attributes: Preset::new("card")
                .with_attribute("box", "padding:4")
                .with_attribute("face", "bg:base-50")
                .attributes,
        };
        insta::assert_snapshot!(resolved.to_string(), @r###"
        card
          box="padding:4"
          face="bg:base-50"
        "###);
    }
}
