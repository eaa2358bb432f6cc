//! In-memory document tree with child-list change notifications
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! detaches it but keeps it addressable, so callers may still hold and
//! re-insert it.
//!
//! Observation follows the usual mutation-observer model: an observer is
//! registered on a root, every insertion or removal at or below that root
//! queues a [`MutationRecord`], and the owner drains the queue in batches
//! with [`Document::take_records`]. Attribute changes are not reported.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use thiserror::Error;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered observer
///
/// Dropping the handle unregisters the observer.
#[derive(Debug)]
pub struct ObserverId {
    index: usize,
    alive: Arc<()>,
}

/// Errors from tree manipulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// An element's tag and attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag_name: String,
    attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// One change to the child list of `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Observer {
    root: NodeId,
    pending: Vec<MutationRecord>,
    owner: Weak<()>,
}

/// A document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observers: Vec<Option<Observer>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing an empty `<body>`
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let body = doc.create_element("body");
        doc.nodes[body.0].parent = Some(doc.root);
        doc.nodes[doc.root.0].children.push(body);
        doc
    }

    /// Create a document with nothing below the document node
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            observers: Vec::new(),
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The first `<body>` element, if any
    pub fn body(&self) -> Option<NodeId> {
        self.find_first(self.root, "body")
    }

    /// First descendant element with the given tag, in tree order
    pub fn find_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some(tag.as_str()))
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `id` is `ancestor` or lies below it
    pub fn is_inclusive_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Whether the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_descendant(id, self.root)
    }

    /// All nodes below `scope` in tree order, excluding `scope` itself
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // ── Attributes ────────────────────────────────────────────────────

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.attributes.get(&attribute_key(name)))
            .map(|v| v.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id)
            .is_some_and(|e| e.attributes.contains_key(&attribute_key(name)))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .attributes
            .insert(attribute_key(name), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(
        &mut self,
        id: NodeId,
        name: &str,
    ) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(id)?.attributes.remove(&attribute_key(name)))
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Whether the node is an element with `tag` carrying `attribute`
    pub fn matches(&self, id: NodeId, tag: &str, attribute: &str) -> bool {
        self.element(id).is_some_and(|e| {
            e.tag_name.eq_ignore_ascii_case(tag)
                && e.attributes.contains_key(&attribute_key(attribute))
        })
    }

    /// Descendants of `scope` matching `tag[attribute]`, in tree order
    pub fn select_all(&self, scope: NodeId, tag: &str, attribute: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.matches(id, tag, attribute))
            .collect()
    }

    // ── Tree mutation ─────────────────────────────────────────────────

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        self.node(child)?;

        if !matches!(parent_node.kind, NodeKind::Document | NodeKind::Element(_)) {
            return Err(DomError::InvalidHierarchy(format!(
                "node {} cannot have children",
                parent
            )));
        }
        if child == self.root {
            return Err(DomError::InvalidHierarchy(
                "the document node cannot be inserted".to_string(),
            ));
        }
        if self.is_inclusive_descendant(parent, child) {
            return Err(DomError::InvalidHierarchy(format!(
                "appending {} to {} would create a cycle",
                child, parent
            )));
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.notify(MutationRecord {
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
        });
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }

        self.nodes[parent.0].children.retain(|&id| id != child);
        self.nodes[child.0].parent = None;
        self.notify(MutationRecord {
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![child],
        });
        Ok(())
    }

    // ── Observation ───────────────────────────────────────────────────

    /// Start observing child-list changes at or below `root`
    ///
    /// The returned handle keeps the observer alive. Once it is dropped the
    /// observer stops queueing records and its slot is released on the next
    /// change.
    pub fn observe(&mut self, root: NodeId) -> Result<ObserverId, DomError> {
        self.node(root)?;
        let handle = ObserverId {
            index: self.observers.len(),
            alive: Arc::new(()),
        };
        self.observers.push(Some(Observer {
            root,
            pending: Vec::new(),
            owner: Arc::downgrade(&handle.alive),
        }));
        Ok(handle)
    }

    /// Stop an observer and drop its pending records
    pub fn disconnect(&mut self, id: ObserverId) {
        if let Some(slot) = self.observers.get_mut(id.index) {
            *slot = None;
        }
    }

    /// Drain the records queued for an observer
    pub fn take_records(&mut self, id: &ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(id.index)
            .and_then(Option::as_mut)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }

    /// Whether an observer has records waiting
    pub fn has_pending(&self, id: &ObserverId) -> bool {
        self.observers
            .get(id.index)
            .and_then(Option::as_ref)
            .is_some_and(|o| !o.pending.is_empty())
    }

    /// Number of observers still registered
    pub fn observer_count(&self) -> usize {
        self.observers
            .iter()
            .flatten()
            .filter(|o| o.owner.strong_count() > 0)
            .count()
    }

    fn notify(&mut self, record: MutationRecord) {
        for slot in self.observers.iter_mut() {
            if slot.as_ref().is_some_and(|o| o.owner.strong_count() == 0) {
                *slot = None;
            }
        }

        let target = record.target;
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (i, o.root)))
            .filter(|&(_, root)| self.is_inclusive_descendant(target, root))
            .map(|(i, _)| i)
            .collect();
        for index in interested {
            if let Some(observer) = self.observers[index].as_mut() {
                observer.pending.push(record.clone());
            }
        }
    }
}

/// Attribute names are ASCII case-insensitive and stored lower-cased
fn attribute_key(name: &str) -> String {
    name.to_ascii_lowercase()
}
