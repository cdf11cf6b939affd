#![forbid(unsafe_code)]

//! Arena-backed element tree.
//!
//! `Document` is the stand-in for a live browser document: elements with
//! ordered attributes, a parent/children structure, optional layout sizes,
//! inline style properties, and a single focused element.
//!
//! # Invariants
//!
//! - `NodeId`s are never reused. Removing a node only detaches it (as in the
//!   DOM), so an id stays valid for the lifetime of the document.
//! - The body node is always connected and can never be removed or appended.
//! - `children` order is document order; [`Document::descendants`] walks in
//!   pre-order, which is document order.
//! - The active element is always connected; detaching a subtree that holds
//!   focus clears it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Foreign id | `NodeId` from another document | Queries return `None`/`false`, setters are no-ops |
//! | Cycle | Appending an ancestor into its descendant | `DomError::HierarchyRequest` |
//! | Body append | Moving the body | `DomError::HierarchyRequest` |

use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::Size;
use crate::selector::Selector;

/// Prefix for author-defined data attributes.
pub const DATA_PREFIX: &str = "data-";

/// Identifier for an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from structural document mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id was not issued by this document.
    UnknownNode(NodeId),
    /// The mutation would break the tree (cycle, or moving the body).
    HierarchyRequest { parent: NodeId, child: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child} into {parent}")
            }
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    size: Option<Size>,
    inline_style: BTreeMap<String, String>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            size: None,
            inline_style: BTreeMap::new(),
        }
    }
}

/// An element tree with focus tracking.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only a `body` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("body")],
            body: NodeId(0),
            active: None,
        }
    }

    /// The root `body` element.
    #[inline]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Number of elements ever created (connected or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds only its body.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Whether `id` was issued by this document.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    // --- Structure ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(DomError::UnknownNode(id));
            }
        }
        if child == self.body || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Detach `node` (and its subtree) from the tree.
    ///
    /// The subtree stays addressable; only its connection is cut. Focus inside
    /// the subtree is dropped.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body || !self.contains(node) {
            return;
        }
        if let Some(active) = self.active
            && (active == node || self.ancestors(active).any(|a| a == node))
        {
            self.active = None;
        }
        self.detach(node);
        #[cfg(feature = "tracing")]
        tracing::trace!(node = %node, "detached subtree");
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != node);
        }
    }

    /// Parent element, if attached.
    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    /// Children in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], |n| n.children.as_slice())
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(node),
        }
    }

    /// Proper descendants in document (pre-)order.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Whether `node` is reachable from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.body || self.ancestors(node).any(|a| a == self.body)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Lowercase tag name.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.tag.as_str())
    }

    /// Whether `node` has the given (lowercase) tag.
    pub fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag(node) == Some(tag)
    }

    // --- Attributes ---

    /// Attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attributes.get(name).map(String::as_str)
    }

    /// Whether the attribute is present (any value, including empty).
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.attributes.contains_key(name))
    }

    /// Set an attribute. Names are lowercased.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.node_mut(node)?.attributes.remove(name)
    }

    /// Add the attribute with an empty value when `on`, remove it otherwise.
    pub fn toggle_attribute(&mut self, node: NodeId, name: &str, on: bool) {
        if on {
            if !self.has_attribute(node, name) {
                self.set_attribute(node, name, "");
            }
        } else {
            self.remove_attribute(node, name);
        }
    }

    /// All attributes, sorted by name.
    pub fn attributes(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        self.node(node).map(|n| &n.attributes)
    }

    // --- Dataset (data-* attributes) ---

    /// Value of `data-{key}`.
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attribute(node, &format!("{DATA_PREFIX}{key}"))
    }

    /// Whether `data-{key}` is present.
    pub fn has_data(&self, node: NodeId, key: &str) -> bool {
        self.has_attribute(node, &format!("{DATA_PREFIX}{key}"))
    }

    /// Set `data-{key}`.
    pub fn set_data(&mut self, node: NodeId, key: &str, value: impl Into<String>) {
        self.set_attribute(node, &format!("{DATA_PREFIX}{key}"), value);
    }

    /// Remove `data-{key}`.
    pub fn remove_data(&mut self, node: NodeId, key: &str) -> Option<String> {
        self.remove_attribute(node, &format!("{DATA_PREFIX}{key}"))
    }

    /// All `data-*` attributes with the prefix stripped.
    pub fn dataset(&self, node: NodeId) -> BTreeMap<String, String> {
        self.node(node)
            .map(|n| {
                n.attributes
                    .iter()
                    .filter_map(|(k, v)| {
                        k.strip_prefix(DATA_PREFIX)
                            .map(|key| (key.to_owned(), v.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write every entry of `dataset` as `data-*` attributes, keeping others.
    pub fn apply_dataset(&mut self, node: NodeId, dataset: &BTreeMap<String, String>) {
        for (key, value) in dataset {
            self.set_data(node, key, value.clone());
        }
    }

    /// Replace all `data-*` attributes with `dataset`, as a markup patch would.
    pub fn replace_dataset(&mut self, node: NodeId, dataset: &BTreeMap<String, String>) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.retain(|k, _| !k.starts_with(DATA_PREFIX));
        }
        self.apply_dataset(node, dataset);
    }

    // --- Layout & inline style ---

    /// Layout size reported by the renderer, if known.
    pub fn size(&self, node: NodeId) -> Option<Size> {
        self.node(node)?.size
    }

    /// Record the layout size of `node`.
    pub fn set_size(&mut self, node: NodeId, size: Size) {
        if let Some(n) = self.node_mut(node) {
            n.size = Some(size);
        }
    }

    /// Inline style property (`style.getPropertyValue`).
    pub fn style_property(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.inline_style.get(name).map(String::as_str)
    }

    /// Set an inline style property (`style.setProperty`).
    pub fn set_style_property(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.inline_style.insert(name.to_owned(), value.into());
        }
    }

    /// All inline style properties.
    pub fn inline_style(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        self.node(node).map(|n| &n.inline_style)
    }

    // --- Queries ---

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// `node` or its nearest ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| selector.matches(self, n))
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope).find(|&n| selector.matches(self, n))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    // --- Focus ---

    /// The focused element.
    #[inline]
    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Move focus to `node`. Detached nodes cannot take focus.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.contains(node) || !self.is_connected(node) {
            return false;
        }
        self.active = Some(node);
        true
    }

    /// Drop focus.
    pub fn blur(&mut self) {
        self.active = None;
    }
}

/// Iterator over proper ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over proper descendants.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
